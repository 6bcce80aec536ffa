use std::fmt;

use async_trait::async_trait;

use super::types::{Frame, OpaqueState};
use crate::core::input::InputState;

/// Errors from the simulation service boundary.
#[derive(Debug)]
pub enum ServiceError {
    /// Client misconfigured (bad base URL). Never reaches the service.
    Config(String),
    /// Transport failure (timeout, DNS, connection refused).
    Network(String),
    /// The service answered with an error status and no usable message.
    Api { status: u16, message: String },
    /// The response body was not the expected JSON string.
    Parse(String),
    /// The service refused the call with its own error message.
    Rejected(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Config(msg) => write!(f, "config error: {msg}"),
            ServiceError::Network(msg) => write!(f, "network error: {msg}"),
            ServiceError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ServiceError::Parse(msg) => write!(f, "parse error: {msg}"),
            ServiceError::Rejected(msg) => write!(f, "rejected by service: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// The simulation: owns all game logic and is reached only through these
/// three calls. Each call may take arbitrarily long.
#[async_trait]
pub trait SimulationService: Send + Sync {
    /// Returns the name of the service backend.
    fn name(&self) -> &str;

    /// Create a fresh game.
    async fn init(&self) -> Result<OpaqueState, ServiceError>;

    /// Advance `state` by one tick under `input`.
    async fn update(&self, state: &OpaqueState, input: InputState) -> Result<OpaqueState, ServiceError>;

    /// Draw `state` into a `width` × `height` character frame.
    async fn render(&self, state: &OpaqueState, width: u16, height: u16) -> Result<Frame, ServiceError>;
}
