//! The remote simulation boundary: an opaque service reached through
//! `init`, `update` and `render`.

pub mod client;
pub mod http;
pub mod types;

use std::sync::Arc;

use log::info;

use crate::core::config::ResolvedConfig;

pub use client::{ServiceError, SimulationService};
pub use http::HttpSimulation;
pub use types::{Frame, OpaqueState};

/// Construct the service client for the resolved config.
pub fn build_service(config: &ResolvedConfig) -> Result<Arc<dyn SimulationService>, ServiceError> {
    let service = HttpSimulation::new(&config.service_url, config.service_timeout)?;
    info!(
        "Simulation service: {} (timeout: {:?})",
        service.base_url(),
        config.service_timeout
    );
    Ok(Arc::new(service))
}
