//! HTTP transport for the simulation service.
//!
//! Every call is a `POST` with a JSON body, answered by a JSON string:
//!
//! | Call     | Path            | Body                                   |
//! |----------|-----------------|----------------------------------------|
//! | `init`   | `/init_game`    | `{}`                                   |
//! | `update` | `/update_game`  | `{"stateJson": .., "input": {..}}`     |
//! | `render` | `/render_frame` | `{"stateJson": .., "width": .., "height": ..}` |

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Serialize;

use crate::core::input::InputState;
use crate::service::{Frame, OpaqueState, ServiceError, SimulationService};

// ============================================================================
// Request Bodies
// ============================================================================

#[derive(Serialize, Debug)]
struct InitRequest {}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    state_json: &'a str,
    input: InputState,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RenderRequest<'a> {
    state_json: &'a str,
    width: u16,
    height: u16,
}

// ============================================================================
// Client
// ============================================================================

pub struct HttpSimulation {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSimulation {
    /// `timeout` of `None` lets a call take as long as the service needs.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let base_url = base_url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ServiceError::Config(format!(
                "service URL must start with http:// or https://, got {base_url:?}"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ServiceError::Config(e.to_string()))?;

        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `{base}/{command}` and decode the JSON string reply.
    async fn invoke<B: Serialize + ?Sized>(&self, command: &str, body: &B) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, command))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        debug!("{command}: HTTP {} ({} bytes)", status, text.len());

        if !status.is_success() {
            warn!("{command} failed: {} - {}", status, text);
            // A JSON string body is the service's own error message.
            return Err(match serde_json::from_str::<String>(&text) {
                Ok(message) => ServiceError::Rejected(message),
                Err(_) => ServiceError::Api {
                    status: status.as_u16(),
                    message: text,
                },
            });
        }

        serde_json::from_str::<String>(&text)
            .map_err(|e| ServiceError::Parse(format!("{command}: expected a JSON string: {e}")))
    }
}

#[async_trait]
impl SimulationService for HttpSimulation {
    fn name(&self) -> &str {
        "http"
    }

    async fn init(&self) -> Result<OpaqueState, ServiceError> {
        self.invoke("init_game", &InitRequest {}).await.map(OpaqueState::from)
    }

    async fn update(&self, state: &OpaqueState, input: InputState) -> Result<OpaqueState, ServiceError> {
        let body = UpdateRequest {
            state_json: state.as_str(),
            input,
        };
        self.invoke("update_game", &body).await.map(OpaqueState::from)
    }

    async fn render(&self, state: &OpaqueState, width: u16, height: u16) -> Result<Frame, ServiceError> {
        let body = RenderRequest {
            state_json: state.as_str(),
            width,
            height,
        };
        self.invoke("render_frame", &body).await.map(Frame::from)
    }
}
