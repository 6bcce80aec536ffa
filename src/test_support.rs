//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::frame::HtmlMarkup;
use crate::core::input::InputState;
use crate::core::surface::DisplaySurface;
use crate::service::{Frame, OpaqueState, ServiceError, SimulationService};

/// One recorded service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init,
    Update(OpaqueState, InputState),
    Render(OpaqueState, u16, u16),
}

/// A service that replays queued results and records every call.
///
/// With nothing queued, `init` returns `"S0"`, `update` appends `"+"` to the
/// state and `render` returns `height` rows of dots.
pub struct ScriptedService {
    init: Mutex<Option<Result<OpaqueState, ServiceError>>>,
    updates: Mutex<VecDeque<Result<OpaqueState, ServiceError>>>,
    renders: Mutex<VecDeque<Result<Frame, ServiceError>>>,
    update_delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self {
            init: Mutex::new(None),
            updates: Mutex::new(VecDeque::new()),
            renders: Mutex::new(VecDeque::new()),
            update_delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_init(self, result: Result<OpaqueState, ServiceError>) -> Self {
        *self.init.lock().unwrap() = Some(result);
        self
    }

    pub fn push_update(self, result: Result<OpaqueState, ServiceError>) -> Self {
        self.updates.lock().unwrap().push_back(result);
        self
    }

    pub fn push_render(self, result: Result<Frame, ServiceError>) -> Self {
        self.renders.lock().unwrap().push_back(result);
        self
    }

    /// Make every `update` sleep before answering.
    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SimulationService for ScriptedService {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn init(&self) -> Result<OpaqueState, ServiceError> {
        self.record(Call::Init);
        self.init
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(OpaqueState::from("S0")))
    }

    async fn update(&self, state: &OpaqueState, input: InputState) -> Result<OpaqueState, ServiceError> {
        self.record(Call::Update(state.clone(), input));
        if let Some(delay) = self.update_delay {
            tokio::time::sleep(delay).await;
        }
        let queued = self.updates.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(OpaqueState::from(format!("{}+", state.as_str()))))
    }

    async fn render(&self, state: &OpaqueState, width: u16, height: u16) -> Result<Frame, ServiceError> {
        self.record(Call::Render(state.clone(), width, height));
        let queued = self.renders.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| {
            let row = ".".repeat(usize::from(width));
            Ok(Frame::from(vec![row; usize::from(height)].join("\n")))
        })
    }
}

/// A surface that records every call made on it.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub sizes: Vec<(u32, u32)>,
    pub fonts: Vec<(u32, u32)>,
    pub contents: Vec<String>,
}

impl RecordingSurface {
    /// The content currently shown, if any.
    pub fn current(&self) -> Option<&str> {
        self.contents.last().map(String::as_str)
    }
}

impl DisplaySurface for RecordingSurface {
    type Markup = HtmlMarkup;

    fn set_size(&mut self, width_px: u32, height_px: u32) {
        self.sizes.push((width_px, height_px));
    }

    fn set_font(&mut self, size_px: u32, line_height_px: u32) {
        self.fonts.push((size_px, line_height_px));
    }

    fn set_content(&mut self, markup: String) {
        self.contents.push(markup);
    }
}
