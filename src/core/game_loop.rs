//! # Game Loop
//!
//! The orchestrator. Owns the opaque game state between frames and drives
//! one request/response cycle per display refresh:
//!
//! ```text
//! Uninitialized ──init ok──▶ Running ──host shutdown──▶ Terminated
//!       │                    │    ▲
//!   init fails               └────┘ snapshot → update → render → display
//!       ▼
//!    Faulted
//! ```
//!
//! `update` and `render` failures are transient: they are logged, the state is
//! left as it was and the next refresh tries again. An `init` failure is final.
//!
//! Resize and shutdown arrive from the host through a [`HostLink`]. Shutdown
//! wins over everything, including an in-flight service call, which is simply
//! dropped.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::core::frame::FrameRenderer;
use crate::core::input::SharedInput;
use crate::core::surface::DisplaySurface;
use crate::core::viewport::{PixelArea, ViewportDimensions, ViewportSizer};
use crate::service::{OpaqueState, ServiceError, SimulationService};

// ============================================================================
// Errors
// ============================================================================

/// The per-frame service call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOp {
    Update,
    Render,
}

impl fmt::Display for StepOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOp::Update => write!(f, "update"),
            StepOp::Render => write!(f, "render"),
        }
    }
}

#[derive(Debug)]
pub enum LoopError {
    /// `init` failed. The loop never starts.
    Init(ServiceError),
    /// `update` or `render` failed. The next refresh retries.
    Step { op: StepOp, source: ServiceError },
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopError::Init(e) => write!(f, "init failed: {e}"),
            LoopError::Step { op, source } => write!(f, "{op} failed: {source}"),
        }
    }
}

impl std::error::Error for LoopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoopError::Init(e) => Some(e),
            LoopError::Step { source, .. } => Some(source),
        }
    }
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running(OpaqueState),
    Faulted,
    Terminated,
}

impl LoopState {
    /// The current game state, if the loop is running.
    pub fn game_state(&self) -> Option<&OpaqueState> {
        match self {
            LoopState::Running(state) => Some(state),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub iterations: u64,
    pub frames_presented: u64,
    pub update_failures: u64,
    pub render_failures: u64,
}

// ============================================================================
// Host link
// ============================================================================

/// Sender side held by the host's event listeners.
#[derive(Debug, Clone)]
pub struct HostHandle {
    resizes: mpsc::UnboundedSender<PixelArea>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl HostHandle {
    /// Report a new container size. Ignored once the loop is gone.
    pub fn resize(&self, container: PixelArea) {
        if self.resizes.send(container).is_err() {
            debug!("Resize after loop exit ignored");
        }
    }

    /// Ask the host to shut down. Takes effect immediately.
    pub fn terminate(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_terminated(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// Receiver side consumed by [`GameLoop::run`].
#[derive(Debug)]
pub struct HostLink {
    resizes: mpsc::UnboundedReceiver<PixelArea>,
    shutdown: watch::Receiver<bool>,
}

pub fn host_link() -> (HostHandle, HostLink) {
    let (resize_tx, resize_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    (
        HostHandle {
            resizes: resize_tx,
            shutdown: Arc::new(shutdown_tx),
        },
        HostLink {
            resizes: resize_rx,
            shutdown: shutdown_rx,
        },
    )
}

/// Resolves once shutdown is requested or every [`HostHandle`] is dropped.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

// ============================================================================
// Loop
// ============================================================================

pub struct GameLoop<S: DisplaySurface> {
    service: Arc<dyn SimulationService>,
    surface: S,
    input: Arc<SharedInput>,
    sizer: ViewportSizer,
    viewport: ViewportDimensions,
    state: LoopState,
    stats: LoopStats,
}

impl<S: DisplaySurface> GameLoop<S> {
    pub fn new(
        service: Arc<dyn SimulationService>,
        surface: S,
        input: Arc<SharedInput>,
        sizer: ViewportSizer,
    ) -> Self {
        Self {
            service,
            surface,
            input,
            sizer,
            viewport: ViewportDimensions::default(),
            state: LoopState::Uninitialized,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn viewport(&self) -> ViewportDimensions {
        self.viewport
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Call `init` and size the viewport. Only acts while `Uninitialized`.
    pub async fn start(&mut self, container: PixelArea) -> Result<(), LoopError> {
        if self.state != LoopState::Uninitialized {
            warn!("start() ignored: loop already left Uninitialized");
            return Ok(());
        }

        info!("Initializing game via {}", self.service.name());
        match self.service.init().await {
            Ok(initial) => {
                debug!("Initial state: {} bytes", initial.as_str().len());
                self.state = LoopState::Running(initial);
                self.resize(container);
                Ok(())
            }
            Err(e) => {
                error!("Failed to initialize game: {e}");
                self.state = LoopState::Faulted;
                Err(LoopError::Init(e))
            }
        }
    }

    /// Recompute the viewport for a new container size.
    pub fn resize(&mut self, container: PixelArea) {
        self.viewport = self.sizer.resize(&mut self.surface, container);
    }

    /// Run one iteration: snapshot input, update, render, display.
    ///
    /// A no-op unless the loop is `Running`. On an update failure the game
    /// state is untouched; on a render failure the state has already advanced
    /// and the previous frame stays on screen.
    pub async fn step(&mut self) -> Result<(), LoopError> {
        let LoopState::Running(current) = &self.state else {
            return Ok(());
        };
        self.stats.iterations += 1;

        let command = self.input.snapshot();
        let next = match self.service.update(current, command).await {
            Ok(next) => next,
            Err(source) => {
                self.stats.update_failures += 1;
                return Err(LoopError::Step {
                    op: StepOp::Update,
                    source,
                });
            }
        };

        let ViewportDimensions { columns, rows } = self.viewport;
        let rendered = self.service.render(&next, columns, rows).await;
        self.state = LoopState::Running(next);

        let frame = match rendered {
            Ok(frame) => frame,
            Err(source) => {
                self.stats.render_failures += 1;
                return Err(LoopError::Step {
                    op: StepOp::Render,
                    source,
                });
            }
        };

        FrameRenderer::display(&mut self.surface, &frame, usize::from(rows));
        self.stats.frames_presented += 1;
        Ok(())
    }

    /// Start the loop and keep stepping once per `refresh` until the host
    /// shuts down.
    ///
    /// Returns `Err(LoopError::Init)` if the loop never started; step failures
    /// are logged and never returned.
    pub async fn run(
        &mut self,
        container: PixelArea,
        refresh: Duration,
        mut link: HostLink,
    ) -> Result<LoopStats, LoopError> {
        tokio::select! {
            biased;
            _ = shutdown_requested(&mut link.shutdown) => {
                info!("Shutdown requested before the game started");
                self.state = LoopState::Terminated;
                return Ok(self.stats);
            }
            started = self.start(container) => started?,
        }

        // Missed ticks are delayed, not bunched: a slow service call pushes the
        // next iteration back instead of queueing catch-up frames.
        let mut refreshes = tokio::time::interval(refresh.max(Duration::from_millis(1)));
        refreshes.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(&mut link.shutdown) => break,
                Some(container) = link.resizes.recv() => self.resize(container),
                _ = refreshes.tick() => {
                    tokio::select! {
                        biased;
                        _ = shutdown_requested(&mut link.shutdown) => break,
                        stepped = self.step() => {
                            if let Err(e) = stepped {
                                warn!("Frame skipped: {e}");
                            }
                        }
                    }
                }
            }
        }

        self.state = LoopState::Terminated;
        info!(
            "Game loop stopped: {} iterations, {} frames, {} update failures, {} render failures",
            self.stats.iterations,
            self.stats.frames_presented,
            self.stats.update_failures,
            self.stats.render_failures
        );
        Ok(self.stats)
    }
}
