//! # TUI Host
//!
//! Runs the game loop in the terminal. Handles terminal modes, reads keys on
//! a blocking thread and paints frames through ratatui.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! Terminals report keys differently: with the kitty keyboard protocol we get
//! real release events; without it, holds are released by
//! [`event::ReleaseFallback`].

pub mod event;
pub mod surface;

use log::{error, info, warn};
use std::io::stdout;
use std::sync::Arc;

use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::core::bindings::EventBindings;
use crate::core::config::ResolvedConfig;
use crate::core::game_loop::{GameLoop, host_link};
use crate::core::input::SharedInput;
use crate::core::viewport::{Margins, ViewportSizer};
use crate::service::build_service;
use crate::tui::surface::TerminalSurface;

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol: ignored by terminals that don't support it
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        info!("Terminal modes restored");
    }
}

pub async fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => {
            error!("Cannot reach simulation service: {e}");
            eprintln!("mazecast: {e}");
            return Ok(());
        }
    };

    let terminal = ratatui::init();
    let mode_guard = match TerminalModeGuard::new() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!("Keyboard enhancement unavailable: {e}");
            None
        }
    };

    let input = Arc::new(SharedInput::new());
    let (host, link) = host_link();
    let reader = event::spawn_reader(
        EventBindings::new(input.clone(), host.clone()),
        config.release_fallback,
    );

    // The terminal has no page chrome around it.
    let sizer = ViewportSizer::new(Margins::NONE, config.font_size_px);
    let mut game = GameLoop::new(service, TerminalSurface::new(terminal), input, sizer);
    let result = game.run(event::available_area(), config.refresh, link).await;

    host.terminate();
    if let Err(e) = reader.await {
        warn!("Input reader panicked: {e}");
    }

    drop(game);
    drop(mode_guard);
    ratatui::restore();

    match result {
        Ok(stats) => info!(
            "Mazecast exiting after {} frames ({} update failures, {} render failures)",
            stats.frames_presented, stats.update_failures, stats.render_failures
        ),
        // Already logged by the loop.
        Err(e) => eprintln!("mazecast: {e}"),
    }
    Ok(())
}
