//! Terminal input: translates crossterm events into key and resize
//! notifications and feeds them to [`EventBindings`] from a blocking thread.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use log::{debug, info, warn};
use tokio::task::JoinHandle;

use crate::core::bindings::{Binding, EventBindings, Key, binding_for};
use crate::core::input::Control;
use crate::core::viewport::PixelArea;

/// How long the reader blocks waiting for an event before re-checking
/// for shutdown and expired key holds.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// TUI-specific input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuiEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// New terminal size in cells.
    Resize(u16, u16),
    /// Ctrl+C. Raw mode swallows SIGINT, so it arrives as a key.
    ForceQuit,
}

pub fn translate_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Esc => Key::Escape,
        _ => Key::Other,
    }
}

pub fn translate(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) if modifiers.contains(KeyModifiers::CONTROL) => Some(TuiEvent::ForceQuit),
        Event::Key(key_event) => {
            let key = translate_key(key_event.code);
            match key_event.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => Some(TuiEvent::KeyDown(key)),
                KeyEventKind::Release => Some(TuiEvent::KeyUp(key)),
            }
        }
        Event::Resize(columns, rows) => Some(TuiEvent::Resize(columns, rows)),
        _ => None,
    }
}

/// Pixel area of a terminal of `columns` × `rows` cells.
///
/// The terminal surface draws one glyph per cell, so the area is measured in
/// glyph cells whatever pixel size the terminal itself reports.
pub fn pixel_area(columns: u16, rows: u16) -> PixelArea {
    PixelArea::from_cells(columns, rows)
}

/// The current terminal's area in glyph cells.
pub fn available_area() -> PixelArea {
    match terminal::size() {
        Ok((columns, rows)) => pixel_area(columns, rows),
        Err(e) => {
            warn!("Could not query terminal size: {e}");
            PixelArea::new(0, 0)
        }
    }
}

// ============================================================================
// Release fallback
// ============================================================================

/// Synthesizes key releases for terminals that only report presses.
///
/// Stays idle until a bound key is pressed again while still held, which is
/// how auto-repeat looks on such terminals. From then on, a held control whose
/// key has not been pressed or repeated for `timeout` is treated as released.
/// The first real release event switches this off for good.
#[derive(Debug)]
pub struct ReleaseFallback {
    timeout: Option<Duration>,
    armed: bool,
    last_seen: [Option<Instant>; 6],
}

impl ReleaseFallback {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            armed: false,
            last_seen: [None; 6],
        }
    }

    /// Whether synthetic releases are currently being produced.
    pub fn is_active(&self) -> bool {
        self.armed && self.timeout.is_some()
    }

    pub fn observe(&mut self, event: &TuiEvent, now: Instant) {
        if self.timeout.is_none() {
            return;
        }
        match *event {
            TuiEvent::KeyDown(key) => {
                if let Some(Binding::Control(control)) = binding_for(key) {
                    let slot = &mut self.last_seen[control.index()];
                    if slot.is_some() && !self.armed {
                        info!("Key repeat without release, release fallback enabled");
                        self.armed = true;
                    }
                    *slot = Some(now);
                }
            }
            TuiEvent::KeyUp(_) => {
                info!("Terminal reports key releases, release fallback disabled");
                self.timeout = None;
                self.armed = false;
                self.last_seen = [None; 6];
            }
            _ => {}
        }
    }

    /// Controls whose hold has lapsed at `now`. Each is reported once.
    pub fn expired(&mut self, now: Instant) -> Vec<Control> {
        let Some(timeout) = self.timeout.filter(|_| self.armed) else {
            return Vec::new();
        };
        let mut lapsed = Vec::new();
        for control in Control::ALL {
            let slot = &mut self.last_seen[control.index()];
            if slot.is_some_and(|seen| now.duration_since(seen) >= timeout) {
                *slot = None;
                lapsed.push(control);
            }
        }
        lapsed
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Apply one event to the bindings.
pub fn handle_event(bindings: &EventBindings, event: TuiEvent) {
    match event {
        TuiEvent::KeyDown(key) => {
            let disposition = bindings.key_down(key);
            debug!("Key down {:?}: {:?}", key, disposition);
        }
        TuiEvent::KeyUp(key) => bindings.key_up(key),
        TuiEvent::Resize(columns, rows) => bindings.resize(pixel_area(columns, rows)),
        TuiEvent::ForceQuit => {
            info!("Ctrl+C pressed, terminating");
            bindings.terminate();
        }
    }
}

/// Read terminal events until the host terminates.
pub fn read_events(bindings: EventBindings, release_fallback: Option<Duration>) {
    let mut fallback = ReleaseFallback::new(release_fallback);
    info!(
        "Input reader started (release fallback: {:?})",
        release_fallback
    );

    while !bindings.is_terminated() {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(raw) => {
                    if let Some(event) = translate(raw) {
                        fallback.observe(&event, Instant::now());
                        handle_event(&bindings, event);
                    }
                }
                Err(e) => {
                    warn!("Failed to read terminal event: {e}");
                    bindings.terminate();
                }
            },
            Ok(false) => {}
            Err(e) => {
                warn!("Failed to poll terminal events: {e}");
                bindings.terminate();
            }
        }

        for control in fallback.expired(Instant::now()) {
            bindings.key_up(Key::Char(control.key()));
        }
    }
    info!("Input reader stopped");
}

/// Run [`read_events`] on a blocking thread.
pub fn spawn_reader(bindings: EventBindings, release_fallback: Option<Duration>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || read_events(bindings, release_fallback))
}
