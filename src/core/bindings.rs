//! # Event Bindings
//!
//! Key and resize listeners. They run outside the loop's control flow: key
//! events write [`SharedInput`] directly, resize and cancel are forwarded to
//! the loop through a [`HostHandle`].
//!
//! | Key      | Binding          |
//! |----------|------------------|
//! | `w`      | forward          |
//! | `s`      | backward         |
//! | `a`      | strafe left      |
//! | `d`      | strafe right     |
//! | `q`      | turn left        |
//! | `e`      | turn right       |
//! | `Esc`    | terminate        |
//!
//! Letters match case-insensitively. Anything else is ignored.

use std::sync::Arc;

use log::{debug, info};

use crate::core::game_loop::HostHandle;
use crate::core::input::{Control, SharedInput};
use crate::core::viewport::PixelArea;

/// A key identifier as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Control(Control),
    Cancel,
}

/// Whether the host should still run its default action for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Suppressed,
    PassThrough,
}

pub fn binding_for(key: Key) -> Option<Binding> {
    match key {
        Key::Escape => Some(Binding::Cancel),
        Key::Char(c) => {
            let c = c.to_ascii_lowercase();
            Control::ALL
                .into_iter()
                .find(|control| control.key() == c)
                .map(Binding::Control)
        }
        Key::Other => None,
    }
}

#[derive(Debug, Clone)]
pub struct EventBindings {
    input: Arc<SharedInput>,
    host: HostHandle,
}

impl EventBindings {
    pub fn new(input: Arc<SharedInput>, host: HostHandle) -> Self {
        Self { input, host }
    }

    /// Key-down: hold the bound control, or terminate on cancel.
    pub fn key_down(&self, key: Key) -> KeyDisposition {
        match binding_for(key) {
            Some(Binding::Control(control)) => {
                self.input.set_control(control, true);
                KeyDisposition::Suppressed
            }
            Some(Binding::Cancel) => {
                info!("Cancel key pressed, terminating");
                self.host.terminate();
                KeyDisposition::PassThrough
            }
            None => KeyDisposition::PassThrough,
        }
    }

    /// Key-up: release the bound control. Never suppressed.
    pub fn key_up(&self, key: Key) {
        if let Some(Binding::Control(control)) = binding_for(key) {
            self.input.set_control(control, false);
        }
    }

    pub fn resize(&self, container: PixelArea) {
        debug!("Host resized to {}x{} px", container.width, container.height);
        self.host.resize(container);
    }

    pub fn terminate(&self) {
        self.host.terminate();
    }

    pub fn is_terminated(&self) -> bool {
        self.host.is_terminated()
    }
}
