//! # Input State
//!
//! Six independent held/released flags, written by key listeners and read
//! once per frame by the game loop.
//!
//! Listeners and the loop run on different threads, so the flags are packed
//! into a single atomic byte. A snapshot is one load and never observes half
//! of an update.

use std::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A logical input direction sampled from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Forward,
    Backward,
    Left,
    Right,
    TurnLeft,
    TurnRight,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::Forward,
        Control::Backward,
        Control::Left,
        Control::Right,
        Control::TurnLeft,
        Control::TurnRight,
    ];

    /// Position of this control in [`Control::ALL`].
    pub fn index(self) -> usize {
        match self {
            Control::Forward => 0,
            Control::Backward => 1,
            Control::Left => 2,
            Control::Right => 3,
            Control::TurnLeft => 4,
            Control::TurnRight => 5,
        }
    }

    /// The key bound to this control.
    pub fn key(self) -> char {
        match self {
            Control::Forward => 'w',
            Control::Backward => 's',
            Control::Left => 'a',
            Control::Right => 'd',
            Control::TurnLeft => 'q',
            Control::TurnRight => 'e',
        }
    }

    fn flag(self) -> Controls {
        match self {
            Control::Forward => Controls::FORWARD,
            Control::Backward => Controls::BACKWARD,
            Control::Left => Controls::LEFT,
            Control::Right => Controls::RIGHT,
            Control::TurnLeft => Controls::TURN_LEFT,
            Control::TurnRight => Controls::TURN_RIGHT,
        }
    }
}

bitflags! {
    /// Held controls as a bitfield.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Controls: u8 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const TURN_LEFT = 1 << 4;
        const TURN_RIGHT = 1 << 5;
    }
}

/// A read-only copy of all six flags, taken at one instant.
///
/// This is also the per-frame input command sent to the simulation service,
/// so the field names are part of the wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl InputState {
    pub fn is_held(&self, control: Control) -> bool {
        match control {
            Control::Forward => self.forward,
            Control::Backward => self.backward,
            Control::Left => self.left,
            Control::Right => self.right,
            Control::TurnLeft => self.turn_left,
            Control::TurnRight => self.turn_right,
        }
    }
}

impl From<Controls> for InputState {
    fn from(held: Controls) -> Self {
        Self {
            forward: held.contains(Controls::FORWARD),
            backward: held.contains(Controls::BACKWARD),
            left: held.contains(Controls::LEFT),
            right: held.contains(Controls::RIGHT),
            turn_left: held.contains(Controls::TURN_LEFT),
            turn_right: held.contains(Controls::TURN_RIGHT),
        }
    }
}

/// The live input record shared between listeners and the loop.
#[derive(Debug, Default)]
pub struct SharedInput {
    held: AtomicU8,
}

impl SharedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_control(&self, control: Control, held: bool) {
        let bit = control.flag().bits();
        if held {
            self.held.fetch_or(bit, Ordering::AcqRel);
        } else {
            self.held.fetch_and(!bit, Ordering::AcqRel);
        }
    }

    pub fn snapshot(&self) -> InputState {
        Controls::from_bits_truncate(self.held.load(Ordering::Acquire)).into()
    }
}
