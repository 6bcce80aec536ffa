//! # Core Presentation Loop
//!
//! This module owns Mazecast's client-side logic.
//! It knows nothing about any specific terminal or page technology.
//!
//! ```text
//!   key / resize events                    display refresh
//!          │                                      │
//!          ▼                                      ▼
//!  ┌───────────────┐   set_control   ┌─────────────────────┐
//!  │ EventBindings │─▶ SharedInput ─▶│      GameLoop       │
//!  └───────┬───────┘     snapshot    │                     │  update / render
//!          │ resize / terminate      │                     │◀──────────────▶ SimulationService
//!          └────────────────────────▶│                     │
//!                                    └──────────┬──────────┘
//!                                               │ Frame
//!                                               ▼
//!                              FrameRenderer ──▶ DisplaySurface
//! ```
//!
//! ## Modules
//!
//! - [`input`]: the six held/released controls and their shared, lock-free store
//! - [`bindings`]: key and resize listeners that mutate input outside the loop
//! - [`viewport`]: character-grid sizing from the available pixel area
//! - [`frame`]: escaping a returned frame into the surface's markup
//! - [`surface`]: the host display surface the loop paints into
//! - [`game_loop`]: the init → update → render → display state machine
//! - [`config`]: settings with a defaults → file → env → CLI hierarchy

pub mod bindings;
pub mod config;
pub mod frame;
pub mod game_loop;
pub mod input;
pub mod surface;
pub mod viewport;
