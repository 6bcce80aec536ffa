//! Mazecast library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod core;
pub mod headless;
pub mod service;
pub mod tui;

#[cfg(test)]
pub mod test_support;

/// Where frames are presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Host {
    #[default]
    Terminal,
    Headless,
}
