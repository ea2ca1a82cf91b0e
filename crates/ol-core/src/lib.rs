//! Core types for orbis-launcher
//!
//! This crate provides configuration, error handling, and logging
//! infrastructure shared by the launcher crates.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, ConfigMode};
pub use error::{ConfigError, LaunchError, Result};
