//! Core utilities shared by every swapframe crate.
//!
//! - Error types and result aliases
//! - Logging initialization
//! - Frame timer
//! - TOML configuration

pub mod config;
mod error;
mod logging;
mod timer;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::Timer;
