//! Error types for the application layer.

use thiserror::Error;

/// Errors raised outside the GPU abstraction: windowing, configuration and IO.
#[derive(Error, Debug)]
pub enum Error {
    /// Vulkan-related errors surfaced through the windowing glue
    #[error("Vulkan error: {0}")]
    Vulkan(String),

    /// Window creation or management errors
    #[error("Window error: {0}")]
    Window(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration value rejected during validation
    #[error("Config error: {0}")]
    Config(String),

    /// Configuration file is not valid TOML for [`crate::AppConfig`]
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type alias using the core Error type.
pub type Result<T> = std::result::Result<T, Error>;
