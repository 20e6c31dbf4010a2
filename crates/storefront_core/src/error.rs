//! Core error types

use thiserror::Error;

/// Errors raised while setting up the page controllers
#[derive(Error, Debug)]
pub enum CoreError {
    /// TOML site configuration failed to parse
    #[error("Invalid TOML site config: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON site configuration failed to parse
    #[error("Invalid JSON site config: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parsed but is unusable
    #[error("Invalid site config: {0}")]
    Config(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
