//! Platform error types

use thiserror::Error;

/// Host-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// A required browser global (window, document, body) is missing
    #[error("Host object not available: {0}")]
    Unavailable(String),

    /// Registering an event listener failed
    #[error("Failed to register listener for '{0}'")]
    Listener(String),

    /// A call into the host raised an exception
    #[error("Host call failed: {0}")]
    Call(String),

    /// Capability not supported by this host (geolocation, clipboard, ...)
    #[error("Capability not supported: {0}")]
    Unsupported(String),

    /// Selector syntax the host cannot evaluate
    #[error("Unsupported selector: {0}")]
    Selector(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
