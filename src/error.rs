//! Error types for keyrotate
//!
//! Only the durability path and the rotator lifecycle can fail. Rotation
//! itself never surfaces an error to the request path.

use thiserror::Error;

/// Result type alias using RotateError
pub type Result<T> = std::result::Result<T, RotateError>;

/// Unified error type for keyrotate operations
#[derive(Debug, Error)]
pub enum RotateError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("Snapshot serialization error: {0}")]
    Snapshot(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Background Worker Errors
    // -------------------------------------------------------------------------
    #[error("Flusher error: {0}")]
    Worker(String),
}
