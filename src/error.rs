//! Error types for the hand keypoint stabilizer.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Keypoint set does not have the configured shape
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Landmark vectors are zero, collinear, or the rotation solve is singular
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Subscribe or publish failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Keypoint log could not be written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Invalid configuration, fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// File or socket I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
