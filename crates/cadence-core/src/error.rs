//! Error types for Cadence.

use thiserror::Error;

/// Result type alias using Cadence's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Cadence.
#[derive(Error, Debug)]
pub enum Error {
    // Queue errors
    #[error("Index {index} out of range for queue of length {len}")]
    InvalidIndex { index: usize, len: usize },

    #[error("Queue is empty")]
    EmptyQueue,

    // Start errors
    #[error("Engine rejected playback start: {0}")]
    StartRejected(String),

    #[error("Playback start failed after retry: {0}")]
    StartFailedTerminal(String),

    // Engine errors
    #[error("Playback engine not available")]
    EngineUnavailable,

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Invalid media source: {0}")]
    InvalidMedia(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if the controller will retry after this error.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::StartRejected(_))
    }
}
