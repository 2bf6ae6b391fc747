//! Error types for edlkit.

use thiserror::Error;

/// Main error type for EDL operations.
#[derive(Error, Debug)]
pub enum EdlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An event line did not carry the fixed number of positional fields.
    #[error("Malformed event on line {line}: found {found} fields, expected {expected}")]
    MalformedEvent {
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("Malformed marker: {0}")]
    MalformedMarker(String),

    #[error("Invalid timecode: {0}")]
    InvalidTimecode(String),

    /// A frame-rate-dependent conversion was requested before a rate was set.
    #[error("Frame rate not set; set it on construction or with set_frame_rate()")]
    FrameRateUnset,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for EDL operations.
pub type Result<T> = std::result::Result<T, EdlError>;
