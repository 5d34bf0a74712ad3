//! Protocol error type shared by the codec and transports.

use thiserror::Error;

/// Errors produced while framing or parsing wire events.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Underlying transport I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame exceeded the configured length limit.
    #[error("frame too long: {actual} bytes (limit {limit})")]
    FrameTooLong {
        /// Observed frame length in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// A frame was not valid JSON or did not match any known event.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Convenience result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
