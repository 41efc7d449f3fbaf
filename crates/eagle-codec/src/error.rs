//! Codec error types.

use eagle_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur while framing or parsing a response body.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Reading the body failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured maximum length.
    #[error("line exceeds maximum length of {max} bytes")]
    LineTooLong {
        /// Maximum line length in bytes.
        max: usize,
    },

    /// The body violated the response grammar.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl CodecError {
    /// Check if this error is a grammar violation rather than an IO failure.
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol(_) | Self::LineTooLong { .. })
    }
}
