//! Client error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use eagle_codec::CodecError;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication failed.
    #[error("authentication failed: {0}")]
    Authentication(#[from] eagle_auth::AuthError),

    /// The response violated the service protocol.
    #[error("protocol error: {0}")]
    Protocol(#[from] eagle_protocol::ProtocolError),

    /// Line framing failed.
    #[error("codec error: {0}")]
    Codec(#[source] CodecError),

    /// Type conversion error.
    #[error("type error: {0}")]
    Type(#[from] eagle_types::TypeError),

    /// The request could not be completed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The service answered with a non-success HTTP status.
    #[error("service returned HTTP {status}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<CodecError> for Error {
    fn from(err: CodecError) -> Self {
        match err {
            // A failed body read is a transport failure, not a framing one
            CodecError::Io(e) => Self::Transport(TransportError::Io(e)),
            CodecError::Protocol(e) => Self::Protocol(e),
            other => Self::Codec(other),
        }
    }
}

impl Error {
    /// Check if this error is transient and may succeed on retry.
    ///
    /// Transport failures and 5xx statuses are transient. The client never
    /// retries on its own.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::HttpStatus { status } => (500..600).contains(status),
            _ => false,
        }
    }

    /// Check if the response did not follow the service protocol.
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        match self {
            Self::Protocol(_) => true,
            Self::Codec(e) => e.is_protocol_error(),
            _ => false,
        }
    }

    /// Check if this error is an authentication failure.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which cookie-file operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceKind {
    /// Reading the cookie file.
    Load,
    /// Writing the cookie file.
    Save,
}

impl fmt::Display for PersistenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => f.write_str("load"),
            Self::Save => f.write_str("save"),
        }
    }
}

/// A cookie file could not be read or written.
///
/// Never fails a call. Returned alongside successful results and logged.
#[derive(Debug, Error)]
#[error("cookie {kind} failed for {}: {source}", .path.display())]
pub struct PersistenceWarning {
    /// The cookie file.
    pub path: PathBuf,
    /// The failed operation.
    pub kind: PersistenceKind,
    /// The underlying IO error.
    #[source]
    pub source: io::Error,
}

impl PersistenceWarning {
    pub(crate) fn new(path: impl Into<PathBuf>, kind: PersistenceKind, source: io::Error) -> Self {
        Self {
            path: path.into(),
            kind,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eagle_auth::AuthError;
    use eagle_protocol::ProtocolError;

    #[test]
    fn test_codec_io_becomes_transport() {
        let err = Error::from(CodecError::Io(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "reset",
        )));
        assert!(matches!(err, Error::Transport(TransportError::Io(_))));
        assert!(err.is_transient());
    }

    #[test]
    fn test_line_overflow_is_protocol_error() {
        let err = Error::from(CodecError::LineTooLong { max: 16 });
        assert!(matches!(err, Error::Codec(_)));
        assert!(err.is_protocol_error());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_classification() {
        assert!(Error::HttpStatus { status: 503 }.is_transient());
        assert!(!Error::HttpStatus { status: 404 }.is_transient());
        assert!(Error::from(AuthError::Rejected { status: 401 }).is_authentication());
        assert!(Error::from(ProtocolError::UnexpectedEndOfHeader).is_protocol_error());
        assert!(!Error::Config("x".into()).is_protocol_error());
    }

    #[test]
    fn test_warning_display() {
        let warning = PersistenceWarning::new(
            "/tmp/jar.txt",
            PersistenceKind::Save,
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = warning.to_string();
        assert!(message.contains("save"));
        assert!(message.contains("/tmp/jar.txt"));
    }
}
