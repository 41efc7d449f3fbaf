//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// No password was given and the provider did not supply one.
    #[error("no password available for user {username:?}")]
    MissingPassword {
        /// The user the password was requested for.
        username: String,
    },

    /// The password provider failed.
    #[error("password provider failed: {0}")]
    Provider(String),

    /// The service rejected the credentials.
    #[error("authentication rejected by service (HTTP {status})")]
    Rejected {
        /// HTTP status code of the rejection.
        status: u16,
    },
}
