//! Credential types for authentication.

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::error::AuthError;
use crate::provider::PasswordProvider;

/// Username and password for HTTP Basic authentication.
///
/// Credentials are immutable once constructed. The password is never shown
/// in debug output and never written to disk.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: Cow<'static, str>,
    password: Cow<'static, str>,
}

impl Credentials {
    /// Create credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the username is empty or
    /// contains `:`, which cannot be represented in a Basic header.
    pub fn new(
        username: impl Into<Cow<'static, str>>,
        password: impl Into<Cow<'static, str>>,
    ) -> Result<Self, AuthError> {
        let username = username.into();
        if username.is_empty() {
            return Err(AuthError::InvalidCredentials("username is empty".into()));
        }
        if username.contains(':') {
            return Err(AuthError::InvalidCredentials(
                "username must not contain ':'".into(),
            ));
        }
        Ok(Self {
            username,
            password: password.into(),
        })
    }

    /// Create credentials, asking `provider` for the password if none is given.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingPassword`] if the provider declines, or any
    /// error the provider reports.
    pub fn resolve(
        username: impl Into<Cow<'static, str>>,
        password: Option<String>,
        provider: &dyn PasswordProvider,
    ) -> Result<Self, AuthError> {
        let username = username.into();
        let password = match password {
            Some(password) => password,
            None => {
                tracing::debug!(username = %username, "requesting password from provider");
                provider
                    .password(&username)?
                    .ok_or_else(|| AuthError::MissingPassword {
                        username: username.to_string(),
                    })?
            }
        };
        Self::new(username, password)
    }

    /// Get the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Get the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// The value of the `Authorization` header for these credentials.
    #[must_use]
    pub fn basic_authorization(&self) -> String {
        let token = BASE64_STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose sensitive data in debug output
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::provider::{NoPassword, StaticPassword};

    #[test]
    fn test_basic_authorization() {
        // RFC 7617 example
        let creds = Credentials::new("Aladdin", "open sesame").unwrap();
        assert_eq!(
            creds.basic_authorization(),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("jdoe", "hunter2").unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("jdoe"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_invalid_usernames() {
        assert!(Credentials::new("", "pw").is_err());
        assert!(Credentials::new("a:b", "pw").is_err());
    }

    #[test]
    fn test_resolve_prefers_explicit_password() {
        let creds =
            Credentials::resolve("jdoe", Some("given".into()), &StaticPassword::new("other"))
                .unwrap();
        assert_eq!(creds.password(), "given");
    }

    #[test]
    fn test_resolve_asks_provider() {
        let creds = Credentials::resolve("jdoe", None, &StaticPassword::new("secret")).unwrap();
        assert_eq!(creds.password(), "secret");
    }

    #[test]
    fn test_resolve_without_password_fails() {
        let err = Credentials::resolve("jdoe", None, &NoPassword).unwrap_err();
        assert_eq!(
            err,
            AuthError::MissingPassword {
                username: "jdoe".into()
            }
        );
    }
}
