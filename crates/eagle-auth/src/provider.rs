//! Password provider capability.
//!
//! A session needs a password exactly once, at construction. When the caller
//! does not pass one, a [`PasswordProvider`] is asked for it. Interactive
//! prompting is left to the application; wrap the prompt in [`FnPassword`].

use crate::error::AuthError;

/// Environment variable read by [`EnvPassword::default`].
pub const DEFAULT_PASSWORD_VAR: &str = "EAGLE_PASSWORD";

/// Source of a password for a given user.
pub trait PasswordProvider: Send + Sync {
    /// Return the password for `username`, or `None` if unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] if the source failed.
    fn password(&self, username: &str) -> Result<Option<String>, AuthError>;
}

/// A fixed password.
#[derive(Clone)]
pub struct StaticPassword(String);

impl StaticPassword {
    /// Create a provider that always returns `password`.
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }
}

impl std::fmt::Debug for StaticPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StaticPassword").field(&"[REDACTED]").finish()
    }
}

impl PasswordProvider for StaticPassword {
    fn password(&self, _username: &str) -> Result<Option<String>, AuthError> {
        Ok(Some(self.0.clone()))
    }
}

/// A password read from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvPassword {
    var: String,
}

impl EnvPassword {
    /// Create a provider reading `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Get the variable name.
    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvPassword {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_VAR)
    }
}

impl PasswordProvider for EnvPassword {
    fn password(&self, _username: &str) -> Result<Option<String>, AuthError> {
        match std::env::var(&self.var) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => Err(AuthError::Provider(format!(
                "{} is not valid unicode",
                self.var
            ))),
        }
    }
}

/// A password supplied by a closure.
pub struct FnPassword<F>(F);

impl<F> FnPassword<F>
where
    F: Fn(&str) -> Result<Option<String>, AuthError> + Send + Sync,
{
    /// Wrap `f` as a provider.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> PasswordProvider for FnPassword<F>
where
    F: Fn(&str) -> Result<Option<String>, AuthError> + Send + Sync,
{
    fn password(&self, username: &str) -> Result<Option<String>, AuthError> {
        (self.0)(username)
    }
}

/// A provider that never has a password.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPassword;

impl PasswordProvider for NoPassword {
    fn password(&self, _username: &str) -> Result<Option<String>, AuthError> {
        Ok(None)
    }
}
