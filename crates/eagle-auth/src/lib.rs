//! # eagle-auth
//!
//! Credentials for the EAGLE query service.
//!
//! The service uses HTTP Basic authentication. This crate holds the
//! credential type, builds the `Authorization` header, and defines the
//! [`PasswordProvider`] capability that supplies a password when the caller
//! did not pass one (an interactive prompt, an environment variable, a
//! secret store).
//!
//! ## Providers
//!
//! | Provider | Source |
//! |----------|--------|
//! | [`StaticPassword`] | A fixed value |
//! | [`EnvPassword`] | An environment variable (`EAGLE_PASSWORD` by default) |
//! | [`FnPassword`] | A closure, e.g. wrapping a terminal prompt |
//! | [`NoPassword`] | Always declines |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod credentials;
pub mod error;
pub mod provider;

pub use credentials::Credentials;
pub use error::AuthError;
pub use provider::{
    DEFAULT_PASSWORD_VAR, EnvPassword, FnPassword, NoPassword, PasswordProvider, StaticPassword,
};
