//! # eagle-client
//!
//! Async client for the EAGLE tabular query service.
//!
//! The service takes SQL over HTTP GET with Basic authentication and answers
//! in a line-oriented text protocol. This crate ties together the pieces:
//!
//! - [`Config`]: endpoint, schema, cookie file, timeouts
//! - [`CookieStore`]: the shared, persisted session cookie jar
//! - [`Session`]: credentials plus transport plus cookies
//! - [`Client`]: `execute_query` and `fetch_docs`
//!
//! ## Example
//!
//! ```rust,ignore
//! use eagle_client::{Config, EnvPassword, connect};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = connect(Config::new(), "jdoe", None, &EnvPassword::default())?;
//!
//!     let result = client
//!         .execute_query("SELECT TOP 10 GalaxyID, Mass FROM RefL0012N0188_Subhalo")
//!         .await?
//!         .into_value();
//!
//!     for row in &result {
//!         let id: i64 = row.try_get("GalaxyID")?;
//!         println!("{id}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Cookies
//!
//! Cookies persist across processes in `sql_cookies.txt` by default so the
//! server-side session is reused. Failing to read or write the file never
//! fails a call: a failed save comes back in [`Completed::warnings`].

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod cookie_store;
pub mod error;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use client::{Client, Completed, connect, execute_query, fetch_docs};
pub use config::{Config, DEFAULT_BASE_URL, DEFAULT_COOKIE_FILE, DEFAULT_SCHEMA};
pub use cookie_store::CookieStore;
pub use error::{Error, PersistenceKind, PersistenceWarning, Result};
pub use session::{Session, SessionBuilder};
pub use transport::{
    HttpRequest, HttpResponse, Method, ReqwestTransport, ResponseBody, Transport, TransportError,
};

// Re-export from dependency crates
pub use eagle_auth::{
    AuthError, Credentials, EnvPassword, FnPassword, NoPassword, PasswordProvider, StaticPassword,
};
pub use eagle_protocol::{ColumnDescriptor, DocPage, ProtocolError, ResultSet, Row};
pub use eagle_types::{BoundedText, ColumnType, TypeError, Value};
