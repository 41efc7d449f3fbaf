//! # eagle-testing
//!
//! Test infrastructure for the EAGLE query client.
//!
//! ## Features
//!
//! - [`MockTransport`]: scripted in-process transport that records requests
//! - [`MockQueryServer`]: a local HTTP/1.1 server for end-to-end tests over
//!   the real transport
//! - [`fixtures`]: well-formed and malformed response bodies
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use eagle_client::{Client, Config, Credentials, Session};
//! use eagle_testing::{MockResponse, MockTransport, fixtures};
//!
//! #[tokio::test]
//! async fn test_with_mock_transport() {
//!     let transport = Arc::new(MockTransport::new());
//!     transport.respond(MockResponse::ok(fixtures::SELECT_SMALL));
//!
//!     let session = Session::builder(Config::new().no_cookie_file(), Credentials::new("u", "p").unwrap())
//!         .transport(transport.clone())
//!         .build()
//!         .unwrap();
//!     let result = Client::new(session).execute_query("SELECT 1").await.unwrap();
//!     assert_eq!(result.value.len(), 2);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod fixtures;
pub mod mock_server;
pub mod mock_transport;
pub mod response;

pub use mock_server::{
    MockQueryServer, MockServerBuilder, MockServerConfig, MockServerError, RecordedRequest,
};
pub use mock_transport::MockTransport;
pub use response::MockResponse;
