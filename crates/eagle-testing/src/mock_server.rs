//! Mock EAGLE query server for integration testing.
//!
//! This module provides a minimal HTTP/1.1 server that speaks just enough of
//! the service interface to exercise the real `reqwest` transport:
//!
//! - `GET <base>?action=doQuery&SQL=...` answers with a configured body
//! - `GET <base>/Help?page=...` answers with a configured page
//! - optional Basic authentication check, answering 401 on mismatch
//! - `Set-Cookie` headers on every response
//!
//! One request is served per connection (`Connection: close`). Request heads
//! are recorded for inspection.
//!
//! ## Example
//!
//! ```rust,ignore
//! use eagle_testing::{MockQueryServer, MockResponse, fixtures};
//!
//! #[tokio::test]
//! async fn test_query() {
//!     let server = MockQueryServer::builder()
//!         .with_query("SELECT 1", MockResponse::ok(fixtures::SELECT_SMALL))
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let config = Config::new().base_url(server.base_url()).no_cookie_file();
//!     // ...
//! }
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use url::Url;

use crate::response::MockResponse;

/// Largest request head accepted.
const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Path prefix the server answers under.
pub const BASE_PATH: &str = "/Eagle";

/// Error type for mock server operations.
#[derive(Debug, Error)]
pub enum MockServerError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed request.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type for mock server operations.
pub type Result<T> = std::result::Result<T, MockServerError>;

/// A request head received by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: String,
    /// Request target, path and query.
    pub target: String,
    /// Header name/value pairs in arrival order.
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Look up a header value, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }

    /// Decoded value of a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        let url = Url::parse(&format!("http://mock{}", self.target)).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// Configuration for the mock query server.
#[derive(Debug, Default)]
pub struct MockServerConfig {
    /// Responses keyed by SQL text.
    queries: HashMap<String, MockResponse>,
    /// Responses keyed by documentation page name.
    docs: HashMap<String, MockResponse>,
    /// Response when nothing matches.
    default_response: Option<MockResponse>,
    /// Expected `Authorization` header value.
    authorization: Option<String>,
    /// Cookie set on every successful response.
    session_cookie: Option<String>,
}

/// Builder for `MockQueryServer`.
#[derive(Debug, Default)]
pub struct MockServerBuilder {
    config: MockServerConfig,
}

impl MockServerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `sql` with `response`.
    pub fn with_query(mut self, sql: impl Into<String>, response: MockResponse) -> Self {
        self.config.queries.insert(sql.into(), response);
        self
    }

    /// Answer documentation page `page` (e.g. `databases/Eagle/T`).
    pub fn with_docs(mut self, page: impl Into<String>, response: MockResponse) -> Self {
        self.config.docs.insert(page.into(), response);
        self
    }

    /// Set the response for unmatched requests. Defaults to 404.
    pub fn with_default_response(mut self, response: MockResponse) -> Self {
        self.config.default_response = Some(response);
        self
    }

    /// Answer 401 unless the request carries exactly this `Authorization`.
    pub fn require_authorization(mut self, value: impl Into<String>) -> Self {
        self.config.authorization = Some(value.into());
        self
    }

    /// Add `Set-Cookie: <cookie>` to every authorized response.
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.config.session_cookie = Some(cookie.into());
        self
    }

    /// Build and start the mock server.
    pub async fn build(self) -> Result<MockQueryServer> {
        MockQueryServer::start(self.config).await
    }
}

struct ServerState {
    config: MockServerConfig,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ServerState {
    fn respond(&self, request: &RecordedRequest) -> MockResponse {
        if let Some(expected) = &self.config.authorization {
            if request.header("authorization") != Some(expected.as_str()) {
                return MockResponse::unauthorized();
            }
        }

        let matched = if request.path().ends_with("/Help") {
            request
                .query_param("page")
                .and_then(|page| self.config.docs.get(&page))
        } else if request.query_param("action").as_deref() == Some("doQuery") {
            request
                .query_param("SQL")
                .and_then(|sql| self.config.queries.get(&sql))
        } else {
            None
        };

        let mut response = matched
            .or(self.config.default_response.as_ref())
            .cloned()
            .unwrap_or_else(|| MockResponse::with_status(404, "Not Found\n"));

        if let Some(cookie) = &self.config.session_cookie {
            response.set_cookies.push(cookie.clone());
        }
        response
    }
}

/// A mock query server for testing.
///
/// The server runs until stopped or dropped.
pub struct MockQueryServer {
    addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    state: Arc<ServerState>,
}

impl MockQueryServer {
    /// Create a new builder for the mock server.
    pub fn builder() -> MockServerBuilder {
        MockServerBuilder::new()
    }

    /// Start the mock server on an available port.
    pub async fn start(config: MockServerConfig) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, _) = broadcast::channel(1);
        let state = Arc::new(ServerState {
            config,
            requests: Mutex::new(Vec::new()),
        });

        let server = Self {
            addr,
            shutdown_tx: shutdown_tx.clone(),
            state: Arc::clone(&state),
        };

        // Spawn the accept loop
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _peer_addr)) => {
                                let state = Arc::clone(&state);
                                tokio::spawn(async move {
                                    if let Err(e) = handle_connection(stream, state).await {
                                        tracing::debug!("Connection error: {}", e);
                                    }
                                });
                            }
                            Err(e) => {
                                tracing::error!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Ok(server)
    }

    /// Get the server's listening address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL to configure a client with.
    pub fn base_url(&self) -> String {
        format!("http://{}{BASE_PATH}", self.addr)
    }

    /// Every request head received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().len()
    }

    /// Stop the server.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

impl Drop for MockQueryServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Serve a single request.
async fn handle_connection(mut stream: TcpStream, state: Arc<ServerState>) -> Result<()> {
    let head = read_head(&mut stream).await?;
    let request = parse_head(&head)?;
    tracing::debug!(method = %request.method, target = %request.target, "mock request");

    let response = state.respond(&request);
    state.requests.lock().push(request);

    write_response(&mut stream, &response).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Read bytes up to and including the blank line ending the head.
async fn read_head(stream: &mut TcpStream) -> Result<Vec<u8>> {
    let mut head = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(MockServerError::Protocol(
                "connection closed before end of request head".into(),
            ));
        }
        head.extend_from_slice(&chunk[..n]);

        if let Some(end) = head.windows(4).position(|w| w == b"\r\n\r\n") {
            head.truncate(end);
            return Ok(head);
        }
        if head.len() > MAX_HEAD_SIZE {
            return Err(MockServerError::Protocol("request head too large".into()));
        }
    }
}

fn parse_head(head: &[u8]) -> Result<RecordedRequest> {
    let text = String::from_utf8_lossy(head);
    let mut lines = text.split("\r\n");

    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split(' ');
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(MockServerError::Protocol(format!(
            "malformed request line: {request_line:?}"
        )));
    };

    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect();

    Ok(RecordedRequest {
        method: method.to_string(),
        target: target.to_string(),
        headers,
    })
}

async fn write_response(stream: &mut TcpStream, response: &MockResponse) -> Result<()> {
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        response.reason(),
        response.body.len()
    );
    for cookie in &response.set_cookies {
        head.push_str("Set-Cookie: ");
        head.push_str(cookie);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");
    stream.write_all(head.as_bytes()).await?;

    let body = match response.fail_after {
        // Short body against the declared length
        Some(limit) => &response.body[..limit.min(response.body.len())],
        None => &response.body[..],
    };
    stream.write_all(body).await?;
    stream.flush().await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_head() {
        let request = parse_head(
            b"GET /Eagle?action=doQuery&SQL=SELECT+1 HTTP/1.1\r\nHost: x\r\nAuthorization: Basic YTpi",
        )
        .unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.path(), "/Eagle");
        assert_eq!(request.query_param("SQL").as_deref(), Some("SELECT 1"));
        assert_eq!(request.header("authorization"), Some("Basic YTpi"));
    }

    #[test]
    fn test_parse_head_rejects_garbage() {
        assert!(parse_head(b"").is_err());
    }
}
