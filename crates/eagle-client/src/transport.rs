//! HTTP transport abstraction.
//!
//! A [`Transport`] performs exactly one HTTP exchange per call. The session
//! layer owns authentication and cookies; transports only move bytes. The
//! response body is handed back as a stream so large result sets are never
//! buffered whole.

use std::fmt;
use std::io;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::TryStreamExt;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use url::Url;

use crate::config::Config;

/// Header carrying credentials. Its value is never logged.
pub const AUTHORIZATION: &str = "Authorization";

/// Header carrying stored cookies.
pub const COOKIE: &str = "Cookie";

/// A streaming response body.
pub type ResponseBody = Pin<Box<dyn AsyncRead + Send>>;

/// Errors raised while performing a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request did not finish within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The request failed for another reason.
    #[error("request failed: {0}")]
    Request(String),

    /// Reading the response body failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// HTTP request method. The service protocol only uses `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
}

impl Method {
    /// The method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing request.
#[derive(Clone)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Full request URL, query included.
    pub url: Url,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a request with no headers.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header value, ignoring case.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(AUTHORIZATION) {
                    (name.as_str(), "[REDACTED]")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &headers)
            .finish()
    }
}

/// A response with a streaming body.
pub struct HttpResponse {
    status: u16,
    set_cookies: Vec<String>,
    body: ResponseBody,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(
        status: u16,
        set_cookies: Vec<String>,
        body: impl AsyncRead + Send + 'static,
    ) -> Self {
        Self {
            status,
            set_cookies,
            body: Box::pin(body),
        }
    }

    /// Create a response with an in-memory body.
    pub fn from_bytes(status: u16, set_cookies: Vec<String>, body: impl Into<Bytes>) -> Self {
        Self::new(status, set_cookies, io::Cursor::new(body.into()))
    }

    /// HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw `Set-Cookie` header values.
    #[must_use]
    pub fn set_cookies(&self) -> &[String] {
        &self.set_cookies
    }

    /// Take the body stream.
    #[must_use]
    pub fn into_body(self) -> ResponseBody {
        self.body
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("set_cookies", &self.set_cookies.len())
            .finish_non_exhaustive()
    }
}

/// One HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the response head with a streaming body.
    ///
    /// Non-success statuses are returned, not raised.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the timeouts and user agent from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
        };

        let mut builder = self.client.request(method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_owned)
            .collect();

        let stream = response.bytes_stream().map_err(io::Error::other);
        Ok(HttpResponse::new(
            status,
            set_cookies,
            StreamReader::new(stream),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_debug_redacts_authorization() {
        let request = HttpRequest::new(
            Method::Get,
            Url::parse("http://h.example.org/Eagle").unwrap(),
        )
        .header(AUTHORIZATION, "Basic c2VjcmV0")
        .header(COOKIE, "s=1");

        let debug = format!("{request:?}");
        assert!(!debug.contains("c2VjcmV0"));
        assert!(debug.contains("s=1"));
        assert_eq!(request.header_value("authorization"), Some("Basic c2VjcmV0"));
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Get.as_str(), "GET");
    }
}
