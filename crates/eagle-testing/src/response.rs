//! Canned HTTP responses shared by the mock transport and mock server.

use std::io;

use bytes::Bytes;
use eagle_client::HttpResponse;
use futures_util::stream;
use tokio_util::io::StreamReader;

/// A scripted HTTP response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Set-Cookie` header values.
    pub set_cookies: Vec<String>,
    /// Response body.
    pub body: Bytes,
    /// Deliver the body in chunks of this size.
    pub chunk_size: Option<usize>,
    /// Break the connection after this many body bytes.
    pub fail_after: Option<usize>,
}

impl MockResponse {
    /// A `200 OK` response with `body`.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::with_status(200, body)
    }

    /// A response with an arbitrary status.
    pub fn with_status(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            set_cookies: Vec::new(),
            body: body.into(),
            chunk_size: None,
            fail_after: None,
        }
    }

    /// A `401 Unauthorized` response.
    pub fn unauthorized() -> Self {
        Self::with_status(401, "Unauthorized\n")
    }

    /// Add a `Set-Cookie` header.
    #[must_use]
    pub fn with_cookie(mut self, set_cookie: impl Into<String>) -> Self {
        self.set_cookies.push(set_cookie.into());
        self
    }

    /// Deliver the body in `size`-byte chunks.
    #[must_use]
    pub fn chunked(mut self, size: usize) -> Self {
        self.chunk_size = Some(size.max(1));
        self
    }

    /// Break the connection after `bytes` bytes of body.
    #[must_use]
    pub fn fail_after(mut self, bytes: usize) -> Self {
        self.fail_after = Some(bytes);
        self
    }

    /// HTTP reason phrase for the status.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            500 => "Internal Server Error",
            503 => "Service Unavailable",
            _ => "Unknown",
        }
    }

    /// Convert into a transport response with a streaming body.
    pub fn into_http_response(self) -> HttpResponse {
        let delivered = match self.fail_after {
            Some(limit) => self.body.slice(..limit.min(self.body.len())),
            None => self.body.clone(),
        };
        let chunk_size = self.chunk_size.unwrap_or(delivered.len().max(1));

        let mut chunks: Vec<io::Result<Bytes>> = Vec::new();
        let mut offset = 0;
        while offset < delivered.len() {
            let end = (offset + chunk_size).min(delivered.len());
            chunks.push(Ok(delivered.slice(offset..end)));
            offset = end;
        }
        if self.fail_after.is_some() {
            chunks.push(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by mock",
            )));
        }

        HttpResponse::new(
            self.status,
            self.set_cookies,
            StreamReader::new(stream::iter(chunks)),
        )
    }
}
