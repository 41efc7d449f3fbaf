//! In-process mock transport.
//!
//! [`MockTransport`] replays scripted responses in order and records every
//! request it receives, so tests can drive a session without a network.
//!
//! ```rust,ignore
//! let transport = Arc::new(MockTransport::new());
//! transport.respond(MockResponse::ok(fixtures::SELECT_SMALL));
//!
//! let session = Session::builder(config, credentials)
//!     .transport(transport.clone())
//!     .build()?;
//! ```

use std::collections::VecDeque;

use async_trait::async_trait;
use eagle_client::{HttpRequest, HttpResponse, Transport, TransportError};
use parking_lot::Mutex;

use crate::response::MockResponse;

#[derive(Debug)]
enum Scripted {
    Respond(MockResponse),
    Fail(String),
    Timeout,
}

/// A [`Transport`] that replays scripted responses.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Create a transport with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn respond(&self, response: MockResponse) -> &Self {
        self.script.lock().push_back(Scripted::Respond(response));
        self
    }

    /// Queue a connection failure.
    pub fn fail(&self, message: impl Into<String>) -> &Self {
        self.script.lock().push_back(Scripted::Fail(message.into()));
        self
    }

    /// Queue a timeout.
    pub fn time_out(&self) -> &Self {
        self.script.lock().push_back(Scripted::Timeout);
        self
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }

    /// Number of requests received.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Number of scripted entries not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tracing::trace!(url = %request.url, "mock transport request");
        self.requests.lock().push(request);

        let next = self.script.lock().pop_front();
        match next {
            Some(Scripted::Respond(response)) => Ok(response.into_http_response()),
            Some(Scripted::Fail(message)) => Err(TransportError::Connect(message)),
            Some(Scripted::Timeout) => Err(TransportError::Timeout),
            None => Err(TransportError::Request(
                "mock transport has no scripted response".into(),
            )),
        }
    }
}
