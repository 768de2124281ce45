//! Mock HTTP Client
//!
//! For testing and demo purposes. Replies are scripted up front and every
//! request is recorded so tests can assert on what was (or was not) sent.

use async_trait::async_trait;
use license_core::{LicenseError, Result};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use super::{HttpClient, HttpRequest};

/// Scripted outcome of one request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockReply {
    /// Response body
    Body(String),
    /// DNS/connect failure
    Unreachable,
    /// Any other transport failure
    Fatal(String),
}

/// Mock client replaying scripted replies in order
#[derive(Debug, Default)]
pub struct MockHttpClient {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    /// Client that answers every request with an empty body
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response body
    pub fn with_reply(self, body: impl Into<String>) -> Self {
        self.with(MockReply::Body(body.into()))
    }

    /// Queue a "host unreachable" failure
    pub fn with_unreachable(self) -> Self {
        self.with(MockReply::Unreachable)
    }

    /// Queue a fatal transport failure
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.with(MockReply::Fatal(message.into()))
    }

    pub fn with(self, reply: MockReply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<String> {
        let url = request.url.clone();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match reply {
            None => Ok(String::new()),
            Some(MockReply::Body(body)) => Ok(body),
            Some(MockReply::Unreachable) => Err(LicenseError::Unreachable(format!(
                "Could not resolve host for {url}"
            ))),
            Some(MockReply::Fatal(message)) => Err(LicenseError::Transport(message)),
        }
    }

    fn name(&self) -> &str {
        "MockHttpClient"
    }
}
