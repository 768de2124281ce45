//! HTTP Clients
//!
//! The transport talks to the network through `HttpClient` so the wire
//! implementation can be swapped (reqwest in production, a scripted mock in
//! tests).

mod mock;
mod reqwest_client;

pub use mock::{MockHttpClient, MockReply};
pub use reqwest_client::ReqwestClient;

use async_trait::async_trait;
use license_core::Result;

/// HTTP verb put on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

/// How request parameters travel
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Appended to the URL query string
    Query(Vec<(String, String)>),
    /// URL-encoded request body
    Form(Vec<(String, String)>),
    /// Pre-encoded JSON request body
    Json(String),
}

/// A fully resolved outgoing request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub verb: HttpVerb,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub payload: Payload,
}

impl HttpRequest {
    /// First header value with exactly this name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Network capability used by the transport (Strategy pattern)
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute one request and return the raw response body.
    ///
    /// DNS and connection failures must surface as
    /// `LicenseError::Unreachable`; every other failure as
    /// `LicenseError::Transport`. Non-2xx statuses are not errors.
    async fn execute(&self, request: HttpRequest) -> Result<String>;

    /// Client name (for logs)
    fn name(&self) -> &str;
}
