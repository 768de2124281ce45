//! # license-transport
//!
//! HTTP transport to the licensing service.
//!
//! ```text
//! LicenseState ──▶ endpoint::resolve ──▶ payload (query / form / json)
//!                                              │
//!                         Observers ◀── events │
//!                                              ▼
//!                                    HttpClient::execute
//!                                              │
//!                                              ▼
//!                                 ApiResponse::decode (or None)
//! ```
//!
//! The network is reached through the [`HttpClient`] trait: [`ReqwestClient`]
//! in production and [`MockHttpClient`] in tests.

pub mod client;
pub mod config;
pub mod cookies;
pub mod endpoint;
pub mod events;
pub mod response;
pub mod transport;

pub use client::{HttpClient, HttpRequest, HttpVerb, MockHttpClient, MockReply, Payload, ReqwestClient};
pub use config::{DEFAULT_REST_NAMESPACE, DEFAULT_USER_AGENT, TlsPolicy, TransportOptions};
pub use cookies::CookieFile;
pub use endpoint::Method;
pub use events::{EventHandler, EventKind, Observers, TransportEvent};
pub use response::ApiResponse;
pub use transport::{AUTHORIZATION, Transport};
