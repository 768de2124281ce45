//! Transport Lifecycle Events
//!
//! Observers subscribe to one event kind and are invoked synchronously, in
//! registration order. Within a call, events fire as:
//!
//! ```text
//! start ─▶ endpoint ─▶ request ─▶ headers ─▶ response ─▶ finish
//! ```

use chrono::{DateTime, Utc};
use license_core::{LicenseError, Params};
use std::str::FromStr;

/// Event discriminant used for subscriptions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    Endpoint,
    Request,
    Headers,
    Response,
    Finish,
}

impl EventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Endpoint => "endpoint",
            Self::Request => "request",
            Self::Headers => "headers",
            Self::Response => "response",
            Self::Finish => "finish",
        }
    }
}

impl FromStr for EventKind {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "endpoint" => Ok(Self::Endpoint),
            "request" => Ok(Self::Request),
            "headers" => Ok(Self::Headers),
            "response" => Ok(Self::Response),
            "finish" => Ok(Self::Finish),
            other => Err(LicenseError::Config(format!("unknown transport event '{other}'"))),
        }
    }
}

/// Event payloads
#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    /// Call is starting
    Start { started_at: DateTime<Utc> },

    /// Endpoint resolved
    Endpoint { endpoint: String, url: String },

    /// Parameters about to be sent
    Request { params: Params },

    /// Final outgoing header set
    Headers { headers: Vec<(String, String)> },

    /// Raw response body received
    Response { body: String },

    /// Call completed
    Finish {
        finished_at: DateTime<Utc>,
        started_at: DateTime<Utc>,
    },
}

impl TransportEvent {
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Start { .. } => EventKind::Start,
            Self::Endpoint { .. } => EventKind::Endpoint,
            Self::Request { .. } => EventKind::Request,
            Self::Headers { .. } => EventKind::Headers,
            Self::Response { .. } => EventKind::Response,
            Self::Finish { .. } => EventKind::Finish,
        }
    }
}

/// Boxed observer callback
pub type EventHandler = Box<dyn Fn(&TransportEvent) + Send + Sync>;

/// Ordered list of observers
#[derive(Default)]
pub struct Observers {
    handlers: Vec<(EventKind, EventHandler)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&TransportEvent) + Send + Sync + 'static,
    {
        self.handlers.push((kind, Box::new(handler)));
    }

    /// Invoke every observer registered for the event's kind
    pub fn emit(&self, event: &TransportEvent) {
        let kind = event.kind();
        for (_, handler) in self.handlers.iter().filter(|(k, _)| *k == kind) {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|(kind, _)| kind.as_str()))
            .finish()
    }
}
