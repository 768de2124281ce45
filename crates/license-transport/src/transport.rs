//! License Transport
//!
//! Performs exactly one call to the licensing service per invocation and
//! hands back the decoded response, or `None` for an empty body.

use std::sync::Arc;

use chrono::Utc;
use license_core::{LicenseError, LicenseState, Result};

use crate::client::{HttpClient, HttpRequest, Payload, ReqwestClient};
use crate::config::TransportOptions;
use crate::endpoint::{self, Method};
use crate::events::{EventKind, Observers, TransportEvent};
use crate::response::ApiResponse;

/// Header stripped when authorization is bypassed
pub const AUTHORIZATION: &str = "Authorization";

/// Configured transport. Configure with `&mut self`, then share for calls.
pub struct Transport {
    client: Arc<dyn HttpClient>,
    options: TransportOptions,
    headers: Vec<(String, String)>,
    observers: Observers,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("client", &self.client.name())
            .field("options", &self.options)
            .field("headers", &self.headers)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Transport {
    /// Transport backed by reqwest
    pub fn new(options: TransportOptions) -> Result<Self> {
        let client = ReqwestClient::from_options(&options)?;
        Ok(Self::with_client(Arc::new(client), options))
    }

    /// Transport over any `HttpClient`
    pub fn with_client(client: Arc<dyn HttpClient>, options: TransportOptions) -> Self {
        Self {
            client,
            options,
            headers: Vec::new(),
            observers: Observers::new(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(TransportOptions::from_env())
    }

    pub const fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Headers sent with every call
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Set a header, replacing any header with the same name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        upsert(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn remove_header(&mut self, name: &str) -> &mut Self {
        self.headers.retain(|(n, _)| n != name);
        self
    }

    /// Register an observer for one event kind
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> &mut Self
    where
        F: Fn(&TransportEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(kind, handler);
        self
    }

    /// Call a logical endpoint with the license's request parameters.
    ///
    /// Returns `Ok(None)` when the service answered with an empty body.
    pub async fn call(
        &self,
        endpoint_name: &str,
        license: &LicenseState,
        method: Method,
        bypass_auth_header: bool,
    ) -> Result<Option<ApiResponse>> {
        let started_at = Utc::now();
        self.observers.emit(&TransportEvent::Start { started_at });

        let base_url = license
            .url()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| LicenseError::Config("license has no service URL".into()))?;
        let endpoint = endpoint::resolve(endpoint_name, license.handler(), &self.options.rest_namespace);
        let url = format!("{base_url}{endpoint}");
        self.observers.emit(&TransportEvent::Endpoint {
            endpoint,
            url: url.clone(),
        });

        let params = license.request();
        self.observers.emit(&TransportEvent::Request {
            params: params.clone(),
        });

        let mut headers = self.headers.clone();
        let payload = if method.is_json() {
            let json = serde_json::to_string(params)?;
            upsert(&mut headers, "Content-Type".into(), "application/json".into());
            upsert(&mut headers, "Content-Length".into(), json.len().to_string());
            Payload::Json(json)
        } else if method == Method::Get {
            Payload::Query(endpoint::encode_params(params))
        } else {
            Payload::Form(endpoint::encode_params(params))
        };

        if bypass_auth_header || self.options.bypass_authorization {
            headers.retain(|(name, _)| name != AUTHORIZATION);
        }
        self.observers.emit(&TransportEvent::Headers {
            headers: headers.clone(),
        });

        tracing::debug!(
            client = self.client.name(),
            method = %method,
            url = %url,
            "Calling licensing service"
        );

        let body = self
            .client
            .execute(HttpRequest {
                verb: method.verb(),
                url,
                headers,
                payload,
            })
            .await
            .inspect_err(|err| tracing::warn!(endpoint = endpoint_name, error = %err, "License call failed"))?;

        self.observers.emit(&TransportEvent::Response { body: body.clone() });
        self.observers.emit(&TransportEvent::Finish {
            finished_at: Utc::now(),
            started_at,
        });

        Ok(ApiResponse::decode(&body))
    }
}

fn upsert(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers.iter_mut().find(|(n, _)| *n == name) {
        Some(existing) => existing.1 = value,
        None => headers.push((name, value)),
    }
}
