//! reqwest-backed HTTP Client

use std::sync::Arc;

use async_trait::async_trait;
use license_core::{LicenseError, Result};
use reqwest::cookie::Jar;
use reqwest::header::SET_COOKIE;

use super::{HttpClient, HttpRequest, HttpVerb, Payload};
use crate::config::{TlsPolicy, TransportOptions};
use crate::cookies::CookieFile;

/// Production client
pub struct ReqwestClient {
    http: reqwest::Client,
    cookie_file: Option<CookieFile>,
}

impl ReqwestClient {
    /// Build a client honoring timeouts, user agent, cookie file and TLS policy
    pub fn from_options(options: &TransportOptions) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let cookie_file = options.cookie_file.clone().map(CookieFile::new);
        if let Some(file) = &cookie_file {
            match file.load_into(&jar) {
                Ok(loaded) => {
                    tracing::debug!(path = %file.path().display(), cookies = loaded, "Loaded cookie file");
                }
                Err(err) => {
                    tracing::warn!(path = %file.path().display(), error = %err, "Cookie file not loaded");
                }
            }
        }

        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .user_agent(options.user_agent.clone())
            .cookie_provider(jar)
            // Only has an effect on https connections
            .danger_accept_invalid_certs(options.tls == TlsPolicy::AcceptInvalidCerts)
            .build()
            .map_err(|e| LicenseError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { http, cookie_file })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(&self, request: HttpRequest) -> Result<String> {
        let method = match request.verb {
            HttpVerb::Get => reqwest::Method::GET,
            HttpVerb::Post => reqwest::Method::POST,
            HttpVerb::Put => reqwest::Method::PUT,
            HttpVerb::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.payload {
            Payload::Query(pairs) => builder.query(pairs),
            Payload::Form(pairs) => builder.form(pairs),
            Payload::Json(body) => builder.body(body.clone()),
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();

        if let Some(file) = &self.cookie_file {
            let cookies: Vec<String> = response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok().map(str::to_string))
                .collect();
            if !cookies.is_empty() {
                // A failed write does not discard the reply
                if let Err(err) = file.record(response.url(), &cookies) {
                    tracing::warn!(path = %file.path().display(), error = %err, "Cookies not persisted");
                }
            }
        }

        tracing::debug!(status = %status, url = %request.url, "Licensing service responded");
        response.text().await.map_err(classify)
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}

/// Separate "host unreachable" from every other failure
fn classify(err: reqwest::Error) -> LicenseError {
    if err.is_connect() {
        LicenseError::Unreachable(err.to_string())
    } else {
        LicenseError::Transport(err.to_string())
    }
}
