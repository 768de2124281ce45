//! Transport Configuration

use std::path::PathBuf;
use std::time::Duration;

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows; U; Windows NT 5.0; en-US; rv:1.7.12) Gecko/20050915 Firefox/1.0.7";

/// REST namespace used by the `wp_rest` handler
pub const DEFAULT_REST_NAMESPACE: &str = "woo-license-keys";

/// Certificate verification policy for https endpoints
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Accept self-signed or otherwise invalid certificates
    #[default]
    AcceptInvalidCerts,
    /// Full certificate verification
    Verify,
}

/// Transport request options
#[derive(Clone, Debug)]
pub struct TransportOptions {
    /// Whole-request timeout
    pub timeout: Duration,

    /// Connection establishment timeout
    pub connect_timeout: Duration,

    /// User-Agent header value
    pub user_agent: String,

    /// File used to persist cookies between runs
    pub cookie_file: Option<PathBuf>,

    /// Certificate verification for https URLs
    pub tls: TlsPolicy,

    /// Namespace segment of `wp_rest` endpoints
    pub rest_namespace: String,

    /// Strip any `Authorization` header from every call
    pub bypass_authorization: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(100),
            connect_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.into(),
            cookie_file: None,
            tls: TlsPolicy::default(),
            rest_namespace: DEFAULT_REST_NAMESPACE.into(),
            bypass_authorization: false,
        }
    }
}

impl TransportOptions {
    /// Read `LICENSE_*` environment variables over the defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str| {
            lookup(key).is_some_and(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        };

        Self {
            timeout: lookup("LICENSE_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map_or(defaults.timeout, Duration::from_secs),
            connect_timeout: lookup("LICENSE_CONNECT_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map_or(defaults.connect_timeout, Duration::from_secs),
            user_agent: lookup("LICENSE_USER_AGENT").unwrap_or(defaults.user_agent),
            cookie_file: lookup("LICENSE_COOKIE_FILE").map(PathBuf::from),
            tls: if flag("LICENSE_TLS_VERIFY") {
                TlsPolicy::Verify
            } else {
                TlsPolicy::AcceptInvalidCerts
            },
            rest_namespace: lookup("LICENSE_REST_NAMESPACE").unwrap_or(defaults.rest_namespace),
            bypass_authorization: flag("LICENSE_BYPASS_AUTHORIZATION"),
        }
    }

    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    pub const fn with_tls(mut self, tls: TlsPolicy) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_rest_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.rest_namespace = namespace.into();
        self
    }

    pub const fn with_bypass_authorization(mut self, bypass: bool) -> Self {
        self.bypass_authorization = bypass;
        self
    }
}
