//! License State
//!
//! The persisted unit of truth: client settings, the parameters sent to the
//! licensing service, the data it last returned, and free-form host metadata.
//!
//! ## Serialized form
//!
//! ```text
//! {
//!   "settings": {"url": "...", "frequency": "daily", "next_check": 0,
//!                "version": "1.2.0", "retries": 0, "handler": "default"},
//!   "request":  {"store_code": "...", "sku": "...", "license_key": "..."},
//!   "data":     {"activation_id": 404, "expire": null, "has_expired": false},
//!   "meta":     {}
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{LicenseError, Result};
use crate::interval::{CheckFrequency, Interval};
use crate::migration::{self, SchemaVersion};

/// Ordered string → scalar map (request parameters, server data, metadata)
pub type Params = serde_json::Map<String, Value>;

/// Endpoint naming convention of the licensing service
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// WordPress REST routing: `/wp-json/<namespace>/v1/<endpoint>`
    WpRest,
    /// Query string routing: `?action=<endpoint>`; also any unknown kind
    #[default]
    #[serde(other)]
    Default,
}

impl HandlerKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::WpRest => "wp_rest",
        }
    }
}

impl std::str::FromStr for HandlerKind {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "wp_rest" | "wp-rest" => Ok(Self::WpRest),
            other => Err(LicenseError::Config(format!("unknown handler '{other}'"))),
        }
    }
}

/// End of the offline grace period
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OfflineUntil {
    /// Server allows unlimited offline use
    Unlimited,
    /// Epoch seconds
    Until(i64),
}

impl Serialize for OfflineUntil {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Unlimited => serializer.serialize_bool(true),
            Self::Until(epoch) => serializer.serialize_i64(*epoch),
        }
    }
}

impl<'de> Deserialize<'de> for OfflineUntil {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Bool(true) => Ok(Self::Unlimited),
            // `false` is what a failed expiry computation leaves behind: already lapsed
            Value::Bool(false) => Ok(Self::Until(0)),
            other => as_number(&other)
                .map(|epoch| Self::Until(epoch as i64))
                .ok_or_else(|| D::Error::custom(format!("invalid offline marker: {other}"))),
        }
    }
}

/// Client-side settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the licensing service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) url: Option<String>,

    /// Remote check frequency
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "frequency_or_none"
    )]
    pub(crate) frequency: Option<CheckFrequency>,

    /// Epoch seconds before which cached data is trusted
    #[serde(default, deserialize_with = "lenient_epoch")]
    pub(crate) next_check: i64,

    /// Schema version of this document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) version: Option<SchemaVersion>,

    /// Consecutive unreachable-host outcomes
    #[serde(default)]
    pub(crate) retries: u32,

    /// Endpoint naming convention
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) handler: Option<HandlerKind>,

    /// Offline grace period marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) offline: Option<OfflineUntil>,
}

/// License state round-tripped through the host's storage
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StateDocument")]
pub struct LicenseState {
    pub(crate) settings: Settings,
    pub(crate) request: Params,
    pub(crate) data: Params,
    pub(crate) meta: Params,
}

/// Wire shape accepted on decode; an empty JSON array stands in for an empty object
#[derive(Deserialize)]
struct StateDocument {
    #[serde(default, deserialize_with = "lenient")]
    settings: Settings,
    #[serde(default, deserialize_with = "lenient")]
    request: Params,
    #[serde(default, deserialize_with = "lenient")]
    data: Params,
    #[serde(default, deserialize_with = "lenient")]
    meta: Params,
}

impl From<StateDocument> for LicenseState {
    fn from(doc: StateDocument) -> Self {
        let mut state = Self {
            settings: doc.settings,
            request: doc.request,
            data: doc.data,
            meta: doc.meta,
        };
        state.mirror_server_ids();
        state
    }
}

impl LicenseState {
    /// Create a fresh, never-activated license with daily checks
    pub fn create(
        url: impl Into<String>,
        store_code: impl Into<String>,
        sku: impl Into<String>,
        license_key: impl Into<String>,
    ) -> Self {
        Self::builder(url, store_code, sku, license_key).build()
    }

    /// Start building a fresh license
    pub fn builder(
        url: impl Into<String>,
        store_code: impl Into<String>,
        sku: impl Into<String>,
        license_key: impl Into<String>,
    ) -> LicenseStateBuilder {
        LicenseStateBuilder {
            url: url.into(),
            store_code: store_code.into(),
            sku: sku.into(),
            license_key: license_key.into(),
            frequency: CheckFrequency::default(),
            handler: HandlerKind::default(),
        }
    }

    /// Decode a persisted license
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode for persistence
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    // --- Accessors ---------------------------------------------------------

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn url(&self) -> Option<&str> {
        self.settings.url.as_deref()
    }

    pub const fn frequency(&self) -> Option<&CheckFrequency> {
        self.settings.frequency.as_ref()
    }

    pub const fn next_check(&self) -> i64 {
        self.settings.next_check
    }

    pub const fn version(&self) -> Option<SchemaVersion> {
        self.settings.version
    }

    pub const fn retries(&self) -> u32 {
        self.settings.retries
    }

    /// Handler kind, falling back to query string routing
    pub fn handler(&self) -> HandlerKind {
        self.settings.handler.unwrap_or_default()
    }

    pub const fn offline_until(&self) -> Option<OfflineUntil> {
        self.settings.offline
    }

    /// Parameters sent to the licensing service
    pub const fn request(&self) -> &Params {
        &self.request
    }

    /// Mutable request parameters, for host-specific extras
    pub const fn request_mut(&mut self) -> &mut Params {
        &mut self.request
    }

    /// Data last returned by the licensing service
    pub const fn data(&self) -> &Params {
        &self.data
    }

    /// Host bookkeeping, never sent to the server
    pub const fn meta(&self) -> &Params {
        &self.meta
    }

    // --- Derived predicates ------------------------------------------------

    /// Whether the license was never activated or validated
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the server flagged the license as expired
    pub fn has_expired(&self) -> bool {
        self.data.get("has_expired").is_some_and(truthy)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Validity of the cached server data at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.settings.frequency.is_none() || self.data.is_empty() {
            return false;
        }
        if self.data.get("activation_id").and_then(as_number).is_none() {
            return false;
        }
        match self.data.get("expire") {
            None | Some(Value::Null) => true,
            Some(expire) => as_number(expire).is_some_and(|at| (now.timestamp() as f64) < at),
        }
    }

    pub const fn is_offline(&self) -> bool {
        self.settings.offline.is_some()
    }

    pub fn is_offline_valid(&self) -> bool {
        self.is_offline_valid_at(Utc::now())
    }

    pub fn is_offline_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.settings.offline {
            Some(OfflineUntil::Unlimited) => true,
            Some(OfflineUntil::Until(epoch)) => now.timestamp() < epoch,
            None => false,
        }
    }

    /// Whether the server granted an offline grace period to this install
    pub fn is_offline_eligible(&self) -> bool {
        let has = |key: &str| self.data.get(key).is_some_and(|v| !v.is_null());
        self.url().is_some_and(|url| !url.is_empty())
            && self.data.get("allow_offline") == Some(&Value::Bool(true))
            && has("offline_interval")
            && has("offline_value")
    }

    // --- Mutators ----------------------------------------------------------

    /// Replace server data wholesale after a successful response
    pub fn set_data(&mut self, data: Params) {
        self.data = data;
        self.mirror_server_ids();
    }

    /// Set a parameter sent with the next request
    pub fn set_request_param(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.request.insert(key.into(), value.into());
    }

    pub fn touch(&mut self) {
        self.touch_at(Utc::now(), true);
    }

    /// Reset retries, optionally leave offline mode, and schedule the next check
    pub fn touch_at(&mut self, now: DateTime<Utc>, disable_offline: bool) {
        self.settings.retries = 0;
        if disable_offline {
            self.settings.offline = None;
        }
        if let Some(frequency) = &self.settings.frequency {
            self.settings.next_check = frequency.interval().apply(now).timestamp();
        }
    }

    pub fn add_retry_attempt(&mut self, next_check: &Interval) {
        self.add_retry_attempt_at(Utc::now(), next_check);
    }

    /// Count one more unreachable outcome and postpone the next check
    pub fn add_retry_attempt_at(&mut self, now: DateTime<Utc>, next_check: &Interval) {
        self.settings.retries += 1;
        self.settings.next_check = next_check.apply(now).timestamp();
    }

    pub fn enable_offline(&mut self) -> Result<()> {
        self.enable_offline_at(Utc::now())
    }

    /// Enter the offline grace period granted by the server data
    pub fn enable_offline_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        let unit = self
            .data
            .get("offline_interval")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let until = if unit == "unlimited" {
            OfflineUntil::Unlimited
        } else {
            let amount = self
                .data
                .get("offline_value")
                .and_then(as_number)
                .map_or(0, |v| v as i64);
            let grace = Interval::parse(&format!("+{amount} {unit}"))?;
            OfflineUntil::Until(grace.apply(now).timestamp())
        };

        self.settings.offline = Some(until);
        self.touch_at(now, false);
        Ok(())
    }

    /// Apply one schema migration step. Returns `true` if the version changed.
    pub fn update_version(&mut self) -> bool {
        let before = self.settings.version;
        let (version, state) = migration::step(before, std::mem::take(self));
        *self = state;
        self.settings.version = Some(version);
        before != Some(version)
    }

    /// Migrate step by step to the latest schema version
    pub fn upgrade(&mut self) {
        while self.update_version() {}
    }

    // --- Metadata ----------------------------------------------------------

    pub fn add_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.meta.insert(key.into(), value.into());
    }

    pub fn get_meta(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    pub fn get_meta_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.meta.get(key).cloned().unwrap_or_else(|| default.into())
    }

    /// Decode a metadata entry into a concrete type
    pub fn get_meta_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.meta
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn remove_meta(&mut self, key: &str) -> Option<Value> {
        self.meta.shift_remove(key)
    }

    /// Copy server-issued identifiers into the request when not already set
    fn mirror_server_ids(&mut self) {
        for (request_key, data_key) in [("activation_id", "activation_id"), ("license_key", "the_key")] {
            if self.request.contains_key(request_key) {
                continue;
            }
            if let Some(value) = self.data.get(data_key).filter(|v| !v.is_null()) {
                self.request.insert(request_key.to_string(), value.clone());
            }
        }
    }
}

impl std::fmt::Display for LicenseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}

/// Builder for fresh licenses
#[derive(Clone, Debug)]
pub struct LicenseStateBuilder {
    url: String,
    store_code: String,
    sku: String,
    license_key: String,
    frequency: CheckFrequency,
    handler: HandlerKind,
}

impl LicenseStateBuilder {
    pub fn frequency(mut self, frequency: CheckFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub const fn handler(mut self, handler: HandlerKind) -> Self {
        self.handler = handler;
        self
    }

    pub fn build(self) -> LicenseState {
        let mut request = Params::new();
        request.insert("store_code".into(), Value::String(self.store_code));
        request.insert("sku".into(), Value::String(self.sku));
        request.insert("license_key".into(), Value::String(self.license_key));

        LicenseState {
            settings: Settings {
                url: Some(self.url),
                frequency: Some(self.frequency),
                next_check: 0,
                version: Some(SchemaVersion::LATEST),
                retries: 0,
                handler: Some(self.handler),
                offline: None,
            },
            request,
            data: Params::new(),
            meta: Params::new(),
        }
    }
}

/// Numeric view of a scalar: numbers, and strings that parse as numbers
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Loose truthiness of a scalar as the licensing service emits it
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(T::default()),
        Value::Array(items) if items.is_empty() => Ok(T::default()),
        other => serde_json::from_value(other).map_err(D::Error::custom),
    }
}

fn frequency_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<CheckFrequency>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.parse().map(Some).map_err(D::Error::custom),
        _ => Ok(None),
    }
}

fn lenient_epoch<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_number(&value).map_or(0, |epoch| epoch as i64))
}
