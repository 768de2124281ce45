//! Licensing Service Responses
//!
//! Decoding is lenient: any JSON object is a response, and the `error` flag
//! is never lost because a sibling field has an unexpected shape.

use license_core::Params;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Decoded response body
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Params")]
pub struct ApiResponse {
    /// Application-level error flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,

    /// License data on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Params>,

    /// Field → message map on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Params>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Anything else the service sent
    #[serde(flatten)]
    pub extra: Params,
}

impl ApiResponse {
    /// `error` is present and explicitly `false`
    pub fn is_success(&self) -> bool {
        self.error == Some(false)
    }

    /// Whether the service reported an error for `field`
    pub fn has_error_for(&self, field: &str) -> bool {
        self.errors.as_ref().is_some_and(|errors| errors.contains_key(field))
    }

    /// Decode a raw body. Empty bodies and non-object JSON yield `None`.
    pub fn decode(body: &str) -> Option<Self> {
        if body.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<Self>(body) {
            Ok(response) => Some(response),
            Err(err) => {
                tracing::warn!(error = %err, "Discarding undecodable response body");
                None
            }
        }
    }
}

impl From<Params> for ApiResponse {
    fn from(mut fields: Params) -> Self {
        let error = fields.shift_remove("error").and_then(|flag| error_flag(&flag));
        let data = fields.shift_remove("data").and_then(into_map);
        let errors = fields.shift_remove("errors").and_then(into_map);
        let message = match fields.shift_remove("message") {
            Some(Value::String(message)) => Some(message),
            Some(Value::Null) | None => None,
            // Keep odd shapes around for the host to inspect
            Some(other) => {
                fields.insert("message".into(), other);
                None
            }
        };

        Self {
            error,
            data,
            errors,
            message,
            extra: fields,
        }
    }
}

/// Only a literal `false` counts as success; null means the flag is absent
const fn error_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(*flag),
        _ => Some(true),
    }
}

/// Map view of any value: lists are keyed by index, scalars become `{"0": v}`
fn into_map(value: Value) -> Option<Params> {
    match value {
        Value::Null => None,
        Value::Object(map) => Some(map),
        Value::Array(items) => Some(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item))
                .collect(),
        ),
        scalar => Some(std::iter::once(("0".to_string(), scalar)).collect()),
    }
}
