//! Endpoints and Request Methods

use std::str::FromStr;

use license_core::{HandlerKind, LicenseError, Params};
use serde_json::Value;

use crate::client::HttpVerb;

pub const ACTIVATE: &str = "license_key_activate";
pub const VALIDATE: &str = "license_key_validate";
pub const DEACTIVATE: &str = "license_key_deactivate";

/// Request method as understood by the licensing service.
///
/// `J*` variants send the parameters as a JSON body using the named verb.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    Get,
    #[default]
    Post,
    JsonPost,
    JsonPut,
    JsonGet,
    JsonDelete,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::JsonPost => "JPOST",
            Self::JsonPut => "JPUT",
            Self::JsonGet => "JGET",
            Self::JsonDelete => "JDELETE",
        }
    }

    /// HTTP verb put on the wire
    pub const fn verb(self) -> HttpVerb {
        match self {
            Self::Get | Self::JsonGet => HttpVerb::Get,
            Self::Post | Self::JsonPost => HttpVerb::Post,
            Self::JsonPut => HttpVerb::Put,
            Self::JsonDelete => HttpVerb::Delete,
        }
    }

    pub const fn is_json(self) -> bool {
        matches!(
            self,
            Self::JsonPost | Self::JsonPut | Self::JsonGet | Self::JsonDelete
        )
    }
}

impl FromStr for Method {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "JPOST" => Ok(Self::JsonPost),
            "JPUT" => Ok(Self::JsonPut),
            "JGET" => Ok(Self::JsonGet),
            "JDELETE" => Ok(Self::JsonDelete),
            other => Err(LicenseError::Config(format!("unsupported request method '{other}'"))),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical endpoint path for a logical endpoint name
pub fn resolve(name: &str, handler: HandlerKind, rest_namespace: &str) -> String {
    match handler {
        HandlerKind::WpRest => format!(
            "/wp-json/{rest_namespace}/v1/{}",
            name.strip_prefix("license_key_").unwrap_or(name)
        ),
        HandlerKind::Default => format!("?action={name}"),
    }
}

/// Flatten request parameters into form/query pairs.
///
/// Booleans become `1`/`0`, nulls are dropped, nested values use
/// `key[sub]` notation.
pub fn encode_params(params: &Params) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        push_pairs(&mut pairs, key.clone(), value);
    }
    pairs
}

fn push_pairs(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((key, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => pairs.push((key, n.to_string())),
        Value::String(s) => pairs.push((key, s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                push_pairs(pairs, format!("{key}[{i}]"), item);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                push_pairs(pairs, format!("{key}[{sub}]"), item);
            }
        }
    }
}
