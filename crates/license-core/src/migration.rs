//! Schema Migration
//!
//! Persisted licenses carry a schema version. Older documents are brought
//! forward one step at a time:
//!
//! ```text
//! (none) ──▶ 1.0.6 ──▶ 1.1.0 ──▶ 1.2.0
//!          retries    meta      handler
//! ```

use serde::{Deserialize, Serialize};

use crate::error::LicenseError;
use crate::state::{HandlerKind, LicenseState};

/// Known schema versions, ordered oldest first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SchemaVersion {
    /// Adds the retry counter
    V1_0_6,
    /// Adds the host metadata map
    V1_1_0,
    /// Adds the endpoint handler kind
    V1_2_0,
}

impl SchemaVersion {
    pub const LATEST: Self = Self::V1_2_0;

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_0_6 => "1.0.6",
            Self::V1_1_0 => "1.1.0",
            Self::V1_2_0 => "1.2.0",
        }
    }

    /// Version reached by migrating one step from `self`
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::V1_0_6 => Some(Self::V1_1_0),
            Self::V1_1_0 => Some(Self::V1_2_0),
            Self::V1_2_0 => None,
        }
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = LicenseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "1.0.6" => Ok(Self::V1_0_6),
            "1.1.0" => Ok(Self::V1_1_0),
            "1.2.0" => Ok(Self::V1_2_0),
            _ => Err(LicenseError::UnsupportedVersion(value)),
        }
    }
}

impl From<SchemaVersion> for String {
    fn from(version: SchemaVersion) -> Self {
        version.as_str().to_string()
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Migrate `state` one step forward from `version`.
///
/// Pure: the returned state carries the returned version. At the latest
/// version the state is returned untouched.
pub fn step(version: Option<SchemaVersion>, mut state: LicenseState) -> (SchemaVersion, LicenseState) {
    let next = match version {
        None => {
            state.settings.retries = 0;
            SchemaVersion::V1_0_6
        }
        // The metadata map always exists in memory; this step only stamps the version
        Some(SchemaVersion::V1_0_6) => SchemaVersion::V1_1_0,
        Some(SchemaVersion::V1_1_0) => {
            state.settings.handler = Some(state.settings.handler.unwrap_or(HandlerKind::Default));
            SchemaVersion::V1_2_0
        }
        Some(latest @ SchemaVersion::V1_2_0) => latest,
    };

    if version != Some(next) {
        tracing::debug!(
            from = version.map_or("none", SchemaVersion::as_str),
            to = next.as_str(),
            "Migrated license schema"
        );
    }
    state.settings.version = Some(next);
    (next, state)
}
