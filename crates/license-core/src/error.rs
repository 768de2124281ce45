//! Error Types

use thiserror::Error;

/// Result type alias for license operations
pub type Result<T> = std::result::Result<T, LicenseError>;

/// License client error types
#[derive(Error, Debug)]
pub enum LicenseError {
    /// Misconfigured host integration (e.g. repository returned no state)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Licensing service could not be reached (DNS or connect failure)
    #[error("Host unreachable: {0}")]
    Unreachable(String),

    /// Any other transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Interval expression could not be interpreted
    #[error("Invalid interval expression: {0}")]
    InvalidInterval(String),

    /// Persisted state carries a schema version this client does not know
    #[error("Unsupported schema version: {0}")]
    UnsupportedVersion(String),

    /// Repository failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LicenseError {
    /// Check if this is the "host unreachable" transport condition
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Io(_))
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(msg) => format!("License client is misconfigured: {msg}"),
            Self::Unreachable(_) => {
                "The licensing service is currently unreachable. Please try again later.".into()
            }
            Self::Transport(_) => "Communication with the licensing service failed.".into(),
            Self::InvalidInterval(expr) => format!("'{expr}' is not a valid check interval."),
            Self::UnsupportedVersion(v) => {
                format!("Stored license uses an unsupported format (version {v}).")
            }
            Self::Storage(_) | Self::Io(_) => "The stored license could not be accessed.".into(),
            Self::Json(_) => "The stored license is corrupted.".into(),
        }
    }
}
