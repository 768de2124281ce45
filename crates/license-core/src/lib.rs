//! # license-core
//!
//! License state model for the license keys client.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       LicenseState                         │
//! │  ┌────────────┐  ┌────────────┐  ┌──────────┐  ┌────────┐  │
//! │  │  settings  │  │  request   │  │   data   │  │  meta  │  │
//! │  └────────────┘  └────────────┘  └──────────┘  └────────┘  │
//! └────────────────────────────────────────────────────────────┘
//!         ▲                                      │
//!         │ load                          save   ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │               LicenseRepository (host storage)             │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! `LicenseState` answers the questions the validator asks (is the cached
//! data still valid, may we run offline, how many retries are left) and
//! knows how to move its own clock forward (`touch`, `add_retry_attempt`,
//! `enable_offline`).

pub mod error;
pub mod interval;
pub mod migration;
pub mod state;
pub mod store;

pub use error::{LicenseError, Result};
pub use interval::{CheckFrequency, Interval, Unit};
pub use migration::SchemaVersion;
pub use state::{HandlerKind, LicenseState, LicenseStateBuilder, OfflineUntil, Params, Settings};
pub use store::{CallbackRepository, FileLicenseRepository, LicenseRepository, MemoryLicenseRepository};
