//! # license-validator
//!
//! Activation, validation and deactivation of a license key.
//!
//! ```text
//! ┌──────────────┐   load / save    ┌───────────────────┐
//! │  Validator   │ ◀──────────────▶ │ LicenseRepository │
//! └──────┬───────┘                  └───────────────────┘
//!        │ call
//!        ▼
//! ┌──────────────┐      HTTP        ┌───────────────────┐
//! │  Transport   │ ───────────────▶ │ licensing service │
//! └──────────────┘                  └───────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use license_core::{FileLicenseRepository, LicenseRepository, LicenseState};
//! use license_transport::{Transport, TransportOptions};
//! use license_validator::{ValidateOptions, Validator};
//!
//! # async fn run() -> license_core::Result<()> {
//! let repo = FileLicenseRepository::new("license.json");
//! let state = LicenseState::create("https://shop.example/", "STORE", "SKU", "KEY");
//! repo.save(Some(state.to_json()?))?;
//!
//! let transport = Arc::new(Transport::new(TransportOptions::default())?);
//! let validator = Validator::from_env(transport);
//!
//! validator.activate(&repo).await?;
//! let valid = validator.validate(&repo, &ValidateOptions::default()).await?;
//! # let _ = valid;
//! # Ok(())
//! # }
//! ```

pub mod validator;

pub use validator::{UNKNOWN_DOMAIN, ValidateOptions, Validator};
