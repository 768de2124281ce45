//! License Validator
//!
//! Drives activation, validation and deactivation against the licensing
//! service and persists the outcome through the host's repository.
//!
//! Validation decision order:
//!
//! ```text
//! empty / has_expired ───────────────▶ false
//! cached and still valid ────────────▶ true            (no call)
//! response with `error` ─────────────▶ !error          (saved)
//! unreachable + offline grace ───────▶ enable / check offline
//! unreachable + retry budget left ───▶ true            (saved, retry counted)
//! otherwise ─────────────────────────▶ false
//! ```

use std::sync::Arc;

use chrono::Utc;
use license_core::{Interval, LicenseError, LicenseRepository, LicenseState, Result};
use license_transport::endpoint::{ACTIVATE, DEACTIVATE, VALIDATE};
use license_transport::{ApiResponse, Method, Transport};

/// Domain reported when the host did not configure one
pub const UNKNOWN_DOMAIN: &str = "Unknown";

/// Knobs for `Validator::validate`
#[derive(Clone, Debug)]
pub struct ValidateOptions {
    /// Call the service even when the cached data is still valid
    pub force: bool,

    /// Report valid on an unreachable service while retries remain
    pub allow_retry: bool,

    /// Consecutive unreachable outcomes tolerated
    pub retry_attempts: u32,

    /// Delay before the next check after an unreachable outcome
    pub retry_interval: Interval,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            force: false,
            allow_retry: false,
            retry_attempts: 2,
            retry_interval: Interval::hours(1),
        }
    }
}

impl ValidateOptions {
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub const fn with_allow_retry(mut self, allow_retry: bool) -> Self {
        self.allow_retry = allow_retry;
        self
    }

    pub const fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    pub fn with_retry_interval(mut self, interval: Interval) -> Self {
        self.retry_interval = interval;
        self
    }
}

/// License operations bound to one transport
#[derive(Clone, Debug)]
pub struct Validator {
    transport: Arc<Transport>,
    domain: Option<String>,
}

impl Validator {
    pub const fn new(transport: Arc<Transport>) -> Self {
        Self {
            transport,
            domain: None,
        }
    }

    /// Report `domain` to the service with every call
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Domain from `LICENSE_DOMAIN`, falling back to `SERVER_NAME`
    pub fn from_env(transport: Arc<Transport>) -> Self {
        Self::from_lookup(transport, |key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup(transport: Arc<Transport>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let domain = ["LICENSE_DOMAIN", "SERVER_NAME"]
            .into_iter()
            .filter_map(&lookup)
            .find(|value| !value.trim().is_empty());
        Self { transport, domain }
    }

    pub fn domain(&self) -> &str {
        self.domain.as_deref().unwrap_or(UNKNOWN_DOMAIN)
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Activate the stored license key.
    ///
    /// On success the server data replaces the cached data and the state is
    /// saved. Returns the raw response; `None` for an empty body.
    pub async fn activate<R>(&self, repo: &R) -> Result<Option<ApiResponse>>
    where
        R: LicenseRepository + ?Sized,
    {
        let mut license = load(repo)?;
        self.stamp_domain(&mut license);

        let response = self
            .transport
            .call(ACTIVATE, &license, Method::Post, false)
            .await?;

        if let Some(success) = response.as_ref().filter(|r| r.is_success()) {
            license.set_data(success.data.clone().unwrap_or_default());
            license.touch();
            save(repo, &license)?;
            tracing::info!(
                domain = self.domain(),
                activation_id = ?license.data().get("activation_id"),
                "License activated"
            );
        } else {
            tracing::warn!(
                message = ?response.as_ref().and_then(|r| r.message.as_deref()),
                "License activation rejected"
            );
        }

        Ok(response)
    }

    /// Validate the stored license, calling the service only when needed
    pub async fn validate<R>(&self, repo: &R, options: &ValidateOptions) -> Result<bool>
    where
        R: LicenseRepository + ?Sized,
    {
        let mut license = load(repo)?;
        license.upgrade();

        if license.is_empty() || license.has_expired() {
            tracing::debug!(
                empty = license.is_empty(),
                expired = license.has_expired(),
                "License not usable"
            );
            return Ok(false);
        }

        if !options.force && Utc::now().timestamp() < license.next_check() && license.is_valid() {
            tracing::debug!(next_check = license.next_check(), "Using cached license data");
            return Ok(true);
        }

        self.stamp_domain(&mut license);
        let response = match self
            .transport
            .call(VALIDATE, &license, Method::Post, false)
            .await
        {
            Ok(response) => response,
            Err(err) if err.is_unreachable() => {
                tracing::warn!(error = %err, "Licensing service unreachable");
                None
            }
            Err(err) => return Err(err),
        };

        match response {
            Some(ApiResponse {
                error: Some(error),
                data,
                ..
            }) => {
                if let Some(data) = data {
                    license.set_data(data);
                }
                license.touch();
                save(repo, &license)?;
                tracing::info!(valid = !error, "License validated");
                Ok(!error)
            }
            Some(_) => {
                tracing::warn!("Validation response carries no error flag");
                Ok(false)
            }
            None => self.recover(repo, license, options),
        }
    }

    /// Deactivate the stored license and erase it when the service agrees
    pub async fn deactivate<R>(&self, repo: &R) -> Result<Option<ApiResponse>>
    where
        R: LicenseRepository + ?Sized,
    {
        let mut license = load(repo)?;
        license.upgrade();
        self.stamp_domain(&mut license);

        let response = self
            .transport
            .call(DEACTIVATE, &license, Method::Post, false)
            .await?;

        let erase = response.as_ref().is_some_and(|r| match r.error {
            Some(false) => true,
            // The activation is already gone on the server side
            Some(true) => r.has_error_for("activation_id"),
            None => false,
        });
        if erase {
            repo.save(None)?;
            tracing::info!(domain = self.domain(), "License deactivated");
        }

        Ok(response)
    }

    /// Validity from cached state only; never calls the service
    pub fn soft_validate<R>(repo: &R) -> Result<bool>
    where
        R: LicenseRepository + ?Sized,
    {
        let mut license = load(repo)?;
        license.upgrade();
        if license.is_empty() || license.has_expired() {
            return Ok(false);
        }
        Ok(license.is_valid())
    }

    /// No usable response: fall back to the offline grace period, then to
    /// the retry budget.
    fn recover<R>(&self, repo: &R, mut license: LicenseState, options: &ValidateOptions) -> Result<bool>
    where
        R: LicenseRepository + ?Sized,
    {
        if license.is_offline_eligible() {
            if license.is_offline() {
                let valid = license.is_offline_valid();
                tracing::debug!(valid, "Offline grace period checked");
                return Ok(valid);
            }
            if let Err(err) = license.enable_offline() {
                tracing::warn!(error = %err, "Cannot enter offline mode");
                return Ok(false);
            }
            save(repo, &license)?;
            tracing::info!(domain = self.domain(), offline = ?license.offline_until(), "Offline mode enabled");
            return Ok(true);
        }

        if options.allow_retry && license.retries() < options.retry_attempts {
            license.add_retry_attempt(&options.retry_interval);
            save(repo, &license)?;
            tracing::info!(
                retries = license.retries(),
                max = options.retry_attempts,
                next_check = license.next_check(),
                "Validation retry scheduled"
            );
            return Ok(true);
        }

        Ok(false)
    }

    fn stamp_domain(&self, license: &mut LicenseState) {
        license.set_request_param("domain", self.domain());
    }
}

fn load<R>(repo: &R) -> Result<LicenseState>
where
    R: LicenseRepository + ?Sized,
{
    repo.load()?
        .ok_or_else(|| LicenseError::Config("repository must return a LicenseState".into()))
}

fn save<R>(repo: &R, license: &LicenseState) -> Result<()>
where
    R: LicenseRepository + ?Sized,
{
    repo.save(Some(license.to_json()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use license_core::{CallbackRepository, MemoryLicenseRepository, OfflineUntil};
    use license_transport::{HttpClient, MockHttpClient, Payload, TransportOptions};
    use serde_json::json;

    fn validator(client: &Arc<MockHttpClient>) -> Validator {
        let client: Arc<dyn HttpClient> = client.clone();
        let transport = Transport::with_client(client, TransportOptions::default());
        Validator::new(Arc::new(transport)).with_domain("unit.test")
    }

    fn tomorrow() -> i64 {
        Utc::now().timestamp() + 86_400
    }

    fn repo(state: &serde_json::Value) -> MemoryLicenseRepository {
        let state = LicenseState::from_json(&state.to_string()).unwrap();
        MemoryLicenseRepository::with_state(&state).unwrap()
    }

    fn stored(repo: &MemoryLicenseRepository) -> LicenseState {
        LicenseState::from_json(&repo.stored().unwrap().unwrap()).unwrap()
    }

    fn active_state(data: serde_json::Value) -> serde_json::Value {
        json!({
            "settings": {
                "url": "https://licenses.test/",
                "frequency": "daily",
                "next_check": 0,
                "version": "1.2.0",
                "retries": 0,
                "handler": "default"
            },
            "request": {"store_code": "store", "sku": "SKU", "license_key": "KEY"},
            "data": data
        })
    }

    #[tokio::test]
    async fn test_missing_state_is_config_error() {
        let client = Arc::new(MockHttpClient::new());
        let repo = MemoryLicenseRepository::new();
        let err = validator(&client)
            .validate(&repo, &ValidateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LicenseError::Config(_)));

        let err = validator(&client).activate(&repo).await.unwrap_err();
        assert!(matches!(err, LicenseError::Config(_)));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_activate_saves_server_data() {
        let client = Arc::new(MockHttpClient::new().with_reply(
            json!({"error": false, "data": {"activation_id": 404, "the_key": "KEY", "expire": tomorrow()}})
                .to_string(),
        ));
        let state = LicenseState::create("https://licenses.test/", "store", "SKU", "KEY");
        let repo = MemoryLicenseRepository::with_state(&state).unwrap();

        let response = validator(&client).activate(&repo).await.unwrap().unwrap();
        assert!(response.is_success());
        assert_eq!(repo.save_count(), 1);

        let saved = stored(&repo);
        assert_eq!(saved.data()["activation_id"], json!(404));
        assert_eq!(saved.request()["activation_id"], json!(404));
        assert_eq!(saved.request()["domain"], json!("unit.test"));
        assert!(saved.next_check() > Utc::now().timestamp());
        assert!(saved.is_valid());

        let request = &client.requests()[0];
        assert_eq!(request.url, "https://licenses.test/?action=license_key_activate");
        let Payload::Form(pairs) = &request.payload else {
            panic!("expected form payload");
        };
        assert!(pairs.contains(&("domain".to_string(), "unit.test".to_string())));
    }

    #[tokio::test]
    async fn test_activate_rejected_is_not_saved() {
        let client = Arc::new(
            MockHttpClient::new()
                .with_reply(r#"{"error":true,"errors":{"license_key":["Invalid"]}}"#)
                .with_reply(""),
        );
        let state = LicenseState::create("https://licenses.test/", "store", "SKU", "KEY");
        let repo = MemoryLicenseRepository::with_state(&state).unwrap();
        let validator = validator(&client);

        let response = validator.activate(&repo).await.unwrap().unwrap();
        assert_eq!(response.error, Some(true));
        assert!(response.has_error_for("license_key"));

        assert!(validator.activate(&repo).await.unwrap().is_none());
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_activate_propagates_unreachable() {
        let client = Arc::new(MockHttpClient::new().with_unreachable());
        let state = LicenseState::create("https://licenses.test/", "store", "SKU", "KEY");
        let repo = MemoryLicenseRepository::with_state(&state).unwrap();

        let err = validator(&client).activate(&repo).await.unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn test_validate_empty_state_makes_no_call() {
        let client = Arc::new(MockHttpClient::new());
        let state = LicenseState::create("https://licenses.test/", "store", "SKU", "KEY");
        let repo = MemoryLicenseRepository::with_state(&state).unwrap();

        let valid = validator(&client)
            .validate(&repo, &ValidateOptions::default().with_force(true))
            .await
            .unwrap();
        assert!(!valid);
        assert_eq!(client.call_count(), 0);
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_validate_expired_makes_no_call() {
        let client = Arc::new(MockHttpClient::new());
        let repo = repo(&active_state(json!({"activation_id": 1, "has_expired": true})));

        let valid = validator(&client)
            .validate(&repo, &ValidateOptions::default())
            .await
            .unwrap();
        assert!(!valid);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_validate_uses_cache_until_next_check() {
        let client = Arc::new(MockHttpClient::new().with_reply(r#"{"error":false}"#));
        let mut state = active_state(json!({"activation_id": 1, "expire": tomorrow()}));
        state["settings"]["next_check"] = json!(tomorrow());
        let repo = repo(&state);
        let validator = validator(&client);

        assert!(validator.validate(&repo, &ValidateOptions::default()).await.unwrap());
        assert_eq!(client.call_count(), 0);

        assert!(validator
            .validate(&repo, &ValidateOptions::default().with_force(true))
            .await
            .unwrap());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_validate_success_persists_and_resets_retries() {
        let expire = tomorrow();
        let client = Arc::new(MockHttpClient::new().with_reply(
            json!({"error": false, "data": {"activation_id": 1, "expire": expire}}).to_string(),
        ));
        let mut state = active_state(json!({"activation_id": 1, "expire": 897}));
        state["settings"]["retries"] = json!(1);
        let repo = repo(&state);

        let valid = validator(&client)
            .validate(&repo, &ValidateOptions::default())
            .await
            .unwrap();
        assert!(valid);
        assert_eq!(repo.save_count(), 1);

        let saved = stored(&repo);
        assert_eq!(saved.data()["expire"], json!(expire));
        assert_eq!(saved.retries(), 0);
        assert!(saved.next_check() > Utc::now().timestamp());
    }

    #[tokio::test]
    async fn test_validate_error_response_is_saved_and_false() {
        let client = Arc::new(MockHttpClient::new().with_reply(r#"{"error":true}"#));
        let repo = repo(&active_state(json!({"activation_id": 1, "expire": 897})));

        let valid = validator(&client)
            .validate(&repo, &ValidateOptions::default())
            .await
            .unwrap();
        assert!(!valid);
        assert_eq!(repo.save_count(), 1);
        assert_eq!(stored(&repo).data()["expire"], json!(897));
    }

    #[tokio::test]
    async fn test_validate_response_without_error_flag() {
        let client = Arc::new(MockHttpClient::new().with_reply(r#"{"message":"maintenance"}"#));
        let repo = repo(&active_state(json!({"activation_id": 1, "expire": 897})));

        let valid = validator(&client)
            .validate(&repo, &ValidateOptions::default().with_allow_retry(true))
            .await
            .unwrap();
        assert!(!valid);
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_validate_rejection_with_list_errors_is_not_offline() {
        let client = Arc::new(
            MockHttpClient::new().with_reply(r#"{"error":true,"errors":["License key is invalid"]}"#),
        );
        let repo = repo(&active_state(json!({
            "activation_id": 1,
            "expire": 897,
            "allow_offline": true,
            "offline_interval": "days",
            "offline_value": 7
        })));

        let valid = validator(&client)
            .validate(&repo, &ValidateOptions::default())
            .await
            .unwrap();
        assert!(!valid);
        assert_eq!(repo.save_count(), 1);
        assert!(!stored(&repo).is_offline());
    }

    #[tokio::test]
    async fn test_validate_rejection_with_scalar_data_is_not_retried() {
        let client = Arc::new(MockHttpClient::new().with_reply(r#"{"error":true,"data":"expired"}"#));
        let repo = repo(&active_state(json!({"activation_id": 1, "expire": 897})));

        let valid = validator(&client)
            .validate(&repo, &ValidateOptions::default().with_allow_retry(true))
            .await
            .unwrap();
        assert!(!valid);

        let saved = stored(&repo);
        assert_eq!(saved.retries(), 0);
        assert_eq!(saved.data()["0"], json!("expired"));
    }

    #[tokio::test]
    async fn test_validate_unreachable_enables_offline() {
        let client = Arc::new(MockHttpClient::new().with_unreachable());
        let repo = repo(&active_state(json!({
            "activation_id": 1,
            "expire": 897,
            "allow_offline": true,
            "offline_interval": "days",
            "offline_value": 7
        })));

        let valid = validator(&client)
            .validate(&repo, &ValidateOptions::default())
            .await
            .unwrap();
        assert!(valid);
        assert_eq!(repo.save_count(), 1);

        let saved = stored(&repo);
        assert!(saved.is_offline());
        let Some(OfflineUntil::Until(until)) = saved.offline_until() else {
            panic!("expected bounded offline period");
        };
        assert!(until > Utc::now().timestamp() + 6 * 86_400);
    }

    #[tokio::test]
    async fn test_validate_unlimited_offline() {
        let client = Arc::new(MockHttpClient::new().with_reply("").with_reply(""));
        let repo = repo(&active_state(json!({
            "activation_id": 1,
            "allow_offline": true,
            "offline_interval": "unlimited",
            "offline_value": 0
        })));
        let validator = validator(&client);
        let options = ValidateOptions::default().with_force(true);

        assert!(validator.validate(&repo, &options).await.unwrap());
        assert_eq!(stored(&repo).offline_until(), Some(OfflineUntil::Unlimited));

        // Already offline: checked, not saved again
        assert!(validator.validate(&repo, &options).await.unwrap());
        assert_eq!(repo.save_count(), 1);
    }

    #[tokio::test]
    async fn test_validate_expired_offline_period_skips_retry() {
        let client = Arc::new(MockHttpClient::new().with_unreachable());
        let mut state = active_state(json!({
            "activation_id": 1,
            "allow_offline": true,
            "offline_interval": "days",
            "offline_value": 7
        }));
        state["settings"]["offline"] = json!(1000);
        let repo = repo(&state);

        let valid = validator(&client)
            .validate(&repo, &ValidateOptions::default().with_allow_retry(true))
            .await
            .unwrap();
        assert!(!valid);
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_validate_unreachable_retries() {
        let client = Arc::new(MockHttpClient::new().with_unreachable());
        let repo = repo(&active_state(json!({"activation_id": 1, "expire": 897})));

        let valid = validator(&client)
            .validate(&repo, &ValidateOptions::default().with_allow_retry(true))
            .await
            .unwrap();
        assert!(valid);
        assert_eq!(repo.save_count(), 1);

        let saved = stored(&repo);
        assert_eq!(saved.retries(), 1);
        assert!(saved.next_check() > Utc::now().timestamp() + 3_000);
        assert!(!saved.is_offline());
    }

    #[tokio::test]
    async fn test_validate_retry_budget_exhausted() {
        let client = Arc::new(MockHttpClient::new().with_unreachable());
        let mut state = active_state(json!({"activation_id": 1, "expire": 897}));
        state["settings"]["retries"] = json!(1);
        let repo = repo(&state);

        let options = ValidateOptions::default()
            .with_allow_retry(true)
            .with_retry_attempts(1);
        let valid = validator(&client).validate(&repo, &options).await.unwrap();
        assert!(!valid);
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_validate_without_retry_fails_closed() {
        let client = Arc::new(MockHttpClient::new().with_reply(""));
        let repo = repo(&active_state(json!({"activation_id": 1, "expire": 897})));

        let valid = validator(&client)
            .validate(&repo, &ValidateOptions::default())
            .await
            .unwrap();
        assert!(!valid);
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_validate_propagates_other_transport_errors() {
        let client = Arc::new(MockHttpClient::new().with_failure("SSL certificate problem"));
        let repo = repo(&active_state(json!({"activation_id": 1, "expire": 897})));

        let err = validator(&client)
            .validate(&repo, &ValidateOptions::default().with_allow_retry(true))
            .await
            .unwrap_err();
        assert!(matches!(err, LicenseError::Transport(_)));
        assert_eq!(repo.save_count(), 0);
    }

    #[tokio::test]
    async fn test_validate_migrates_legacy_state() {
        let client = Arc::new(MockHttpClient::new().with_unreachable());
        let repo = repo(&json!({
            "settings": {"url": "https://licenses.test/", "frequency": "daily", "retries": 5},
            "request": {"license_key": "KEY"},
            "data": {"activation_id": 1, "expire": 897}
        }));

        let valid = validator(&client)
            .validate(&repo, &ValidateOptions::default().with_allow_retry(true))
            .await
            .unwrap();
        assert!(valid);

        let saved = stored(&repo);
        assert_eq!(saved.retries(), 1);
        assert_eq!(saved.version(), Some(license_core::SchemaVersion::LATEST));
    }

    #[tokio::test]
    async fn test_deactivate_success_erases() {
        let client = Arc::new(MockHttpClient::new().with_reply(r#"{"error":false,"message":"deactivated"}"#));
        let repo = repo(&active_state(json!({"activation_id": 1})));

        let response = validator(&client).deactivate(&repo).await.unwrap().unwrap();
        assert_eq!(response.message.as_deref(), Some("deactivated"));
        assert_eq!(repo.save_count(), 1);
        assert!(repo.stored().unwrap().is_none());
        assert_eq!(
            client.requests()[0].url,
            "https://licenses.test/?action=license_key_deactivate"
        );
    }

    #[tokio::test]
    async fn test_deactivate_unknown_activation_erases_once() {
        let client = Arc::new(MockHttpClient::new().with_reply(
            r#"{"error":true,"errors":{"activation_id":"not found"}}"#,
        ));
        let saves = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recorded = Arc::clone(&saves);
        let repo = CallbackRepository::new(
            || {
                Some(LicenseState::from_json(&active_state(json!({"activation_id": 1})).to_string()).unwrap())
            },
            move |serialized| recorded.lock().unwrap().push(serialized),
        );

        validator(&client).deactivate(&repo).await.unwrap();
        assert_eq!(*saves.lock().unwrap(), vec![None]);
    }

    #[tokio::test]
    async fn test_deactivate_other_errors_keep_license() {
        let client = Arc::new(
            MockHttpClient::new()
                .with_reply(r#"{"error":true,"errors":{"license_key":"invalid"}}"#)
                .with_reply(""),
        );
        let repo = repo(&active_state(json!({"activation_id": 1})));
        let validator = validator(&client);

        validator.deactivate(&repo).await.unwrap();
        assert!(validator.deactivate(&repo).await.unwrap().is_none());
        assert_eq!(repo.save_count(), 0);
        assert!(repo.stored().unwrap().is_some());
    }

    #[test]
    fn test_soft_validate() {
        let valid = repo(&active_state(json!({"activation_id": 1, "expire": tomorrow()})));
        assert!(Validator::soft_validate(&valid).unwrap());

        let stale = repo(&active_state(json!({"activation_id": 1, "expire": 897})));
        assert!(!Validator::soft_validate(&stale).unwrap());

        let expired = repo(&active_state(json!({"activation_id": 1, "has_expired": true})));
        assert!(!Validator::soft_validate(&expired).unwrap());

        let state = LicenseState::create("https://licenses.test/", "store", "SKU", "KEY");
        let empty = MemoryLicenseRepository::with_state(&state).unwrap();
        assert!(!Validator::soft_validate(&empty).unwrap());
    }

    #[test]
    fn test_domain_lookup() {
        let client: Arc<dyn HttpClient> = Arc::new(MockHttpClient::new());
        let transport = Arc::new(Transport::with_client(client, TransportOptions::default()));

        let validator = Validator::from_lookup(Arc::clone(&transport), |_| None);
        assert_eq!(validator.domain(), UNKNOWN_DOMAIN);

        let validator = Validator::from_lookup(Arc::clone(&transport), |key| {
            (key == "SERVER_NAME").then(|| "server.test".to_string())
        });
        assert_eq!(validator.domain(), "server.test");

        let validator = Validator::from_lookup(transport, |key| Some(key.to_lowercase()));
        assert_eq!(validator.domain(), "license_domain");
    }
}
