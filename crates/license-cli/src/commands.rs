//! Command implementations

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use license_core::{FileLicenseRepository, LicenseError, LicenseRepository, LicenseState};
use license_transport::{ApiResponse, EventKind, Transport, TransportEvent, TransportOptions};
use license_validator::{ValidateOptions, Validator};

use crate::{InitArgs, ValidateArgs};

const ALL_EVENTS: [EventKind; 6] = [
    EventKind::Start,
    EventKind::Endpoint,
    EventKind::Request,
    EventKind::Headers,
    EventKind::Response,
    EventKind::Finish,
];

pub fn init(repo: &FileLicenseRepository, args: &InitArgs) -> Result<ExitCode> {
    if !args.overwrite && repo.load()?.is_some() {
        bail!(
            "{} already holds a license (use --overwrite to replace it)",
            repo.path().display()
        );
    }

    let license = LicenseState::builder(&args.url, &args.store_code, &args.sku, &args.license_key)
        .frequency(args.frequency.clone())
        .handler(args.handler)
        .build();
    repo.save(Some(license.to_json()?))?;

    tracing::info!(path = %repo.path().display(), url = %args.url, "License state created");
    Ok(ExitCode::SUCCESS)
}

pub async fn activate(repo: &FileLicenseRepository, verbose: bool) -> Result<ExitCode> {
    let response = validator(verbose)?.activate(repo).await?;
    let activated = response.as_ref().is_some_and(ApiResponse::is_success);
    print_response(response.as_ref())?;
    Ok(exit_code(activated))
}

pub async fn validate(repo: &FileLicenseRepository, args: &ValidateArgs, verbose: bool) -> Result<ExitCode> {
    let options = ValidateOptions::default()
        .with_force(args.force)
        .with_allow_retry(args.allow_retry)
        .with_retry_attempts(args.retry_attempts)
        .with_retry_interval(args.retry_interval.clone());

    let valid = validator(verbose)?.validate(repo, &options).await?;
    println!("{}", if valid { "valid" } else { "invalid" });
    Ok(exit_code(valid))
}

pub async fn deactivate(repo: &FileLicenseRepository, verbose: bool) -> Result<ExitCode> {
    let response = validator(verbose)?.deactivate(repo).await?;
    let erased = repo.load()?.is_none();
    print_response(response.as_ref())?;
    Ok(exit_code(erased))
}

pub fn status(repo: &FileLicenseRepository) -> Result<ExitCode> {
    let valid = Validator::soft_validate(repo)?;
    println!("{}", if valid { "valid" } else { "invalid" });
    Ok(exit_code(valid))
}

pub fn show(repo: &FileLicenseRepository) -> Result<ExitCode> {
    let license = repo
        .load()?
        .with_context(|| format!("no license stored at {}", repo.path().display()))?;
    println!("{}", serde_json::to_string_pretty(&license)?);
    Ok(ExitCode::SUCCESS)
}

fn validator(verbose: bool) -> Result<Validator> {
    let mut transport = Transport::new(TransportOptions::from_env())?;
    if verbose {
        for kind in ALL_EVENTS {
            transport.subscribe(kind, log_event);
        }
    }
    Ok(Validator::from_env(Arc::new(transport)))
}

fn log_event(event: &TransportEvent) {
    match event {
        TransportEvent::Start { started_at } => tracing::info!(%started_at, "start"),
        TransportEvent::Endpoint { endpoint, url } => tracing::info!(%endpoint, %url, "endpoint"),
        TransportEvent::Request { params } => {
            tracing::info!(params = %serde_json::Value::Object(params.clone()), "request");
        }
        TransportEvent::Headers { headers } => tracing::info!(?headers, "headers"),
        TransportEvent::Response { body } => tracing::info!(%body, "response"),
        TransportEvent::Finish { finished_at, started_at } => {
            let elapsed_ms = (*finished_at - *started_at).num_milliseconds();
            tracing::info!(elapsed_ms, "finish");
        }
    }
}

fn print_response(response: Option<&ApiResponse>) -> Result<()> {
    match response {
        Some(response) => println!("{}", serde_json::to_string_pretty(response)?),
        None => println!("no response from the licensing service"),
    }
    Ok(())
}

/// Operator-facing message: the friendly text for license errors, the full chain otherwise
pub fn describe(err: &anyhow::Error) -> String {
    err.downcast_ref::<LicenseError>()
        .map_or_else(|| format!("{err:#}"), LicenseError::user_message)
}

const fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

#[cfg(test)]
mod tests {
    use super::*;
    use license_core::{CheckFrequency, HandlerKind};

    fn init_args() -> InitArgs {
        InitArgs {
            url: "https://shop.test/".into(),
            store_code: "STORE".into(),
            sku: "SKU".into(),
            license_key: "KEY".into(),
            frequency: CheckFrequency::Hourly,
            handler: HandlerKind::WpRest,
            overwrite: false,
        }
    }

    #[test]
    fn test_init_writes_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileLicenseRepository::new(dir.path().join("license.json"));

        init(&repo, &init_args()).unwrap();

        let license = repo.load().unwrap().unwrap();
        assert_eq!(license.url(), Some("https://shop.test/"));
        assert_eq!(license.frequency(), Some(&CheckFrequency::Hourly));
        assert_eq!(license.handler(), HandlerKind::WpRest);
        assert!(license.is_empty());
    }

    #[test]
    fn test_init_refuses_to_clobber() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileLicenseRepository::new(dir.path().join("license.json"));
        init(&repo, &init_args()).unwrap();

        assert!(init(&repo, &init_args()).is_err());

        let args = InitArgs {
            overwrite: true,
            license_key: "OTHER".into(),
            ..init_args()
        };
        init(&repo, &args).unwrap();
        let license = repo.load().unwrap().unwrap();
        assert_eq!(license.request()["license_key"], "OTHER");
    }

    #[test]
    fn test_status_of_fresh_state_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileLicenseRepository::new(dir.path().join("license.json"));
        init(&repo, &init_args()).unwrap();

        status(&repo).unwrap();
        assert!(!Validator::soft_validate(&repo).unwrap());
    }

    #[test]
    fn test_describe_prefers_user_message() {
        let err = anyhow::Error::from(LicenseError::Unreachable("dns error".into()));
        assert_eq!(describe(&err), LicenseError::Unreachable(String::new()).user_message());

        let err = anyhow::anyhow!("no license stored at license.json");
        assert_eq!(describe(&err), "no license stored at license.json");
    }

    #[test]
    fn test_describe_sees_through_context() {
        let err = Err::<(), _>(LicenseError::Json(serde_json::from_str::<u8>("x").unwrap_err()))
            .context("reading license.json")
            .unwrap_err();
        assert_eq!(describe(&err), "The stored license is corrupted.");
    }

    #[test]
    fn test_show_without_state_fails() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileLicenseRepository::new(dir.path().join("missing.json"));
        assert!(show(&repo).is_err());
    }
}
