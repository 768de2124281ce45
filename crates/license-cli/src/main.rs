//! licensectl
//!
//! Command-line host for the license keys client. Keeps the license state in
//! a JSON file and drives activation, validation and deactivation against
//! the licensing service.
//!
//! Configuration comes from flags, then `LICENSE_*` environment variables
//! (a `.env` file is loaded first).

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use license_core::{CheckFrequency, HandlerKind, Interval};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "licensectl")]
#[command(about = "Activate, validate and deactivate license keys", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// License state file
    #[arg(long, global = true, env = "LICENSE_STATE_FILE", default_value = "license.json")]
    state_file: PathBuf,

    /// Log every transport event
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh license state file
    Init(InitArgs),

    /// Activate the license key with the service
    Activate,

    /// Validate the license, calling the service when due
    Validate(ValidateArgs),

    /// Deactivate the license key and erase local state
    Deactivate,

    /// Validity from cached state only (no network)
    Status,

    /// Print the stored license state
    Show,
}

#[derive(Args)]
struct InitArgs {
    /// Base URL of the licensing service
    #[arg(long, env = "LICENSE_URL")]
    url: String,

    /// Store code
    #[arg(long, env = "LICENSE_STORE_CODE")]
    store_code: String,

    /// Product SKU
    #[arg(long, env = "LICENSE_SKU")]
    sku: String,

    /// License key
    #[arg(long, env = "LICENSE_KEY")]
    license_key: String,

    /// daily, hourly, weekly or an interval such as "+3 days"
    #[arg(long, default_value = "daily")]
    frequency: CheckFrequency,

    /// default or wp_rest
    #[arg(long, default_value = "default")]
    handler: HandlerKind,

    /// Replace an existing state file
    #[arg(long)]
    overwrite: bool,
}

#[derive(Args)]
struct ValidateArgs {
    /// Call the service even if the cached data is still valid
    #[arg(long)]
    force: bool,

    /// Report valid while the service is unreachable and retries remain
    #[arg(long)]
    allow_retry: bool,

    /// Unreachable outcomes tolerated
    #[arg(long, default_value_t = 2)]
    retry_attempts: u32,

    /// Delay before retrying an unreachable service
    #[arg(long, default_value = "+1 hour")]
    retry_interval: Interval,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment before clap reads env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let repo = license_core::FileLicenseRepository::new(&cli.state_file);

    let result = match cli.command {
        Commands::Init(args) => commands::init(&repo, &args),
        Commands::Activate => commands::activate(&repo, cli.verbose).await,
        Commands::Validate(args) => commands::validate(&repo, &args, cli.verbose).await,
        Commands::Deactivate => commands::deactivate(&repo, cli.verbose).await,
        Commands::Status => commands::status(&repo),
        Commands::Show => commands::show(&repo),
    };

    result.unwrap_or_else(|err| {
        tracing::debug!(error = ?err, "Command failed");
        eprintln!("error: {}", commands::describe(&err));
        ExitCode::FAILURE
    })
}
