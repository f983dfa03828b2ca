// # ddns-updater - Route 53 Dynamic DNS Updater
//
// This binary is a THIN integration layer:
// - DO NOT add DNS or reconciliation logic here
// - All update logic lives in ddns-core
//
// The binary is responsible for:
// 1. Reading configuration (JSON file, then command-line overrides)
// 2. Initializing logging
// 3. Building the HTTP IP source and the Route 53 provider
// 4. Running the update engine once and reporting the result
//
// It runs one pass and exits; schedule it with cron or a systemd timer.
//
// ## Configuration
//
// `config.json` in the working directory (or `-c FILE`):
//
// ```json
// {
//   "aws_access_key_id": "AKIA...",
//   "aws_secret_access_key": "...",
//   "aws_region": "us-east-1",
//   "aws_hosted_zone": "example.com.",
//   "subdomains": ["home", "vpn"]
// }
// ```
//
// Every value can be overridden on the command line (see `--help`). The
// credential and region flags also read `AWS_ACCESS_KEY_ID`,
// `AWS_SECRET_ACCESS_KEY` and `AWS_REGION`.
//
// ## Example
//
// ```bash
// ddns-updater -c /etc/ddns-updater/config.json --log-dir /var/log/ddns-updater
// ```

mod cli;
mod logging;

use clap::Parser;
use cli::Cli;
use ddns_core::{Settings, UpdateEngine};
use ddns_ip_http::HttpIpSource;
use ddns_provider_route53::Route53Provider;
use logging::LoggingOptions;
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Exit codes for different termination scenarios
///
/// - 0: The run finished (including records that were not found or refused)
/// - 1: Configuration or startup error
/// - 2: `--strict` was given and the run has failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdaterExitCode {
    /// Run finished
    Finished = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Strict mode and the zone was missing, the run failed, or a write was rejected
    RunFailed = 2,
}

impl From<UpdaterExitCode> for ExitCode {
    fn from(code: UpdaterExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Exit code for a finished run
fn exit_code_for(strict: bool, has_failures: bool) -> UpdaterExitCode {
    if strict && has_failures {
        UpdaterExitCode::RunFailed
    } else {
        UpdaterExitCode::Finished
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from file and flags
    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {}", e);
        return UpdaterExitCode::ConfigError.into();
    }

    // Initialize tracing
    let level = match logging::parse_level(&cli.log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };
    let log_options = LoggingOptions {
        level,
        quiet: cli.quiet,
        log_dir: cli.log_dir.clone(),
    };
    let log_path = match logging::init(&log_options) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    info!("Starting ddns-updater");
    if let Some(path) = log_path {
        info!("Logging to {}", path.display());
    }
    info!(
        "Configuration loaded: zone {}, {} subdomain(s)",
        settings.aws_hosted_zone,
        settings.subdomains.len()
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return UpdaterExitCode::ConfigError.into();
        }
    };

    rt.block_on(run_updater(&cli, settings)).into()
}

/// Build the components and run one update pass
async fn run_updater(cli: &Cli, settings: Settings) -> UpdaterExitCode {
    let ip_source = match HttpIpSource::from_settings(&settings) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to set up IP lookup: {}", e);
            return UpdaterExitCode::ConfigError;
        }
    };
    info!("IP source: {}", ip_source.url());

    let provider = match Route53Provider::connect(&settings, cli.dry_run).await {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to set up Route 53 client: {}", e);
            return UpdaterExitCode::ConfigError;
        }
    };
    info!("DNS provider: {:?}", provider);

    let engine = match UpdateEngine::new(Box::new(ip_source), Box::new(provider), &settings) {
        Ok(engine) => engine.with_missing_record_policy(cli.missing_record_policy()),
        Err(e) => {
            error!("Failed to create update engine: {}", e);
            return UpdaterExitCode::ConfigError;
        }
    };

    let report = engine.run().await;
    let summary = report.summary();

    if report.has_failures() {
        warn!("Run finished with failures: {}", summary);
    } else {
        info!("Run finished: {}", summary);
    }
    println!("{}", summary);

    exit_code_for(cli.strict, report.has_failures())
}
