//! Command-line interface
//!
//! Flags layer on top of the JSON config file: any flag that is given
//! replaces the file's value.

use anyhow::Result;
use clap::Parser;
use ddns_core::{MissingRecordPolicy, Settings};
use std::path::{Path, PathBuf};

/// Config file loaded when `--config` is not given (may be absent)
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Directory for monthly log files
pub const DEFAULT_LOG_DIR: &str = "ddns-updater-logs";

/// Point Route 53 A records at this machine's external IP address
#[derive(Parser)]
#[command(name = "ddns-updater", version, about)]
pub struct Cli {
    /// JSON config file [default: config.json, if present]
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only log warnings and errors, to the console only
    #[arg(short, long)]
    pub quiet: bool,

    /// AWS access key id
    #[arg(long, env = "AWS_ACCESS_KEY_ID", value_name = "ID")]
    pub aws_key_id: Option<String>,

    /// AWS secret access key
    #[arg(
        long,
        env = "AWS_SECRET_ACCESS_KEY",
        value_name = "SECRET",
        hide_env_values = true
    )]
    pub aws_key_secret: Option<String>,

    /// AWS region, e.g. us-east-1
    #[arg(long, env = "AWS_REGION", value_name = "REGION")]
    pub aws_region: Option<String>,

    /// Hosted zone name, matched exactly (e.g. "example.com.")
    #[arg(long, value_name = "ZONE")]
    pub aws_hosted_zone: Option<String>,

    /// Subdomain label to update (repeatable; replaces the config file's list)
    #[arg(short = 's', long = "subdomain", value_name = "LABEL")]
    pub subdomains: Vec<String>,

    /// Look everything up but submit no changes
    #[arg(long)]
    pub dry_run: bool,

    /// Create an A record when a subdomain has none
    #[arg(long)]
    pub create_missing: bool,

    /// Exit with status 2 when the zone is missing, the run fails, or a write is rejected
    #[arg(long)]
    pub strict: bool,

    /// Directory for log files
    #[arg(long, value_name = "DIR", default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,

    /// Log level
    #[arg(
        long,
        env = "DDNS_LOG_LEVEL",
        value_name = "LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: String,
}

impl Cli {
    /// Load the config file and apply flag overrides
    ///
    /// An explicit `--config` must exist; the default `config.json` may be
    /// missing, in which case every setting must come from flags.
    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Settings::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Settings::new(),
        };

        self.apply_overrides(&mut settings);
        Ok(settings)
    }

    /// Replace settings with the values of the flags that were given
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(id) = &self.aws_key_id {
            settings.aws_access_key_id = id.clone();
        }
        if let Some(secret) = &self.aws_key_secret {
            settings.aws_secret_access_key = secret.clone();
        }
        if let Some(region) = &self.aws_region {
            settings.aws_region = region.clone();
        }
        if let Some(zone) = &self.aws_hosted_zone {
            settings.aws_hosted_zone = zone.clone();
        }
        if !self.subdomains.is_empty() {
            settings.subdomains = self.subdomains.clone();
        }
    }

    pub fn missing_record_policy(&self) -> MissingRecordPolicy {
        if self.create_missing {
            MissingRecordPolicy::Create
        } else {
            MissingRecordPolicy::Skip
        }
    }
}
