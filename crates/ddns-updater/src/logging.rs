//! Logging setup
//!
//! Console output always; with a monthly log file unless quiet.

use anyhow::{Context, Result};
use chrono::Datelike;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Logging options taken from the command line
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    pub level: LevelFilter,
    pub quiet: bool,
    pub log_dir: PathBuf,
}

impl LoggingOptions {
    /// Effective level: quiet caps output at warnings
    pub fn effective_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::WARN.min(self.level)
        } else {
            self.level
        }
    }
}

/// Parse a level name accepted by `--log-level`
pub fn parse_level(name: &str) -> Result<LevelFilter> {
    match name.to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        _ => anyhow::bail!(
            "Log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            name
        ),
    }
}

/// Log file for the month containing `date`
pub fn monthly_log_path(log_dir: &Path, date: impl Datelike) -> PathBuf {
    log_dir.join(format!(
        "ddns-updater-{:04}{:02}.log",
        date.year(),
        date.month()
    ))
}

/// Install the global subscriber
///
/// Returns the log file path when a file layer was installed.
pub fn init(options: &LoggingOptions) -> Result<Option<PathBuf>> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, log_path) = if options.quiet {
        (None, None)
    } else {
        let path = monthly_log_path(&options.log_dir, chrono::Local::now());
        let file = open_log_file(&path)?;
        let layer = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file));
        (Some(layer), Some(path))
    };

    tracing_subscriber::registry()
        .with(options.effective_level())
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to set tracing subscriber")?;

    Ok(log_path)
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create log directory {}", dir.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Cannot open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_monthly_log_path() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let path = monthly_log_path(Path::new("logs"), date);
        assert_eq!(path, PathBuf::from("logs/ddns-updater-202403.log"));
    }

    #[test]
    fn test_same_month_shares_file() {
        let first = NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
        let next = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let dir = Path::new("logs");

        assert_eq!(monthly_log_path(dir, first), monthly_log_path(dir, last));
        assert_ne!(monthly_log_path(dir, last), monthly_log_path(dir, next));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level("WARN").unwrap(), LevelFilter::WARN);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_quiet_caps_level_at_warn() {
        let options = LoggingOptions {
            level: LevelFilter::DEBUG,
            quiet: true,
            log_dir: PathBuf::from("logs"),
        };
        assert_eq!(options.effective_level(), LevelFilter::WARN);

        let options = LoggingOptions {
            level: LevelFilter::ERROR,
            ..options
        };
        assert_eq!(options.effective_level(), LevelFilter::ERROR);
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = monthly_log_path(&dir.path().join("nested"), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());

        open_log_file(&path).unwrap();
        assert!(path.exists());

        // Reopening appends rather than failing
        open_log_file(&path).unwrap();
    }
}
