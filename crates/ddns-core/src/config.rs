//! Configuration types for the DDNS updater
//!
//! [`Settings`] is loaded once per run (JSON file, then command-line
//! overrides) and is immutable afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Default external IP lookup endpoint
pub const DEFAULT_IP_LOOKUP_URL: &str = "https://ipv4.icanhazip.com";

/// Default timeout for outbound HTTP requests (in seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Updater settings
///
/// Field names match the keys of the JSON config file:
///
/// ```json
/// {
///   "aws_access_key_id": "AKIA...",
///   "aws_secret_access_key": "...",
///   "aws_region": "us-east-1",
///   "aws_hosted_zone": "example.com.",
///   "subdomains": ["home", "vpn"]
/// }
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    /// AWS access key id
    #[serde(default)]
    pub aws_access_key_id: String,

    /// AWS secret access key
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub aws_secret_access_key: String,

    /// AWS region code used to sign requests
    #[serde(default)]
    pub aws_region: String,

    /// Hosted zone name, matched exactly against the provider's zone names
    #[serde(default)]
    pub aws_hosted_zone: String,

    /// Subdomain labels to keep pointed at this host, in update order
    #[serde(default)]
    pub subdomains: Vec<String>,

    /// External IP lookup endpoint
    #[serde(default = "default_ip_lookup_url")]
    pub ip_lookup_url: String,

    /// Timeout for outbound HTTP requests (in seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Settings {
    /// Create empty settings with default lookup URL and timeout
    pub fn new() -> Self {
        Self {
            aws_access_key_id: String::new(),
            aws_secret_access_key: String::new(),
            aws_region: String::new(),
            aws_hosted_zone: String::new(),
            subdomains: Vec::new(),
            ip_lookup_url: default_ip_lookup_url(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }

    /// Load settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    /// Parse settings from a JSON document
    pub fn from_json(contents: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Fully-qualified names of all configured subdomains, in order
    pub fn fqdns(&self) -> Vec<String> {
        self.subdomains
            .iter()
            .map(|label| fqdn(label, &self.aws_hosted_zone))
            .collect()
    }

    /// HTTP timeout as a [`Duration`]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Validate the settings
    ///
    /// Credentials, region and hosted zone are required before any network
    /// call. An empty subdomain list is valid (the run is a no-op).
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.aws_access_key_id.trim().is_empty() {
            return Err(crate::Error::config("aws_access_key_id cannot be empty"));
        }
        if self.aws_secret_access_key.trim().is_empty() {
            return Err(crate::Error::config("aws_secret_access_key cannot be empty"));
        }
        if self.aws_region.trim().is_empty() {
            return Err(crate::Error::config("aws_region cannot be empty"));
        }
        if self.aws_hosted_zone.trim().is_empty() {
            return Err(crate::Error::config("aws_hosted_zone cannot be empty"));
        }

        for label in &self.subdomains {
            if label.is_empty() {
                return Err(crate::Error::config("Subdomain labels cannot be empty"));
            }
            if label.chars().any(char::is_whitespace) {
                return Err(crate::Error::config(format!(
                    "Subdomain label contains whitespace: '{}'",
                    label
                )));
            }
        }

        if self.ip_lookup_url.is_empty() {
            return Err(crate::Error::config("ip_lookup_url cannot be empty"));
        }
        if !self.ip_lookup_url.starts_with("https://") && !self.ip_lookup_url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "ip_lookup_url must use HTTP or HTTPS scheme. Got: {}",
                self.ip_lookup_url
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(crate::Error::config("http_timeout_secs must be > 0"));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

// Custom Debug implementation that hides the secret key
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_secret_access_key", &"<REDACTED>")
            .field("aws_region", &self.aws_region)
            .field("aws_hosted_zone", &self.aws_hosted_zone)
            .field("subdomains", &self.subdomains)
            .field("ip_lookup_url", &self.ip_lookup_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// Compose a fully-qualified name from a label and a zone name
///
/// Plain concatenation: a zone configured as "example.com." yields
/// "home.example.com.", one configured as "example.com" yields
/// "home.example.com".
pub fn fqdn(label: &str, zone_name: &str) -> String {
    format!("{}.{}", label, zone_name)
}

fn default_ip_lookup_url() -> String {
    DEFAULT_IP_LOOKUP_URL.to_string()
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
