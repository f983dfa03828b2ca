// # HTTP IP Source
//
// This crate provides the external IP lookup for the DDNS updater.
//
// ## Architecture
//
// Issues one GET to a "what is my IP" service (default: icanhazip.com) and
// treats the trimmed response body as the IPv4 address. There is no polling,
// caching or retry: the updater is run by a scheduler, and the next scheduled
// run is the retry.

use ddns_core::traits::IpSource;
use ddns_core::{Error, Result, Settings};

use std::net::Ipv4Addr;
use std::time::Duration;

/// HTTP-based IP source
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL returning the caller's IPv4 address as plain text
    /// - `timeout`: Deadline for the whole request
    ///
    /// Fails if the HTTP client cannot be built with that deadline.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create from updater settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.ip_lookup_url.clone(), settings.http_timeout())
    }

    /// The lookup URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch current IP from HTTP service
    async fn fetch_ip(&self) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "{} answered with HTTP {}",
                self.url,
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        parse_ipv4(&ip_text)
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        let ip = self.fetch_ip().await?;
        tracing::debug!("{} reported {}", self.url, ip);
        Ok(ip)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Parse a lookup response body into an IPv4 address
fn parse_ipv4(body: &str) -> Result<Ipv4Addr> {
    let ip_text = body.trim();

    if ip_text.is_empty() {
        return Err(Error::ip_source("Empty response body"));
    }

    ip_text
        .parse()
        .map_err(|_| Error::ip_source(format!("Not an IPv4 address: {:?}", truncate(ip_text, 64))))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
