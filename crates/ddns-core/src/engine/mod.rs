//! Update engine
//!
//! The UpdateEngine runs one pass of the updater:
//! - Look up the external IP via IpSource
//! - Resolve the hosted zone id via DnsProvider
//! - Reconcile each configured subdomain, in order
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  IpSource   │────▶│ UpdateEngine │────▶│  RunReport   │
//! └─────────────┘     └──────────────┘     └──────────────┘
//!                            │
//!              ┌─────────────┴─────────────┐
//!              ▼                           ▼
//!     ┌────────────────┐          ┌────────────────┐
//!     │ zone directory │          │   Reconciler   │
//!     │ (once per run) │          │ (per subdomain)│
//!     └────────────────┘          └────────────────┘
//!              │                           │
//!              └─────────────┬─────────────┘
//!                            ▼
//!                    ┌──────────────┐
//!                    │ DnsProvider  │
//!                    └──────────────┘
//! ```
//!
//! ## Failure Handling
//!
//! 1. IP lookup fails: logged as a warning, run ends with no DNS calls
//! 2. Zone or record listing fails: logged as an error, rest of the run abandoned
//! 3. An upsert is refused: recorded as `Rejected`, remaining subdomains continue
//!
//! [`UpdateEngine::run`] never returns an error: every failure ends up in the
//! [`RunReport`].

mod report;

pub use report::{RunReport, RunStatus, SubdomainOutcome};

use crate::config::Settings;
use crate::error::Result;
use crate::reconcile::{MissingRecordPolicy, Reconciler};
use crate::traits::{DnsProvider, IpSource};
use crate::zone::find_zone_id;
use chrono::{DateTime, Utc};
use std::net::Ipv4Addr;
use tracing::{Instrument, error, info, info_span, warn};

/// Single-pass DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`UpdateEngine::new()`]
/// 2. Call [`UpdateEngine::run()`] once per scheduled invocation
/// 3. Inspect the returned [`RunReport`]
///
/// ## Threading
///
/// A run is strictly sequential: one IP lookup, one zone lookup, then one
/// reconciliation per subdomain in configured order. Nothing is cached
/// between runs.
pub struct UpdateEngine {
    /// IP source for the external address
    ip_source: Box<dyn IpSource>,

    /// DNS provider holding the zone
    provider: Box<dyn DnsProvider>,

    /// Hosted zone name, matched exactly
    hosted_zone: String,

    /// Fully-qualified subdomain names, in update order
    fqdns: Vec<String>,

    /// Policy for subdomains without an A record
    missing_record_policy: MissingRecordPolicy,
}

impl UpdateEngine {
    /// Create a new update engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `settings`: Updater settings (validated here, before any network call)
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        settings: &Settings,
    ) -> Result<Self> {
        settings.validate()?;

        Ok(Self {
            ip_source,
            provider,
            hosted_zone: settings.aws_hosted_zone.clone(),
            fqdns: settings.fqdns(),
            missing_record_policy: MissingRecordPolicy::default(),
        })
    }

    /// Set the policy for subdomains without an A record
    pub fn with_missing_record_policy(mut self, policy: MissingRecordPolicy) -> Self {
        self.missing_record_policy = policy;
        self
    }

    /// Run one update pass
    ///
    /// Every log line emitted during the run carries the run's start time.
    pub async fn run(&self) -> RunReport {
        let started_at = Utc::now();
        let span = info_span!("run", runtime = %started_at.format("%Y-%m-%dT%H:%M:%SZ"));

        self.run_internal(started_at).instrument(span).await
    }

    async fn run_internal(&self, started_at: DateTime<Utc>) -> RunReport {
        let mut report = RunReport::new(started_at);
        info!("Starting update of {} subdomain(s) in {}", self.fqdns.len(), self.hosted_zone);

        info!("Getting external IP address from {}", self.ip_source.describe());
        match self.ip_source.current().await {
            Ok(ip) => {
                info!("Got external IP address {}", ip);
                report.external_ip = Some(ip);

                // Error boundary: nothing below may end the process
                if let Err(e) = self.update_zone(ip, &mut report).await {
                    error!("Update run failed: {}", e);
                    report.status = RunStatus::Failed { error: e.to_string() };
                }
            }
            Err(e) => {
                warn!("Could not get external IP address: {}", e);
                report.status = RunStatus::IpUnavailable;
            }
        }

        info!("Finished: {}", report.summary());
        report
    }

    async fn update_zone(&self, ip: Ipv4Addr, report: &mut RunReport) -> Result<()> {
        let Some(zone) = find_zone_id(self.provider.as_ref(), &self.hosted_zone).await? else {
            error!(
                "Hosted zone {} not found in {} (names are matched exactly, including any trailing dot)",
                self.hosted_zone,
                self.provider.provider_name()
            );
            report.status = RunStatus::ZoneNotFound;
            return Ok(());
        };
        info!("Found hosted zone {} with id {}", zone.name, zone.id);
        report.zone = Some(zone.clone());

        let reconciler =
            Reconciler::new(self.provider.as_ref()).with_missing_record_policy(self.missing_record_policy);

        for fqdn in &self.fqdns {
            let outcome = reconciler.reconcile(&zone.id, fqdn, ip).await?;
            report.outcomes.push(SubdomainOutcome {
                fqdn: fqdn.clone(),
                outcome,
            });
        }

        Ok(())
    }
}
