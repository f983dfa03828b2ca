//! Per-run report

use crate::reconcile::ReconciliationOutcome;
use crate::zone::ResolvedZone;
use chrono::{DateTime, Utc};
use std::fmt;
use std::net::Ipv4Addr;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every configured subdomain was reconciled
    Completed,
    /// The external IP lookup failed; no DNS work was attempted
    IpUnavailable,
    /// No zone carries the configured hosted zone name
    ZoneNotFound,
    /// A provider call failed and the rest of the run was abandoned
    Failed {
        /// The error that stopped the run
        error: String,
    },
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => f.write_str("completed"),
            RunStatus::IpUnavailable => f.write_str("ip-unavailable"),
            RunStatus::ZoneNotFound => f.write_str("zone-not-found"),
            RunStatus::Failed { error } => write!(f, "failed ({})", error),
        }
    }
}

/// Outcome for one configured subdomain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdomainOutcome {
    /// The fully-qualified name that was reconciled
    pub fqdn: String,
    /// What happened to it
    pub outcome: ReconciliationOutcome,
}

/// Everything one run did, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// The external address, if the lookup succeeded
    pub external_ip: Option<Ipv4Addr>,
    /// The resolved zone, if the lookup found one
    pub zone: Option<ResolvedZone>,
    /// How the run ended
    pub status: RunStatus,
    /// One entry per reconciled subdomain, in configured order
    pub outcomes: Vec<SubdomainOutcome>,
}

impl RunReport {
    pub(crate) fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            external_ip: None,
            zone: None,
            status: RunStatus::Completed,
            outcomes: Vec::new(),
        }
    }

    /// Whether the run hit a problem a scheduler should hear about
    ///
    /// True for a failed run, a missing zone, or any rejected write. An
    /// unavailable IP and records that do not exist are not failures.
    pub fn has_failures(&self) -> bool {
        matches!(self.status, RunStatus::Failed { .. } | RunStatus::ZoneNotFound)
            || self
                .outcomes
                .iter()
                .any(|o| matches!(o.outcome, ReconciliationOutcome::Rejected { .. }))
    }

    /// Number of outcomes with the given label (see [`ReconciliationOutcome::label`])
    pub fn count(&self, label: &str) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.label() == label).count()
    }

    /// One-line summary for logs and the console
    pub fn summary(&self) -> String {
        format!(
            "status={} ip={} updated={} created={} already-correct={} record-not-found={} rejected={}",
            self.status,
            self.external_ip
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            self.count("updated"),
            self.count("created"),
            self.count("already-correct"),
            self.count("record-not-found"),
            self.count("rejected"),
        )
    }
}
