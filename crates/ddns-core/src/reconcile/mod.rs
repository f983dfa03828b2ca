//! Record reconciler
//!
//! Given a zone, a fully-qualified name and the desired IPv4 address, the
//! reconciler reads the zone's record sets and writes only when the recorded
//! address differs.
//!
//! ## Decision table
//!
//! ```text
//! A record named fqdn?   first value        action          outcome
//! ─────────────────────  ─────────────────  ──────────────  ──────────────
//! no                     -                  none            RecordNotFound
//! yes                    (no values)        none            RecordNotFound
//! yes                    == desired         none            AlreadyCorrect
//! yes                    != desired         one UPSERT      Updated / Rejected
//! ```
//!
//! Values are compared as strings, without normalizing the stored value.
//! Missing records are never created unless the reconciler is built with
//! [`MissingRecordPolicy::Create`].

use crate::error::Result;
use crate::traits::{DnsProvider, RecordSet, RecordType, UpsertStatus, ZoneId};
use std::net::Ipv4Addr;
use tracing::{debug, info, warn};

/// TTL given to records created under [`MissingRecordPolicy::Create`] (in seconds)
pub const DEFAULT_RECORD_TTL: i64 = 300;

/// What to do when no A record exists for a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingRecordPolicy {
    /// Report [`ReconciliationOutcome::RecordNotFound`] and write nothing
    #[default]
    Skip,
    /// Upsert a new single-value A record
    Create,
}

/// Result of reconciling one name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// No A record with values exists for the name; nothing was written
    RecordNotFound,
    /// The record already holds the desired address; nothing was written
    AlreadyCorrect {
        /// The recorded value
        current: String,
    },
    /// One upsert replaced the first value and the provider accepted it
    Updated {
        /// The value before the change
        previous: String,
        /// Provider change id, if any
        change_id: Option<String>,
    },
    /// A missing record was created (only under [`MissingRecordPolicy::Create`])
    Created {
        /// Provider change id, if any
        change_id: Option<String>,
    },
    /// The upsert was submitted but not accepted
    Rejected {
        /// Provider-supplied reason
        reason: String,
    },
}

impl ReconciliationOutcome {
    /// Short label for summaries
    pub fn label(&self) -> &'static str {
        match self {
            ReconciliationOutcome::RecordNotFound => "record-not-found",
            ReconciliationOutcome::AlreadyCorrect { .. } => "already-correct",
            ReconciliationOutcome::Updated { .. } => "updated",
            ReconciliationOutcome::Created { .. } => "created",
            ReconciliationOutcome::Rejected { .. } => "rejected",
        }
    }
}

/// What the reconciler intends to do for a name, before any write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// No A record with that exact name
    Missing,
    /// The A record exists but carries no values
    NoValues,
    /// The first value already equals the desired address
    AlreadyCorrect {
        /// The recorded value
        current: String,
    },
    /// The first value differs; `record` is the full replacement to submit
    Replace {
        /// The recorded value
        previous: String,
        /// The record set with its first value replaced
        record: RecordSet,
    },
}

/// Decide what to do for `fqdn` given a zone's record sets
///
/// Only the first record set whose name equals `fqdn` exactly and whose type
/// is A is considered. Every other record set is ignored.
pub fn plan(records: &[RecordSet], fqdn: &str, desired_ip: Ipv4Addr) -> Plan {
    let Some(record) = records
        .iter()
        .find(|record| record.name == fqdn && record.record_type == RecordType::A)
    else {
        return Plan::Missing;
    };

    let Some(current) = record.first_value() else {
        return Plan::NoValues;
    };

    let desired = desired_ip.to_string();
    if current == desired {
        return Plan::AlreadyCorrect {
            current: current.to_string(),
        };
    }

    let previous = current.to_string();
    let mut replacement = record.clone();
    replacement.values[0] = desired;

    Plan::Replace {
        previous,
        record: replacement,
    }
}

/// Reconciles A records against a [`DnsProvider`]
pub struct Reconciler<'a> {
    provider: &'a dyn DnsProvider,
    missing_record_policy: MissingRecordPolicy,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler that never creates records
    pub fn new(provider: &'a dyn DnsProvider) -> Self {
        Self {
            provider,
            missing_record_policy: MissingRecordPolicy::default(),
        }
    }

    /// Set the policy for names without an A record
    pub fn with_missing_record_policy(mut self, policy: MissingRecordPolicy) -> Self {
        self.missing_record_policy = policy;
        self
    }

    /// Bring the A record for `fqdn` in line with `desired_ip`
    ///
    /// Issues at most one upsert. A failed record listing is returned as an
    /// error; a failed or refused upsert is reported as
    /// [`ReconciliationOutcome::Rejected`].
    pub async fn reconcile(
        &self,
        zone_id: &ZoneId,
        fqdn: &str,
        desired_ip: Ipv4Addr,
    ) -> Result<ReconciliationOutcome> {
        let records = self.provider.list_records(zone_id).await?;
        debug!("Zone {} has {} record set(s)", zone_id, records.len());

        match plan(&records, fqdn, desired_ip) {
            Plan::Missing if self.missing_record_policy == MissingRecordPolicy::Create => {
                let record = RecordSet::a(fqdn, desired_ip.to_string(), Some(DEFAULT_RECORD_TTL));
                match self.submit(zone_id, &record).await {
                    Ok(change_id) => {
                        info!("Created record {} -> {}", fqdn, desired_ip);
                        Ok(ReconciliationOutcome::Created { change_id })
                    }
                    Err(reason) => {
                        warn!("Creating record {} was rejected: {}", fqdn, reason);
                        Ok(ReconciliationOutcome::Rejected { reason })
                    }
                }
            }
            Plan::Missing => {
                info!("Subdomain {} record not found", fqdn);
                Ok(ReconciliationOutcome::RecordNotFound)
            }
            Plan::NoValues => {
                info!("Subdomain {} has an A record without values, leaving it alone", fqdn);
                Ok(ReconciliationOutcome::RecordNotFound)
            }
            Plan::AlreadyCorrect { current } => {
                info!("Subdomain {} found, but the IP address was already {}", fqdn, current);
                Ok(ReconciliationOutcome::AlreadyCorrect { current })
            }
            Plan::Replace { previous, record } => match self.submit(zone_id, &record).await {
                Ok(change_id) => {
                    info!(
                        "Change request submitted for {}: {} -> {} (change: {})",
                        fqdn,
                        previous,
                        desired_ip,
                        change_id.as_deref().unwrap_or("none")
                    );
                    Ok(ReconciliationOutcome::Updated { previous, change_id })
                }
                Err(reason) => {
                    warn!("Change request for {} -> {} was rejected: {}", fqdn, desired_ip, reason);
                    Ok(ReconciliationOutcome::Rejected { reason })
                }
            },
        }
    }

    /// Submit one upsert, folding transport failures into a rejection reason
    async fn submit(&self, zone_id: &ZoneId, record: &RecordSet) -> std::result::Result<Option<String>, String> {
        match self.provider.upsert_record(zone_id, record).await {
            Ok(UpsertStatus::Accepted { change_id }) => Ok(change_id),
            Ok(UpsertStatus::Rejected { reason }) => Err(reason),
            Err(e) => Err(format!("{} upsert failed: {}", self.provider.provider_name(), e)),
        }
    }
}
