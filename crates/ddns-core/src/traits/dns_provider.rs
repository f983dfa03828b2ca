// # DNS Provider Trait
//
// Defines the capability interface to a hosted-DNS management API.
//
// ## Implementations
//
// - AWS Route 53: `ddns-provider-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let zones = provider.list_zones("example.com.").await?;
//     let records = provider.list_records(&zones[0].id).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-specific hosted zone identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    /// Wrap a provider zone identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A zone as returned by the provider's zone listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// Provider identifier
    pub id: ZoneId,
    /// Zone name exactly as the provider reports it (e.g. "example.com.")
    pub name: String,
}

/// DNS record type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
    /// Canonical name record
    Cname,
    /// Any other type, carried verbatim
    Other(String),
}

impl RecordType {
    /// Parse a provider type string ("A", "AAAA", ...)
    pub fn parse(value: &str) -> Self {
        match value {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "CNAME" => RecordType::Cname,
            other => RecordType::Other(other.to_string()),
        }
    }

    /// The wire name of this type
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Cname => "CNAME",
            RecordType::Other(other) => other,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource record set as the provider stores it
///
/// The provider owns these; the updater only ever reads the first value and,
/// when it differs, submits a full replacement of the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Fully-qualified record name, exactly as the provider reports it
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Time-to-live in seconds
    pub ttl: Option<i64>,
    /// Record values in provider order
    pub values: Vec<String>,
    /// Routing attributes, written back unchanged on upsert
    pub routing: RecordRouting,
}

impl RecordSet {
    /// Create an A record set with a single value
    pub fn a(name: impl Into<String>, value: impl Into<String>, ttl: Option<i64>) -> Self {
        Self {
            name: name.into(),
            record_type: RecordType::A,
            ttl,
            values: vec![value.into()],
            routing: RecordRouting::default(),
        }
    }

    /// The first value entry, if any
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// Attributes that tell apart record sets sharing a name and type
///
/// Weighted, latency, failover, geolocation and multivalue record sets are
/// only identified by these together with name and type. An upsert that
/// drops them describes a different record set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordRouting {
    pub set_identifier: Option<String>,
    pub weight: Option<i64>,
    /// Latency-based routing region (e.g. "eu-west-1")
    pub region: Option<String>,
    /// "PRIMARY" or "SECONDARY"
    pub failover: Option<String>,
    pub geo_location: Option<RecordGeoLocation>,
    pub multi_value_answer: Option<bool>,
    pub health_check_id: Option<String>,
}

impl RecordRouting {
    /// True for a plain (simple routing) record set
    pub fn is_simple(&self) -> bool {
        self == &Self::default()
    }
}

/// Geolocation routing key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordGeoLocation {
    pub continent_code: Option<String>,
    pub country_code: Option<String>,
    pub subdivision_code: Option<String>,
}

/// Result of submitting an upsert change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertStatus {
    /// The provider accepted the change
    Accepted {
        /// Provider change id, when one was issued
        change_id: Option<String>,
    },
    /// The provider answered with a non-success status
    Rejected {
        /// Provider-supplied reason
        reason: String,
    },
}

/// Trait for DNS provider implementations
///
/// This is an opaque capability interface over the provider's management API:
/// list zones, list record sets, submit one upsert.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off
/// - ❌ Cache zones or records beyond a single call
/// - ❌ Decide whether an update is needed (owned by [`Reconciler`](crate::Reconciler))
/// - ❌ Create records on their own initiative
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List zones matching a name filter
    ///
    /// The filter is a hint; callers do their own exact-name matching on the
    /// result, which may contain zones with other names.
    async fn list_zones(&self, name_filter: &str) -> Result<Vec<HostedZone>, crate::Error>;

    /// List every record set in a zone, in provider order
    ///
    /// Implementations must follow pagination to the end.
    async fn list_records(&self, zone_id: &ZoneId) -> Result<Vec<RecordSet>, crate::Error>;

    /// Submit a single upsert change for `record`
    ///
    /// # Returns
    ///
    /// - `Ok(UpsertStatus::Accepted)`: The provider accepted the change
    /// - `Ok(UpsertStatus::Rejected)`: The provider answered with an error status
    /// - `Err(Error)`: No answer was obtained (transport failure)
    async fn upsert_record(
        &self,
        zone_id: &ZoneId,
        record: &RecordSet,
    ) -> Result<UpsertStatus, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
