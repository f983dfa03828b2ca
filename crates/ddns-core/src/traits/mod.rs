//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Look up the external IP address
//! - [`DnsProvider`]: List zones and records, submit upserts

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{
    DnsProvider, HostedZone, RecordGeoLocation, RecordRouting, RecordSet, RecordType, UpsertStatus,
    ZoneId,
};
