//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that record every call so tests
//! can assert exactly which provider operations a run issued.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    DnsProvider, HostedZone, IpSource, RecordRouting, RecordSet, RecordType, UpsertStatus, ZoneId,
};
use ddns_core::Settings;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource that always returns the same address
pub struct StaticIpSource {
    ip: Ipv4Addr,
    call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new StaticIpSource that shares its counter with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            ip: other.ip,
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ip)
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// An IpSource whose lookup always fails (e.g. the HTTP call timed out)
pub struct FailingIpSource;

#[async_trait::async_trait]
impl IpSource for FailingIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        Err(Error::http("operation timed out"))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

/// How the mock provider answers upserts
#[derive(Debug, Clone)]
pub enum UpsertBehavior {
    /// Accept and apply the change
    Accept,
    /// Answer with a rejection
    Reject(String),
    /// Fail without an answer
    Fail(String),
}

#[derive(Debug)]
struct ProviderState {
    zones: Vec<HostedZone>,
    records: Vec<RecordSet>,
    upsert_behavior: UpsertBehavior,
    fail_zone_listing: bool,
    /// Fail record listing once this many listings have succeeded
    fail_record_listing_after: Option<usize>,
    list_zones_filters: Vec<String>,
    list_records_zone_ids: Vec<ZoneId>,
    upserts: Vec<(ZoneId, RecordSet)>,
}

/// A mock DnsProvider holding one in-memory zone listing and record table
///
/// Accepted upserts are applied to the record table, so a second
/// reconciliation sees the first one's write.
pub struct MockDnsProvider {
    state: Arc<Mutex<ProviderState>>,
    change_counter: Arc<AtomicUsize>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProviderState {
                zones: Vec::new(),
                records: Vec::new(),
                upsert_behavior: UpsertBehavior::Accept,
                fail_zone_listing: false,
                fail_record_listing_after: None,
                list_zones_filters: Vec::new(),
                list_records_zone_ids: Vec::new(),
                upserts: Vec::new(),
            })),
            change_counter: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a new MockDnsProvider that shares state with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            state: Arc::clone(&other.state),
            change_counter: Arc::clone(&other.change_counter),
        }
    }

    pub fn with_zone(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().zones.push(HostedZone {
            id: ZoneId::new(id),
            name: name.to_string(),
        });
        self
    }

    pub fn with_record(self, record: RecordSet) -> Self {
        self.state.lock().unwrap().records.push(record);
        self
    }

    pub fn with_upsert_behavior(self, behavior: UpsertBehavior) -> Self {
        self.state.lock().unwrap().upsert_behavior = behavior;
        self
    }

    pub fn failing_zone_listing(self) -> Self {
        self.state.lock().unwrap().fail_zone_listing = true;
        self
    }

    pub fn failing_record_listing_after(self, successful_listings: usize) -> Self {
        self.state.lock().unwrap().fail_record_listing_after = Some(successful_listings);
        self
    }

    /// Get the number of times list_zones() was called
    pub fn list_zones_count(&self) -> usize {
        self.state.lock().unwrap().list_zones_filters.len()
    }

    /// Zone ids passed to list_records(), in call order
    pub fn list_records_zone_ids(&self) -> Vec<ZoneId> {
        self.state.lock().unwrap().list_records_zone_ids.clone()
    }

    /// Get the number of times upsert_record() was called
    pub fn upsert_count(&self) -> usize {
        self.state.lock().unwrap().upserts.len()
    }

    /// Every upsert submitted, in call order
    pub fn upserts(&self) -> Vec<(ZoneId, RecordSet)> {
        self.state.lock().unwrap().upserts.clone()
    }

    /// Current record table
    pub fn records(&self) -> Vec<RecordSet> {
        self.state.lock().unwrap().records.clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_zones(&self, name_filter: &str) -> Result<Vec<HostedZone>> {
        let mut state = self.state.lock().unwrap();
        state.list_zones_filters.push(name_filter.to_string());

        if state.fail_zone_listing {
            return Err(Error::auth("The security token included in the request is invalid"));
        }
        Ok(state.zones.clone())
    }

    async fn list_records(&self, zone_id: &ZoneId) -> Result<Vec<RecordSet>> {
        let mut state = self.state.lock().unwrap();

        if let Some(limit) = state.fail_record_listing_after
            && state.list_records_zone_ids.len() >= limit
        {
            state.list_records_zone_ids.push(zone_id.clone());
            return Err(Error::provider("mock", "Throttling: Rate exceeded"));
        }

        state.list_records_zone_ids.push(zone_id.clone());
        Ok(state.records.clone())
    }

    async fn upsert_record(&self, zone_id: &ZoneId, record: &RecordSet) -> Result<UpsertStatus> {
        let mut state = self.state.lock().unwrap();
        state.upserts.push((zone_id.clone(), record.clone()));

        match state.upsert_behavior.clone() {
            UpsertBehavior::Accept => {
                match state
                    .records
                    .iter_mut()
                    .find(|r| r.name == record.name && r.record_type == record.record_type)
                {
                    Some(existing) => *existing = record.clone(),
                    None => state.records.push(record.clone()),
                }
                let n = self.change_counter.fetch_add(1, Ordering::SeqCst);
                Ok(UpsertStatus::Accepted {
                    change_id: Some(format!("/change/C{}", n)),
                })
            }
            UpsertBehavior::Reject(reason) => Ok(UpsertStatus::Rejected { reason }),
            UpsertBehavior::Fail(message) => Err(Error::http(message)),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to build an A record set
pub fn a_record(name: &str, value: &str) -> RecordSet {
    RecordSet::a(name, value, Some(300))
}

/// Helper to build a record set of any type
pub fn record(name: &str, record_type: &str, values: &[&str]) -> RecordSet {
    RecordSet {
        name: name.to_string(),
        record_type: RecordType::parse(record_type),
        ttl: Some(300),
        values: values.iter().map(|v| v.to_string()).collect(),
        routing: RecordRouting::default(),
    }
}

/// Helper to create valid Settings for testing
pub fn settings(zone: &str, subdomains: &[&str]) -> Settings {
    Settings {
        aws_access_key_id: "AKIATEST".to_string(),
        aws_secret_access_key: "test-secret".to_string(),
        aws_region: "us-east-1".to_string(),
        aws_hosted_zone: zone.to_string(),
        subdomains: subdomains.iter().map(|s| s.to_string()).collect(),
        ..Settings::new()
    }
}

pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}
