// # ddns-core
//
// Core library for the Route 53 dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the provider-independent half of the updater:
// - **IpSource**: Trait for looking up the external IPv4 address
// - **DnsProvider**: Trait over a hosted-DNS API (list zones, list records, upsert)
// - **zone**: Resolves a hosted zone name to its provider id
// - **Reconciler**: Decides whether an A record needs a write, and issues it
// - **UpdateEngine**: Runs IP lookup → zone lookup → reconcile, once per invocation
//
// ## Design Principles
//
// 1. **Separation of Concerns**: No network code here; providers and IP sources live in their own crates
// 2. **Stateless**: Nothing persists between runs; the DNS provider holds all state
// 3. **Minimal Writes**: A record is written only when its value differs
// 4. **Library-First**: The binary is a thin layer over this crate

pub mod traits;
pub mod engine;
pub mod reconcile;
pub mod zone;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, IpSource};
pub use engine::{RunReport, RunStatus, SubdomainOutcome, UpdateEngine};
pub use reconcile::{MissingRecordPolicy, ReconciliationOutcome, Reconciler};
pub use zone::{ResolvedZone, find_zone_id};
pub use config::Settings;
pub use error::{Error, Result};
