// # IP Source Trait
//
// Defines the interface for discovering this host's public IPv4 address.
//
// ## Implementations
//
// - HTTP-based ("what is my IP" service): `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let ip = source.current().await?;
//     println!("external address: {ip}");
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for external IP lookups
///
/// # Trust Level: Semi-Trusted
///
/// IP sources may perform network I/O against their lookup endpoint, but:
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (the next scheduled run is the retry)
/// - ❌ Cache an address between calls
/// - ❌ Spawn tasks or polling loops
/// - ❌ Touch DNS state
///
/// An error from [`IpSource::current`] is not fatal: the
/// [`UpdateEngine`](crate::UpdateEngine) logs it and skips the run.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Look up the current external IPv4 address
    ///
    /// Exactly one lookup attempt is made per call.
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The address as seen by the lookup service
    /// - `Err(Error)`: Transport failure, timeout, non-success status or
    ///   an unparseable response body
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Short description of where addresses come from (for logging)
    fn describe(&self) -> String;
}
