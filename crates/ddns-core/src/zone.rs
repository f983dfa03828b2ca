//! Zone directory
//!
//! Resolves a hosted zone name to the provider identifier needed for record
//! operations. Names are compared byte-for-byte: "example.com" does not match
//! a provider zone named "example.com.".

use crate::error::Result;
use crate::traits::{DnsProvider, HostedZone, ZoneId};
use tracing::debug;

/// A zone name paired with its provider identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedZone {
    /// Zone name as configured
    pub name: String,
    /// Provider identifier
    pub id: ZoneId,
}

/// Look up the identifier of the zone named exactly `zone_name`
///
/// # Returns
///
/// - `Ok(Some(ResolvedZone))`: The first listed zone whose name equals `zone_name`
/// - `Ok(None)`: No listed zone has exactly that name
/// - `Err(Error)`: The listing itself failed (authentication, network)
pub async fn find_zone_id(provider: &dyn DnsProvider, zone_name: &str) -> Result<Option<ResolvedZone>> {
    let zones = provider.list_zones(zone_name).await?;
    debug!("{} listed {} zone(s) for filter {}", provider.provider_name(), zones.len(), zone_name);

    Ok(select_zone(&zones, zone_name).map(|zone| ResolvedZone {
        name: zone_name.to_string(),
        id: zone.id.clone(),
    }))
}

fn select_zone<'a>(zones: &'a [HostedZone], zone_name: &str) -> Option<&'a HostedZone> {
    zones.iter().find(|zone| zone.name == zone_name)
}
