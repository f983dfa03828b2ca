// # Route 53 DNS Provider
//
// This crate provides an AWS Route 53 implementation of `DnsProvider`.
//
// ## Behavior
//
// - ✅ One API call per operation (plus pagination for record listing)
// - ✅ Full error propagation (the engine decides what a failure means)
// - ✅ Operation timeout configured from settings
// - ✅ Error classification by AWS error code (auth, throttling, not found)
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry logic (SDK retries are disabled; the next scheduled run retries)
// - ❌ NO caching
//
// ## Security Requirements
//
// - The secret access key NEVER appears in logs or `Debug` output
//
// ## API Reference
//
// - ListHostedZonesByName: GET `/2013-04-01/hostedzonesbyname?dnsname=...`
// - ListResourceRecordSets: GET `/2013-04-01/hostedzone/:id/rrset`
// - ChangeResourceRecordSets: POST `/2013-04-01/hostedzone/:id/rrset/`

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_route53::Client;
use aws_sdk_route53::config::{Credentials, Region};
use aws_sdk_route53::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, GeoLocation, ResourceRecord, ResourceRecordSet,
    ResourceRecordSetFailover, ResourceRecordSetRegion, RrType,
};
use ddns_core::traits::{
    DnsProvider, HostedZone, RecordGeoLocation, RecordRouting, RecordSet, RecordType,
    UpsertStatus, ZoneId,
};
use ddns_core::{Error, Result, Settings};

const PROVIDER_NAME: &str = "route53";

/// Comment attached to every change batch
const CHANGE_COMMENT: &str = "ddns-updater";

/// Route 53 DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all list requests (zone lookup, record lookup)
/// - Log the intended change batch
/// - **NOT** submit it
pub struct Route53Provider {
    /// SDK client (holds the credentials)
    client: Client,

    /// Region used to sign requests
    region: String,

    /// Access key id, kept for diagnostics only
    access_key_id: String,

    /// Dry-run mode: if true, list but never submit changes
    dry_run: bool,
}

// Custom Debug implementation; the secret lives only inside the SDK client
impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("aws_secret_access_key", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Route53Provider {
    /// Build a provider from updater settings
    ///
    /// Uses the static credentials and region from `settings`. No request is
    /// made here.
    ///
    /// # Parameters
    ///
    /// - `settings`: Updater settings (validated here)
    /// - `dry_run`: If true, perform list requests but skip change submissions
    pub async fn connect(settings: &Settings, dry_run: bool) -> Result<Self> {
        Self::connect_to(settings, dry_run, None).await
    }

    /// Like [`Route53Provider::connect`], optionally against another endpoint
    async fn connect_to(
        settings: &Settings,
        dry_run: bool,
        endpoint_url: Option<&str>,
    ) -> Result<Self> {
        settings.validate()?;

        let credentials = Credentials::new(
            settings.aws_access_key_id.clone(),
            settings.aws_secret_access_key.clone(),
            None,
            None,
            "ddns-updater-settings",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.aws_region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(settings.http_timeout())
                    .build(),
            );
        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let sdk_config = loader.load().await;

        if dry_run {
            tracing::warn!("Route 53 provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            client: Client::new(&sdk_config),
            region: settings.aws_region.clone(),
            access_key_id: settings.aws_access_key_id.clone(),
            dry_run,
        })
    }

    /// Whether change submissions are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[async_trait]
impl DnsProvider for Route53Provider {
    async fn list_zones(&self, name_filter: &str) -> Result<Vec<HostedZone>> {
        tracing::debug!("Listing hosted zones by name from {}", name_filter);

        let output = self
            .client
            .list_hosted_zones_by_name()
            .dns_name(name_filter)
            .send()
            .await
            .map_err(|e| classify_sdk_error("ListHostedZonesByName", e))?;

        Ok(output
            .hosted_zones()
            .iter()
            .map(|zone| HostedZone {
                id: ZoneId::new(zone.id()),
                name: zone.name().to_string(),
            })
            .collect())
    }

    async fn list_records(&self, zone_id: &ZoneId) -> Result<Vec<RecordSet>> {
        let mut records = Vec::new();
        let mut start_name: Option<String> = None;
        let mut start_type: Option<RrType> = None;
        let mut start_identifier: Option<String> = None;

        loop {
            let output = self
                .client
                .list_resource_record_sets()
                .hosted_zone_id(zone_id.as_str())
                .set_start_record_name(start_name.take())
                .set_start_record_type(start_type.take())
                .set_start_record_identifier(start_identifier.take())
                .send()
                .await
                .map_err(|e| classify_sdk_error("ListResourceRecordSets", e))?;

            records.extend(output.resource_record_sets().iter().map(record_from_sdk));

            if !output.is_truncated() {
                break;
            }

            start_name = output.next_record_name().map(str::to_string);
            start_type = output.next_record_type().cloned();
            start_identifier = output.next_record_identifier().map(str::to_string);

            if start_name.is_none() {
                break;
            }
            tracing::debug!("Record listing for {} truncated, fetching next page", zone_id);
        }

        Ok(records)
    }

    async fn upsert_record(&self, zone_id: &ZoneId, record: &RecordSet) -> Result<UpsertStatus> {
        let change_batch = build_change_batch(record)?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would submit UPSERT to zone {}: {}",
                zone_id,
                serde_json::json!({
                    "name": record.name,
                    "type": record.record_type.as_str(),
                    "ttl": record.ttl,
                    "values": record.values,
                    "set_identifier": record.routing.set_identifier,
                })
            );
            return Ok(UpsertStatus::Accepted { change_id: None });
        }

        let result = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id.as_str())
            .change_batch(change_batch)
            .send()
            .await;

        match result {
            Ok(output) => {
                let change_id = output.change_info().map(|info| info.id().to_string());
                tracing::debug!("Route 53 accepted change {:?}", change_id);
                Ok(UpsertStatus::Accepted { change_id })
            }
            Err(SdkError::ServiceError(service)) => {
                let err = service.err();
                Ok(UpsertStatus::Rejected {
                    reason: format!(
                        "{}: {}",
                        err.code().unwrap_or("Unknown"),
                        err.message().unwrap_or("no message")
                    ),
                })
            }
            Err(e) => Err(classify_sdk_error("ChangeResourceRecordSets", e)),
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Convert an SDK record set into the provider-neutral model
fn record_from_sdk(record_set: &ResourceRecordSet) -> RecordSet {
    RecordSet {
        name: record_set.name().to_string(),
        record_type: RecordType::parse(record_set.r#type().as_str()),
        ttl: record_set.ttl(),
        values: record_set
            .resource_records()
            .iter()
            .map(|r| r.value().to_string())
            .collect(),
        routing: routing_from_sdk(record_set),
    }
}

fn routing_from_sdk(record_set: &ResourceRecordSet) -> RecordRouting {
    RecordRouting {
        set_identifier: record_set.set_identifier().map(str::to_string),
        weight: record_set.weight(),
        region: record_set.region().map(|r| r.as_str().to_string()),
        failover: record_set.failover().map(|f| f.as_str().to_string()),
        geo_location: record_set.geo_location().map(|geo| RecordGeoLocation {
            continent_code: geo.continent_code().map(str::to_string),
            country_code: geo.country_code().map(str::to_string),
            subdivision_code: geo.subdivision_code().map(str::to_string),
        }),
        multi_value_answer: record_set.multi_value_answer(),
        health_check_id: record_set.health_check_id().map(str::to_string),
    }
}

/// Build a change batch holding a single UPSERT of `record`
fn build_change_batch(record: &RecordSet) -> Result<ChangeBatch> {
    let change = Change::builder()
        .action(ChangeAction::Upsert)
        .resource_record_set(build_record_set(record)?)
        .build()
        .map_err(build_error)?;

    ChangeBatch::builder()
        .comment(CHANGE_COMMENT)
        .changes(change)
        .build()
        .map_err(build_error)
}

/// Convert a record set back into the SDK shape, routing attributes included
fn build_record_set(record: &RecordSet) -> Result<ResourceRecordSet> {
    let routing = &record.routing;
    let resource_records = record
        .values
        .iter()
        .map(|value| ResourceRecord::builder().value(value.as_str()).build())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(build_error)?;

    ResourceRecordSet::builder()
        .name(record.name.as_str())
        .r#type(RrType::from(record.record_type.as_str()))
        .set_ttl(record.ttl)
        .set_resource_records(Some(resource_records))
        .set_set_identifier(routing.set_identifier.clone())
        .set_weight(routing.weight)
        .set_region(routing.region.as_deref().map(ResourceRecordSetRegion::from))
        .set_failover(routing.failover.as_deref().map(ResourceRecordSetFailover::from))
        .set_geo_location(routing.geo_location.as_ref().map(|geo| {
            GeoLocation::builder()
                .set_continent_code(geo.continent_code.clone())
                .set_country_code(geo.country_code.clone())
                .set_subdivision_code(geo.subdivision_code.clone())
                .build()
        }))
        .set_multi_value_answer(routing.multi_value_answer)
        .set_health_check_id(routing.health_check_id.clone())
        .build()
        .map_err(build_error)
}

fn build_error(e: BuildError) -> Error {
    Error::invalid_input(format!("Cannot build Route 53 change: {}", e))
}

/// Map an SDK failure to the core error type
fn classify_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(service) => {
            let service_err = service.err();
            classify_code(operation, service_err.code(), service_err.message())
        }
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => Error::http(format!(
            "{} failed: {}",
            operation,
            DisplayErrorContext(&err)
        )),
        other => Error::provider(
            PROVIDER_NAME,
            format!("{} failed: {}", operation, DisplayErrorContext(&other)),
        ),
    }
}

/// Map an AWS error code to the core error type
fn classify_code(operation: &str, code: Option<&str>, message: Option<&str>) -> Error {
    let code = code.unwrap_or("Unknown");
    let detail = format!("{} failed: {}: {}", operation, code, message.unwrap_or("no message"));

    match code {
        "InvalidClientTokenId"
        | "SignatureDoesNotMatch"
        | "IncompleteSignature"
        | "ExpiredToken"
        | "AccessDenied"
        | "AccessDeniedException"
        | "UnrecognizedClientException" => Error::auth(detail),
        "Throttling" | "ThrottlingException" | "PriorRequestNotComplete" => {
            Error::rate_limited(detail)
        }
        "NoSuchHostedZone" => Error::not_found(detail),
        _ => Error::provider(PROVIDER_NAME, detail),
    }
}
