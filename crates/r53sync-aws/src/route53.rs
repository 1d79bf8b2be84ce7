//! Route 53 DNS provider
//!
//! Translates a core [`ChangeBatch`] into SDK types and submits it with a
//! single `ChangeResourceRecordSets` call. Record attributes the core keeps
//! only as pass-through JSON are mapped here when Route 53 understands them.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_route53::Client;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::primitives::DateTimeFormat;
use aws_sdk_route53::types as sdk;
use r53sync_core::definition::{DEFAULT_RECORD_TYPE, RecordTemplate};
use r53sync_core::record_set::{ChangeAction, ChangeBatch};
use r53sync_core::traits::{ChangeInfo, DnsProvider};
use r53sync_core::{Error, Result};
use serde_json::{Number, Value};
use tracing::debug;

const PROVIDER: &str = "route53";

/// `DnsProvider` backed by Route 53
pub struct Route53Provider {
    client: Client,
}

impl Route53Provider {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl DnsProvider for Route53Provider {
    async fn change_resource_record_sets(
        &self,
        hosted_zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo> {
        let sdk_batch = to_sdk_batch(batch)?;

        debug!(
            hosted_zone = hosted_zone_id,
            changes = batch.changes.len(),
            "ChangeResourceRecordSets"
        );

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(hosted_zone_id)
            .change_batch(sdk_batch)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, DisplayErrorContext(&e).to_string()))?;

        let info = output
            .change_info()
            .ok_or_else(|| Error::provider(PROVIDER, "response carried no ChangeInfo"))?;

        Ok(from_sdk_change_info(info))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

fn build_error(e: impl std::fmt::Display) -> Error {
    Error::provider(PROVIDER, format!("invalid change batch: {e}"))
}

fn to_sdk_batch(batch: &ChangeBatch) -> Result<sdk::ChangeBatch> {
    let changes = batch
        .changes
        .iter()
        .map(|change| {
            sdk::Change::builder()
                .action(to_sdk_action(change.action))
                .resource_record_set(to_sdk_record_set(&change.resource_record_set)?)
                .build()
                .map_err(build_error)
        })
        .collect::<Result<Vec<_>>>()?;

    sdk::ChangeBatch::builder()
        .set_changes(Some(changes))
        .comment(&batch.comment)
        .build()
        .map_err(build_error)
}

fn to_sdk_action(action: ChangeAction) -> sdk::ChangeAction {
    match action {
        ChangeAction::Upsert => sdk::ChangeAction::Upsert,
    }
}

fn to_sdk_record_set(record: &RecordTemplate) -> Result<sdk::ResourceRecordSet> {
    let records = record
        .resource_records
        .iter()
        .flatten()
        .map(|r| {
            sdk::ResourceRecord::builder()
                .value(&r.value)
                .build()
                .map_err(build_error)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut builder = sdk::ResourceRecordSet::builder()
        .name(&record.name)
        .r#type(sdk::RrType::from(
            record.record_type.as_deref().unwrap_or(DEFAULT_RECORD_TYPE),
        ))
        .set_ttl(record.ttl.as_ref().map(|ttl| to_ttl(record, ttl)).transpose()?)
        .set_resource_records(Some(records));

    for (key, value) in &record.extra {
        builder = match key.as_str() {
            "SetIdentifier" => builder.set_identifier(expect_str(record, key, value)?),
            "HealthCheckId" => builder.health_check_id(expect_str(record, key, value)?),
            "Failover" => builder.failover(sdk::ResourceRecordSetFailover::from(expect_str(
                record, key, value,
            )?)),
            "Region" => builder.region(sdk::ResourceRecordSetRegion::from(expect_str(
                record, key, value,
            )?)),
            "GeoLocation" => builder.geo_location(to_geo_location(record, value)?),
            "Weight" => {
                let weight = value
                    .as_i64()
                    .ok_or_else(|| mistyped(record, key, "an integer"))?;
                builder.weight(weight)
            }
            "MultiValueAnswer" => {
                let multi = value
                    .as_bool()
                    .ok_or_else(|| mistyped(record, key, "a boolean"))?;
                builder.multi_value_answer(multi)
            }
            // Unmapped attributes are refused, never dropped
            _ => {
                return Err(Error::validation(format!(
                    "Record {} attribute {key} cannot be submitted to Route 53 \
                     alongside discovered ResourceRecords",
                    record.name
                )));
            }
        };
    }

    builder.build().map_err(build_error)
}

/// Route 53 takes whole seconds; integral floats such as `60.0` are accepted
fn to_ttl(record: &RecordTemplate, ttl: &Number) -> Result<i64> {
    ttl.as_i64()
        .or_else(|| {
            ttl.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        })
        .ok_or_else(|| mistyped(record, "TTL", "a whole number of seconds"))
}

fn to_geo_location(record: &RecordTemplate, value: &Value) -> Result<sdk::GeoLocation> {
    let geo = value
        .as_object()
        .ok_or_else(|| mistyped(record, "GeoLocation", "an object"))?;

    let mut builder = sdk::GeoLocation::builder();
    for (key, value) in geo {
        let code = value
            .as_str()
            .ok_or_else(|| mistyped(record, &format!("GeoLocation {key}"), "a string"))?;
        builder = match key.as_str() {
            "ContinentCode" => builder.continent_code(code),
            "CountryCode" => builder.country_code(code),
            "SubdivisionCode" => builder.subdivision_code(code),
            _ => return Err(mistyped(record, &format!("GeoLocation {key}"), "a known code field")),
        };
    }
    Ok(builder.build())
}

fn expect_str<'a>(record: &RecordTemplate, key: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| mistyped(record, key, "a string"))
}

fn mistyped(record: &RecordTemplate, key: &str, kind: &str) -> Error {
    Error::validation(format!("Record {} {key} must be {kind}", record.name))
}

fn from_sdk_change_info(info: &sdk::ChangeInfo) -> ChangeInfo {
    ChangeInfo {
        id: info.id().to_string(),
        status: info.status().as_str().to_string(),
        submitted_at: info.submitted_at().fmt(DateTimeFormat::DateTime).ok(),
        comment: info.comment().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use r53sync_core::record_set::{build, to_change};
    use serde_json::json;

    fn batch_of(template: RecordTemplate, ips: &[&str]) -> ChangeBatch {
        let ips: Vec<String> = ips.iter().map(|s| s.to_string()).collect();
        ChangeBatch {
            changes: vec![to_change(build(&template, &ips))],
            comment: "r53sync test".to_string(),
        }
    }

    #[test]
    fn converts_upsert_with_records() {
        let batch = batch_of(
            RecordTemplate::new("launch.example.com").with_ttl(60),
            &["192.1.2.3", "192.1.2.4"],
        );

        let sdk_batch = to_sdk_batch(&batch).unwrap();
        assert_eq!(sdk_batch.comment(), Some("r53sync test"));
        assert_eq!(sdk_batch.changes().len(), 1);

        let change = &sdk_batch.changes()[0];
        assert_eq!(change.action(), &sdk::ChangeAction::Upsert);

        let record_set = change.resource_record_set().unwrap();
        assert_eq!(record_set.name(), "launch.example.com");
        assert_eq!(record_set.r#type(), &sdk::RrType::A);
        assert_eq!(record_set.ttl(), Some(60));
        let values: Vec<&str> = record_set.resource_records().iter().map(|r| r.value()).collect();
        assert_eq!(values, vec!["192.1.2.3", "192.1.2.4"]);
    }

    #[test]
    fn maps_routing_attributes() {
        let mut template = RecordTemplate::new("app.example.com").with_type("AAAA");
        template.extra.insert("SetIdentifier".into(), json!("primary"));
        template.extra.insert("Weight".into(), json!(10));
        template.extra.insert("Failover".into(), json!("PRIMARY"));
        template.extra.insert("HealthCheckId".into(), json!("hc-1"));

        let sdk_batch = to_sdk_batch(&batch_of(template, &["2001:db8::1"])).unwrap();
        let record_set = sdk_batch.changes()[0].resource_record_set().unwrap();

        assert_eq!(record_set.r#type(), &sdk::RrType::Aaaa);
        assert_eq!(record_set.set_identifier(), Some("primary"));
        assert_eq!(record_set.weight(), Some(10));
        assert_eq!(
            record_set.failover(),
            Some(&sdk::ResourceRecordSetFailover::Primary)
        );
        assert_eq!(record_set.health_check_id(), Some("hc-1"));
    }

    #[test]
    fn maps_latency_and_geo_attributes() {
        let mut template = RecordTemplate::new("app.example.com");
        template.extra.insert("SetIdentifier".into(), json!("west"));
        template.extra.insert("Region".into(), json!("us-west-1"));
        template.extra.insert(
            "GeoLocation".into(),
            json!({ "CountryCode": "US", "SubdivisionCode": "CA" }),
        );

        let sdk_batch = to_sdk_batch(&batch_of(template, &["192.1.2.3"])).unwrap();
        let record_set = sdk_batch.changes()[0].resource_record_set().unwrap();

        assert_eq!(
            record_set.region(),
            Some(&sdk::ResourceRecordSetRegion::UsWest1)
        );
        let geo = record_set.geo_location().unwrap();
        assert_eq!(geo.country_code(), Some("US"));
        assert_eq!(geo.subdivision_code(), Some("CA"));
    }

    #[test]
    fn untranslatable_attribute_fails_instead_of_dropping() {
        let mut template = RecordTemplate::new("app.example.com");
        template.extra.insert(
            "AliasTarget".into(),
            json!({ "HostedZoneId": "Z2", "DNSName": "lb.example.com", "EvaluateTargetHealth": false }),
        );

        let err = to_sdk_batch(&batch_of(template, &["192.1.2.3"])).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("AliasTarget"));
    }

    #[test]
    fn integral_float_ttl_is_accepted() {
        let mut template = RecordTemplate::new("app.example.com");
        template.ttl = Some(Number::from_f64(60.0).unwrap());

        let sdk_batch = to_sdk_batch(&batch_of(template, &["192.1.2.3"])).unwrap();
        let record_set = sdk_batch.changes()[0].resource_record_set().unwrap();
        assert_eq!(record_set.ttl(), Some(60));
    }

    #[test]
    fn fractional_ttl_is_rejected() {
        let mut template = RecordTemplate::new("app.example.com");
        template.ttl = Some(Number::from_f64(0.5).unwrap());

        let err = to_sdk_batch(&batch_of(template, &["192.1.2.3"])).unwrap_err();
        assert!(err.to_string().contains("TTL"));
    }

    #[test]
    fn mistyped_attribute_is_rejected() {
        let mut template = RecordTemplate::new("app.example.com");
        template.extra.insert("Weight".into(), json!("heavy"));

        let err = to_sdk_batch(&batch_of(template, &["192.1.2.3"])).unwrap_err();
        assert!(err.to_string().contains("Weight"));
    }
}
