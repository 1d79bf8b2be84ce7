//! Architectural Contract Test: Discovery Scope
//!
//! Every inventory query carries its region explicitly and resources are
//! resolved concurrently under a fixed cap.
//!
//! Constraints verified:
//! - Group region beats resource region beats document region
//! - Filters reach the inventory unmodified
//! - Concurrent resources never exceed max_concurrency
//! - Result order follows declaration order, not completion order
//!
//! If this test fails, queries can leak into the wrong region or the
//! batch order can depend on timing.

mod common;

use common::*;
use r53sync_core::definition::Filter;
use r53sync_core::traits::Instance;
use r53sync_core::EngineConfig;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn region_is_passed_per_query() {
    let inventory = MockInventory::new()
        .with_instances("a", vec![Instance::public("192.1.2.1")])
        .with_instances("b", vec![Instance::public("192.1.2.2")])
        .with_instances("c", vec![Instance::public("192.1.2.3")]);
    let provider = MockDnsProvider::new();

    let doc = definition(json!({
        "HostedZone": "Z1",
        "Region": "us-west-1",
        "Resources": {
            "doc-region": resource("a", "a.example.com"),
            "resource-region": {
                "Region": "eu-west-1",
                "Instances": [{ "Filters": [{ "Name": "tag:Name", "Values": ["b"] }] }],
                "ResourceRecordSet": { "Name": "b.example.com" }
            },
            "group-region": {
                "Region": "eu-west-1",
                "Instances": [{
                    "Filters": [{ "Name": "tag:Name", "Values": ["c"] }],
                    "Region": "ap-southeast-2"
                }],
                "ResourceRecordSet": { "Name": "c.example.com" }
            }
        }
    }));

    let (engine, _rx) = engine(&inventory, &provider, EngineConfig::default());
    engine.reconcile(&doc).await.expect("reconcile succeeds");

    let mut regions: Vec<(String, Option<String>)> = inventory
        .queries()
        .into_iter()
        .map(|q| (q.filters[0].values[0].clone(), q.region))
        .collect();
    regions.sort();

    assert_eq!(
        regions,
        vec![
            ("a".to_string(), Some("us-west-1".to_string())),
            ("b".to_string(), Some("eu-west-1".to_string())),
            ("c".to_string(), Some("ap-southeast-2".to_string())),
        ]
    );
}

#[tokio::test]
async fn no_region_means_backend_default() {
    let inventory = MockInventory::new().with_instances("web", vec![Instance::public("192.1.2.3")]);
    let provider = MockDnsProvider::new();

    let doc = definition(json!({
        "HostedZone": "Z1",
        "Resources": { "web": resource("web", "web.example.com") }
    }));

    let (engine, _rx) = engine(&inventory, &provider, EngineConfig::default());
    engine.reconcile(&doc).await.expect("reconcile succeeds");

    assert_eq!(inventory.queries()[0].region, None);
}

#[tokio::test]
async fn filters_reach_inventory_unmodified() {
    let inventory = MockInventory::new().with_instances("web", vec![Instance::public("192.1.2.3")]);
    let provider = MockDnsProvider::new();

    let doc = definition(json!({
        "HostedZone": "Z1",
        "Resources": {
            "web": {
                "Instances": [{
                    "Filters": [
                        { "Name": "tag:Name", "Values": ["web"] },
                        { "Name": "instance-state-name", "Values": ["running", "pending"] }
                    ]
                }],
                "ResourceRecordSet": { "Name": "web.example.com" }
            }
        }
    }));

    let (engine, _rx) = engine(&inventory, &provider, EngineConfig::default());
    engine.reconcile(&doc).await.expect("reconcile succeeds");

    assert_eq!(
        inventory.queries()[0].filters,
        vec![
            Filter::new("tag:Name", ["web"]),
            Filter::new("instance-state-name", ["running", "pending"]),
        ]
    );
}

#[tokio::test]
async fn concurrency_is_capped() {
    let mut inventory = MockInventory::new();
    let mut resources = serde_json::Map::new();
    for i in 0..6 {
        let tag = format!("r{i}");
        inventory = inventory
            .with_instances(&tag, vec![Instance::public(format!("192.1.2.{i}"))])
            .delayed(&tag, Duration::from_millis(20));
        resources.insert(tag.clone(), resource(&tag, &format!("{tag}.example.com")));
    }
    let provider = MockDnsProvider::new();

    let doc = definition(json!({ "HostedZone": "Z1", "Resources": resources }));

    let config = EngineConfig::default().with_max_concurrency(2);
    let (engine, _rx) = engine(&inventory, &provider, config);
    engine.reconcile(&doc).await.expect("reconcile succeeds");

    assert_eq!(inventory.query_count(), 6);
    assert!(
        inventory.max_in_flight() <= 2,
        "observed {} concurrent queries",
        inventory.max_in_flight()
    );
    assert_eq!(provider.submissions()[0].1.changes.len(), 6);
}

#[tokio::test]
async fn batch_order_ignores_completion_order() {
    let inventory = MockInventory::new()
        .with_instances("slow", vec![Instance::public("192.1.2.1")])
        .delayed("slow", Duration::from_millis(50))
        .with_instances("fast", vec![Instance::public("192.1.2.2")]);
    let provider = MockDnsProvider::new();

    let doc = definition(json!({
        "HostedZone": "Z1",
        "Resources": {
            "slow": resource("slow", "slow.example.com"),
            "fast": resource("fast", "fast.example.com")
        }
    }));

    let (engine, _rx) = engine(&inventory, &provider, EngineConfig::default());
    engine.reconcile(&doc).await.expect("reconcile succeeds");

    let names: Vec<String> = provider.submissions()[0]
        .1
        .changes
        .iter()
        .map(|c| c.resource_record_set.name.clone())
        .collect();
    assert_eq!(names, vec!["slow.example.com", "fast.example.com"]);
}
