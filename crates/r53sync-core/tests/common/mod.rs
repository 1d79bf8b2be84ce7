//! Test doubles and common utilities for reconciliation contract tests
//!
//! These doubles count and record every backend call so tests can assert
//! not only on results but on which calls were (or were not) made.

#![allow(dead_code)]

use r53sync_core::definition::{Filter, ResourceDefinition};
use r53sync_core::error::{Error, Result};
use r53sync_core::location::S3Location;
use r53sync_core::record_set::ChangeBatch;
use r53sync_core::traits::{
    ChangeInfo, DnsProvider, Instance, InstanceInventory, ObjectStore, Reservation,
};
use r53sync_core::{EngineConfig, EngineEvent, ReconciliationEngine};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// One recorded inventory query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub region: Option<String>,
    pub filters: Vec<Filter>,
}

/// Inventory keyed by the first value of the first filter
///
/// Unknown keys resolve to no reservations. Keys can be made to fail or to
/// answer after a delay.
#[derive(Clone, Default)]
pub struct MockInventory {
    responses: Arc<Mutex<HashMap<String, Vec<Reservation>>>>,
    failures: Arc<Mutex<HashMap<String, String>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    queries: Arc<Mutex<Vec<Query>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries for `key` with a single reservation of `instances`
    pub fn with_instances(self, key: &str, instances: Vec<Instance>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_string(), vec![Reservation::new(instances)]);
        self
    }

    /// Fail queries for `key` with `message`
    pub fn failing(self, key: &str, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(key.to_string(), message.to_string());
        self
    }

    /// Delay answers for `key`
    pub fn delayed(self, key: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(key.to_string(), delay);
        self
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    /// Highest number of queries observed running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

fn filter_key(filters: &[Filter]) -> String {
    filters
        .first()
        .and_then(|f| f.values.first())
        .cloned()
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl InstanceInventory for MockInventory {
    async fn describe_instances(
        &self,
        region: Option<&str>,
        filters: &[Filter],
    ) -> Result<Vec<Reservation>> {
        self.queries.lock().unwrap().push(Query {
            region: region.map(str::to_string),
            filters: filters.to_vec(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let key = filter_key(filters);
        let delay = self.delays.lock().unwrap().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(message) = self.failures.lock().unwrap().get(&key) {
            return Err(Error::provider("mock-inventory", message.clone()));
        }

        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    fn backend_name(&self) -> &'static str {
        "mock-inventory"
    }
}

/// A DNS provider that records every submitted batch
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    call_count: Arc<AtomicUsize>,
    submissions: Arc<Mutex<Vec<(String, ChangeBatch)>>>,
    failure: Option<String>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that rejects every batch with `message`
    pub fn rejecting(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// `(hosted_zone_id, batch)` for every call, in call order
    pub fn submissions(&self) -> Vec<(String, ChangeBatch)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn change_resource_record_sets(
        &self,
        hosted_zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo> {
        let n = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.submissions
            .lock()
            .unwrap()
            .push((hosted_zone_id.to_string(), batch.clone()));

        if let Some(message) = &self.failure {
            return Err(Error::provider("mock-dns", message.clone()));
        }

        Ok(ChangeInfo {
            id: format!("/change/C{n}"),
            status: "PENDING".to_string(),
            submitted_at: None,
            comment: Some(batch.comment.clone()),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock-dns"
    }
}

/// In-memory object store
#[derive(Clone, Default)]
pub struct MockObjectStore {
    objects: Arc<Mutex<HashMap<(String, String), Vec<u8>>>>,
    put_count: Arc<AtomicUsize>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, location: &S3Location, body: Vec<u8>) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert((location.bucket.clone(), location.key.clone()), body);
        self
    }

    pub fn object(&self, location: &S3Location) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(location.bucket.clone(), location.key.clone()))
            .cloned()
    }

    pub fn put_count(&self) -> usize {
        self.put_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ObjectStore for MockObjectStore {
    async fn get_object(&self, location: &S3Location) -> Result<Vec<u8>> {
        self.object(location)
            .ok_or_else(|| Error::provider("mock-s3", format!("NoSuchKey: {location}")))
    }

    async fn put_object(&self, location: &S3Location, body: Vec<u8>) -> Result<()> {
        self.put_count.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .insert((location.bucket.clone(), location.key.clone()), body);
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "mock-s3"
    }
}

/// Build an engine over clones of the given doubles
pub fn engine(
    inventory: &MockInventory,
    provider: &MockDnsProvider,
    config: EngineConfig,
) -> (ReconciliationEngine, mpsc::Receiver<EngineEvent>) {
    ReconciliationEngine::new(Box::new(inventory.clone()), Box::new(provider.clone()), config)
        .expect("engine construction succeeds")
}

/// Parse a definition from a `serde_json::json!` value
pub fn definition(doc: serde_json::Value) -> ResourceDefinition {
    ResourceDefinition::parse(&serde_json::to_vec(&doc).unwrap()).expect("valid definition")
}

/// Single-group resource matching instances tagged `tag`
pub fn resource(tag: &str, record_name: &str) -> serde_json::Value {
    serde_json::json!({
        "Instances": [
            { "Filters": [{ "Name": "tag:Name", "Values": [tag] }] }
        ],
        "ResourceRecordSet": { "Name": record_name }
    })
}

/// Drain every event currently buffered in `rx`
pub fn drain(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
