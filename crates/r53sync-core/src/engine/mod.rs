//! Reconciliation engine
//!
//! The ReconciliationEngine is responsible for:
//! - Resolving every declared resource to a set of IPs via InstanceInventory
//! - Building one UPSERT change per resource
//! - Submitting all changes as a single batch via ZoneUpdater
//!
//! ## Architecture
//!
//! ```text
//!                      ┌──────────────────────┐
//!                      │  ResourceDefinition  │
//!                      └──────────────────────┘
//!                                 │ fan-out (one task per resource,
//!                                 │  one query per instance group)
//!             ┌───────────────────┼───────────────────┐
//!             ▼                   ▼                   ▼
//!     ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//!     │  discover    │    │  discover    │    │  discover    │
//!     │  (resource)  │    │  (resource)  │    │  (resource)  │
//!     └──────────────┘    └──────────────┘    └──────────────┘
//!             │                   │                   │
//!             └───────────────────┼───────────────────┘
//!                                 ▼ fan-in (join, all-or-nothing)
//!                      ┌──────────────────────┐
//!                      │  build + ChangeBatch │
//!                      └──────────────────────┘
//!                                 │
//!                                 ▼
//!                      ┌──────────────────────┐
//!                      │     ZoneUpdater      │
//!                      └──────────────────────┘
//! ```
//!
//! ## Phases
//!
//! `Loaded -> Discovering -> Building -> Submitting -> Done`, with `Failed`
//! reachable from `Discovering` and `Submitting`. Each transition is logged
//! and emitted as an [`EngineEvent::PhaseChanged`].
//!
//! ## Failure Policy
//!
//! A batch represents one consistent snapshot of desired state. If any
//! resource fails discovery or resolves to zero IPs, nothing is submitted.
//! Discovery already in flight is allowed to finish; the reported error is
//! the first failing resource in declaration order.

use crate::config::EngineConfig;
use crate::definition::{ResourceDefinition, ResourceSpec};
use crate::discovery::discover_ips;
use crate::error::{Error, Result};
use crate::record_set::{ChangeBatch, build, to_change};
use crate::traits::{ChangeInfo, DnsProvider, InstanceInventory};
use crate::zone::ZoneUpdater;
use futures::StreamExt;
use futures::future::join_all;
use futures::stream;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Reconciliation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    Loaded,
    Discovering,
    Building,
    Submitting,
    Done,
    Failed,
}

/// Events emitted by the ReconciliationEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The pass moved to a new phase
    PhaseChanged { phase: ReconcilePhase },

    /// A resource resolved to a non-empty IP list
    ResourceResolved { resource: String, ips: Vec<String> },

    /// A resource failed discovery or resolved to nothing
    ResourceFailed { resource: String, error: String },

    /// The provider accepted the batch
    BatchSubmitted {
        change_count: usize,
        change_id: String,
    },
}

/// Outcome of a successful reconciliation pass
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    /// Zone the batch was submitted against
    pub hosted_zone: String,

    /// The batch as submitted
    pub batch: ChangeBatch,

    /// Provider acknowledgement
    pub change_info: ChangeInfo,
}

/// Core reconciliation engine
///
/// One call to [`ReconciliationEngine::reconcile`] is one declarative pass.
/// The engine keeps no state between passes; drift is corrected only by
/// running it again.
pub struct ReconciliationEngine {
    /// Compute inventory to resolve instance groups against
    inventory: Box<dyn InstanceInventory>,

    /// Batched submitter
    updater: ZoneUpdater,

    /// Maximum number of resources resolved concurrently
    max_concurrency: usize,

    /// Comment override for the change batch
    comment: Option<String>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl ReconciliationEngine {
    /// Create a new reconciliation engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        inventory: Box<dyn InstanceInventory>,
        provider: Box<dyn DnsProvider>,
        config: EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            inventory,
            updater: ZoneUpdater::new(provider).with_dry_run(config.dry_run),
            max_concurrency: config.max_concurrency,
            comment: config.comment,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run one reconciliation pass for `definition`
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileReport)`: The batch was submitted (or logged, in dry-run mode)
    /// - `Err(Error)`: Discovery failed, a resource had no IPs, a precondition
    ///   failed, or the provider rejected the batch
    pub async fn reconcile(&self, definition: &ResourceDefinition) -> Result<ReconcileReport> {
        self.set_phase(ReconcilePhase::Loaded);
        info!(
            hosted_zone = %definition.hosted_zone,
            resources = definition.resources.len(),
            dry_run = self.updater.is_dry_run(),
            "Starting reconciliation"
        );

        match self.run(definition).await {
            Ok(report) => {
                self.set_phase(ReconcilePhase::Done);
                Ok(report)
            }
            Err(e) => {
                error!("Reconciliation failed: {}", e);
                self.set_phase(ReconcilePhase::Failed);
                Err(e)
            }
        }
    }

    async fn run(&self, definition: &ResourceDefinition) -> Result<ReconcileReport> {
        self.set_phase(ReconcilePhase::Discovering);
        let resolved = self.resolve_all(definition).await?;

        self.set_phase(ReconcilePhase::Building);
        let changes = definition
            .resources
            .iter()
            .zip(resolved)
            .map(|((_, spec), ips)| to_change(build(&spec.resource_record_set, &ips)))
            .collect();
        let batch = ZoneUpdater::batch(changes, self.comment.clone());

        self.set_phase(ReconcilePhase::Submitting);
        let change_info = self
            .updater
            .submit_batch(&definition.hosted_zone, &batch)
            .await?;

        self.emit_event(EngineEvent::BatchSubmitted {
            change_count: batch.changes.len(),
            change_id: change_info.id.clone(),
        });

        Ok(ReconcileReport {
            hosted_zone: definition.hosted_zone.clone(),
            batch,
            change_info,
        })
    }

    /// Resolve every resource, at most `max_concurrency` at a time
    ///
    /// Results come back in declaration order whatever the completion order.
    async fn resolve_all(&self, definition: &ResourceDefinition) -> Result<Vec<Vec<String>>> {
        let results: Vec<Result<Vec<String>>> = stream::iter(definition.resources.iter())
            .map(|(name, spec)| self.resolve_resource(definition, name, spec))
            .buffered(self.max_concurrency)
            .collect()
            .await;

        results.into_iter().collect()
    }

    /// Resolve all instance groups of one resource concurrently
    async fn resolve_resource(
        &self,
        definition: &ResourceDefinition,
        name: &str,
        spec: &ResourceSpec,
    ) -> Result<Vec<String>> {
        let queries = spec.instances.iter().map(|group| {
            let region = definition.region_for(spec, group);
            debug!(
                resource = name,
                region = region.unwrap_or("<default>"),
                private_ip = group.private_ip,
                "Querying instance group"
            );
            discover_ips(
                &*self.inventory,
                &group.filters,
                group.private_ip,
                region,
            )
        });

        let outcome = join_all(queries)
            .await
            .into_iter()
            .collect::<Result<Vec<Vec<String>>>>()
            .map_err(|e| Error::discovery(name, e))
            .and_then(|ip_sets| {
                let ips: Vec<String> = ip_sets.into_iter().flatten().collect();
                if ips.is_empty() {
                    Err(Error::empty_result(name))
                } else {
                    Ok(ips)
                }
            });

        match &outcome {
            Ok(ips) => {
                info!(resource = name, ips = ?ips, "Resource resolved");
                self.emit_event(EngineEvent::ResourceResolved {
                    resource: name.to_string(),
                    ips: ips.clone(),
                });
            }
            Err(e) => {
                warn!(resource = name, "Resource failed: {}", e);
                self.emit_event(EngineEvent::ResourceFailed {
                    resource: name.to_string(),
                    error: e.to_string(),
                });
            }
        }

        outcome
    }

    fn set_phase(&self, phase: ReconcilePhase) {
        debug!(?phase, "Reconciliation phase");
        self.emit_event(EngineEvent::PhaseChanged { phase });
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Reconciliation never blocks on a slow consumer; a closed channel just means nobody listens
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
