// # r53sync-core
//
// Core library for reconciling DNS record sets with the addresses of
// running compute instances.
//
// ## Architecture Overview
//
// - **ResourceDefinition**: Declarative mapping of record names to instance filters
// - **InstanceInventory**: Trait for querying running instances by filter and region
// - **DnsProvider**: Trait for submitting a batch of record-set changes
// - **ObjectStore**: Trait for fetching/storing a definition at a remote location
// - **ReconciliationEngine**: Discover → build → submit, once per invocation
// - **ZoneUpdater**: Precondition checks and the single batched submission
// - **policy_document**: Least-privilege IAM policy for one definition
//
// ## Design Principles
//
// 1. **Declarative**: The definition is the whole desired state; no local state
// 2. **All-or-nothing**: One failed resource means no batch is submitted
// 3. **Idempotent**: Every change is an UPSERT, so re-running is always safe
// 4. **Explicit region**: Region is a per-call argument, never shared config
// 5. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod definition;
pub mod location;
pub mod discovery;
pub mod record_set;
pub mod zone;
pub mod engine;
pub mod loader;
pub mod policy;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, InstanceInventory, ObjectStore};
pub use definition::ResourceDefinition;
pub use location::S3Location;
pub use engine::{EngineEvent, ReconcilePhase, ReconcileReport, ReconciliationEngine};
pub use zone::ZoneUpdater;
pub use loader::{DefinitionSource, load_definition, upload_definition};
pub use policy::{PolicyDocument, policy_document};
pub use config::EngineConfig;
pub use error::{Error, Result};
