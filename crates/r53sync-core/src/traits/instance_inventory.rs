// # Instance Inventory Trait
//
// Defines the interface for querying a compute inventory for running
// instances matching a set of filters.
//
// ## Implementations
//
// - EC2 `DescribeInstances`: `r53sync-aws` crate
//
// ## Usage
//
// ```rust,ignore
// use r53sync_core::InstanceInventory;
// use r53sync_core::definition::Filter;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let inventory = /* InstanceInventory implementation */;
//
//     let reservations = inventory
//         .describe_instances(Some("us-west-1"), &[Filter::new("tag:Name", ["web"])])
//         .await?;
//
//     Ok(())
// }
// ```

use crate::definition::Filter;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An instance as reported by the inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Instance {
    /// Backend identifier, for logging only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
}

impl Instance {
    /// Instance with only a public address
    pub fn public(ip: impl Into<String>) -> Self {
        Self {
            public_ip_address: Some(ip.into()),
            ..Self::default()
        }
    }

    /// Instance with only a private address
    pub fn private(ip: impl Into<String>) -> Self {
        Self {
            private_ip_address: Some(ip.into()),
            ..Self::default()
        }
    }

    /// Instance with both addresses
    pub fn dual(public: impl Into<String>, private: impl Into<String>) -> Self {
        Self {
            public_ip_address: Some(public.into()),
            private_ip_address: Some(private.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.instance_id = Some(id.into());
        self
    }
}

/// A group of instances returned together by the inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Reservation {
    #[serde(default)]
    pub instances: Vec<Instance>,
}

impl Reservation {
    pub fn new(instances: Vec<Instance>) -> Self {
        Self { instances }
    }
}

/// Trait for compute-inventory backends
///
/// # Region Handling
///
/// The region is an explicit argument of every call. Implementations must
/// never keep an "active region" in shared mutable configuration: concurrent
/// queries for different regions run side by side and must not observe each
/// other. Build (or cache) one client per region instead.
///
/// # Failure Semantics
///
/// - Return the backend error as `Error::Provider`; the engine wraps it with
///   the resource name and aborts the whole reconciliation.
/// - No retries. Re-running the reconciliation is the retry.
#[async_trait]
pub trait InstanceInventory: Send + Sync {
    /// Query instances matching `filters` in `region`
    ///
    /// # Parameters
    ///
    /// - `region`: Region to scope the query to; `None` uses the backend default
    /// - `filters`: Filters passed through opaquely; empty means unfiltered
    ///
    /// # Returns
    ///
    /// Reservations in backend order (not guaranteed stable between calls)
    async fn describe_instances(
        &self,
        region: Option<&str>,
        filters: &[Filter],
    ) -> Result<Vec<Reservation>, crate::Error>;

    /// Get the backend name (for logging/debugging)
    fn backend_name(&self) -> &'static str;
}
