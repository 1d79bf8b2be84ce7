// # DNS Provider Trait
//
// Defines the interface for submitting a batch of record-set changes to a
// hosted zone.
//
// ## Implementations
//
// - Route 53 `ChangeResourceRecordSets`: `r53sync-aws` crate
//
// ## Usage
//
// ```rust,ignore
// use r53sync_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let info = provider.change_resource_record_sets("Z148QEXAMPLE8V", &batch).await?;
//     println!("{} is {}", info.id, info.status);
//
//     Ok(())
// }
// ```

use crate::record_set::ChangeBatch;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider acknowledgement of a submitted change batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeInfo {
    /// Provider-assigned change identifier
    pub id: String,

    /// Provider status, e.g. `PENDING` or `INSYNC`
    pub status: String,

    /// Submission time as reported by the provider (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Trait for DNS provider implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// - Exactly one provider call per invocation of
///   [`DnsProvider::change_resource_record_sets`].
/// - The batch is applied atomically by the provider or not at all.
/// - No retry or backoff: errors go back to the caller unchanged as
///   `Error::Provider`. Every change is an UPSERT, so re-running is safe.
/// - No precondition checks; those belong to `ZoneUpdater`, which never
///   calls the provider with an empty batch or zone id.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Submit `batch` against `hosted_zone_id`
    ///
    /// # Returns
    ///
    /// - `Ok(ChangeInfo)`: The provider accepted the batch
    /// - `Err(Error)`: The provider rejected it or could not be reached
    async fn change_resource_record_sets(
        &self,
        hosted_zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
