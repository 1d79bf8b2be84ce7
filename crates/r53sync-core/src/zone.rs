//! Zone updater
//!
//! Submits one batched change against a hosted zone after checking the
//! preconditions locally. A failed precondition never reaches the provider.

use crate::error::{Error, Result};
use crate::record_set::{Change, ChangeBatch};
use crate::traits::{ChangeInfo, DnsProvider};
use chrono::SecondsFormat;
use tracing::info;

/// Marker embedded in generated change-batch comments
pub const TOOL_MARKER: &str = "r53sync";

/// Status reported for a batch that was built but not submitted
pub const DRY_RUN_STATUS: &str = "DRY_RUN";

/// Generated comment: tool marker plus the current UTC timestamp
pub fn default_comment() -> String {
    format!(
        "{} change at {}",
        TOOL_MARKER,
        chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Batched submitter for one DNS provider
pub struct ZoneUpdater {
    provider: Box<dyn DnsProvider>,
    dry_run: bool,
}

impl ZoneUpdater {
    /// Create an updater that submits through `provider`
    pub fn new(provider: Box<dyn DnsProvider>) -> Self {
        Self {
            provider,
            dry_run: false,
        }
    }

    /// In dry-run mode batches are checked and logged but never submitted
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Assemble a batch, generating the comment when none is given
    pub fn batch(changes: Vec<Change>, comment: Option<String>) -> ChangeBatch {
        ChangeBatch {
            changes,
            comment: comment.unwrap_or_else(default_comment),
        }
    }

    /// Submit `changes` against `hosted_zone_id`
    pub async fn submit(
        &self,
        hosted_zone_id: &str,
        changes: Vec<Change>,
        comment: Option<String>,
    ) -> Result<ChangeInfo> {
        self.submit_batch(hosted_zone_id, &Self::batch(changes, comment))
            .await
    }

    /// Submit a prepared batch with exactly one provider call
    ///
    /// Provider errors are returned unchanged; nothing is retried.
    pub async fn submit_batch(&self, hosted_zone_id: &str, batch: &ChangeBatch) -> Result<ChangeInfo> {
        if hosted_zone_id.is_empty() {
            return Err(Error::precondition(
                "HostedZoneId required to update a hosted zone",
            ));
        }
        if batch.changes.is_empty() {
            return Err(Error::precondition(
                "Updating a hosted zone requires one or more changes",
            ));
        }

        if self.dry_run {
            info!(
                hosted_zone = hosted_zone_id,
                changes = batch.changes.len(),
                "[DRY-RUN] Would submit change batch: {}",
                serde_json::to_string(batch).unwrap_or_else(|e| format!("<unserializable: {e}>"))
            );
            return Ok(ChangeInfo {
                id: "dry-run".to_string(),
                status: DRY_RUN_STATUS.to_string(),
                submitted_at: Some(chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
                comment: Some(batch.comment.clone()),
            });
        }

        info!(
            provider = self.provider.provider_name(),
            hosted_zone = hosted_zone_id,
            changes = batch.changes.len(),
            "Submitting change batch"
        );

        let change_info = self
            .provider
            .change_resource_record_sets(hosted_zone_id, batch)
            .await?;

        info!(
            change_id = %change_info.id,
            status = %change_info.status,
            "Change batch accepted"
        );

        Ok(change_info)
    }
}
