//! Configuration types for r53sync
//!
//! The resource definition describes *what* to publish; this module holds
//! the knobs for *how* one reconciliation pass runs.

use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of resources resolved concurrently
    ///
    /// Instance groups within one resource are always queried together.
    /// Keep this modest to stay under the inventory backend's rate limits.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped (with a warning log); the
    /// reconciliation itself never waits on a slow event consumer.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Comment attached to the change batch; generated when unset
    #[serde(default)]
    pub comment: Option<String>,

    /// Build and log the change batch without submitting it
    #[serde(default)]
    pub dry_run: bool,
}

impl EngineConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            event_channel_capacity: default_event_channel_capacity(),
            comment: None,
            dry_run: false,
        }
    }

    /// Set the concurrency limit
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Override the change-batch comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_concurrency == 0 {
            return Err(crate::Error::config("max_concurrency must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event_channel_capacity must be > 0"));
        }
        if self.comment.as_deref().is_some_and(str::is_empty) {
            return Err(crate::Error::config("comment cannot be empty when set"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_max_concurrency() -> usize {
    8
}

fn default_event_channel_capacity() -> usize {
    100
}
