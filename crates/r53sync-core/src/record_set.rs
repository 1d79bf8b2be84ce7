//! Record-set builder
//!
//! Turns a record template plus a list of discovered IPs into the UPSERT
//! change submitted to the DNS provider. Pure functions; nothing here fails.

use crate::definition::{DEFAULT_RECORD_TYPE, RecordTemplate, ResourceRecord};
use serde::{Deserialize, Serialize};

/// Change action. Only create-or-replace is ever issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Upsert,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Upsert => "UPSERT",
        }
    }
}

/// One change inside a [`ChangeBatch`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    #[serde(rename = "Action")]
    pub action: ChangeAction,

    #[serde(rename = "ResourceRecordSet")]
    pub resource_record_set: RecordTemplate,
}

/// The atomic unit submitted to the DNS provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeBatch {
    #[serde(rename = "Changes")]
    pub changes: Vec<Change>,

    #[serde(rename = "Comment")]
    pub comment: String,
}

/// Fill `template` with `ips`
///
/// `Type` defaults to `A`. `ResourceRecords` is replaced by exactly one
/// record per IP, in order; anything the template carried there is dropped.
/// An empty `ips` yields an empty record list; rejecting that is the
/// engine's job.
pub fn build(template: &RecordTemplate, ips: &[String]) -> RecordTemplate {
    let mut record_set = template.clone();
    if record_set.record_type.is_none() {
        record_set.record_type = Some(DEFAULT_RECORD_TYPE.to_string());
    }
    record_set.resource_records = Some(
        ips.iter()
            .map(|ip| ResourceRecord { value: ip.clone() })
            .collect(),
    );
    record_set
}

/// Wrap a record set as an UPSERT change
pub fn to_change(record_set: RecordTemplate) -> Change {
    Change {
        action: ChangeAction::Upsert,
        resource_record_set: record_set,
    }
}
