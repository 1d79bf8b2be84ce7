//! Remote-location pointer ("s3location")
//!
//! A small JSON document, `{"Bucket": "...", "Key": "..."}`, naming the object
//! that holds the resource definition.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Bucket and key of a remotely stored resource definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
}

impl S3Location {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse a pointer document; `origin` labels every error
    pub fn parse(data: &[u8], origin: &str) -> Result<Self> {
        let doc: Value =
            serde_json::from_slice(data).map_err(|e| Error::parse(origin, e.to_string()))?;

        let bucket = required_string(&doc, "Bucket", origin)?;
        let key = required_string(&doc, "Key", origin)?;

        Ok(Self { bucket, key })
    }

    /// Read a pointer document from a local file
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        Self::parse(&data, &path.display().to_string())
    }
}

impl fmt::Display for S3Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

fn required_string(doc: &Value, field: &str, origin: &str) -> Result<String> {
    match doc.get(field) {
        None => Err(Error::location(format!("{origin} is missing {field}"))),
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(Error::location(format!("{origin} {field} must be a string"))),
    }
}
