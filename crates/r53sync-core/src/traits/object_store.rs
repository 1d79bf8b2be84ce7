// # Object Store Trait
//
// Defines the interface for fetching and storing the raw bytes of a resource
// definition kept at a remote location.
//
// ## Implementations
//
// - S3 `GetObject`/`PutObject`: `r53sync-aws` crate

use crate::location::S3Location;
use async_trait::async_trait;

/// Trait for remote object storage
///
/// Implementations move bytes only. Parsing and validation stay with
/// `ResourceDefinition`, so a definition that fails validation is never
/// uploaded and a downloaded one is validated exactly like a local file.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the object at `location`
    async fn get_object(&self, location: &S3Location) -> Result<Vec<u8>, crate::Error>;

    /// Store `body` at `location`, replacing any existing object
    async fn put_object(&self, location: &S3Location, body: Vec<u8>) -> Result<(), crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}
