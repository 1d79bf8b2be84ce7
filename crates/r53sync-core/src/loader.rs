//! Resource-definition loading
//!
//! A definition comes either from a local file or from an object named by an
//! s3location pointer file. Both paths end in [`ResourceDefinition::parse`],
//! so validation is identical wherever the bytes came from.

use crate::definition::ResourceDefinition;
use crate::error::Result;
use crate::location::S3Location;
use crate::traits::ObjectStore;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where to load the resource definition from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionSource {
    /// Local resource definition file
    Resource(PathBuf),

    /// Local s3location pointer file naming the remote definition
    S3Location(PathBuf),
}

/// Load and validate a resource definition
///
/// `store` is only consulted for [`DefinitionSource::S3Location`].
pub async fn load_definition(
    source: &DefinitionSource,
    store: &dyn ObjectStore,
) -> Result<ResourceDefinition> {
    match source {
        DefinitionSource::Resource(path) => {
            info!(path = %path.display(), "Reading resource definition");
            ResourceDefinition::read(path).await
        }
        DefinitionSource::S3Location(path) => {
            let location = S3Location::read(path).await?;
            info!(%location, store = store.store_name(), "Downloading resource definition");
            let body = store.get_object(&location).await?;
            ResourceDefinition::parse_from(&body, &location.to_string())
        }
    }
}

/// Validate a local definition and upload it to the pointer's location
///
/// An invalid definition is never uploaded.
pub async fn upload_definition(
    resource_path: impl AsRef<Path>,
    location_path: impl AsRef<Path>,
    store: &dyn ObjectStore,
) -> Result<S3Location> {
    let definition = ResourceDefinition::read(resource_path).await?;
    let location = S3Location::read(location_path).await?;

    let body = definition.to_json_vec()?;
    info!(
        %location,
        resources = definition.resources.len(),
        bytes = body.len(),
        "Uploading resource definition"
    );
    store.put_object(&location, body).await?;

    Ok(location)
}
