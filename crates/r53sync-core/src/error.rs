//! Error types for r53sync
//!
//! Every error carries the identifying detail (resource name, field name,
//! origin path) in its message so an operator can act on it directly.

use thiserror::Error;

/// Result type alias for r53sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for r53sync
#[derive(Error, Debug)]
pub enum Error {
    /// The input document is not well-formed JSON
    #[error("Failed to parse JSON ({origin}): {message}")]
    Parse {
        /// Where the document came from (path, s3 key, "<input>")
        origin: String,
        /// Parser message
        message: String,
    },

    /// Well-formed but semantically incomplete resource definition
    #[error("Invalid resource definition: {0}")]
    Validation(String),

    /// Problem with an s3location pointer document
    #[error("Invalid s3location: {0}")]
    Location(String),

    /// The compute-inventory backend failed while resolving a resource
    #[error("Instance discovery failed for resource \"{resource}\": {source}")]
    Discovery {
        /// Resource whose discovery failed
        resource: String,
        /// Backend error
        #[source]
        source: Box<Error>,
    },

    /// A resource resolved to zero IP addresses
    #[error("No IPs for resource {0}")]
    EmptyResult(String),

    /// ZoneUpdater refused to submit (no network call was made)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Backend-specific error, propagated verbatim
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a parse error for a document read from `origin`
    pub fn parse(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an s3location error
    pub fn location(msg: impl Into<String>) -> Self {
        Self::Location(msg.into())
    }

    /// Wrap a backend error as a discovery failure for `resource`
    pub fn discovery(resource: impl Into<String>, source: Error) -> Self {
        Self::Discovery {
            resource: resource.into(),
            source: Box::new(source),
        }
    }

    /// Create an empty-result error for `resource`
    pub fn empty_result(resource: impl Into<String>) -> Self {
        Self::EmptyResult(resource.into())
    }

    /// Create a precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Name of the resource this error is attributed to, if any
    pub fn resource(&self) -> Option<&str> {
        match self {
            Error::Discovery { resource, .. } => Some(resource),
            Error::EmptyResult(resource) => Some(resource),
            _ => None,
        }
    }
}
