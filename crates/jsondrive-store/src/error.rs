use std::io;
use std::path::{Path, PathBuf};

/// Errors produced by document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The collection name was empty.
    #[error("missing collection")]
    MissingCollection,

    /// The resource name was empty.
    #[error("missing resource")]
    MissingResource,

    /// A collection or resource name cannot be mapped onto a single path component.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// No record exists for the given collection and resource.
    #[error("record not found: {collection}/{resource}")]
    NotFound { collection: String, resource: String },

    /// The collection directory does not exist.
    #[error("collection not found: {collection}")]
    CollectionNotFound { collection: String },

    /// The store root exists but is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// I/O error while touching the given path.
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The value could not be encoded as JSON. No file was touched.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// The stored bytes could not be decoded into the requested shape.
    #[error("decode error in {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns `true` for the not-found family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::CollectionNotFound { .. }
        )
    }

    /// Returns `true` for errors raised before any filesystem access.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingCollection | Self::MissingResource | Self::InvalidName { .. }
        )
    }
}

/// Convenience alias used throughout the store crate.
pub type Result<T> = std::result::Result<T, StoreError>;
