//! Blob storage error kinds.

use std::io;
use thiserror::Error;

/// Failure kinds reported by [`super::BlobStore`].
#[derive(Error, Debug)]
pub enum BlobError {
    /// The store root is unusable (for example, not absolute).
    #[error("Blob store configuration error: {0}")]
    Configuration(String),

    /// No committed blob exists for the identifier.
    #[error("Blob not found")]
    NotFound,

    /// Any other filesystem failure.
    #[error("Blob I/O error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for BlobError {
    fn from(value: io::Error) -> Self {
        if value.kind() == io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(value)
        }
    }
}
