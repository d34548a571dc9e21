//! Attachment metadata and blob identifiers.

use crate::constants::BLOB_FILE_SUFFIX;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque key of one stored blob.
///
/// Always generated internally (random v4) or read back from a stored
/// [`AttachmentRecord`]; never parsed from request paths. Its hyphenated form
/// is used verbatim as the blob's file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(Uuid);

impl BlobId {
    /// Generate a fresh, never-reused identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// File name of the committed blob (`<uuid>.bin`).
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0.as_hyphenated(), BLOB_FILE_SUFFIX)
    }
}

impl Default for BlobId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for BlobId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.as_hyphenated(), f)
    }
}

/// Metadata describing one stored attachment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentRecord {
    pub paste_id: String,
    pub slug: String,
    pub blob_id: BlobId,
    pub mime_type: String,
    /// BLAKE3 hex digest of the blob contents.
    pub checksum: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// API-facing attachment row; omits the internal blob identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentSummary {
    pub slug: String,
    pub mime_type: String,
    pub checksum: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

impl From<&AttachmentRecord> for AttachmentSummary {
    fn from(value: &AttachmentRecord) -> Self {
        Self {
            slug: value.slug.clone(),
            mime_type: value.mime_type.clone(),
            checksum: value.checksum.clone(),
            size: value.size,
            created_at: value.created_at,
        }
    }
}
