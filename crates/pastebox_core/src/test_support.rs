//! Shared test-only helpers for pastebox_core.

use crate::models::{attachment::AttachmentRecord, attachment::BlobId, paste::Paste};
use crate::{BlobStore, Database};
use chrono::Utc;
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
///
/// # Panics
/// Panics if temp-dir creation or database initialization fails.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

/// Database plus blob store sharing one temp dir.
pub(crate) fn setup_temp_storage() -> (Database, BlobStore, TempDir) {
    let (db, temp_dir) = setup_temp_db();
    let blobs = BlobStore::open(temp_dir.path().join("attachments")).expect("blob store");
    (db, blobs, temp_dir)
}

/// Insert a public paste owned by `owner` at `slug`.
pub(crate) fn insert_paste(db: &Database, owner: &str, slug: &str) -> Paste {
    let paste = Paste::new(owner.to_string(), slug.to_string(), "body".to_string());
    db.pastes.create(&paste).expect("create paste");
    paste
}

/// Attachment record pointing at a fresh blob id; not yet persisted.
pub(crate) fn attachment_record(paste: &Paste, slug: &str) -> AttachmentRecord {
    AttachmentRecord {
        paste_id: paste.id.clone(),
        slug: slug.to_string(),
        blob_id: BlobId::new(),
        mime_type: "text/plain".to_string(),
        checksum: "00".repeat(32),
        size: 0,
        created_at: Utc::now(),
    }
}
