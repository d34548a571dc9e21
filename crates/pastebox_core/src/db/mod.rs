//! Metadata database for pastes and attachment records, backed by redb.

/// Attachment record storage.
pub mod attachment;
/// Paste storage and the owner/slug address index.
pub mod paste;
/// Table definitions.
pub mod tables;


use crate::{
    constants::REDB_FILE_NAME,
    error::AppError,
    models::{attachment::AttachmentRecord, paste::Paste},
};
use redb::ReadableTable;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;
use tables::{ATTACHMENTS, PASTES, PASTES_BY_SLUG};

/// Database handle with accessors for each record family.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub pastes: paste::PasteDb,
    pub attachments: attachment::AttachmentDb,
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, AppError> {
    Ok(bincode::serialize(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

impl Database {
    /// Open (or create) the database stored under directory `path`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or redb cannot
    /// open the file.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!("Failed to create database directory: {}", err))
        })?;
        let db = redb::Database::create(dir.join(REDB_FILE_NAME))?;
        Self::from_shared(Arc::new(db))
    }

    /// Build a handle over an already-open redb instance.
    ///
    /// # Errors
    /// Returns an error if the required tables cannot be initialized.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            pastes: paste::PasteDb::new(db.clone())?,
            attachments: attachment::AttachmentDb::new(db.clone())?,
            db,
        })
    }

    /// Delete a paste, its address index row, and all of its attachment
    /// records in one transaction.
    ///
    /// Blob files are not touched; the returned records name the blobs the
    /// caller must release.
    ///
    /// # Returns
    /// `Ok(Some(records))` when the paste existed, `Ok(None)` otherwise.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete_paste_cascade(
        &self,
        paste_id: &str,
    ) -> Result<Option<Vec<AttachmentRecord>>, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut by_slug = write_txn.open_table(PASTES_BY_SLUG)?;
            let mut attachments = write_txn.open_table(ATTACHMENTS)?;

            let Some(paste_guard) = pastes.get(paste_id)? else {
                return Ok(None);
            };
            let paste: Paste = decode(paste_guard.value())?;
            drop(paste_guard);

            let _ = pastes.remove(paste_id)?;
            let _ = by_slug.remove((paste.owner.as_str(), paste.slug.as_str()))?;

            let records = attachment::records_for_paste(&attachments, paste_id)?;
            for record in &records {
                let _ = attachments.remove((paste_id, record.slug.as_str()))?;
            }
            records
        };
        write_txn.commit()?;
        Ok(Some(removed))
    }
}
