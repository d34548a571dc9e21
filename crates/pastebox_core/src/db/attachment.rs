//! Attachment record storage backed by redb.

use super::{decode, encode};
use crate::{db::tables::*, error::AppError, models::attachment::AttachmentRecord};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for attachment records.
pub struct AttachmentDb {
    db: Arc<redb::Database>,
}

/// Collect every attachment record of `paste_id`, ordered by slug.
pub(super) fn records_for_paste<T>(
    table: &T,
    paste_id: &str,
) -> Result<Vec<AttachmentRecord>, AppError>
where
    T: ReadableTable<(&'static str, &'static str), &'static [u8]>,
{
    let mut records = Vec::new();
    for item in table.range((paste_id, "")..)? {
        let (key, value) = item?;
        let (row_paste_id, _) = key.value();
        if row_paste_id != paste_id {
            break;
        }
        records.push(decode(value.value())?);
    }
    Ok(records)
}

impl AttachmentDb {
    /// Initialize the attachment table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(ATTACHMENTS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert an attachment record for an existing paste.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when the paste does not exist,
    /// [`AppError::Conflict`] when the slug is taken within the paste.
    pub fn create(&self, record: &AttachmentRecord) -> Result<(), AppError> {
        let encoded = encode(record)?;
        let key = (record.paste_id.as_str(), record.slug.as_str());

        let write_txn = self.db.begin_write()?;
        {
            let pastes = write_txn.open_table(PASTES)?;
            let mut attachments = write_txn.open_table(ATTACHMENTS)?;

            if pastes.get(record.paste_id.as_str())?.is_none() {
                return Err(AppError::NotFound);
            }
            if attachments.get(key)?.is_some() {
                return Err(AppError::Conflict(format!(
                    "Attachment '{}' already exists on this paste",
                    record.slug
                )));
            }
            attachments.insert(key, encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Resolve an attachment slug within a paste.
    pub fn resolve(
        &self,
        paste_id: &str,
        slug: &str,
    ) -> Result<Option<AttachmentRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let attachments = read_txn.open_table(ATTACHMENTS)?;
        match attachments.get((paste_id, slug))? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    /// List a paste's attachments, ordered by slug.
    pub fn list(&self, paste_id: &str) -> Result<Vec<AttachmentRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let attachments = read_txn.open_table(ATTACHMENTS)?;
        records_for_paste(&attachments, paste_id)
    }

    /// Delete one attachment record and return it.
    ///
    /// # Returns
    /// `Ok(Some(record))` when deleted, `Ok(None)` when missing.
    pub fn delete(
        &self,
        paste_id: &str,
        slug: &str,
    ) -> Result<Option<AttachmentRecord>, AppError> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut attachments = write_txn.open_table(ATTACHMENTS)?;
            let Some(guard) = attachments.get((paste_id, slug))? else {
                return Ok(None);
            };
            let record: AttachmentRecord = decode(guard.value())?;
            drop(guard);
            let _ = attachments.remove((paste_id, slug))?;
            record
        };
        write_txn.commit()?;
        Ok(Some(deleted))
    }
}
