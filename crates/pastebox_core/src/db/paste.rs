//! Paste storage operations backed by redb.

use super::{decode, encode};
use crate::{db::tables::*, error::AppError, models::paste::Paste};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for paste rows and the owner/slug address index.
pub struct PasteDb {
    db: Arc<redb::Database>,
}

impl PasteDb {
    /// Initialize paste tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PASTES)?;
        write_txn.open_table(PASTES_BY_SLUG)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a paste and its address index row atomically.
    ///
    /// # Errors
    /// [`AppError::Conflict`] when the id or the `(owner, slug)` address is
    /// already taken; storage errors otherwise.
    pub fn create(&self, paste: &Paste) -> Result<(), AppError> {
        let encoded = encode(paste)?;
        let address = (paste.owner.as_str(), paste.slug.as_str());

        let write_txn = self.db.begin_write()?;
        {
            let mut pastes = write_txn.open_table(PASTES)?;
            let mut by_slug = write_txn.open_table(PASTES_BY_SLUG)?;

            if pastes.get(paste.id.as_str())?.is_some() {
                return Err(AppError::Conflict(format!(
                    "Paste id '{}' already exists",
                    paste.id
                )));
            }
            if by_slug.get(address)?.is_some() {
                return Err(AppError::Conflict(format!(
                    "Paste slug '{}' is already in use",
                    paste.slug
                )));
            }

            pastes.insert(paste.id.as_str(), encoded.as_slice())?;
            by_slug.insert(address, paste.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a paste by id.
    ///
    /// # Returns
    /// `Ok(Some(paste))` when found, `Ok(None)` when missing.
    pub fn get(&self, id: &str) -> Result<Option<Paste>, AppError> {
        let read_txn = self.db.begin_read()?;
        let pastes = read_txn.open_table(PASTES)?;
        match pastes.get(id)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    /// Resolve `(owner, slug)` to a paste.
    ///
    /// # Errors
    /// [`AppError::StorageMessage`] when the index points at a missing row.
    pub fn resolve(&self, owner: &str, slug: &str) -> Result<Option<Paste>, AppError> {
        let read_txn = self.db.begin_read()?;
        let by_slug = read_txn.open_table(PASTES_BY_SLUG)?;
        let pastes = read_txn.open_table(PASTES)?;

        let Some(id_guard) = by_slug.get((owner, slug))? else {
            return Ok(None);
        };
        let id = id_guard.value();
        match pastes.get(id)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Err(AppError::StorageMessage(format!(
                "Address index references missing paste '{}'",
                id
            ))),
        }
    }

    /// Whether `owner` already has a paste at `slug`.
    pub fn slug_exists(&self, owner: &str, slug: &str) -> Result<bool, AppError> {
        let read_txn = self.db.begin_read()?;
        let by_slug = read_txn.open_table(PASTES_BY_SLUG)?;
        Ok(by_slug.get((owner, slug))?.is_some())
    }

    /// All pastes owned by `owner`, newest first.
    pub fn list_by_owner(&self, owner: &str) -> Result<Vec<Paste>, AppError> {
        let read_txn = self.db.begin_read()?;
        let by_slug = read_txn.open_table(PASTES_BY_SLUG)?;
        let pastes = read_txn.open_table(PASTES)?;
        let mut owned = Vec::new();

        for item in by_slug.range((owner, "")..)? {
            let (key, id_guard) = item?;
            let (row_owner, _) = key.value();
            if row_owner != owner {
                break;
            }
            let Some(paste_guard) = pastes.get(id_guard.value())? else {
                continue;
            };
            owned.push(decode::<Paste>(paste_guard.value())?);
        }

        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}
