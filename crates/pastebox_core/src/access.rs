//! Read-side paste and attachment access.
//!
//! Every lookup here treats "hidden from this identity" and "expired" the same
//! as "absent": callers only ever see [`AppError::NotFound`].

use crate::{
    blob::{BlobReader, BlobStore},
    error::AppError,
    models::{
        attachment::AttachmentSummary,
        identity::Identity,
        paste::{Paste, PasteSummary, PasteView},
    },
    Database,
};

/// Metadata envelope plus open byte stream for one attachment.
///
/// Dropping the value releases the underlying file handle.
#[derive(Debug)]
pub struct AttachmentDownload {
    pub mime_type: String,
    pub checksum: String,
    pub size: u64,
    pub reader: BlobReader,
}

/// Resolve `(owner, slug)` to a paste the identity may see.
fn visible_paste(
    db: &Database,
    identity: &Identity,
    owner: &str,
    paste_slug: &str,
) -> Result<Paste, AppError> {
    let paste = db
        .pastes
        .resolve(owner, paste_slug)?
        .ok_or(AppError::NotFound)?;
    if paste.is_expired() || !identity.can_view(&paste) {
        return Err(AppError::NotFound);
    }
    Ok(paste)
}

/// Authorize and open one attachment for streaming.
///
/// The blob is opened only after the paste and attachment record resolve and
/// the identity is allowed to see the paste. A record whose blob is missing
/// surfaces as [`AppError::Blob`] so the inconsistency stays visible.
///
/// # Errors
/// [`AppError::NotFound`] for a missing, expired, or hidden paste and for a
/// missing attachment record; [`AppError::Blob`] when the blob cannot be
/// opened; database errors otherwise.
pub async fn fetch_attachment(
    db: &Database,
    blobs: &BlobStore,
    identity: &Identity,
    owner: &str,
    paste_slug: &str,
    attachment_slug: &str,
) -> Result<AttachmentDownload, AppError> {
    let paste = visible_paste(db, identity, owner, paste_slug)?;
    let record = db
        .attachments
        .resolve(&paste.id, attachment_slug)?
        .ok_or(AppError::NotFound)?;

    let reader = blobs.read(&record.blob_id).await?;
    Ok(AttachmentDownload {
        mime_type: record.mime_type,
        checksum: record.checksum,
        size: reader.len(),
        reader,
    })
}

/// A visible paste with its attachment summaries.
///
/// # Errors
/// [`AppError::NotFound`] when the paste is missing, expired, or hidden.
pub fn view_paste(
    db: &Database,
    identity: &Identity,
    owner: &str,
    paste_slug: &str,
) -> Result<PasteView, AppError> {
    let paste = visible_paste(db, identity, owner, paste_slug)?;
    let attachments = db
        .attachments
        .list(&paste.id)?
        .iter()
        .map(AttachmentSummary::from)
        .collect();
    Ok(PasteView { paste, attachments })
}

/// The owner's pastes that this identity may see in a listing, newest first.
pub fn list_pastes(
    db: &Database,
    identity: &Identity,
    owner: &str,
) -> Result<Vec<PasteSummary>, AppError> {
    Ok(db
        .pastes
        .list_by_owner(owner)?
        .iter()
        .filter(|paste| !paste.is_expired() && identity.can_list(paste))
        .map(PasteSummary::from)
        .collect())
}
