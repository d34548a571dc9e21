//! Paste and attachment mutations shared by HTTP handlers.
//!
//! Metadata is always committed or removed before the blob it references is
//! touched by readers: uploads write the blob first and publish the record
//! last, deletes unpublish the record first and release the blob last.

use crate::{
    blob::{BlobError, BlobStore, ChecksumReader},
    constants::DEFAULT_ATTACHMENT_MIME,
    error::AppError,
    models::{
        attachment::{AttachmentRecord, BlobId},
        identity::Identity,
        paste::{CreatePasteRequest, Paste},
    },
    slug::{generate_unique_slug, validate_slug},
    Database,
};
use chrono::Utc;
use tokio::io::AsyncRead;

/// Load a paste the identity may modify.
///
/// # Errors
/// [`AppError::Unauthorized`] for anonymous callers; [`AppError::NotFound`]
/// when the paste is missing or belongs to someone else.
fn modifiable_paste(
    db: &Database,
    identity: &Identity,
    paste_id: &str,
) -> Result<Paste, AppError> {
    if identity.username().is_none() {
        return Err(AppError::Unauthorized);
    }
    match db.pastes.get(paste_id)? {
        Some(paste) if identity.can_modify(&paste) => Ok(paste),
        _ => Err(AppError::NotFound),
    }
}

/// Delete the blob behind a record that has already been unpublished.
async fn release_blob(blobs: &BlobStore, record: &AttachmentRecord) -> Result<(), AppError> {
    match blobs.delete(&record.blob_id).await {
        Ok(()) => Ok(()),
        Err(BlobError::NotFound) => {
            tracing::warn!(
                paste_id = %record.paste_id,
                attachment = %record.slug,
                blob_id = %record.blob_id,
                "Attachment blob was already missing at delete"
            );
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Create a paste owned by the calling identity.
///
/// # Arguments
/// - `request`: paste payload; a missing slug is generated (long when
///   `long_slug` is set).
///
/// # Errors
/// [`AppError::Unauthorized`] for anonymous callers, [`AppError::BadRequest`]
/// for an invalid slug or an expiry in the past, [`AppError::Conflict`] when
/// the slug is taken.
pub fn create_paste(
    db: &Database,
    identity: &Identity,
    request: CreatePasteRequest,
) -> Result<Paste, AppError> {
    let owner = identity.username().ok_or(AppError::Unauthorized)?;

    if let Some(expires_at) = request.expires_at {
        if expires_at <= Utc::now() {
            return Err(AppError::BadRequest(
                "Expiry must be in the future".to_string(),
            ));
        }
    }

    let slug = match request.slug {
        Some(slug) => {
            validate_slug(&slug)?;
            slug
        }
        None => generate_unique_slug(request.long_slug, |candidate| {
            db.pastes.slug_exists(owner, candidate)
        })?,
    };

    let mut paste = Paste::new(owner.to_string(), slug, request.content);
    paste.title = request.title;
    paste.visibility = request.visibility.unwrap_or_default();
    paste.expires_at = request.expires_at;
    db.pastes.create(&paste)?;

    tracing::info!(owner = %paste.owner, slug = %paste.slug, "Created paste");
    Ok(paste)
}

/// Stream `source` into a new attachment on `paste_id`.
///
/// The blob is written under a fresh [`BlobId`] and checksummed in the same
/// pass. The record is committed only after the blob is durable; if that
/// commit fails the blob is removed again.
///
/// # Arguments
/// - `mime_type`: declared content type; `None` records
///   `application/octet-stream`.
///
/// # Errors
/// Authorization errors as for any mutation, [`AppError::BadRequest`] for an
/// invalid slug, [`AppError::Conflict`] when the slug is already used on this
/// paste, [`AppError::Blob`] when storing the bytes fails.
pub async fn upload_attachment<R>(
    db: &Database,
    blobs: &BlobStore,
    identity: &Identity,
    paste_id: &str,
    slug: &str,
    mime_type: Option<&str>,
    source: R,
) -> Result<AttachmentRecord, AppError>
where
    R: AsyncRead + Unpin,
{
    let paste = modifiable_paste(db, identity, paste_id)?;
    if paste.is_expired() {
        return Err(AppError::NotFound);
    }
    validate_slug(slug)?;
    if db.attachments.resolve(&paste.id, slug)?.is_some() {
        return Err(AppError::Conflict(format!(
            "Attachment '{}' already exists on this paste",
            slug
        )));
    }

    let blob_id = BlobId::new();
    let mut reader = ChecksumReader::new(source);
    blobs.write(&blob_id, &mut reader).await?;
    let digest = reader.finish();

    let record = AttachmentRecord {
        paste_id: paste.id,
        slug: slug.to_string(),
        blob_id,
        mime_type: mime_type
            .filter(|mime| !mime.trim().is_empty())
            .unwrap_or(DEFAULT_ATTACHMENT_MIME)
            .to_string(),
        checksum: digest.checksum,
        size: digest.size,
        created_at: Utc::now(),
    };

    if let Err(err) = db.attachments.create(&record) {
        if let Err(cleanup) = blobs.delete(&blob_id).await {
            tracing::error!(
                blob_id = %blob_id,
                error = %cleanup,
                "Failed to remove blob after attachment commit failed"
            );
        }
        return Err(err);
    }

    tracing::info!(
        paste_id = %record.paste_id,
        attachment = %record.slug,
        size = record.size,
        "Stored attachment"
    );
    Ok(record)
}

/// Remove one attachment and release its blob.
///
/// # Errors
/// Authorization errors as for any mutation, [`AppError::NotFound`] when the
/// attachment does not exist, [`AppError::Blob`] when the blob cannot be
/// removed for a reason other than already being gone.
pub async fn delete_attachment(
    db: &Database,
    blobs: &BlobStore,
    identity: &Identity,
    paste_id: &str,
    slug: &str,
) -> Result<(), AppError> {
    let paste = modifiable_paste(db, identity, paste_id)?;
    let record = db
        .attachments
        .delete(&paste.id, slug)?
        .ok_or(AppError::NotFound)?;
    release_blob(blobs, &record).await
}

/// Delete a paste with all of its attachments.
///
/// Every blob is attempted even if an earlier release fails; the first such
/// failure is returned after the rest have been tried.
///
/// # Returns
/// Number of attachments released.
pub async fn delete_paste(
    db: &Database,
    blobs: &BlobStore,
    identity: &Identity,
    paste_id: &str,
) -> Result<usize, AppError> {
    let paste = modifiable_paste(db, identity, paste_id)?;
    let records = db
        .delete_paste_cascade(&paste.id)?
        .ok_or(AppError::NotFound)?;

    let mut first_error = None;
    for record in &records {
        if let Err(err) = release_blob(blobs, record).await {
            tracing::error!(
                paste_id = %record.paste_id,
                blob_id = %record.blob_id,
                error = %err,
                "Failed to release attachment blob"
            );
            if first_error.is_none() {
                first_error = Some(err);
            }
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }

    tracing::info!(
        owner = %paste.owner,
        slug = %paste.slug,
        attachments = records.len(),
        "Deleted paste"
    );
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::checksum_of;
    use crate::models::paste::PasteVisibility;
    use crate::test_support::{attachment_record, insert_paste, setup_temp_storage};
    use chrono::Duration;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    struct BrokenSource;

    impl AsyncRead for BrokenSource {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "client gone")))
        }
    }

    fn blob_files(blobs: &BlobStore) -> usize {
        std::fs::read_dir(blobs.root()).expect("read root").count()
    }

    #[test]
    fn create_paste_requires_identity_and_generates_slugs() {
        let (db, _blobs, _temp) = setup_temp_storage();
        let request = || CreatePasteRequest {
            content: "hello".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            create_paste(&db, &Identity::Anonymous, request()),
            Err(AppError::Unauthorized)
        ));

        let short = create_paste(&db, &Identity::user("alice"), request()).expect("short");
        assert_eq!(short.owner, "alice");
        assert_eq!(short.slug.len(), crate::constants::SLUG_SHORT_LEN);
        assert_eq!(short.visibility, PasteVisibility::Public);

        let long = create_paste(
            &db,
            &Identity::user("alice"),
            CreatePasteRequest {
                long_slug: true,
                visibility: Some(PasteVisibility::Private),
                ..request()
            },
        )
        .expect("long");
        assert_eq!(long.slug.len(), crate::constants::SLUG_LONG_LEN);
        assert_eq!(long.visibility, PasteVisibility::Private);
    }

    #[test]
    fn create_paste_validates_slug_and_expiry() {
        let (db, _blobs, _temp) = setup_temp_storage();
        let alice = Identity::user("alice");
        let with_slug = |slug: &str| CreatePasteRequest {
            content: "x".to_string(),
            slug: Some(slug.to_string()),
            ..Default::default()
        };

        create_paste(&db, &alice, with_slug("notes")).expect("first");
        assert!(matches!(
            create_paste(&db, &alice, with_slug("notes")),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            create_paste(&db, &alice, with_slug("../up")),
            Err(AppError::BadRequest(_))
        ));

        let past = CreatePasteRequest {
            expires_at: Some(Utc::now() - Duration::seconds(1)),
            ..with_slug("later")
        };
        assert!(matches!(
            create_paste(&db, &alice, past),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn upload_records_checksum_size_and_mime() {
        let (db, blobs, _temp) = setup_temp_storage();
        let paste = insert_paste(&db, "alice", "notes");
        let payload = b"attachment payload".as_slice();

        let record = upload_attachment(
            &db,
            &blobs,
            &Identity::user("alice"),
            &paste.id,
            "data.txt",
            Some("text/plain"),
            payload,
        )
        .await
        .expect("upload");

        assert_eq!(record.checksum, checksum_of(payload));
        assert_eq!(record.size, payload.len() as u64);
        assert_eq!(record.mime_type, "text/plain");
        assert!(blobs.contains(&record.blob_id).await.unwrap());
        assert_eq!(
            db.attachments.resolve(&paste.id, "data.txt").unwrap(),
            Some(record)
        );

        let untyped = upload_attachment(
            &db,
            &blobs,
            &Identity::admin("root"),
            &paste.id,
            "raw",
            None,
            b"".as_slice(),
        )
        .await
        .expect("empty upload");
        assert_eq!(untyped.mime_type, DEFAULT_ATTACHMENT_MIME);
        assert_eq!(untyped.size, 0);
    }

    #[tokio::test]
    async fn upload_authorization() {
        let (db, blobs, _temp) = setup_temp_storage();
        let paste = insert_paste(&db, "alice", "notes");

        let anonymous = upload_attachment(
            &db,
            &blobs,
            &Identity::Anonymous,
            &paste.id,
            "a",
            None,
            b"x".as_slice(),
        )
        .await;
        assert!(matches!(anonymous, Err(AppError::Unauthorized)));

        let stranger = upload_attachment(
            &db,
            &blobs,
            &Identity::user("bob"),
            &paste.id,
            "a",
            None,
            b"x".as_slice(),
        )
        .await;
        assert!(matches!(stranger, Err(AppError::NotFound)));

        let missing = upload_attachment(
            &db,
            &blobs,
            &Identity::admin("root"),
            "no-such-paste",
            "a",
            None,
            b"x".as_slice(),
        )
        .await;
        assert!(matches!(missing, Err(AppError::NotFound)));
        assert_eq!(blob_files(&blobs), 0);
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected_before_storage() {
        let (db, blobs, _temp) = setup_temp_storage();
        let paste = insert_paste(&db, "alice", "notes");
        let alice = Identity::user("alice");

        upload_attachment(&db, &blobs, &alice, &paste.id, "a", None, b"1".as_slice())
            .await
            .expect("first");
        let second =
            upload_attachment(&db, &blobs, &alice, &paste.id, "a", None, b"2".as_slice()).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(blob_files(&blobs), 1);
    }

    #[tokio::test]
    async fn failed_source_leaves_no_record_or_blob() {
        let (db, blobs, _temp) = setup_temp_storage();
        let paste = insert_paste(&db, "alice", "notes");

        let err = upload_attachment(
            &db,
            &blobs,
            &Identity::user("alice"),
            &paste.id,
            "broken",
            None,
            BrokenSource,
        )
        .await
        .expect_err("source fails");
        assert!(matches!(err, AppError::Blob(BlobError::Io(_))));
        assert!(db.attachments.resolve(&paste.id, "broken").unwrap().is_none());
        assert_eq!(blob_files(&blobs), 0);
    }

    #[tokio::test]
    async fn upload_to_expired_paste_is_not_found() {
        let (db, blobs, _temp) = setup_temp_storage();
        let mut paste = Paste::new("alice".into(), "gone".into(), "x".into());
        paste.expires_at = Some(Utc::now() - Duration::seconds(1));
        db.pastes.create(&paste).unwrap();

        let result = upload_attachment(
            &db,
            &blobs,
            &Identity::user("alice"),
            &paste.id,
            "a",
            None,
            b"x".as_slice(),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn delete_attachment_removes_record_then_blob() {
        let (db, blobs, _temp) = setup_temp_storage();
        let paste = insert_paste(&db, "alice", "notes");
        let alice = Identity::user("alice");
        let record = upload_attachment(&db, &blobs, &alice, &paste.id, "a", None, b"x".as_slice())
            .await
            .expect("upload");

        assert!(matches!(
            delete_attachment(&db, &blobs, &Identity::user("bob"), &paste.id, "a").await,
            Err(AppError::NotFound)
        ));
        delete_attachment(&db, &blobs, &alice, &paste.id, "a")
            .await
            .expect("delete");
        assert!(db.attachments.resolve(&paste.id, "a").unwrap().is_none());
        assert!(!blobs.contains(&record.blob_id).await.unwrap());

        assert!(matches!(
            delete_attachment(&db, &blobs, &alice, &paste.id, "a").await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_attachment_tolerates_missing_blob() {
        let (db, blobs, _temp) = setup_temp_storage();
        let paste = insert_paste(&db, "alice", "notes");
        db.attachments
            .create(&attachment_record(&paste, "orphan"))
            .unwrap();

        delete_attachment(&db, &blobs, &Identity::user("alice"), &paste.id, "orphan")
            .await
            .expect("metadata removed even though blob was gone");
        assert!(db.attachments.resolve(&paste.id, "orphan").unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_paste_releases_every_blob() {
        let (db, blobs, _temp) = setup_temp_storage();
        let paste = insert_paste(&db, "alice", "notes");
        let alice = Identity::user("alice");
        for slug in ["a", "b", "c"] {
            upload_attachment(&db, &blobs, &alice, &paste.id, slug, None, slug.as_bytes())
                .await
                .expect("upload");
        }
        assert_eq!(blob_files(&blobs), 3);

        assert!(matches!(
            delete_paste(&db, &blobs, &Identity::Anonymous, &paste.id).await,
            Err(AppError::Unauthorized)
        ));

        let released = delete_paste(&db, &blobs, &Identity::admin("root"), &paste.id)
            .await
            .expect("delete");
        assert_eq!(released, 3);
        assert_eq!(blob_files(&blobs), 0);
        assert!(db.pastes.resolve("alice", "notes").unwrap().is_none());
        assert!(matches!(
            delete_paste(&db, &blobs, &alice, &paste.id).await,
            Err(AppError::NotFound)
        ));
    }
}
