//! End-to-end storage checks through the root facade.

use pastebox::models::paste::CreatePasteRequest;
use pastebox::{access, paste_ops, BlobError, BlobStore, Database, Identity};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

#[tokio::test]
async fn upload_fetch_delete_through_facade() {
    let temp = TempDir::new().unwrap();
    let db = Database::new(temp.path().join("db").to_str().unwrap()).unwrap();
    let blobs = BlobStore::open(temp.path().join("attachments")).unwrap();
    let alice = Identity::user("alice");

    let paste = paste_ops::create_paste(
        &db,
        &alice,
        CreatePasteRequest {
            content: "with attachment".to_string(),
            slug: Some("doc".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let record = paste_ops::upload_attachment(
        &db,
        &blobs,
        &alice,
        &paste.id,
        "hello.txt",
        Some("text/plain"),
        b"hello-attachment".as_slice(),
    )
    .await
    .unwrap();

    let mut download =
        access::fetch_attachment(&db, &blobs, &Identity::Anonymous, "alice", "doc", "hello.txt")
            .await
            .unwrap();
    assert_eq!(download.checksum, record.checksum);
    assert_eq!(download.mime_type, "text/plain");
    let mut body = Vec::new();
    download.reader.read_to_end(&mut body).await.unwrap();
    assert_eq!(body, b"hello-attachment");
    drop(download);

    paste_ops::delete_paste(&db, &blobs, &alice, &paste.id)
        .await
        .unwrap();
    assert!(matches!(
        blobs.read(&record.blob_id).await,
        Err(BlobError::NotFound)
    ));
}

#[test]
fn relative_blob_root_is_a_configuration_error() {
    assert!(matches!(
        BlobStore::open("relative/store"),
        Err(BlobError::Configuration(_))
    ));
}
