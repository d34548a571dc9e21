//! Attachment HTTP handlers.
//!
//! Bytes are streamed in both directions; no handler buffers a whole
//! attachment in memory.

use super::normalize::declared_content_type;
use crate::{error::HttpError, identity::CurrentIdentity, AppError, AppState};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::TryStreamExt;
use pastebox_core::{
    access, constants::BLOB_COPY_CHUNK_SIZE, models::attachment::AttachmentSummary, paste_ops,
};
use std::io;
use tokio_util::io::{ReaderStream, StreamReader};

/// Whether an `If-None-Match` header names `etag`.
fn etag_matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|candidate| {
            let candidate = candidate.trim();
            let candidate = candidate.strip_prefix("W/").unwrap_or(candidate);
            candidate.trim_matches('"')
        })
        .any(|candidate| candidate == "*" || candidate == etag)
}

/// Stream one attachment's bytes.
///
/// Headers (`Content-Type`, `ETag`, `Content-Length`) are set before any body
/// bytes are produced. The blob's file handle lives in the body stream and is
/// released when the stream finishes or the client goes away.
///
/// # Errors
/// 404 for anything the caller may not see; 500 for storage faults.
pub async fn download_attachment(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path((owner, paste_slug, attachment_slug)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let download = access::fetch_attachment(
        &state.db,
        &state.blobs,
        &identity,
        &owner,
        &paste_slug,
        &attachment_slug,
    )
    .await?;

    let etag = HeaderValue::from_str(&download.checksum).map_err(|_| {
        AppError::StorageMessage("Stored checksum is not a valid header value".to_string())
    })?;

    if etag_matches(&headers, &download.checksum) {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    let content_type = HeaderValue::from_str(&download.mime_type).unwrap_or_else(|_| {
        tracing::warn!(mime = %download.mime_type, "Stored MIME type is not a valid header value");
        HeaderValue::from_static(pastebox_core::constants::DEFAULT_ATTACHMENT_MIME)
    });
    let size = download.size;
    let body = Body::from_stream(ReaderStream::with_capacity(
        download.reader,
        BLOB_COPY_CHUNK_SIZE,
    ));

    let mut response = Response::new(body);
    let response_headers = response.headers_mut();
    response_headers.insert(header::CONTENT_TYPE, content_type);
    response_headers.insert(header::ETAG, etag);
    response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    Ok(response)
}

/// Store the raw request body as an attachment on paste `id`.
///
/// The body is streamed to disk as it arrives and is not size-capped.
///
/// # Errors
/// 401 for anonymous callers, 404 when the paste is missing or owned by
/// someone else, 409 when the slug is taken, 400 for an invalid slug.
pub async fn upload_attachment(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path((id, slug)): Path<(String, String)>,
    headers: HeaderMap,
    body: Body,
) -> Result<(StatusCode, Json<AttachmentSummary>), HttpError> {
    let mime_type = declared_content_type(&headers);
    let source = StreamReader::new(body.into_data_stream().map_err(io::Error::other));

    let record = paste_ops::upload_attachment(
        &state.db,
        &state.blobs,
        &identity,
        &id,
        &slug,
        mime_type.as_deref(),
        source,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(AttachmentSummary::from(&record))))
}

/// Remove one attachment and its stored bytes.
pub async fn delete_attachment(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path((id, slug)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, HttpError> {
    paste_ops::delete_attachment(&state.db, &state.blobs, &identity, &id, &slug).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
