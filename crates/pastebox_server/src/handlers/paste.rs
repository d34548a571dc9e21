//! Paste HTTP handlers.

use super::normalize::normalize_optional;
use crate::{
    error::HttpError, identity::CurrentIdentity, models::paste::*, AppError, AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use pastebox_core::{access, paste_ops};

/// List the pastes of `owner` visible to the caller.
///
/// # Returns
/// Summary rows (no content), newest first.
pub async fn list_owner_pastes(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(owner): Path<String>,
) -> Result<Json<Vec<PasteSummary>>, HttpError> {
    Ok(Json(access::list_pastes(&state.db, &identity, &owner)?))
}

/// Show one paste with its attachment list.
///
/// # Errors
/// 404 when the paste is missing, expired, or not visible to the caller.
pub async fn view_paste(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path((owner, paste_slug)): Path<(String, String)>,
) -> Result<Json<PasteView>, HttpError> {
    Ok(Json(access::view_paste(
        &state.db,
        &identity,
        &owner,
        &paste_slug,
    )?))
}

/// Create a paste owned by the caller.
///
/// # Errors
/// 401 for anonymous callers, 400 for oversize content or an invalid slug,
/// 409 when the slug is taken.
pub async fn create_paste(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Json(mut req): Json<CreatePasteRequest>,
) -> Result<Json<Paste>, HttpError> {
    if req.content.len() > state.config.max_paste_size {
        return Err(AppError::BadRequest(format!(
            "Paste size exceeds maximum of {} bytes",
            state.config.max_paste_size
        ))
        .into());
    }
    req.slug = normalize_optional(req.slug);
    req.title = normalize_optional(req.title);

    Ok(Json(paste_ops::create_paste(&state.db, &identity, req)?))
}

/// Delete a paste and all of its attachments.
pub async fn delete_paste(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let released = paste_ops::delete_paste(&state.db, &state.blobs, &identity, &id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "attachments_deleted": released
    })))
}
