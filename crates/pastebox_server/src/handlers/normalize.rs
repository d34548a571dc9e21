//! Normalization helpers for optional request inputs.

use axum::http::{header, HeaderMap};

/// Trim an optional string field; empty or whitespace-only values become `None`.
pub(super) fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// The `Content-Type` a client declared for an upload, if usable.
pub(super) fn declared_content_type(headers: &HeaderMap) -> Option<String> {
    let raw = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    normalize_optional(raw)
}
