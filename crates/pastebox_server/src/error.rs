//! HTTP error mapping for API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pastebox_core::{AppError, BlobError};
use serde_json::json;

/// Wrapper that renders an [`AppError`] as a JSON error response.
///
/// Response bodies carry only a generic message; causes go to the log.
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

const NOT_FOUND: &str = "Not found";
const INTERNAL: &str = "Internal server error";

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND.to_string()),
            AppError::Blob(BlobError::NotFound) => {
                tracing::error!("Attachment record exists but its blob is missing from storage");
                (StatusCode::NOT_FOUND, NOT_FOUND.to_string())
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Blob(err @ (BlobError::Io(_) | BlobError::Configuration(_))) => {
                tracing::error!(error = %err, "Blob storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
            }
            AppError::Serialization(err) => {
                tracing::error!(error = %err, "Serialization error");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
            }
            AppError::Configuration(msg) | AppError::StorageMessage(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = HttpError(err).into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json"))
    }

    #[tokio::test]
    async fn not_found_kinds_render_identically() {
        let plain = render(AppError::NotFound).await;
        let missing_blob = render(AppError::Blob(BlobError::NotFound)).await;
        assert_eq!(plain, missing_blob);
        assert_eq!(plain.0, StatusCode::NOT_FOUND);
        assert_eq!(plain.1, json!({ "error": "Not found" }));
    }

    #[tokio::test]
    async fn storage_faults_hide_details() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/blobs/x.bin");
        for err in [
            AppError::Blob(BlobError::Io(io)),
            AppError::StorageMessage("index points at /secret".to_string()),
            AppError::Configuration("relative root".to_string()),
        ] {
            let (status, body) = render(err).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({ "error": "Internal server error" }));
        }
    }

    #[tokio::test]
    async fn client_errors_keep_their_status() {
        assert_eq!(render(AppError::Unauthorized).await.0, StatusCode::UNAUTHORIZED);
        assert_eq!(
            render(AppError::BadRequest("bad slug".into())).await,
            (StatusCode::BAD_REQUEST, json!({ "error": "bad slug" }))
        );
        assert_eq!(
            render(AppError::Conflict("taken".into())).await.0,
            StatusCode::CONFLICT
        );
    }
}
