use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store query failed: {0}")]
    Query(String),

    #[error("Index unreachable: {0}")]
    IndexUnreachable(String),

    #[error("Index query failed: {0}")]
    IndexQueryFailed(String),

    #[error("No stats snapshot available")]
    NoSnapshotAvailable,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Identity directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable name, returned to callers in the error body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::Query(_) => "query_error",
            AppError::IndexUnreachable(_) => "index_unreachable",
            AppError::IndexQueryFailed(_) => "index_query_failed",
            AppError::NoSnapshotAvailable => "no_snapshot_available",
            AppError::Validation(_) => "validation_error",
            AppError::DirectoryUnavailable(_) => "directory_unavailable",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked) => {
                AppError::StoreUnavailable(format!("store busy: {}", e))
            }
            _ => AppError::Query(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {}", e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        tracing::error!(status = %status, kind = self.kind(), error = %message);

        let body = json!({
            "data": null,
            "error": {
                "code": status.as_u16(),
                "kind": self.kind(),
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}
