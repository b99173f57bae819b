use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use lexora_inbox::InboxError;
use lexora_types::api::ErrorResponse;

/// Handler errors. Rendered as `{ "error", "error_code" }` with the
/// matching status so clients never have to guess from an empty body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed identifier or missing/invalid field (400)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing or bad credentials (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated but acting on someone else's data (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate username or email (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database unreachable or failing (503)
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Wraps a storage failure. The detail is logged, not sent to clients.
    pub fn store(err: anyhow::Error) -> Self {
        error!("Store error: {:#}", err);
        ApiError::StoreUnavailable("database unavailable".into())
    }

    /// Like [`ApiError::store`], but a constraint violation (a concurrent
    /// writer claimed the same unique value first) becomes `Conflict`.
    pub fn store_or_conflict(err: anyhow::Error, conflict: &str) -> Self {
        if lexora_db::is_constraint_violation(&err) {
            warn!("Constraint violation: {:#}", err);
            ApiError::Conflict(conflict.to_string())
        } else {
            ApiError::store(err)
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<InboxError> for ApiError {
    fn from(err: InboxError) -> Self {
        match err {
            InboxError::InvalidArgument(msg) => ApiError::InvalidArgument(msg),
            InboxError::StoreUnavailable(msg) => {
                error!("Inbox store error: {}", msg);
                ApiError::StoreUnavailable("database unavailable".into())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(error_code, error_message = %message, "Request failed");
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(error_code, error_message = %message, "Auth error");
        }

        let body = ErrorResponse {
            error: message,
            error_code: error_code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Runs blocking database work off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal("worker task failed".into())
    })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbox_errors_keep_their_kind() {
        let invalid: ApiError = InboxError::InvalidArgument("bad id".into()).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.error_code(), "INVALID_ARGUMENT");

        let down: ApiError = InboxError::StoreUnavailable("disk I/O error".into()).into();
        assert_eq!(down.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!down.to_string().contains("disk"));
    }

    #[test]
    fn only_constraint_failures_become_conflicts() {
        let other = ApiError::store_or_conflict(anyhow::anyhow!("disk I/O error"), "taken");
        assert_eq!(other.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(other.error_code(), "STORE_UNAVAILABLE");
    }
}
