use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed filter / pagination input. Caller error, never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage fault. Transient; surfaced verbatim so an outer layer may retry.
    #[error("Retrieval error ({details}): {message}")]
    Retrieval {
        details: &'static str,
        message: String,
    },

    /// Employee-code allocation kept colliding with concurrent writers.
    #[error("Employee code allocation conflicted after {attempts} attempts")]
    SequencingConflict { attempts: u32 },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Retrieval {
            details: classify_sqlx_error(&err),
            message: err.to_string(),
        }
    }
}

/// Stable, machine-readable label for a storage fault.
pub fn classify_sqlx_error(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::PoolTimedOut => "pool_timed_out",
        sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => "pool_closed",
        sqlx::Error::Io(_) => "io",
        sqlx::Error::Tls(_) => "tls",
        sqlx::Error::Protocol(_) => "protocol",
        sqlx::Error::RowNotFound => "row_not_found",
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => "decode",
        sqlx::Error::Database(_) => "database",
        _ => "other",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Retrieval { details, message } => {
                tracing::error!(details = *details, "Retrieval error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RETRIEVAL_ERROR",
                    "A storage error occurred".to_string(),
                    Some(*details),
                )
            }
            AppError::SequencingConflict { attempts } => {
                tracing::warn!("Employee code allocation gave up after {attempts} attempts");
                (
                    StatusCode::CONFLICT,
                    "SEQUENCING_CONFLICT",
                    "Could not allocate a unique employee code; retry the request".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = json!(details);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
