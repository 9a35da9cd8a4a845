//! HTTP error types
//!
//! Maps the conversion taxonomy onto response statuses: 400 for invalid
//! input, 504 for timeouts, 500 for everything else, with a distinct
//! structured body when an entire batch fails.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::convert::{ConversionFailure, ConvertError};

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Every item in a batch failed; reported distinctly from partial
    /// failure so callers can branch on the status alone.
    #[error("All {total} conversions failed")]
    BatchFailed {
        total: usize,
        failures: Vec<ConversionFailure>,
    },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Body for a whole-batch failure, listing every per-item descriptor.
#[derive(Serialize)]
struct BatchErrorResponse {
    error: String,
    message: String,
    total: usize,
    failures: Vec<ConversionFailure>,
}

fn error_response(status: StatusCode, error_type: &str, message: String) -> Response {
    let body = Json(ErrorResponse {
        error: error_type.to_string(),
        message,
    });
    (status, body).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => {
                error_response(StatusCode::BAD_REQUEST, "bad_request", msg)
            }
            AppError::Convert(err) => {
                let message = err.to_string();
                match err {
                    ConvertError::Timeout { .. } => {
                        error_response(StatusCode::GATEWAY_TIMEOUT, "timeout", message)
                    }
                    ConvertError::EngineUnavailable(_) => {
                        tracing::error!("{}", message);
                        error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "engine_unavailable",
                            message,
                        )
                    }
                    ConvertError::Failed { .. } => {
                        tracing::error!("{}", message);
                        error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "conversion_failed",
                            message,
                        )
                    }
                }
            }
            AppError::BatchFailed { total, failures } => {
                tracing::error!("All {} conversions in batch failed", total);
                let body = BatchErrorResponse {
                    error: "all_conversions_failed".to_string(),
                    message: format!("All {} conversions failed", total),
                    total,
                    failures,
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            AppError::Archive(e) => {
                tracing::error!("Archive error: {}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "archive_error",
                    "Failed to build result archive".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        }
    }
}
