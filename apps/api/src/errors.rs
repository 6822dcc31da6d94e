use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::saga::AnalysisError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Analysis(e) => {
                // The step tag keeps the failure attributable in logs; the
                // user only sees the generic message for that failure class.
                tracing::error!(step = e.step(), error = %e, "job analysis failed");
                let (status, code) = match e {
                    AnalysisError::RunTimedOut => {
                        (StatusCode::GATEWAY_TIMEOUT, "ANALYSIS_TIMEOUT")
                    }
                    AnalysisError::Cancelled => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "ANALYSIS_CANCELLED")
                    }
                    _ => (StatusCode::BAD_GATEWAY, "ANALYSIS_FAILED"),
                };
                (status, code, e.user_message().to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
