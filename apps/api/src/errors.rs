use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::document::DocumentError;
use crate::analysis::error::AnalysisError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Invalid JSON body: {0}")]
    JsonBody(#[from] JsonRejection),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Document(e) => (StatusCode::BAD_REQUEST, "invalid_request", e.to_string()),
            AppError::Multipart(e) => {
                (StatusCode::BAD_REQUEST, "invalid_request", e.body_text())
            }
            AppError::JsonBody(e) => (StatusCode::BAD_REQUEST, "invalid_request", e.body_text()),
            AppError::Analysis(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.kind(), client_message(e))
            }
        };

        let body = Json(json!({
            "error": {
                "kind": kind,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Logs the full error and returns the text that is safe to show a client.
/// Upstream bodies and raw model output stay in the logs.
fn client_message(e: &AnalysisError) -> String {
    match e {
        AnalysisError::Configuration(msg) => {
            tracing::error!("Analysis misconfigured: {msg}");
            "The analysis service is not configured".to_string()
        }
        AnalysisError::Upstream { status, message } => {
            tracing::error!("Upstream error (status {status:?}): {message}");
            match status {
                Some(s) => format!("The AI service returned an error (status {s})"),
                None => "The AI service could not be reached".to_string(),
            }
        }
        AnalysisError::MalformedResponse { message, raw } => {
            tracing::error!("Malformed AI response: {message}; raw={raw:?}");
            "The AI service returned a response that could not be parsed".to_string()
        }
        AnalysisError::Validation(_) => {
            tracing::error!("AI response failed validation: {e}");
            e.to_string()
        }
    }
}
