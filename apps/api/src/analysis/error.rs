use thiserror::Error;

use crate::analysis::validation::ValidationIssue;
use crate::llm_client::LlmError;

/// Every way a single analysis can fail. All variants are terminal for the
/// invocation; only `Upstream` is worth retrying.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream error{}: {message}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Upstream { status: Option<u16>, message: String },

    /// `raw` holds the offending model output for server-side diagnostics.
    /// It is never sent to clients.
    #[error("Malformed response: {message}")]
    MalformedResponse {
        message: String,
        raw: Option<String>,
    },

    #[error("Validation error: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),
}

impl AnalysisError {
    /// Stable machine-readable tag used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Configuration(_) => "configuration_error",
            AnalysisError::Upstream { .. } => "upstream_error",
            AnalysisError::MalformedResponse { .. } => "malformed_response",
            AnalysisError::Validation(_) => "validation_error",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalysisError::Upstream { .. })
    }
}

impl From<LlmError> for AnalysisError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Decode { message, raw } => AnalysisError::MalformedResponse {
                message: format!("completion body is not valid JSON: {message}"),
                raw: Some(raw),
            },
            other => AnalysisError::Upstream {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
