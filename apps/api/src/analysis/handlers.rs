//! Axum route handlers for the Analysis API.

use axum::{
    extract::{FromRequest, Multipart, State},
    Json,
};

use crate::analysis::document::{extract_resume_text, DocumentKind};
use crate::analysis::models::{AnalysisRequest, AnalysisResult};
use crate::errors::AppError;
use crate::state::AppState;

/// `Json` extractor whose rejections render as `AppError`.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// POST /api/v1/analyze-resume
///
/// Body: `{"resumeText": "...", "linkedinProfile": "..."}`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    AppJson(request): AppJson<AnalysisRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    run_analysis(&state, request).await
}

/// POST /api/v1/analyze-resume/upload
///
/// Multipart form: `resume` file field (PDF or plain text) and an optional
/// `linkedinProfile` text field. Unknown fields are ignored.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let mut resume_text = None;
    let mut linkedin_profile = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("resume") => {
                let kind = DocumentKind::detect(field.file_name(), field.content_type())?;
                let data = field.bytes().await?;
                resume_text = Some(extract_resume_text(kind, &data)?);
            }
            Some("linkedinProfile") => linkedin_profile = Some(field.text().await?),
            _ => {}
        }
    }

    let resume_text = resume_text
        .ok_or_else(|| AppError::InvalidRequest("multipart field 'resume' is required".to_string()))?;

    run_analysis(&state, AnalysisRequest::new(resume_text, linkedin_profile)).await
}

async fn run_analysis(
    state: &AppState,
    request: AnalysisRequest,
) -> Result<Json<AnalysisResult>, AppError> {
    check_request(&request, state.pipeline.config().max_resume_chars)?;
    let result = state
        .pipeline
        .analyze_with_retry(&request, &state.retry)
        .await?;
    Ok(Json(result))
}

fn check_request(request: &AnalysisRequest, max_chars: Option<usize>) -> Result<(), AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "resumeText cannot be empty".to_string(),
        ));
    }
    if let Some(max) = max_chars {
        let len = request.resume_text.chars().count();
        if len > max {
            return Err(AppError::InvalidRequest(format!(
                "resumeText is {len} characters; the limit is {max}"
            )));
        }
    }
    Ok(())
}
