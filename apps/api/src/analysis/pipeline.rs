//! Analysis pipeline: one resume in, one validated `AnalysisResult` out.
//!
//! Flow per call: credential check → prompt → single completion call →
//! brace extraction → JSON parse → schema/range validation.
//! No state is kept between calls and nothing is cached.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::error::AnalysisError;
use crate::analysis::extract::extract_json_object;
use crate::analysis::models::{AnalysisRequest, AnalysisResult};
use crate::analysis::prompts::build_messages;
use crate::analysis::validation::validate_analysis;
use crate::config::AnalysisConfig;
use crate::llm_client::{CompletionClient, CompletionRequest, ResponseFormat};

/// Caller-side retry for upstream failures. One attempt means no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based): base, 2×base, 4×base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

pub struct AnalysisPipeline {
    config: AnalysisConfig,
    client: Arc<dyn CompletionClient>,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig, client: Arc<dyn CompletionClient>) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs one analysis. Makes at most one upstream call and never retries.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AnalysisError::Configuration("LOVABLE_API_KEY is not configured".to_string())
            })?;

        let span = info_span!("analyze_resume", analysis_id = %Uuid::new_v4());

        async move {
            let completion_request = CompletionRequest {
                model: self.config.model.clone(),
                messages: build_messages(&self.config.system_prompt, request),
                response_format: self.config.json_mode.then(ResponseFormat::json_object),
            };

            info!(
                "Requesting analysis: model={}, resume_chars={}, profile={}",
                completion_request.model,
                request.resume_text.chars().count(),
                request.profile().is_some()
            );

            let response = self
                .client
                .complete(api_key, &completion_request)
                .await
                .map_err(|e| {
                    warn!("Completion call failed: {e}");
                    AnalysisError::from(e)
                })?;

            let text = response
                .text()
                .ok_or_else(|| AnalysisError::MalformedResponse {
                    message: "completion contained no message content".to_string(),
                    raw: None,
                })?;

            let result = parse_reply(text)?;
            info!(
                "Analysis complete: ats_score={}, skills={}, jobs={}",
                result.ats_score,
                result.skills.len(),
                result.job_recommendations.len()
            );
            Ok::<_, AnalysisError>(result)
        }
        .instrument(span)
        .await
    }

    /// `analyze`, retried on upstream failures with exponential backoff.
    /// Every other failure is returned on the spot.
    pub async fn analyze_with_retry(
        &self,
        request: &AnalysisRequest,
        policy: &RetryPolicy,
    ) -> Result<AnalysisResult, AnalysisError> {
        let mut attempt = 1;
        loop {
            match self.analyze(request).await {
                Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        "Analysis attempt {} failed ({}), retrying after {}ms...",
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }
}

/// Extracts, parses and validates the model's free-form reply.
pub fn parse_reply(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let json = extract_json_object(text).ok_or_else(|| AnalysisError::MalformedResponse {
        message: "no JSON object found in completion".to_string(),
        raw: Some(text.to_string()),
    })?;

    let value: Value =
        serde_json::from_str(json).map_err(|e| AnalysisError::MalformedResponse {
            message: format!("completion JSON could not be parsed: {e}"),
            raw: Some(json.to_string()),
        })?;

    validate_analysis(value).map_err(AnalysisError::Validation)
}
