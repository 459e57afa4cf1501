use std::time::Duration;

use anyhow::{Context, Result};

use crate::analysis::pipeline::RetryPolicy;
use crate::analysis::prompts::ANALYSIS_SYSTEM_PROMPT;

pub const DEFAULT_COMPLETION_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Application configuration loaded from environment variables.
/// Fails at startup only on malformed values; a missing API key is reported
/// per analysis as a configuration error.
#[derive(Debug, Clone)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub retry: RetryPolicy,
    pub port: u16,
    pub rust_log: String,
}

/// Everything the analysis pipeline needs, injected at construction.
#[derive(Clone)]
pub struct AnalysisConfig {
    pub api_key: Option<String>,
    pub completion_url: String,
    pub model: String,
    pub timeout: Duration,
    /// Ask the endpoint for `response_format: json_object`.
    pub json_mode: bool,
    pub system_prompt: String,
    /// Upper bound on resume text length, in characters. `None` = unbounded.
    pub max_resume_chars: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            completion_url: DEFAULT_COMPLETION_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            json_mode: false,
            system_prompt: ANALYSIS_SYSTEM_PROMPT.to_string(),
            max_resume_chars: None,
        }
    }
}

// Hand-written so the key never reaches the logs.
impl std::fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("completion_url", &self.completion_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("json_mode", &self.json_mode)
            .field("max_resume_chars", &self.max_resume_chars)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let system_prompt = match lookup("ANALYSIS_SYSTEM_PROMPT_FILE") {
            Some(path) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read system prompt file '{path}'"))?,
            None => ANALYSIS_SYSTEM_PROMPT.to_string(),
        };

        let analysis = AnalysisConfig {
            api_key: lookup("LOVABLE_API_KEY").filter(|k| !k.trim().is_empty()),
            completion_url: lookup("COMPLETION_API_URL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string()),
            model: lookup("COMPLETION_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(
                parse_or(&lookup, "COMPLETION_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            ),
            json_mode: parse_or(&lookup, "COMPLETION_JSON_MODE", false)?,
            system_prompt,
            max_resume_chars: parse_optional(&lookup, "MAX_RESUME_CHARS")?,
        };

        let retry = RetryPolicy {
            max_attempts: parse_or(&lookup, "UPSTREAM_MAX_ATTEMPTS", 1u32)?.max(1),
            base_delay: Duration::from_millis(parse_or(&lookup, "UPSTREAM_RETRY_BASE_MS", 1000)?),
        };

        Ok(Config {
            analysis,
            retry,
            port: parse_or(&lookup, "PORT", 8080u16)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse_optional(lookup, key)?.unwrap_or(default))
}

fn parse_optional<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'"))
        })
        .transpose()
}
