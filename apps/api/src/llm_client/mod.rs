//! LLM Client: the single point of entry for chat-completion calls.
//!
//! ARCHITECTURAL RULE: No other module may call the completion endpoint directly.
//! All LLM interactions MUST go through a `CompletionClient`.
//!
//! Wire format: OpenAI-compatible `/v1/chat/completions` with bearer auth.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("undecodable completion body: {message}")]
    Decode { message: String, raw: String },
}

impl LlmError {
    /// HTTP status returned by the endpoint, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Api { status, .. } => Some(*status),
            LlmError::Http(e) => e.status().map(|s| s.as_u16()),
            LlmError::Timeout(_) | LlmError::Decode { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: &'static str,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl CompletionResponse {
    /// Text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

/// The completion client trait. The pipeline only ever talks to this seam,
/// so tests can swap in a recording fake.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError>;
}

/// HTTP implementation against a chat-completions endpoint.
/// Makes exactly one request per call; retries belong to the caller.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: url.into(),
            timeout,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Completion API returned {}: {}", status, body);
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let completion: CompletionResponse =
            serde_json::from_slice(&body).map_err(|e| LlmError::Decode {
                message: e.to_string(),
                raw: String::from_utf8_lossy(&body).into_owned(),
            })?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Completion call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(completion)
    }
}

impl LlmClient {
    fn classify(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Http(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_without_response_format() {
        let request = CompletionRequest {
            model: "google/gemini-2.5-flash".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            response_format: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "google/gemini-2.5-flash");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_request_serializes_json_mode() {
        let request = CompletionRequest {
            model: "m".to_string(),
            messages: vec![],
            response_format: Some(ResponseFormat::json_object()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_response_text_reads_first_choice() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"first"}},{"message":{"content":"second"}}]}"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), Some("first"));
        assert!(response.usage.is_none());
    }

    #[test]
    fn test_response_without_choices_has_no_text() {
        let response: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_response_null_content_has_no_text() {
        let body = r#"{"choices":[{"message":{"content":null}}],"usage":{"prompt_tokens":10,"completion_tokens":0,"total_tokens":10}}"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), None);
        assert_eq!(response.usage.unwrap().prompt_tokens, 10);
    }

    #[test]
    fn test_api_error_exposes_status() {
        let err = LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(LlmError::Timeout(Duration::from_secs(1)).status(), None);
    }

    #[test]
    fn test_partial_usage_still_decodes() {
        let body = r#"{"choices":[{"message":{"content":"{}"}}],"usage":{"prompt_tokens":10,"total_tokens":10}}"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), Some("{}"));
        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 10);
        assert_eq!(usage.completion_tokens, 0);
    }

    mod http {
        use std::sync::{Arc, Mutex};

        use axum::http::{header, HeaderMap, StatusCode};
        use axum::routing::post;
        use axum::{Json, Router};
        use serde_json::{json, Value};

        use super::*;

        type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

        /// Serves `router` on an ephemeral local port and returns the
        /// completions URL.
        async fn serve(router: Router) -> String {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, router).await.unwrap();
            });
            format!("http://{addr}/v1/chat/completions")
        }

        fn recording_endpoint(seen: Seen, reply: Value) -> Router {
            Router::new().route(
                "/v1/chat/completions",
                post(move |headers: HeaderMap, Json(body): Json<Value>| {
                    let seen = seen.clone();
                    let reply = reply.clone();
                    async move {
                        let auth = headers
                            .get(header::AUTHORIZATION)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen.lock().unwrap().push((auth, body));
                        Json(reply)
                    }
                }),
            )
        }

        fn request(response_format: Option<ResponseFormat>) -> CompletionRequest {
            CompletionRequest {
                model: "google/gemini-2.5-flash".to_string(),
                messages: vec![ChatMessage::system("sys"), ChatMessage::user("cv")],
                response_format,
            }
        }

        #[tokio::test]
        async fn test_posts_bearer_and_body() {
            let seen: Seen = Arc::default();
            let reply = json!({
                "choices": [{"message": {"role": "assistant", "content": "{\"atsScore\":80}"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 7}
            });
            let url = serve(recording_endpoint(seen.clone(), reply)).await;
            let client = LlmClient::new(url, Duration::from_secs(5)).unwrap();

            let response = client.complete("secret-key", &request(None)).await.unwrap();
            assert_eq!(response.text(), Some("{\"atsScore\":80}"));

            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 1);
            let (auth, body) = &seen[0];
            assert_eq!(auth.as_deref(), Some("Bearer secret-key"));
            assert_eq!(body["model"], "google/gemini-2.5-flash");
            assert_eq!(body["messages"][0]["role"], "system");
            assert_eq!(body["messages"][0]["content"], "sys");
            assert_eq!(body["messages"][1]["role"], "user");
            assert_eq!(body["messages"][1]["content"], "cv");
            assert!(body.get("response_format").is_none());
        }

        #[tokio::test]
        async fn test_json_mode_reaches_the_wire() {
            let seen: Seen = Arc::default();
            let reply = json!({"choices": [{"message": {"content": "{}"}}]});
            let url = serve(recording_endpoint(seen.clone(), reply)).await;
            let client = LlmClient::new(url, Duration::from_secs(5)).unwrap();

            client
                .complete("k", &request(Some(ResponseFormat::json_object())))
                .await
                .unwrap();

            let seen = seen.lock().unwrap();
            assert_eq!(seen[0].1["response_format"]["type"], "json_object");
        }

        #[tokio::test]
        async fn test_error_status_uses_error_body_message() {
            let router = Router::new().route(
                "/v1/chat/completions",
                post(|| async {
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        Json(json!({"error": {"message": "model overloaded"}})),
                    )
                }),
            );
            let url = serve(router).await;
            let client = LlmClient::new(url, Duration::from_secs(5)).unwrap();

            match client.complete("k", &request(None)).await {
                Err(LlmError::Api { status, message }) => {
                    assert_eq!(status, 503);
                    assert_eq!(message, "model overloaded");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_error_status_with_plain_body_keeps_body() {
            let router = Router::new().route(
                "/v1/chat/completions",
                post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
            );
            let url = serve(router).await;
            let client = LlmClient::new(url, Duration::from_secs(5)).unwrap();

            match client.complete("k", &request(None)).await {
                Err(LlmError::Api { status, message }) => {
                    assert_eq!(status, 429);
                    assert_eq!(message, "slow down");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_success_with_html_body_is_decode_error() {
            let router = Router::new().route(
                "/v1/chat/completions",
                post(|| async {
                    (
                        [(header::CONTENT_TYPE, "text/html")],
                        "<html>gateway page</html>",
                    )
                }),
            );
            let url = serve(router).await;
            let client = LlmClient::new(url, Duration::from_secs(5)).unwrap();

            match client.complete("k", &request(None)).await {
                Err(LlmError::Decode { raw, .. }) => {
                    assert_eq!(raw, "<html>gateway page</html>");
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_slow_endpoint_times_out() {
            let router = Router::new().route(
                "/v1/chat/completions",
                post(|| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    Json(json!({"choices": []}))
                }),
            );
            let url = serve(router).await;
            let timeout = Duration::from_millis(300);
            let client = LlmClient::new(url, timeout).unwrap();

            match client.complete("k", &request(None)).await {
                Err(LlmError::Timeout(after)) => assert_eq!(after, timeout),
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
