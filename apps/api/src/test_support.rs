//! Shared test doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::llm_client::{CompletionClient, CompletionRequest, CompletionResponse, LlmError};

type Script = Box<dyn Fn(usize) -> Result<CompletionResponse, LlmError> + Send + Sync>;

/// Fake completion endpoint: answers each call from a script keyed by the
/// zero-based call index and records the key and request it was sent.
pub struct ScriptedClient {
    script: Script,
    calls: AtomicUsize,
    pub seen: Mutex<Vec<(String, CompletionRequest)>>,
}

impl ScriptedClient {
    pub fn new(
        script: impl Fn(usize) -> Result<CompletionResponse, LlmError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Answers every call with the same message content.
    pub fn replying(content: &'static str) -> Arc<Self> {
        Self::new(move |_| Ok(reply(content)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((api_key.to_string(), request.clone()));
        (self.script)(n)
    }
}

pub fn reply(content: &str) -> CompletionResponse {
    serde_json::from_value(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
    .unwrap()
}

pub fn unavailable() -> LlmError {
    LlmError::Api {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}
