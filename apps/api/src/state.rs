use std::sync::Arc;

use crate::analysis::pipeline::{AnalysisPipeline, RetryPolicy};

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; concurrent requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
    /// Applied by the handlers around each analysis. Default: single attempt.
    pub retry: RetryPolicy,
}
