use std::sync::Arc;

use crate::config::Config;
use crate::insight::source::InsightSource;
use crate::insight::throttle::InsightThrottle;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable insight backend. Default: LlmInsightSource.
    pub insight_source: Arc<dyn InsightSource>,
    /// Process-wide spacing between insight calls, shared by every handler clone.
    pub insight_throttle: Arc<InsightThrottle>,
}

impl AppState {
    pub fn new(config: Config, insight_source: Arc<dyn InsightSource>) -> Self {
        let insight_throttle = Arc::new(InsightThrottle::new(config.insight_rate_limit));
        Self {
            config,
            insight_source,
            insight_throttle,
        }
    }
}
