//! Axum route handlers for the Insight API.

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::insight::models::{NormalizedInsight, RawInsightPayload, SkillTerms};
use crate::insight::normalizer::normalize;
use crate::state::AppState;

/// POST /api/v1/insight
///
/// Asks the insight source about the matched / missing terms and returns the normalized reply.
/// Rejected with 429 when called again inside the configured interval.
pub async fn handle_generate_insight(
    State(state): State<AppState>,
    Json(terms): Json<SkillTerms>,
) -> Result<Json<NormalizedInsight>, AppError> {
    if terms.is_empty() {
        return Err(AppError::Validation(
            "No skills provided for analysis".to_string(),
        ));
    }

    if !state.insight_throttle.try_acquire() {
        return Err(AppError::RateLimited);
    }

    let reply = state.insight_source.fetch_insight(&terms).await?;
    let insight = normalize(reply.into_payload());

    info!(
        "Insight normalized: {} recommendations, {} priority groups",
        insight.recommendations.len(),
        insight.grouped.len()
    );

    Ok(Json(insight))
}

/// POST /api/v1/insight/normalize
///
/// Normalizes a reply the caller already has. Accepts an object or a bare string.
pub async fn handle_normalize(Json(raw): Json<Value>) -> Json<NormalizedInsight> {
    Json(normalize(RawInsightPayload::from_value(&raw)))
}
