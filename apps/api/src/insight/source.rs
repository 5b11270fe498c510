//! Insight source: pluggable, trait-based producer of raw model replies.
//!
//! Default: `LlmInsightSource` (chat completion via `llm_client`).
//! `AppState` holds an `Arc<dyn InsightSource>`, so handlers never see the network.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::insight::models::{RawInsightPayload, SkillTerms};
use crate::insight::prompts::{build_insight_prompt, insight_system_prompt};
use crate::llm_client::{strip_json_fences, LlmClient};

/// What an insight source hands back: a decoded object, or text that would not decode.
#[derive(Debug, Clone, PartialEq)]
pub enum InsightReply {
    Structured(RawInsightPayload),
    Text(String),
}

impl InsightReply {
    /// Undecodable text is wrapped as `{ insight: <text> }`.
    pub fn into_payload(self) -> RawInsightPayload {
        match self {
            InsightReply::Structured(payload) => payload,
            InsightReply::Text(text) => RawInsightPayload::from_text(text),
        }
    }
}

/// The `fetch_insight(terms)` capability. Implement this to swap backends without
/// touching the handler or the normalizer.
#[async_trait]
pub trait InsightSource: Send + Sync {
    async fn fetch_insight(&self, terms: &SkillTerms) -> Result<InsightReply, AppError>;
}

/// Decodes a model reply. JSON objects (optionally fenced) become `Structured`,
/// a JSON string document is unwrapped, and anything else stays `Text`.
pub fn decode_reply(text: &str) -> InsightReply {
    let candidate = strip_json_fences(text);

    match serde_json::from_str::<serde_json::Value>(candidate) {
        Ok(value) if value.is_object() => {
            InsightReply::Structured(RawInsightPayload::from_value(&value))
        }
        Ok(serde_json::Value::String(inner)) => InsightReply::Text(inner),
        Ok(_) => {
            debug!("LLM reply is JSON but not an object; normalizing raw text");
            InsightReply::Text(text.to_string())
        }
        Err(e) => {
            debug!("LLM reply is not valid JSON ({e}); normalizing raw text");
            InsightReply::Text(text.to_string())
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmInsightSource: default implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmInsightSource(pub LlmClient);

#[async_trait]
impl InsightSource for LlmInsightSource {
    async fn fetch_insight(&self, terms: &SkillTerms) -> Result<InsightReply, AppError> {
        info!(
            "Requesting insight for {} matched / {} missing terms",
            terms.matched.len(),
            terms.missing.len()
        );

        let prompt = build_insight_prompt(terms);
        let text = self
            .0
            .call_text(&prompt, &insight_system_prompt())
            .await
            .map_err(|e| AppError::Llm(format!("Insight generation failed: {e}")))?;

        Ok(decode_reply(&text))
    }
}
