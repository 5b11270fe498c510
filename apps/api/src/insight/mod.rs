// Insight: turns LLM replies about skill gaps into one predictable shape.
// All LLM calls go through llm_client; the normalizer itself is pure.

pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod prompts;
pub mod source;
pub mod throttle;
