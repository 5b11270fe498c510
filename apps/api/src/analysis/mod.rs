// Keyword analysis: resume text extraction, JD term ranking, coverage suggestions.
// Pure Rust, no LLM calls; the matched/missing terms feed the insight module.

pub mod extract;
pub mod handlers;
pub mod suggestions;
pub mod terms;
