// All LLM prompt constants for the Insight module.
// Reuses cross-cutting fragments from llm_client::prompts.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::insight::models::{Priority, SkillTerms};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(matched|missing|labels)\}").expect("valid placeholder regex")
});

/// Persona for insight generation. `JSON_ONLY_SYSTEM` is appended by `insight_system_prompt`.
pub const INSIGHT_PERSONA: &str = "You are a detailed resume analysis assistant. \
    Provide actionable, structured insights. \
    Highlight strengths, skill gaps, and grouped missing skills.";

/// Insight prompt template. Replace `{matched}`, `{missing}` and `{labels}` before sending.
pub const INSIGHT_PROMPT_TEMPLATE: &str = r#"You are analyzing a resume against a job description.

Matched skills: {matched}
Missing skills: {missing}

Return a JSON object with this EXACT schema (no extra fields):
{
  "insight": "A clear paragraph summarizing the candidate's strengths and gaps.",
  "recommendations": [
    "Recommendation 1 in clear English",
    "Recommendation 2"
  ],
  "grouped": {
    "Critical": ["Skill with 1-2 lines of context on why it is critical"],
    "Important": ["Skill with 1-2 lines of context on why it is important"],
    "Nice-to-Have": ["Skill with 1-2 lines of context on why it helps but is not required"]
  }
}

Rules:
- Use exactly these keys in "grouped": {labels}. Always include all of them, even if one is empty.
- Each skill entry should have a short description, not just the name.
- Keep descriptions concise but informative.
- Give 3 to 5 recommendations, each a single actionable statement."#;

pub fn insight_system_prompt() -> String {
    format!("{INSIGHT_PERSONA} {JSON_ONLY_SYSTEM}")
}

pub fn build_insight_prompt(terms: &SkillTerms) -> String {
    let labels = Priority::ALL
        .iter()
        .map(|p| format!("\"{}\"", p.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    let matched = term_list(&terms.matched);
    let missing = term_list(&terms.missing);

    // Single pass: substituted terms are never rescanned for placeholders.
    PLACEHOLDER
        .replace_all(INSIGHT_PROMPT_TEMPLATE, |caps: &Captures| match &caps[1] {
            "matched" => matched.clone(),
            "missing" => missing.clone(),
            _ => labels.clone(),
        })
        .into_owned()
}

fn term_list(terms: &[String]) -> String {
    if terms.is_empty() {
        "(none)".to_string()
    } else {
        terms.join(", ")
    }
}
