//! Resume vs JD suggestions: keyword coverage plus two cheap heuristics.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::terms::extract_jd_terms;

/// Number of ranked JD terms checked against the resume.
const JD_TERM_LIMIT: usize = 60;
/// Max matched / missing terms echoed back per list.
const ITEMS_PER_LIST: usize = 12;
/// Fewer numeric mentions than this triggers the quantification hint.
const MIN_NUMERIC_MENTIONS: usize = 3;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,4}\b").expect("valid number regex"));

static YEARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\+?\s+years?").expect("valid years regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    Skills,
    Format,
    Experience,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionItems {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: SuggestionCategory,
    pub title: String,
    /// 0.0 – 1.0
    pub score: f64,
    pub items: Option<SuggestionItems>,
    pub message: String,
}

/// Compares resume text against the top JD terms and returns suggestions in display order:
/// skill coverage first, then the quantification and experience hints when they apply.
pub fn analyze_resume(resume_text: &str, job_text: &str) -> Vec<Suggestion> {
    let resume_lower = resume_text.to_lowercase();
    let jd_terms = extract_jd_terms(job_text, JD_TERM_LIMIT);

    let (matched, missing): (Vec<String>, Vec<String>) = jd_terms
        .iter()
        .cloned()
        .partition(|term| resume_lower.contains(term.as_str()));

    let score = round3(matched.len() as f64 / jd_terms.len().max(1) as f64);

    let mut suggestions = vec![Suggestion {
        category: SuggestionCategory::Skills,
        title: "Skill coverage".to_string(),
        score,
        message: format!(
            "Resume matches {} of {} prioritized JD terms ({}%). \
             Consider adding the missing skills/keywords in your summary or skills section.",
            matched.len(),
            jd_terms.len(),
            (score * 100.0) as u32
        ),
        items: Some(SuggestionItems {
            matched: matched.into_iter().take(ITEMS_PER_LIST).collect(),
            missing: missing.into_iter().take(ITEMS_PER_LIST).collect(),
        }),
    }];

    if NUMBER.find_iter(resume_text).count() < MIN_NUMERIC_MENTIONS {
        suggestions.push(Suggestion {
            category: SuggestionCategory::Format,
            title: "Quantify achievements".to_string(),
            score: 0.5,
            items: None,
            message: "Your resume has few numeric mentions. Try quantifying accomplishments \
                      (e.g. 'Reduced costs by 20%')."
                .to_string(),
        });
    }

    let jd_years = YEARS
        .captures(&job_text.to_lowercase())
        .and_then(|c| c.get(1).map(|m| m.as_str().to_string()));
    if let Some(years) = jd_years {
        if !YEARS.is_match(&resume_lower) {
            suggestions.push(Suggestion {
                category: SuggestionCategory::Experience,
                title: "Years of experience missing".to_string(),
                score: 0.2,
                items: None,
                message: format!(
                    "The job asks for ~{years} years. Consider making your relevant experience clearer."
                ),
            });
        }
    }

    suggestions
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
