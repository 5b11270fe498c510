//! Insight Normalizer: recovers `NormalizedInsight` from whatever the model returned.
//!
//! Preference is tiered per field: an already structured field wins outright,
//! otherwise the field is mined from the `insight` text. The text is expected to
//! look roughly like:
//!
//! ```text
//! Insight Summary: <narrative>
//! Recommendations:
//! 1. ...
//! Group by Priority:
//! High: skill, skill
//! ```
//!
//! Every branch has a defined fallback, so `normalize` is total.

use std::sync::LazyLock;

use regex::Regex;

use crate::insight::models::{NormalizedInsight, Priority, RawInsightPayload, SkillGroups};

static INSIGHT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*Insight Summary:?\s*").expect("valid header regex"));

static RECOMMENDATIONS_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Recommendations:").expect("valid marker regex"));

static GROUPING_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Group by Priority:|Group by:|Skills Relevance to Job Description:")
        .expect("valid marker regex")
});

static ENUMERATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[.)]\s*").expect("valid enumeration regex"));

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\s+").expect("valid sentence regex"));

/// Label synonyms the model uses interchangeably. Matched case-insensitively.
const PRIORITY_SYNONYMS: &[(&str, Priority)] = &[
    ("High", Priority::Critical),
    ("Medium", Priority::Important),
    ("Low", Priority::NiceToHave),
    ("Critical", Priority::Critical),
    ("Important", Priority::Important),
    ("Nice-to-Have", Priority::NiceToHave),
];

/// The three text regions of a free-form insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections<'a> {
    pub narrative: &'a str,
    pub recommendations: &'a str,
    pub grouping: &'a str,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Converts a raw model payload into the canonical shape. Never fails.
pub fn normalize(raw: RawInsightPayload) -> NormalizedInsight {
    let RawInsightPayload {
        insight,
        recommendations,
        grouped,
    } = raw;

    let original = insight.as_deref().unwrap_or("").trim();
    let text = strip_insight_header(original);
    let sections = split_sections(text);

    let recommendations = match recommendations {
        Some(list) if !list.is_empty() => list,
        _ => parse_recommendations_block(sections.recommendations),
    };

    let grouped = match grouped {
        Some(groups) if !groups.is_empty() => canonicalize_groups(groups),
        _ => canonicalize_groups(parse_grouped_block(sections.grouping)),
    };

    let mut summary = sections.narrative.to_string();
    if summary.is_empty() && recommendations.is_empty() && grouped.is_empty() {
        // Nothing structural survived; keep the text rather than render a blank panel.
        summary = original.to_string();
    }

    NormalizedInsight {
        summary,
        recommendations,
        grouped,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Named steps
// ────────────────────────────────────────────────────────────────────────────

/// Removes a leading `Insight Summary:` label (colon optional, any case).
pub fn strip_insight_header(text: &str) -> &str {
    match INSIGHT_HEADER.find(text) {
        Some(m) => text[m.end()..].trim(),
        None => text.trim(),
    }
}

/// Splits `text` around the first match of `marker`, dropping the marker itself.
fn split_on_first<'a>(text: &'a str, marker: &Regex) -> Option<(&'a str, &'a str)> {
    marker
        .find(text)
        .map(|m| (&text[..m.start()], &text[m.end()..]))
}

/// Narrative before `Recommendations:`, recommendations up to the first grouping
/// header, grouping after it. Without the recommendations marker everything is narrative.
pub fn split_sections(text: &str) -> Sections<'_> {
    let Some((narrative, rest)) = split_on_first(text, &RECOMMENDATIONS_MARKER) else {
        return Sections {
            narrative: text.trim(),
            recommendations: "",
            grouping: "",
        };
    };

    let (recommendations, grouping) = split_on_first(rest, &GROUPING_MARKER).unwrap_or((rest, ""));

    Sections {
        narrative: narrative.trim(),
        recommendations: recommendations.trim(),
        grouping: grouping.trim(),
    }
}

fn non_empty_lines(block: &str) -> Vec<&str> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// True for lines such as `1. Do X` or `12) Do Y`.
pub fn has_enumeration_marker(line: &str) -> bool {
    ENUMERATION_MARKER.is_match(line)
}

/// Strips the enumeration marker, or returns `None` when the line has none.
pub fn strip_enumeration_marker(line: &str) -> Option<&str> {
    ENUMERATION_MARKER
        .find(line)
        .map(|m| line[m.end()..].trim())
}

/// Breaks prose after every period followed by whitespace. The period stays with its sentence.
///
/// Naive on purpose: abbreviations and decimals followed by a space are split too.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_BREAK.find_iter(text) {
        // +1 keeps the period, which is a single byte
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Numbered lines win; otherwise one recommendation per line; a single line is split into sentences.
pub fn parse_recommendations_block(block: &str) -> Vec<String> {
    let lines = non_empty_lines(block);
    if lines.is_empty() {
        return Vec::new();
    }

    if lines.iter().any(|line| has_enumeration_marker(line)) {
        return lines
            .iter()
            .filter_map(|line| strip_enumeration_marker(line))
            .filter(|rec| !rec.is_empty())
            .map(str::to_string)
            .collect();
    }

    if lines.len() > 1 {
        return lines.into_iter().map(str::to_string).collect();
    }

    split_sentences(lines[0])
}

/// Reads `Label: a, b, c` lines. Repeated labels accumulate; lines without a label are skipped.
pub fn parse_grouped_block(block: &str) -> Vec<(String, Vec<String>)> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();

    for line in non_empty_lines(block) {
        let Some((label, rest)) = line.split_once(':') else {
            continue;
        };
        let label = label.trim();
        if label.is_empty() {
            continue;
        }

        let skills = rest
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        match groups.iter_mut().find(|(existing, _)| existing == label) {
            Some((_, list)) => list.extend(skills),
            None => groups.push((label.to_string(), skills.collect())),
        }
    }

    groups
}

/// Maps a priority synonym to its canonical label; unknown labels pass through trimmed.
pub fn canonical_label(label: &str) -> &str {
    let label = label.trim();
    PRIORITY_SYNONYMS
        .iter()
        .find(|(synonym, _)| synonym.eq_ignore_ascii_case(label))
        .map(|(_, priority)| priority.as_str())
        .unwrap_or(label)
}

fn canonicalize_groups(groups: Vec<(String, Vec<String>)>) -> SkillGroups {
    let mut canonical = SkillGroups::new();
    for (label, skills) in groups {
        canonical.extend_label(canonical_label(&label), skills);
    }
    canonical
}
