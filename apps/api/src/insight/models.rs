//! Insight data model: the untrusted LLM payload and the canonical shape handed to the UI.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

// ────────────────────────────────────────────────────────────────────────────
// Priority labels
// ────────────────────────────────────────────────────────────────────────────

/// The only bucket names a consumer should expect in `NormalizedInsight.grouped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Critical,
    Important,
    NiceToHave,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Critical, Priority::Important, Priority::NiceToHave];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::Important => "Important",
            Priority::NiceToHave => "Nice-to-Have",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Raw payload (input)
// ────────────────────────────────────────────────────────────────────────────

/// Whatever the model call produced, in whatever shape it arrived.
///
/// Built either from a decoded JSON object (`from_value`) or from undecodable
/// text (`from_text`). No field is trusted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInsightPayload {
    pub insight: Option<String>,
    pub recommendations: Option<Vec<String>>,
    /// Label → skills, in the order the labels were encountered.
    pub grouped: Option<Vec<(String, Vec<String>)>>,
}

impl RawInsightPayload {
    /// Wraps free text that could not be decoded as JSON.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            insight: Some(text.into()),
            ..Self::default()
        }
    }

    /// Lenient conversion from an arbitrary JSON value.
    ///
    /// Objects contribute whichever of `insight`, `recommendations` and `grouped`
    /// have a usable shape. A bare JSON string is treated as insight text.
    /// Anything else yields an empty payload.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(fields) => Self {
                insight: fields
                    .get("insight")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                recommendations: fields
                    .get("recommendations")
                    .and_then(recommendation_list),
                grouped: fields
                    .get("grouped")
                    .and_then(Value::as_object)
                    .map(|groups| {
                        groups
                            .iter()
                            .map(|(label, skills)| {
                                (label.clone(), string_list(skills).unwrap_or_default())
                            })
                            .collect()
                    }),
            },
            Value::String(text) => Self::from_text(text.as_str()),
            _ => Self::default(),
        }
    }
}

/// Recommendations are sentences, so a single string is one item and never split on commas.
fn recommendation_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(list_item).collect()),
        Value::String(text) => Some(vec![text.clone()]),
        _ => None,
    }
}

/// Reads a JSON value as a list of skills, tolerating the shapes models drift into.
///
/// - array of strings: kept in order, non-string scalars skipped
/// - array item `{"skill": .., "recommendation": ..}`: rendered as `skill: recommendation`
/// - single string: comma separated list
fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(list_item).collect()),
        Value::String(text) => Some(
            text.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

fn list_item(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(fields) => {
            let skill = fields.get("skill").and_then(Value::as_str)?.trim();
            if skill.is_empty() {
                return None;
            }
            match fields
                .get("recommendation")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|r| !r.is_empty())
            {
                Some(rec) => Some(format!("{skill}: {rec}")),
                None => Some(skill.to_string()),
            }
        }
        _ => None,
    }
}

impl From<NormalizedInsight> for RawInsightPayload {
    fn from(normalized: NormalizedInsight) -> Self {
        Self {
            insight: Some(normalized.summary),
            recommendations: Some(normalized.recommendations),
            grouped: Some(normalized.grouped.into_entries()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Normalized output
// ────────────────────────────────────────────────────────────────────────────

/// Priority buckets in first-seen order. Serializes as a JSON object.
///
/// Pushing to an existing label appends rather than replaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillGroups {
    entries: Vec<(String, Vec<String>)>,
}

impl SkillGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend_label<I>(&mut self, label: &str, skills: I)
    where
        I: IntoIterator<Item = String>,
    {
        match self.entries.iter_mut().find(|(existing, _)| existing == label) {
            Some((_, list)) => list.extend(skills),
            None => self
                .entries
                .push((label.to_string(), skills.into_iter().collect())),
        }
    }

    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, skills)| skills.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_entries(self) -> Vec<(String, Vec<String>)> {
        self.entries
    }
}

impl Serialize for SkillGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, skills) in &self.entries {
            map.serialize_entry(label, skills)?;
        }
        map.end()
    }
}

/// The canonical contract the renderer relies on. All three fields are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedInsight {
    pub summary: String,
    pub recommendations: Vec<String>,
    pub grouped: SkillGroups,
}

/// Matched and missing terms from keyword analysis, sent to the insight source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillTerms {
    #[serde(default)]
    pub matched: Vec<String>,
    #[serde(default)]
    pub missing: Vec<String>,
}

impl SkillTerms {
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty() && self.missing.is_empty()
    }
}
