//! JD term extraction: frequency-ranked 1–3-grams from a job description.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9+#.\-]+").expect("valid token regex"));

pub const STOPWORDS: &[&str] = &[
    "and", "or", "the", "a", "an", "to", "for", "in", "of", "on", "with", "is", "are", "be", "as",
    "by", "we", "you", "your", "our", "this", "that", "these", "those",
];

const MAX_NGRAM: usize = 3;

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Lowercases and pulls out runs of letters, digits and `+ # . -` (so `c++`, `c#`, `node.js` survive).
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Space-joined windows of `n` consecutive tokens.
pub fn ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    tokens.windows(n).map(|window| window.join(" ")).collect()
}

/// Ranks candidate terms by frequency, then by word count, both descending.
/// Ties keep first-seen order.
pub fn extract_jd_terms(job_text: &str, top_n: usize) -> Vec<String> {
    let tokens: Vec<String> = tokenize(job_text)
        .into_iter()
        .filter(|t| !t.is_empty() && !is_stopword(t))
        .collect();

    let mut candidates: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for n in 1..=MAX_NGRAM {
        for gram in ngrams(&tokens, n) {
            let all_weak = gram
                .split(' ')
                .all(|w| is_stopword(w) || w.chars().count() < 2);
            if all_weak {
                continue;
            }
            match index.get(&gram) {
                Some(&i) => candidates[i].1 += 1,
                None => {
                    index.insert(gram.clone(), candidates.len());
                    candidates.push((gram, 1));
                }
            }
        }
    }

    // stable sort keeps first-seen order among equal keys
    candidates.sort_by(|(a_term, a_count), (b_term, b_count)| {
        (b_count, word_count(b_term)).cmp(&(a_count, word_count(a_term)))
    });

    candidates
        .into_iter()
        .take(top_n)
        .map(|(term, _)| term)
        .collect()
}

fn word_count(term: &str) -> usize {
    term.split(' ').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_tech_punctuation() {
        assert_eq!(
            tokenize("Senior C++/C# dev, Node.js & CI-CD!"),
            vec!["senior", "c++", "c#", "dev", "node.js", "ci-cd"]
        );
    }

    #[test]
    fn test_ngrams_windows() {
        let tokens: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ngrams(&tokens, 2), vec!["a b", "b c"]);
        assert_eq!(ngrams(&tokens, 3), vec!["a b c"]);
        assert!(ngrams(&tokens, 4).is_empty());
        assert!(ngrams(&tokens, 0).is_empty());
    }

    #[test]
    fn test_extract_jd_terms_drops_stopwords() {
        let terms = extract_jd_terms("The team and the product", 10);
        assert!(terms.iter().all(|t| !t.split(' ').any(is_stopword)));
        // equal counts: the longer gram ranks first
        assert_eq!(terms, vec!["team product", "team", "product"]);
    }

    #[test]
    fn test_extract_jd_terms_ranks_by_frequency_then_length() {
        let terms = extract_jd_terms("rust python rust python rust", 4);
        // rust x3; then the x2 grams, longest first, first-seen among equals
        assert_eq!(
            terms,
            vec!["rust", "rust python rust", "rust python", "python rust"]
        );
    }

    #[test]
    fn test_extract_jd_terms_skips_single_char_grams() {
        assert!(extract_jd_terms("x y", 10).is_empty());
        assert_eq!(extract_jd_terms("x ml", 10), vec!["x ml", "ml"]);
    }

    #[test]
    fn test_extract_jd_terms_respects_top_n() {
        let terms = extract_jd_terms("kubernetes docker terraform ansible", 2);
        assert_eq!(
            terms,
            vec!["kubernetes docker terraform", "docker terraform ansible"]
        );
    }

    #[test]
    fn test_extract_jd_terms_empty_text() {
        assert!(extract_jd_terms("", 40).is_empty());
    }
}
