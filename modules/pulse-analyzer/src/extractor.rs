//! Text feature extraction: word lists and keyword-category counts.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static AI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(ai|artificial intelligence|machine learning|ml|neural|gpt|llm)\b").unwrap()
});
static ENTERPRISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(enterprise|business|organization|team|scale)\b").unwrap());
static SPEED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(fast|quick|instant|real-time|performance|latency)\b").unwrap()
});
static SECURITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(secure|security|encryption|compliance|private|privacy)\b").unwrap()
});
static COST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(free|cheap|affordable|cost|price|pricing)\b").unwrap());

/// Raw keyword-category match counts. Callers threshold these; no ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordCounts {
    pub ai: usize,
    pub enterprise: usize,
    pub speed: usize,
    pub security: usize,
    pub cost: usize,
}

/// Tokenize snapshot text into a set-like ordered word list.
///
/// Joins the inputs, splits on whitespace, strips every character outside
/// `[A-Za-z0-9-]`, and drops tokens of length <= 2. No stemming and no case
/// folding — capitalization is itself a signal for the noun heuristic.
pub fn extract_words<S: AsRef<str>>(texts: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut words = Vec::new();

    for text in texts {
        for token in text.as_ref().split_whitespace() {
            let word: String = token
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            if word.len() > 2 && seen.insert(word.clone()) {
                words.push(word);
            }
        }
    }

    words
}

/// Count word-boundary matches against the fixed category vocabularies.
/// Input is lowercased first; every match in a single pass is counted.
pub fn categorize_keywords(text: &str) -> KeywordCounts {
    let lower = text.to_lowercase();

    KeywordCounts {
        ai: AI_RE.find_iter(&lower).count(),
        enterprise: ENTERPRISE_RE.find_iter(&lower).count(),
        speed: SPEED_RE.find_iter(&lower).count(),
        security: SECURITY_RE.find_iter(&lower).count(),
        cost: COST_RE.find_iter(&lower).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_strips_punctuation_and_short_tokens() {
        let words = extract_words(&["Fast, simple & secure! Go AI now."]);
        assert_eq!(words, vec!["Fast", "simple", "secure"]);
    }

    #[test]
    fn extract_keeps_case_and_hyphens() {
        let words = extract_words(&["Real-time Analytics"]);
        assert_eq!(words, vec!["Real-time", "Analytics"]);
    }

    #[test]
    fn extract_dedupes_preserving_first_occurrence() {
        let words = extract_words(&["fast fast platform", "platform fast"]);
        assert_eq!(words, vec!["fast", "platform"]);
    }

    #[test]
    fn extract_is_deterministic() {
        let input = ["AI-powered platform for enterprise teams"];
        assert_eq!(extract_words(&input), extract_words(&input));
    }

    #[test]
    fn categorize_counts_word_boundary_matches() {
        let counts = categorize_keywords("AI and machine learning for the enterprise");
        assert_eq!(counts.ai, 2);
        assert_eq!(counts.enterprise, 1);
        assert_eq!(counts.speed, 0);
    }

    #[test]
    fn categorize_does_not_match_inside_words() {
        // "maintain" contains "ai" but not on a word boundary
        let counts = categorize_keywords("we maintain the system");
        assert_eq!(counts.ai, 0);
    }

    #[test]
    fn categorize_is_case_insensitive() {
        let counts = categorize_keywords("SECURE and Private PRICING");
        assert_eq!(counts.security, 2);
        assert_eq!(counts.cost, 1);
    }
}
