//! Heuristic word-class tagging.
//!
//! Regex/suffix/capitalization approximations, not grammar. Isolated behind
//! a trait so a real POS tagger could replace this unit without touching the
//! scorer or the implication generator — they only consume counts and lists.

/// Class flags for a single word. A word may be both noun-like and
/// verb-like, and then appears in both lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordClass {
    pub is_noun_like: bool,
    pub is_verb_like: bool,
}

pub trait WordClassifier: Send + Sync {
    fn classify(&self, word: &str) -> WordClass;
}

/// The default classifier: length/capitalization for nouns, literal
/// suffixes for verbs.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicClassifier;

const VERB_SUFFIXES: [&str; 4] = ["ing", "ed", "ify", "ize"];

impl WordClassifier for HeuristicClassifier {
    fn classify(&self, word: &str) -> WordClass {
        let is_noun_like =
            word.chars().count() > 4 && word.chars().next().is_some_and(|c| c.is_uppercase());
        let is_verb_like = VERB_SUFFIXES.iter().any(|s| word.ends_with(s));
        WordClass {
            is_noun_like,
            is_verb_like,
        }
    }
}
