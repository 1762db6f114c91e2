//! Assembly: two snapshots in, one DriftAnalysis out.

use chrono::Utc;

use pulse_common::{DriftAnalysis, Snapshot, MAX_NEW_TERMS, TRAJECTORY_THRESHOLD};

use crate::classify::{HeuristicClassifier, WordClassifier};
use crate::implications::generate_implications;
use crate::scorer::{drift_score_with_new_words, new_words};
use crate::tone::detect_tone_shifts;

/// Trajectory call text attached when the score crosses the threshold.
const TRAJECTORY_CALL: &str = "Significant language drift detected";

/// Compare a baseline and a current snapshot of the same competitor.
/// Deterministic over the snapshots' textual fields; the id and timestamp
/// are the only non-pure parts of the result.
pub fn analyze_drift(baseline: &Snapshot, current: &Snapshot) -> DriftAnalysis {
    analyze_drift_with(&HeuristicClassifier, baseline, current)
}

/// Same as [`analyze_drift`] with an explicit word-class strategy.
pub fn analyze_drift_with(
    classifier: &dyn WordClassifier,
    baseline: &Snapshot,
    current: &Snapshot,
) -> DriftAnalysis {
    let fresh_words = new_words(baseline, current);

    let mut new_nouns = Vec::new();
    let mut new_verbs = Vec::new();
    for word in &fresh_words {
        let class = classifier.classify(word);
        if class.is_noun_like {
            new_nouns.push(word.clone());
        }
        if class.is_verb_like {
            new_verbs.push(word.clone());
        }
    }
    new_nouns.truncate(MAX_NEW_TERMS);
    new_verbs.truncate(MAX_NEW_TERMS);

    let tone_shifts = detect_tone_shifts(baseline, current);
    let score = drift_score_with_new_words(baseline, current, fresh_words.len());
    let implications =
        generate_implications(baseline, current, &new_nouns, &new_verbs, &tone_shifts);

    DriftAnalysis {
        id: DriftAnalysis::new_id(),
        competitor_url: current.competitor_url.clone(),
        competitor_name: current.competitor_name.clone(),
        analyzed_at: Utc::now(),
        drift_score: score,
        new_nouns,
        new_verbs,
        tone_shifts,
        implications,
        trajectory_call: (score >= TRAJECTORY_THRESHOLD).then(|| TRAJECTORY_CALL.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pulse_common::Severity;

    fn snapshot(hero: &str, subheads: &[&str], pricing: &[&str]) -> Snapshot {
        Snapshot {
            id: Snapshot::new_id(),
            competitor_url: "https://example.com".into(),
            competitor_name: "Example".into(),
            captured_at: Utc::now(),
            hero_text: hero.into(),
            subheads: subheads.iter().map(|s| s.to_string()).collect(),
            pricing_blocks: pricing.iter().map(|s| s.to_string()).collect(),
            raw_html: String::new(),
        }
    }

    #[test]
    fn hero_change_scores_at_least_thirty_with_trajectory_call() {
        let base = snapshot("Fast and simple", &["Built for teams"], &["$9 monthly"]);
        let mut cur = base.clone();
        cur.hero_text = "AI-powered and secure".into();

        let analysis = analyze_drift(&base, &cur);
        assert!(analysis.drift_score >= 30);
        assert!(analysis.trajectory_call.is_some());
        assert!(analysis
            .implications
            .iter()
            .any(|i| i.severity == Severity::High && i.text.starts_with("Hero text updated")));
    }

    #[test]
    fn identical_snapshots_yield_zero_and_fallback_implication() {
        let a = snapshot("Fast and simple", &["Built for teams"], &["$9 monthly"]);
        let analysis = analyze_drift(&a, &a.clone());
        assert_eq!(analysis.drift_score, 0);
        assert!(analysis.trajectory_call.is_none());
        assert!(analysis.tone_shifts.is_empty());
        assert_eq!(analysis.implications.len(), 1);
        assert_eq!(analysis.implications[0].severity, Severity::Low);
    }

    #[test]
    fn new_capitalized_words_surface_as_nouns() {
        let base = snapshot("A data platform", &[], &[]);
        let cur = snapshot("A data platform with Observability and tracing", &[], &[]);
        let analysis = analyze_drift(&base, &cur);
        assert!(analysis.new_nouns.contains(&"Observability".to_string()));
        assert!(analysis.new_verbs.contains(&"tracing".to_string()));
    }

    #[test]
    fn noun_and_verb_lists_are_capped_at_ten() {
        let base = snapshot("base", &[], &[]);
        let many: Vec<String> = (0..15).map(|i| format!("Feature{i:02}shipped")).collect();
        let cur = snapshot(&many.join(" "), &[], &[]);
        let analysis = analyze_drift(&base, &cur);
        assert!(analysis.new_nouns.len() <= 10);
        assert!(analysis.new_verbs.len() <= 10);
    }

    #[test]
    fn analysis_fields_are_deterministic_across_calls() {
        let base = snapshot("Fast and simple", &["Built for teams"], &["$9 monthly"]);
        let cur = snapshot("AI-powered and secure", &["Built for enterprise"], &["$19 monthly"]);
        let a = analyze_drift(&base, &cur);
        let b = analyze_drift(&base, &cur);
        assert_eq!(a.drift_score, b.drift_score);
        assert_eq!(a.new_nouns, b.new_nouns);
        assert_eq!(a.new_verbs, b.new_verbs);
        assert_eq!(a.tone_shifts, b.tone_shifts);
        assert_eq!(a.implications.len(), b.implications.len());
    }
}
