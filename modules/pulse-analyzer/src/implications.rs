//! Implication generation: fixed rule order, all rules evaluated, capped.

use pulse_common::{
    DriftImplication, NarrativeTag, Persona, Severity, Snapshot, Stage, MAX_IMPLICATIONS,
};

use crate::tone::truncate;

/// Hero text is truncated to this many characters in the implication line.
const HERO_LINE_CHARS: usize = 100;
/// New nouns listed in the terminology implication.
const NOUNS_LISTED: usize = 5;

/// Generate 1-5 implications from the detected deltas.
///
/// Rules run in fixed order and are not mutually exclusive; the result is
/// truncated to the first five in generation order, so the hero-change
/// implication always keeps its slot when present. An empty rule set falls
/// back to a single low-severity "minor updates" implication.
pub fn generate_implications(
    baseline: &Snapshot,
    current: &Snapshot,
    new_nouns: &[String],
    _new_verbs: &[String],
    tone_shifts: &[String],
) -> Vec<DriftImplication> {
    let mut implications = Vec::new();

    if baseline.hero_text != current.hero_text {
        implications.push(DriftImplication {
            text: format!(
                "Hero text updated: \"{}...\"",
                truncate(&current.hero_text, HERO_LINE_CHARS)
            ),
            so_what: "Primary messaging has changed. Review their new positioning.".into(),
            narrative_tag: NarrativeTag::Trust,
            persona: Persona::Cto,
            stage: Stage::Awareness,
            severity: Severity::High,
        });
    }

    if !new_nouns.is_empty() {
        let listed: Vec<&str> = new_nouns
            .iter()
            .take(NOUNS_LISTED)
            .map(String::as_str)
            .collect();
        implications.push(DriftImplication {
            text: format!("New product terms added: {}", listed.join(", ")),
            so_what:
                "Competitor is introducing new features or capabilities. Investigate what they launched."
                    .into(),
            narrative_tag: NarrativeTag::Innovation,
            persona: Persona::VpEngineering,
            stage: Stage::Consideration,
            severity: Severity::Medium,
        });
    }

    for shift in tone_shifts {
        implications.push(DriftImplication {
            text: shift.clone(),
            so_what: "Strategic positioning change detected. Monitor their messaging evolution."
                .into(),
            narrative_tag: NarrativeTag::Control,
            persona: Persona::ProductManager,
            stage: Stage::Awareness,
            severity: Severity::Medium,
        });
    }

    if implications.is_empty() {
        implications.push(DriftImplication {
            text: "Minor updates detected in competitor messaging".into(),
            so_what: "Small textual changes - likely routine updates.".into(),
            narrative_tag: NarrativeTag::Trust,
            persona: Persona::Cto,
            stage: Stage::Awareness,
            severity: Severity::Low,
        });
    }

    implications.truncate(MAX_IMPLICATIONS);
    implications
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(hero: &str) -> Snapshot {
        Snapshot {
            id: Snapshot::new_id(),
            competitor_url: "https://example.com".into(),
            competitor_name: "Example".into(),
            captured_at: Utc::now(),
            hero_text: hero.into(),
            subheads: vec![],
            pricing_blocks: vec![],
            raw_html: String::new(),
        }
    }

    #[test]
    fn no_deltas_yields_single_low_fallback() {
        let a = snapshot("same");
        let imps = generate_implications(&a, &a, &[], &[], &[]);
        assert_eq!(imps.len(), 1);
        assert_eq!(imps[0].severity, Severity::Low);
        assert!(imps[0].text.contains("Minor updates"));
    }

    #[test]
    fn hero_change_yields_high_trust_cto_awareness() {
        let base = snapshot("Fast and simple");
        let cur = snapshot("AI-powered and secure");
        let imps = generate_implications(&base, &cur, &[], &[], &[]);
        let hero = &imps[0];
        assert_eq!(hero.severity, Severity::High);
        assert_eq!(hero.narrative_tag, NarrativeTag::Trust);
        assert_eq!(hero.persona, Persona::Cto);
        assert_eq!(hero.stage, Stage::Awareness);
        assert!(hero.text.contains("AI-powered and secure"));
    }

    #[test]
    fn new_nouns_list_at_most_five_terms() {
        let a = snapshot("same");
        let nouns: Vec<String> = (0..8).map(|i| format!("Term{i}")).collect();
        let imps = generate_implications(&a, &a, &nouns, &[], &[]);
        assert_eq!(imps.len(), 1);
        assert_eq!(imps[0].narrative_tag, NarrativeTag::Innovation);
        assert_eq!(imps[0].persona, Persona::VpEngineering);
        assert!(imps[0].text.ends_with("Term0, Term1, Term2, Term3, Term4"));
    }

    #[test]
    fn each_tone_shift_yields_one_implication() {
        let a = snapshot("same");
        let shifts = vec!["Added AI/ML positioning".to_string(), "Moving upmarket to enterprise".to_string()];
        let imps = generate_implications(&a, &a, &[], &[], &shifts);
        assert_eq!(imps.len(), 2);
        assert!(imps.iter().all(|i| i.narrative_tag == NarrativeTag::Control
            && i.persona == Persona::ProductManager
            && i.severity == Severity::Medium));
    }

    #[test]
    fn result_is_capped_at_five_and_hero_keeps_its_slot() {
        let base = snapshot("old hero");
        let cur = snapshot("new hero");
        let nouns = vec!["Gateway".to_string()];
        let shifts: Vec<String> = (0..6).map(|i| format!("shift {i}")).collect();
        let imps = generate_implications(&base, &cur, &nouns, &[], &shifts);
        assert_eq!(imps.len(), 5);
        assert!(imps[0].text.starts_with("Hero text updated"));
    }
}
