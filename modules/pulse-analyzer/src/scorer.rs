//! Drift scoring: additive, capped per signal, globally capped at 100.
//!
//! Each contributing factor is independently visible and bounded, trading
//! precision for auditability.

use pulse_common::Snapshot;

use crate::extractor::extract_words;

/// Points for an exact hero-text change.
const HERO_CHANGE_POINTS: u8 = 30;
/// Points per index-aligned subhead difference.
const SUBHEAD_DIFF_POINTS: usize = 10;
/// Cap on the subhead factor.
const SUBHEAD_CAP: usize = 30;
/// Points when any positionally-aligned pricing block differs.
const PRICING_CHANGE_POINTS: u8 = 20;
/// Points per word present in current but not in baseline.
const NEW_WORD_POINTS: usize = 2;
/// Cap on the new-vocabulary factor.
const NEW_WORD_CAP: usize = 20;

/// Score the drift between two snapshots of the same competitor, 0-100.
///
/// Subheads and pricing blocks are compared strictly positionally:
/// reordering unchanged content registers as drift. Invariant of the
/// published score, not an oversight.
pub fn drift_score(baseline: &Snapshot, current: &Snapshot) -> u8 {
    let new_word_count = new_words(baseline, current).len();
    drift_score_with_new_words(baseline, current, new_word_count)
}

/// Words present in `current`'s hero+subheads+pricing but absent from
/// `baseline`'s, in first-occurrence order.
pub fn new_words(baseline: &Snapshot, current: &Snapshot) -> Vec<String> {
    let baseline_words = extract_words(&snapshot_texts(baseline));
    let current_words = extract_words(&snapshot_texts(current));

    current_words
        .into_iter()
        .filter(|w| !baseline_words.contains(w))
        .collect()
}

pub(crate) fn snapshot_texts(snapshot: &Snapshot) -> Vec<String> {
    let mut texts = vec![snapshot.hero_text.clone()];
    texts.extend(snapshot.subheads.iter().cloned());
    texts.extend(snapshot.pricing_blocks.iter().cloned());
    texts
}

pub(crate) fn drift_score_with_new_words(
    baseline: &Snapshot,
    current: &Snapshot,
    new_word_count: usize,
) -> u8 {
    let mut score: usize = 0;

    // Hero text change (high impact, exact string inequality)
    if baseline.hero_text != current.hero_text {
        score += HERO_CHANGE_POINTS as usize;
    }

    // Subhead changes, index-aligned against the current list
    let subhead_changes = current
        .subheads
        .iter()
        .enumerate()
        .filter(|&(i, sh)| baseline.subheads.get(i) != Some(sh))
        .count();
    score += (subhead_changes * SUBHEAD_DIFF_POINTS).min(SUBHEAD_CAP);

    // Pricing changes (high impact)
    let pricing_changed = current
        .pricing_blocks
        .iter()
        .enumerate()
        .any(|(i, pb)| baseline.pricing_blocks.get(i) != Some(pb));
    if pricing_changed {
        score += PRICING_CHANGE_POINTS as usize;
    }

    // New vocabulary
    score += (new_word_count * NEW_WORD_POINTS).min(NEW_WORD_CAP);

    score.min(100) as u8
}
