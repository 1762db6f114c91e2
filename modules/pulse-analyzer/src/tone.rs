//! Tone-shift detection over keyword-category deltas.

use pulse_common::Snapshot;

use crate::extractor::categorize_keywords;

/// A category crosses into "positioning" territory at this many matches.
const POSITIONING_THRESHOLD: usize = 2;
/// A speed-count drop larger than this reads as de-emphasis.
const SPEED_DROP_SLACK: usize = 1;
/// Hero text is truncated to this many characters in the shift message.
const HERO_PREVIEW_CHARS: usize = 50;

/// Detect tone shifts between two snapshots, in fixed order: hero change
/// first, then AI, then enterprise, then speed. The checks are independent —
/// zero, one, or several may fire for one comparison.
pub fn detect_tone_shifts(baseline: &Snapshot, current: &Snapshot) -> Vec<String> {
    let mut shifts = Vec::new();

    if baseline.hero_text != current.hero_text {
        shifts.push(format!(
            "Hero text changed from \"{}...\" to \"{}...\"",
            truncate(&baseline.hero_text, HERO_PREVIEW_CHARS),
            truncate(&current.hero_text, HERO_PREVIEW_CHARS),
        ));
    }

    let baseline_counts =
        categorize_keywords(&format!("{} {}", baseline.hero_text, baseline.subheads.join(" ")));
    let current_counts =
        categorize_keywords(&format!("{} {}", current.hero_text, current.subheads.join(" ")));

    if baseline_counts.ai < POSITIONING_THRESHOLD && current_counts.ai >= POSITIONING_THRESHOLD {
        shifts.push("Added AI/ML positioning".to_string());
    }
    if baseline_counts.enterprise < POSITIONING_THRESHOLD
        && current_counts.enterprise >= POSITIONING_THRESHOLD
    {
        shifts.push("Moving upmarket to enterprise".to_string());
    }
    if baseline_counts.speed > current_counts.speed + SPEED_DROP_SLACK {
        shifts.push("De-emphasizing speed/performance".to_string());
    }

    shifts
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
