//! Digest assembly and HTML email rendering.

use chrono::Utc;
use std::fmt::Write;

use pulse_common::{
    ActionItem, ActionStatus, DriftAnalysis, DriftImplication, MarketPulseReport, Severity,
    TRAJECTORY_THRESHOLD,
};

/// Implications surfaced in the digest's "key changes" section.
const TOP_IMPLICATIONS: usize = 10;

/// Aggregate one scan cycle's analyses and gated actions into a report.
/// Email-sent fields start false/None; the dispatcher fills them in after a
/// successful send.
pub fn build_report(
    drift_analyses: Vec<DriftAnalysis>,
    recommended_actions: Vec<ActionItem>,
) -> MarketPulseReport {
    let top_implications: Vec<DriftImplication> = drift_analyses
        .iter()
        .flat_map(|d| d.implications.iter())
        .filter(|i| matches!(i.severity, Severity::High | Severity::Medium))
        .take(TOP_IMPLICATIONS)
        .cloned()
        .collect();

    MarketPulseReport {
        id: MarketPulseReport::new_id(),
        generated_at: Utc::now(),
        drift_analyses,
        top_implications,
        recommended_actions,
        sent_via_email: false,
        sent_at: None,
    }
}

/// Render the Market Pulse email. Returns (subject, html body).
pub fn render_email(
    analyses: &[DriftAnalysis],
    actions: &[ActionItem],
) -> (String, String) {
    let changed: Vec<&DriftAnalysis> = analyses
        .iter()
        .filter(|d| d.drift_score >= TRAJECTORY_THRESHOLD)
        .collect();

    let subject = format!(
        "Market Pulse: {} Competitor Change{} Detected",
        changed.len(),
        if changed.len() == 1 { "" } else { "s" }
    );

    let top_implications: Vec<&DriftImplication> = analyses
        .iter()
        .flat_map(|d| d.implications.iter())
        .filter(|i| matches!(i.severity, Severity::High | Severity::Medium))
        .take(5)
        .collect();

    let validated: Vec<&ActionItem> = actions
        .iter()
        .filter(|a| a.status == ActionStatus::Validated)
        .collect();
    let unvalidated: Vec<&ActionItem> = actions
        .iter()
        .filter(|a| a.status == ActionStatus::InsufficientData)
        .collect();

    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html>\n<html>\n<body style=\"font-family: sans-serif; line-height: 1.6; color: #333;\">\n\
         <div style=\"max-width: 600px; margin: 0 auto; padding: 20px;\">\n",
    );
    let _ = write!(
        html,
        "<h1>Market Pulse Report</h1>\n<p>{}</p>\n\
         <p><em>Note: this report uses basic text comparison. Insights require manual review.</em></p>\n",
        Utc::now().format("%A, %B %-d, %Y")
    );

    html.push_str("<h2>Detected Changes</h2>\n");
    if changed.is_empty() {
        html.push_str("<p>No significant changes detected this week.</p>\n");
    }
    for drift in &changed {
        let _ = write!(
            html,
            "<div style=\"border-left: 4px solid #667eea; padding: 10px; margin-bottom: 10px;\">\n\
             <strong>{}</strong> — drift score {}<br/>\n",
            escape(&drift.competitor_name),
            drift.drift_score
        );
        if let Some(call) = &drift.trajectory_call {
            let _ = write!(html, "<strong>Signal:</strong> {}<br/>\n", escape(call));
        }
        if !drift.new_nouns.is_empty() {
            let _ = write!(
                html,
                "<strong>New Terms:</strong> {}<br/>\n",
                escape(&drift.new_nouns.join(", "))
            );
        }
        if !drift.tone_shifts.is_empty() {
            let _ = write!(
                html,
                "<strong>Changes:</strong> {}<br/>\n",
                escape(&drift.tone_shifts.join("; "))
            );
        }
        html.push_str("</div>\n");
    }

    html.push_str("<h2>Key Changes</h2>\n");
    for imp in &top_implications {
        let _ = write!(
            html,
            "<div style=\"border: 1px solid #e2e8f0; padding: 10px; margin-bottom: 8px;\">\n\
             <p><strong>{}</strong></p>\n<p>{}</p>\n<p><small>{} · {} · {}</small></p>\n</div>\n",
            escape(&imp.text),
            escape(&imp.so_what),
            imp.narrative_tag,
            imp.persona,
            imp.stage
        );
    }

    if !validated.is_empty() {
        html.push_str("<h2>Validated Counter-Moves</h2>\n");
        for action in &validated {
            let _ = write!(
                html,
                "<div style=\"border-left: 4px solid #48bb78; padding: 10px; margin-bottom: 8px;\">\n\
                 <p><strong>Line:</strong> {}</p>\n<p><strong>Proof:</strong> {}</p>\n\
                 <p><strong>Next Step:</strong> {}</p>\n</div>\n",
                escape(&action.line),
                escape(action.proof_id.as_deref().unwrap_or("")),
                escape(&action.next_step)
            );
        }
    }

    if !unvalidated.is_empty() {
        html.push_str("<h2>Requires Proof Validation</h2>\n");
        for action in &unvalidated {
            let _ = write!(
                html,
                "<div style=\"border-left: 4px solid #f56565; padding: 10px; margin-bottom: 8px;\">\n\
                 <p><strong>Line:</strong> {}</p>\n\
                 <p><strong>INSUFFICIENT DATA—PROOF NEEDED</strong></p>\n\
                 <p><strong>Next Step:</strong> {}</p>\n</div>\n",
                escape(&action.line),
                escape(&action.next_step)
            );
        }
    }

    html.push_str(
        "<hr/>\n<p><small>Generated by Market Sensor Engine</small></p>\n</div>\n</body>\n</html>\n",
    );

    (subject, html)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
