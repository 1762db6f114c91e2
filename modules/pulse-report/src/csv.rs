//! CSV export: one row per implication, joined with its gated action.

use pulse_common::{ActionItem, DriftAnalysis};

const HEADERS: [&str; 11] = [
    "Date",
    "Competitor",
    "Drift Score",
    "Implication",
    "So What",
    "Narrative Tag",
    "Persona",
    "Stage",
    "Severity",
    "Proof ID",
    "Action Status",
];

/// Flatten analyses (each paired with its recomputed action items, aligned
/// by implication index) into a CSV document.
pub fn export_csv(rows: &[(DriftAnalysis, Vec<ActionItem>)]) -> String {
    let mut lines = Vec::new();
    lines.push(HEADERS.map(String::from).join(","));

    for (analysis, actions) in rows {
        for (i, imp) in analysis.implications.iter().enumerate() {
            let action = actions.get(i);
            let cells = [
                analysis.analyzed_at.format("%Y-%m-%d").to_string(),
                analysis.competitor_name.clone(),
                analysis.drift_score.to_string(),
                imp.text.clone(),
                imp.so_what.clone(),
                imp.narrative_tag.to_string(),
                imp.persona.to_string(),
                imp.stage.to_string(),
                imp.severity.to_string(),
                action
                    .and_then(|a| a.proof_id.clone())
                    .unwrap_or_default(),
                action.map(|a| a.status.to_string()).unwrap_or_default(),
            ];
            lines.push(
                cells
                    .iter()
                    .map(|c| quote(c))
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }
    }

    lines.join("\n")
}

/// Quote a cell when it contains a comma, quote, or newline; double
/// embedded quotes.
fn quote(cell: &str) -> String {
    let escaped = cell.replace('"', "\"\"");
    if escaped.contains(',') || escaped.contains('"') || escaped.contains('\n') {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pulse_common::{
        ActionStatus, DriftImplication, NarrativeTag, Persona, Severity, Stage,
    };

    fn fixture() -> (DriftAnalysis, Vec<ActionItem>) {
        let analysis = DriftAnalysis {
            id: DriftAnalysis::new_id(),
            competitor_url: "https://rival.example.com".into(),
            competitor_name: "Rival, Inc.".into(),
            analyzed_at: Utc::now(),
            drift_score: 34,
            new_nouns: vec![],
            new_verbs: vec![],
            tone_shifts: vec![],
            implications: vec![DriftImplication {
                text: "Hero text updated: \"AI-powered\"".into(),
                so_what: "Review positioning".into(),
                narrative_tag: NarrativeTag::Trust,
                persona: Persona::Cto,
                stage: Stage::Awareness,
                severity: Severity::High,
            }],
            trajectory_call: Some("Significant language drift detected".into()),
        };
        let actions = vec![ActionItem {
            line: analysis.implications[0].text.clone(),
            proof_id: Some("PROOF-TRUST-CTO-X".into()),
            next_step: "Review proof".into(),
            narrative_tag: NarrativeTag::Trust,
            persona: Persona::Cto,
            stage: Stage::Awareness,
            status: ActionStatus::Validated,
        }];
        (analysis, actions)
    }

    #[test]
    fn exports_header_plus_one_row_per_implication() {
        let csv = export_csv(&[fixture()]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Date,Competitor,Drift Score"));
        assert!(lines[1].contains("PROOF-TRUST-CTO-X"));
        assert!(lines[1].contains("VALIDATED"));
    }

    #[test]
    fn cells_with_commas_and_quotes_are_quoted() {
        let csv = export_csv(&[fixture()]);
        // Competitor name contains a comma; implication text contains quotes.
        assert!(csv.contains("\"Rival, Inc.\""));
        assert!(csv.contains("\"Hero text updated: \"\"AI-powered\"\"\""));
    }

    #[test]
    fn missing_action_leaves_proof_and_status_empty() {
        let (analysis, _) = fixture();
        let csv = export_csv(&[(analysis, vec![])]);
        let last = csv.lines().last().unwrap();
        assert!(last.ends_with(",,"));
    }
}
