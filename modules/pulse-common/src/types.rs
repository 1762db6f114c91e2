use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Bounds and thresholds ---

/// Subheads retained per snapshot.
pub const SNAPSHOT_MAX_SUBHEADS: usize = 10;

/// Pricing blocks retained per snapshot.
pub const SNAPSHOT_MAX_PRICING_BLOCKS: usize = 5;

/// New nouns/verbs retained per analysis.
pub const MAX_NEW_TERMS: usize = 10;

/// Implications retained per analysis.
pub const MAX_IMPLICATIONS: usize = 5;

/// Drift score at or above which a trajectory call is made and a
/// competitor counts as "changed" in the Market Pulse digest.
pub const TRAJECTORY_THRESHOLD: u8 = 30;

// --- Enums (closed sets — values outside these are a caller error) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NarrativeTag {
    Trust,
    Speed,
    Control,
    Innovation,
    Cost,
    Security,
}

impl std::fmt::Display for NarrativeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NarrativeTag::Trust => write!(f, "Trust"),
            NarrativeTag::Speed => write!(f, "Speed"),
            NarrativeTag::Control => write!(f, "Control"),
            NarrativeTag::Innovation => write!(f, "Innovation"),
            NarrativeTag::Cost => write!(f, "Cost"),
            NarrativeTag::Security => write!(f, "Security"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    #[serde(rename = "CTO")]
    Cto,
    #[serde(rename = "CFO")]
    Cfo,
    #[serde(rename = "Data Engineer")]
    DataEngineer,
    #[serde(rename = "VP Engineering")]
    VpEngineering,
    #[serde(rename = "Product Manager")]
    ProductManager,
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Persona::Cto => write!(f, "CTO"),
            Persona::Cfo => write!(f, "CFO"),
            Persona::DataEngineer => write!(f, "Data Engineer"),
            Persona::VpEngineering => write!(f, "VP Engineering"),
            Persona::ProductManager => write!(f, "Product Manager"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Awareness,
    Consideration,
    Decision,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Awareness => write!(f, "Awareness"),
            Stage::Consideration => write!(f, "Consideration"),
            Stage::Decision => write!(f, "Decision"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    Validated,
    InsufficientData,
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionStatus::Validated => write!(f, "VALIDATED"),
            ActionStatus::InsufficientData => write!(f, "INSUFFICIENT_DATA"),
        }
    }
}

// --- Snapshot ---

/// Immutable capture of one competitor page at one point in time.
/// Never mutated after creation; superseded (not deleted) by later captures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub competitor_url: String,
    pub competitor_name: String,
    pub captured_at: DateTime<Utc>,
    pub hero_text: String,
    pub subheads: Vec<String>,
    pub pricing_blocks: Vec<String>,
    /// Retained for audit only — never analyzed.
    pub raw_html: String,
}

impl Snapshot {
    pub fn new_id() -> String {
        format!("snapshot-{}", Uuid::new_v4())
    }
}

// --- Drift analysis ---

/// One observation derived from a detected drift, tagged for routing
/// to the right audience and funnel stage. Exists only inside a
/// DriftAnalysis — never persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftImplication {
    pub text: String,
    pub so_what: String,
    pub narrative_tag: NarrativeTag,
    pub persona: Persona,
    pub stage: Stage,
    pub severity: Severity,
}

/// Derived, immutable comparison of exactly two snapshots of the same
/// competitor. The score is a deterministic pure function of the two
/// snapshots' textual fields only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftAnalysis {
    pub id: String,
    pub competitor_url: String,
    pub competitor_name: String,
    pub analyzed_at: DateTime<Utc>,
    pub drift_score: u8,
    pub new_nouns: Vec<String>,
    pub new_verbs: Vec<String>,
    pub tone_shifts: Vec<String>,
    pub implications: Vec<DriftImplication>,
    /// Present iff drift_score >= TRAJECTORY_THRESHOLD.
    pub trajectory_call: Option<String>,
}

impl DriftAnalysis {
    pub fn new_id() -> String {
        format!("drift-{}", Uuid::new_v4())
    }
}

// --- Proof vault ---

/// Durable evidence unit backing a competitive counter-claim.
/// Created by an operator, deleted explicitly. The expiry date is
/// descriptive only — matching never enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRecord {
    pub proof_id: String,
    pub evidence_sentence: String,
    pub source_link: String,
    pub persona_tag: Persona,
    pub narrative_tag: NarrativeTag,
    pub stage: Stage,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProofRecord {
    /// Derive the proof identifier from its routing tags plus a
    /// time-based suffix, e.g. `PROOF-TRUST-CTO-MBXK2J01`.
    pub fn derive_id(narrative_tag: NarrativeTag, persona: Persona, at: DateTime<Utc>) -> String {
        let tag = narrative_tag.to_string().to_uppercase();
        let persona_compact: String = persona
            .to_string()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let suffix = base36(at.timestamp_millis().max(0) as u64).to_uppercase();
        format!("PROOF-{tag}-{persona_compact}-{suffix}")
    }
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}

// --- Action items ---

/// A proposed counter-move, gated by proof availability. Ephemeral:
/// recomputed on every report generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub line: String,
    pub proof_id: Option<String>,
    pub next_step: String,
    pub narrative_tag: NarrativeTag,
    pub persona: Persona,
    pub stage: Stage,
    pub status: ActionStatus,
}

// --- Market Pulse report ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPulseReport {
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub drift_analyses: Vec<DriftAnalysis>,
    pub top_implications: Vec<DriftImplication>,
    pub recommended_actions: Vec<ActionItem>,
    pub sent_via_email: bool,
    pub sent_at: Option<DateTime<Utc>>,
}

impl MarketPulseReport {
    pub fn new_id() -> String {
        format!("report-{}", Uuid::new_v4())
    }
}

// --- Competitor configuration ---

/// Operator-managed scan target. The url is the identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorConfig {
    pub url: String,
    pub name: String,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scanned: Option<DateTime<Utc>>,
    pub added_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn enums_serialize_to_wire_literals() {
        assert_eq!(
            serde_json::to_string(&NarrativeTag::Innovation).unwrap(),
            "\"Innovation\""
        );
        assert_eq!(
            serde_json::to_string(&Persona::VpEngineering).unwrap(),
            "\"VP Engineering\""
        );
        assert_eq!(
            serde_json::to_string(&Stage::Consideration).unwrap(),
            "\"Consideration\""
        );
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::to_string(&ActionStatus::InsufficientData).unwrap(),
            "\"INSUFFICIENT_DATA\""
        );
    }

    #[test]
    fn action_item_uses_stable_field_names() {
        let item = ActionItem {
            line: "x".into(),
            proof_id: None,
            next_step: "y".into(),
            narrative_tag: NarrativeTag::Trust,
            persona: Persona::Cto,
            stage: Stage::Awareness,
            status: ActionStatus::Validated,
        };
        let v = serde_json::to_value(&item).unwrap();
        for key in ["line", "proofId", "nextStep", "narrativeTag", "persona", "stage", "status"] {
            assert!(v.get(key).is_some(), "missing field {key}");
        }
        assert_eq!(v["status"], "VALIDATED");
    }

    #[test]
    fn proof_id_derivation_is_deterministic() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let a = ProofRecord::derive_id(NarrativeTag::Innovation, Persona::VpEngineering, at);
        let b = ProofRecord::derive_id(NarrativeTag::Innovation, Persona::VpEngineering, at);
        assert_eq!(a, b);
        assert!(a.starts_with("PROOF-INNOVATION-VPEngineering-"));
        assert!(!a.contains(' '));
    }

    #[test]
    fn base36_round_numbers() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
    }
}
