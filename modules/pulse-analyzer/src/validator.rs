//! Proof matching and action validation.
//!
//! The safety gate: no counter-move is ever reported as validated without a
//! traceable evidence record. The gate is binary existence-of-match — proof
//! freshness and expiry are not consulted.

use anyhow::Result;
use async_trait::async_trait;

use pulse_common::{ActionItem, ActionStatus, DriftImplication, NarrativeTag, Persona, ProofRecord, Stage};

/// Safety-stop next-step for actions with no backing evidence.
pub const INSUFFICIENT_DATA_NEXT_STEP: &str =
    "[INSUFFICIENT DATA—PROOF NEEDED] Add proof to vault to validate this counter-move";

/// Next-step for actions backed by a proof record.
pub const VALIDATED_NEXT_STEP: &str = "Review proof and decide on counter-messaging strategy";

/// Explicit optional-filter query for the proof vault. The validator always
/// supplies all three fields; partial queries exist for the operator search
/// surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProofQuery {
    pub narrative_tag: Option<NarrativeTag>,
    pub persona: Option<Persona>,
    pub stage: Option<Stage>,
}

impl ProofQuery {
    /// Exact-match filter on all three routing tags.
    pub fn exact(narrative_tag: NarrativeTag, persona: Persona, stage: Stage) -> Self {
        Self {
            narrative_tag: Some(narrative_tag),
            persona: Some(persona),
            stage: Some(stage),
        }
    }

    pub fn matches(&self, proof: &ProofRecord) -> bool {
        if self.narrative_tag.is_some_and(|t| proof.narrative_tag != t) {
            return false;
        }
        if self.persona.is_some_and(|p| proof.persona_tag != p) {
            return false;
        }
        if self.stage.is_some_and(|s| proof.stage != s) {
            return false;
        }
        true
    }
}

/// Read-only proof lookup, implemented by the store collaborator.
/// Match ordering among ties is the implementor's concern.
#[async_trait]
pub trait ProofSearch: Send + Sync {
    async fn search_proofs(&self, query: &ProofQuery) -> Result<Vec<ProofRecord>>;
}

/// Produce one ActionItem per implication, in input order, gated on the
/// existence of a proof record matching (narrative_tag, persona, stage).
pub async fn validate(
    proofs: &dyn ProofSearch,
    implications: &[DriftImplication],
) -> Result<Vec<ActionItem>> {
    let mut actions = Vec::with_capacity(implications.len());

    for implication in implications {
        let query = ProofQuery::exact(
            implication.narrative_tag,
            implication.persona,
            implication.stage,
        );
        let matches = proofs.search_proofs(&query).await?;

        let action = match matches.first() {
            Some(proof) => ActionItem {
                line: implication.text.clone(),
                proof_id: Some(proof.proof_id.clone()),
                next_step: VALIDATED_NEXT_STEP.to_string(),
                narrative_tag: implication.narrative_tag,
                persona: implication.persona,
                stage: implication.stage,
                status: ActionStatus::Validated,
            },
            None => ActionItem {
                line: implication.text.clone(),
                proof_id: None,
                next_step: INSUFFICIENT_DATA_NEXT_STEP.to_string(),
                narrative_tag: implication.narrative_tag,
                persona: implication.persona,
                stage: implication.stage,
                status: ActionStatus::InsufficientData,
            },
        };
        actions.push(action);
    }

    Ok(actions)
}

// ---------------------------------------------------------------------------
// MemoryProofVault (tests — no store required)
// ---------------------------------------------------------------------------

/// In-memory proof vault for testing the validation gate.
#[derive(Debug, Default)]
pub struct MemoryProofVault {
    proofs: Vec<ProofRecord>,
}

impl MemoryProofVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proofs(proofs: Vec<ProofRecord>) -> Self {
        Self { proofs }
    }

    pub fn add(&mut self, proof: ProofRecord) {
        self.proofs.push(proof);
    }
}

#[async_trait]
impl ProofSearch for MemoryProofVault {
    async fn search_proofs(&self, query: &ProofQuery) -> Result<Vec<ProofRecord>> {
        Ok(self
            .proofs
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pulse_common::Severity;

    fn proof(tag: NarrativeTag, persona: Persona, stage: Stage) -> ProofRecord {
        let now = Utc::now();
        ProofRecord {
            proof_id: ProofRecord::derive_id(tag, persona, now),
            evidence_sentence: "Benchmark shows 2x throughput".into(),
            source_link: "https://example.com/benchmark".into(),
            persona_tag: persona,
            narrative_tag: tag,
            stage,
            expiry_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn implication(tag: NarrativeTag, persona: Persona, stage: Stage) -> DriftImplication {
        DriftImplication {
            text: "New product terms added: Gateway".into(),
            so_what: "Investigate".into(),
            narrative_tag: tag,
            persona,
            stage,
            severity: Severity::Medium,
        }
    }

    #[tokio::test]
    async fn matching_proof_validates_the_action() {
        let vault = MemoryProofVault::with_proofs(vec![proof(
            NarrativeTag::Innovation,
            Persona::VpEngineering,
            Stage::Consideration,
        )]);
        let imps = vec![implication(
            NarrativeTag::Innovation,
            Persona::VpEngineering,
            Stage::Consideration,
        )];

        let actions = validate(&vault, &imps).await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].status, ActionStatus::Validated);
        assert!(actions[0].proof_id.is_some());
        assert_eq!(actions[0].next_step, VALIDATED_NEXT_STEP);
    }

    #[tokio::test]
    async fn empty_vault_marks_insufficient_data() {
        let vault = MemoryProofVault::new();
        let imps = vec![implication(
            NarrativeTag::Innovation,
            Persona::VpEngineering,
            Stage::Consideration,
        )];

        let actions = validate(&vault, &imps).await.unwrap();
        assert_eq!(actions[0].status, ActionStatus::InsufficientData);
        assert!(actions[0].proof_id.is_none());
        assert!(actions[0].next_step.contains("INSUFFICIENT DATA"));
    }

    #[tokio::test]
    async fn all_three_tags_must_match() {
        // Same narrative and persona, different stage — no match.
        let vault = MemoryProofVault::with_proofs(vec![proof(
            NarrativeTag::Innovation,
            Persona::VpEngineering,
            Stage::Decision,
        )]);
        let imps = vec![implication(
            NarrativeTag::Innovation,
            Persona::VpEngineering,
            Stage::Consideration,
        )];

        let actions = validate(&vault, &imps).await.unwrap();
        assert_eq!(actions[0].status, ActionStatus::InsufficientData);
    }

    #[tokio::test]
    async fn one_action_per_implication_in_input_order() {
        let vault = MemoryProofVault::with_proofs(vec![proof(
            NarrativeTag::Trust,
            Persona::Cto,
            Stage::Awareness,
        )]);
        let imps = vec![
            implication(NarrativeTag::Control, Persona::ProductManager, Stage::Awareness),
            implication(NarrativeTag::Trust, Persona::Cto, Stage::Awareness),
            implication(NarrativeTag::Cost, Persona::Cfo, Stage::Decision),
        ];

        let actions = validate(&vault, &imps).await.unwrap();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0].status, ActionStatus::InsufficientData);
        assert_eq!(actions[1].status, ActionStatus::Validated);
        assert_eq!(actions[2].status, ActionStatus::InsufficientData);
        for (action, imp) in actions.iter().zip(&imps) {
            assert_eq!(action.line, imp.text);
        }
    }

    #[tokio::test]
    async fn validated_iff_proof_id_present() {
        let vault = MemoryProofVault::with_proofs(vec![proof(
            NarrativeTag::Trust,
            Persona::Cto,
            Stage::Awareness,
        )]);
        let imps = vec![
            implication(NarrativeTag::Trust, Persona::Cto, Stage::Awareness),
            implication(NarrativeTag::Speed, Persona::Cfo, Stage::Decision),
        ];
        let actions = validate(&vault, &imps).await.unwrap();
        for action in actions {
            assert_eq!(
                action.status == ActionStatus::Validated,
                action.proof_id.is_some()
            );
        }
    }

    #[tokio::test]
    async fn expired_proof_still_validates() {
        // Expiry is descriptive only — the gate never consults it.
        let mut expired = proof(NarrativeTag::Trust, Persona::Cto, Stage::Awareness);
        expired.expiry_date = Some(Utc::now() - Duration::days(30));
        let vault = MemoryProofVault::with_proofs(vec![expired]);

        let imps = vec![implication(NarrativeTag::Trust, Persona::Cto, Stage::Awareness)];
        let actions = validate(&vault, &imps).await.unwrap();
        assert_eq!(actions[0].status, ActionStatus::Validated);
    }
}
