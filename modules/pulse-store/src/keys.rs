//! Redis key scheme. One entity per key, JSON values, plus index
//! sets/lists for enumeration.

pub fn competitor_config(url: &str) -> String {
    format!("competitor:config:{url}")
}

/// Set of competitor urls.
pub const COMPETITOR_CONFIGS: &str = "competitor:configs";

pub fn snapshot(id: &str) -> String {
    format!("snapshot:{id}")
}

/// Per-competitor list of snapshot ids, newest first.
pub fn snapshots_by_competitor(url: &str) -> String {
    format!("snapshots:{url}")
}

pub fn drift_analysis(id: &str) -> String {
    format!("drift:{id}")
}

/// Per-competitor list of analysis ids, newest first.
pub fn drift_by_competitor(url: &str) -> String {
    format!("drift:by:{url}")
}

pub fn proof_record(proof_id: &str) -> String {
    format!("proof:{proof_id}")
}

/// Set of all proof ids.
pub const PROOF_RECORDS: &str = "proof:all";

pub fn report(id: &str) -> String {
    format!("report:{id}")
}

/// List of report ids, newest first.
pub const REPORTS: &str = "reports:all";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_and_index_keys_do_not_collide() {
        // Analysis ids are prefixed ("drift-<uuid>") while the index key is
        // namespaced under drift:by:, so a url can never shadow an entity.
        let entity = drift_analysis("drift-abc");
        let index = drift_by_competitor("https://example.com");
        assert_ne!(entity, index);
        assert!(entity.starts_with("drift:"));
        assert!(index.starts_with("drift:by:"));
    }

    #[test]
    fn keys_embed_the_identity() {
        assert_eq!(
            competitor_config("https://example.com"),
            "competitor:config:https://example.com"
        );
        assert_eq!(proof_record("PROOF-TRUST-CTO-X"), "proof:PROOF-TRUST-CTO-X");
    }
}
