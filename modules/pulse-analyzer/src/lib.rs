//! Drift detection and action validation.
//!
//! Turns two snapshots of a competitor page into a scored diff, a set of
//! tagged implications, and a proof-gated list of counter-moves. Everything
//! here is synchronous, deterministic, and pure over its inputs — the only
//! collaborator is the injected [`ProofSearch`] store used by `validate`.

pub mod analysis;
pub mod classify;
pub mod extractor;
pub mod implications;
pub mod scorer;
pub mod tone;
pub mod validator;

pub use analysis::analyze_drift;
pub use classify::{HeuristicClassifier, WordClass, WordClassifier};
pub use extractor::{categorize_keywords, extract_words, KeywordCounts};
pub use implications::generate_implications;
pub use scorer::drift_score;
pub use tone::detect_tone_shifts;
pub use validator::{validate, MemoryProofVault, ProofQuery, ProofSearch};
