//! Competitor page scanning: fetch marketing pages, extract snapshots,
//! analyze drift against retained baselines, and dispatch digests.

pub mod extract;
pub mod scout;
pub mod scraper;

pub use extract::extract_snapshot;
pub use scout::{ScanStats, Scout};
pub use scraper::{HttpScraper, PageScraper};
