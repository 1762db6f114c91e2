//! Market Pulse digest assembly, email rendering/dispatch, and CSV export.
//!
//! Downstream consumers of the analyzer's output. No analysis logic lives
//! here — only aggregation and presentation.

pub mod csv;
pub mod mailer;
pub mod report;

pub use csv::export_csv;
pub use mailer::Mailer;
pub use report::{build_report, render_email};
