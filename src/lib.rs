//! BNetzA Underperformance Checker Library
//!
//! Validates broadband speed-test campaigns against the regulator's
//! measurement plan and derives an informational underperformance verdict.
//! When the recorded measurements do not form a campaign themselves, a
//! compliant 3-day x 10-measurement subset is searched for.

pub mod campaign;
pub mod config;
pub mod ingest;
pub mod models;
pub mod report;
pub mod stats;

pub use campaign::{evaluate, run_check, select_subset, validate};
pub use stats::aggregate;
