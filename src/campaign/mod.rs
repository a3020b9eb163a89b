//! Measurement campaigns under the BNetzA procedure
//!
//! - [`validate`] checks the measurement plan (3 days x 10 measurements,
//!   span, gaps, spacing)
//! - [`evaluate`] computes the underperformance verdict of a valid campaign
//! - [`select_subset`] searches a larger pool for a compliant campaign
//! - [`run_check`] chains the three the way the application uses them
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bnetza_checker::campaign::{run_check, CampaignSource};
//! use bnetza_checker::models::ContractSpeeds;
//!
//! let contract = ContractSpeeds::new(300.0, 150.0)?;
//! let report = run_check(&measurements, contract)?;
//! match report.source {
//!     CampaignSource::NotConstructible => eprintln!("{}", report.result.errors.join("\n")),
//!     _ => println!("{}", report.result.reason),
//! }
//! ```

pub mod check;
pub mod evaluator;
pub mod grouping;
pub mod result;
pub mod rules;
pub mod selector;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use check::*;
pub use evaluator::*;
pub use grouping::*;
pub use result::*;
pub use selector::*;
pub use validator::*;
