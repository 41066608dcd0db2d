//! Transport-run scoring
//!
//! - `deviation`: per-cause excursion summary over a history snapshot
//! - `trust`: 0-100 trust score with grade, statistics and trend
//! - `liability`: normalised risk attribution per cause with recommendations

pub mod deviation;
mod liability;
mod trust;

pub use deviation::{CauseDeviation, DeviationBands, DeviationSummary};
pub use liability::LiabilityEngine;
pub use trust::TrustScoreEngine;
