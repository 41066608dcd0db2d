//! Shared data structures for the cold-chain decision engine
//!
//! - `telemetry`: TelemetryReading, TelemetryHistory (bounded ring buffer), HistorySnapshot
//! - `catalog`: Destination and MarketOption catalogs
//! - `decision`: ShelfLifePrediction, RerouteDecision, MarketPivotDecision, DecisionRecord
//! - `scoring`: TrustScore and LiabilityReport
//! - `advisory`: DriverRecommendation and the per-cycle DriverAdvisory

mod advisory;
mod catalog;
mod decision;
mod scoring;
mod telemetry;

pub use advisory::*;
pub use catalog::*;
pub use decision::*;
pub use scoring::*;
pub use telemetry::*;
