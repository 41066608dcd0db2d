//! Spoilage Shield: Cold-Chain Decision Engine
//!
//! Turns a stream of cargo telemetry into delivery decisions for perishable
//! freight.
//!
//! ## Architecture
//!
//! - **Physics Engine**: Q10 temperature, vibration and humidity decay multipliers
//! - **ML Engine**: Hybrid shelf-life predictor blending physics with a regression estimate
//! - **Optimization**: Survival-margin rerouting, emergency market pivot and preserved value
//! - **Scoring**: Transport trust score and per-cause liability attribution
//! - **Advisory**: In-cab driver advice from the reading and route margin
//! - **Explanation**: Template narration of every decision
//! - **Pipeline**: One telemetry reading in, one `DecisionRecord` out

pub mod advisory;
pub mod config;
pub mod explanation;
pub mod ml_engine;
pub mod optimization;
pub mod physics_engine;
pub mod pipeline;
pub mod scoring;
pub mod sensors;
pub mod types;

// Re-export shield configuration
pub use config::ShieldConfig;

// Re-export the decision cycle
pub use pipeline::{DecisionEngine, DecisionError, ShipmentContext};

// Re-export commonly used types
pub use types::{
    DecisionOutcome, DecisionRecord, Destination, DriverAdvisory, HistorySnapshot,
    LiabilityReport, MarketOption, MarketPivotDecision, RerouteDecision, ShelfLifePrediction,
    TelemetryHistory, TelemetryReading, TrustScore, ValueAssessment,
};

// Re-export engines
pub use advisory::DriverRecommender;
pub use explanation::ExplanationGenerator;
pub use ml_engine::ShelfLifePredictor;
pub use optimization::{MarketPivotEngine, ProfitOptimizer, SurvivalOptimizer};
pub use physics_engine::DecayPhysicsModel;
pub use scoring::{LiabilityEngine, TrustScoreEngine};
