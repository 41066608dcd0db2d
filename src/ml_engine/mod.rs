//! ML Engine: hybrid shelf-life prediction
//!
//! Combines the deterministic decay physics with a black-box regression
//! estimate. The estimator is optional and never allowed to fail a
//! prediction: any error or implausible value degrades that cycle to the
//! physics figure.
//!
//! ## Architecture
//! - `estimator`: `RegressionEstimator` trait + JSON-backed `LinearEstimator`
//! - `blend`: `BlendStrategy` trait with `PhysicsOnly` and `Hybrid` implementations
//! - `predictor`: `ShelfLifePredictor`, the per-reading entry point

pub mod blend;
pub mod estimator;
pub mod predictor;

pub use blend::{BlendInput, BlendOutcome, BlendStrategy, Hybrid, PhysicsOnly};
pub use estimator::{EstimatorError, LinearEstimator, LinearModelArtifact, RegressionEstimator};
pub use predictor::{ShelfLifePredictor, UnavailableEstimator};
