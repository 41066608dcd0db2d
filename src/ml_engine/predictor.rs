//! Hybrid shelf-life predictor
//!
//! physics multipliers -> physics_days -> blend strategy -> clamp -> status

use std::path::Path;
use tracing::{info, warn};

use super::blend::{BlendInput, BlendStrategy, Hybrid, PhysicsOnly};
use super::estimator::{EstimatorError, LinearEstimator, RegressionEstimator};
use crate::config::ShieldConfig;
use crate::physics_engine::DecayPhysicsModel;
use crate::types::{DecayBreakdown, ShelfLifePrediction, ShelfLifeStatus, TelemetryReading};

/// Stand-in for a model artifact that could not be loaded at startup.
///
/// Every estimate fails, so each prediction is reported as degraded rather
/// than silently physics-only.
#[derive(Debug, Clone)]
pub struct UnavailableEstimator {
    reason: String,
}

impl UnavailableEstimator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl RegressionEstimator for UnavailableEstimator {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn estimate(&self, _: f64, _: f64, _: f64) -> Result<f64, EstimatorError> {
        Err(EstimatorError::Unavailable(self.reason.clone()))
    }
}

pub struct ShelfLifePredictor {
    physics: DecayPhysicsModel,
    strategy: Box<dyn BlendStrategy>,
    warning_days: f64,
    critical_days: f64,
}

impl ShelfLifePredictor {
    pub fn new(physics: DecayPhysicsModel, strategy: Box<dyn BlendStrategy>) -> Self {
        Self {
            physics,
            strategy,
            warning_days: 5.0,
            critical_days: 2.0,
        }
    }

    #[must_use]
    pub fn with_status_thresholds(mut self, warning_days: f64, critical_days: f64) -> Self {
        self.warning_days = warning_days;
        self.critical_days = critical_days;
        self
    }

    /// Build from config. Without `prediction.model_path` the predictor is
    /// physics-only; with one, the linear artifact is loaded and blended.
    pub fn from_config(config: &ShieldConfig) -> Self {
        let physics = DecayPhysicsModel::new(&config.physics, &config.bands);
        let p = &config.prediction;

        let strategy: Box<dyn BlendStrategy> = match &p.model_path {
            None => Box::new(PhysicsOnly),
            Some(path) => {
                let hybrid = Hybrid::new(load_estimator(path), p.blend_weight, p.implausible_factor);
                info!(
                    blend_weight = hybrid.blend_weight(),
                    implausible_factor = p.implausible_factor,
                    "Hybrid blend configured"
                );
                Box::new(hybrid)
            }
        };
        info!(strategy = strategy.name(), "Shelf-life predictor ready");

        Self::new(physics, strategy).with_status_thresholds(p.warning_days, p.critical_days)
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn predict(&self, reading: &TelemetryReading, base_shelf_life_days: f64) -> ShelfLifePrediction {
        let multipliers = self.physics.multipliers(
            reading.temperature_c,
            reading.humidity_pct,
            reading.vibration_g,
        );
        let physics_days = self.physics.physics_days(base_shelf_life_days, &multipliers);

        let outcome = self.strategy.blend(&BlendInput {
            physics_days,
            base_shelf_life_days,
            temperature_c: reading.temperature_c,
            humidity_pct: reading.humidity_pct,
            vibration_g: reading.vibration_g,
            nominal: multipliers.is_nominal(),
        });

        let days_left = outcome.days_left;
        ShelfLifePrediction {
            days_left,
            physics_days,
            ml_estimate: outcome.ml_estimate,
            base_shelf_life_days,
            decay_rate: multipliers.combined(),
            breakdown: DecayBreakdown {
                temp_multiplier: multipliers.temperature,
                vibration_multiplier: multipliers.vibration,
                humidity_multiplier: multipliers.humidity,
                ml_adjustment: days_left - physics_days,
            },
            status: ShelfLifeStatus::classify(days_left, self.warning_days, self.critical_days),
            mode: outcome.mode,
            temperature_c: reading.temperature_c,
            humidity_pct: reading.humidity_pct,
            vibration_g: reading.vibration_g,
        }
    }
}

fn load_estimator(path: &Path) -> Box<dyn RegressionEstimator> {
    match LinearEstimator::load(path) {
        Ok(est) => Box::new(est),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Model artifact unavailable, predictions will run degraded");
            Box::new(UnavailableEstimator::new(e.to_string()))
        }
    }
}
