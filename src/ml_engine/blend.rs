//! Blend strategies: how the physics estimate and the regression estimate combine.
//!
//! Two interchangeable implementations:
//! - [`PhysicsOnly`]: the physics figure, untouched
//! - [`Hybrid`]: `w * ml + (1 - w) * physics`, falling back to physics when
//!   the estimator fails or overshoots; negative estimates are floored at 0
//!
//! Both clamp the result to `[0, base_shelf_life_days]`. At nominal
//! conditions (no stress multiplier active) both return the base exactly.

use tracing::{debug, warn};

use super::estimator::RegressionEstimator;
use crate::types::PredictionMode;

/// Inputs available to a blend strategy for one prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendInput {
    pub physics_days: f64,
    pub base_shelf_life_days: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub vibration_g: f64,
    /// True when every decay multiplier is exactly 1.0
    pub nominal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendOutcome {
    pub days_left: f64,
    pub ml_estimate: Option<f64>,
    pub mode: PredictionMode,
}

impl BlendOutcome {
    fn physics(input: &BlendInput, ml_estimate: Option<f64>, mode: PredictionMode) -> Self {
        Self {
            days_left: clamp_days(input.physics_days, input.base_shelf_life_days),
            ml_estimate,
            mode,
        }
    }
}

fn clamp_days(days: f64, base: f64) -> f64 {
    days.min(base).max(0.0)
}

/// Strategy for turning physics (and optionally a regression estimate) into `days_left`.
pub trait BlendStrategy: Send + Sync {
    /// Strategy name for logging
    fn name(&self) -> &str;

    fn blend(&self, input: &BlendInput) -> BlendOutcome;
}

// ============================================================================
// Physics only
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicsOnly;

impl BlendStrategy for PhysicsOnly {
    fn name(&self) -> &str {
        "physics_only"
    }

    fn blend(&self, input: &BlendInput) -> BlendOutcome {
        BlendOutcome::physics(input, None, PredictionMode::PhysicsOnly)
    }
}

// ============================================================================
// Hybrid
// ============================================================================

pub struct Hybrid {
    estimator: Box<dyn RegressionEstimator>,
    blend_weight: f64,
    implausible_factor: f64,
}

impl Hybrid {
    /// `blend_weight` is clamped to [0, 1].
    pub fn new(estimator: Box<dyn RegressionEstimator>, blend_weight: f64, implausible_factor: f64) -> Self {
        Self {
            estimator,
            blend_weight: blend_weight.clamp(0.0, 1.0),
            implausible_factor,
        }
    }

    pub fn blend_weight(&self) -> f64 {
        self.blend_weight
    }

    /// Negative estimates are plausible (floored at zero before blending);
    /// non-finite ones and those above `base * implausible_factor` are not.
    fn is_plausible(&self, estimate: f64, base: f64) -> bool {
        estimate.is_finite() && estimate <= base * self.implausible_factor
    }
}

impl std::fmt::Debug for Hybrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hybrid")
            .field("estimator", &self.estimator.name())
            .field("blend_weight", &self.blend_weight)
            .field("implausible_factor", &self.implausible_factor)
            .finish()
    }
}

impl BlendStrategy for Hybrid {
    fn name(&self) -> &str {
        "hybrid"
    }

    fn blend(&self, input: &BlendInput) -> BlendOutcome {
        // No stress active: physics already returns the base, the estimator is not consulted
        if input.nominal {
            return BlendOutcome::physics(input, None, PredictionMode::Hybrid);
        }

        // Single attempt; any failure degrades to physics for this cycle only
        let raw = match self.estimator.estimate(
            input.temperature_c,
            input.humidity_pct,
            input.vibration_g,
        ) {
            Ok(v) => v,
            Err(e) => {
                warn!(
                    estimator = self.estimator.name(),
                    error = %e,
                    "Regression estimator failed, using physics-only prediction"
                );
                return BlendOutcome::physics(input, None, PredictionMode::Degraded);
            }
        };

        if !self.is_plausible(raw, input.base_shelf_life_days) {
            warn!(
                estimator = self.estimator.name(),
                estimate = raw,
                limit = input.base_shelf_life_days * self.implausible_factor,
                "Implausible regression estimate, using physics-only prediction"
            );
            return BlendOutcome::physics(input, Some(raw), PredictionMode::Degraded);
        }

        // A model extrapolating past total spoilage still means "spoiled"
        let estimate = raw.max(0.0);

        let w = self.blend_weight;
        let blended = w * estimate + (1.0 - w) * input.physics_days;
        debug!(estimate, raw, physics_days = input.physics_days, blended, "Hybrid blend");

        BlendOutcome {
            days_left: clamp_days(blended, input.base_shelf_life_days),
            ml_estimate: Some(estimate),
            mode: PredictionMode::Hybrid,
        }
    }
}
