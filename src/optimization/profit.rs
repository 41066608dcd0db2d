//! ProfitOptimizer: monetary value of the shelf life still left
//!
//! `value_preserved = cargo_value * days_left / base_shelf_life_days`. A
//! non-positive base preserves nothing and writes off the whole cargo.

use tracing::debug;

use crate::config::ShieldConfig;
use crate::types::{QualityGrade, ValueAssessment};

#[derive(Debug, Clone, PartialEq)]
pub struct ProfitOptimizer {
    currency: String,
}

impl ProfitOptimizer {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }

    pub fn from_config(config: &ShieldConfig) -> Self {
        Self::new(config.shipment.currency.clone())
    }

    pub fn assess(&self, cargo_value: f64, days_left: f64, base_shelf_life_days: f64) -> ValueAssessment {
        if base_shelf_life_days <= 0.0 {
            return ValueAssessment {
                cargo_value,
                value_preserved: 0.0,
                wasted_value: cargo_value,
                remaining_pct: 0.0,
                grade: QualityGrade::F,
                daily_value: 0.0,
                hourly_value: 0.0,
                currency: self.currency.clone(),
            };
        }

        let fraction = days_left.max(0.0) / base_shelf_life_days;
        let value_preserved = cargo_value * fraction;
        let remaining_pct = fraction * 100.0;
        let daily_value = cargo_value / base_shelf_life_days;

        debug!(
            value_preserved,
            remaining_pct,
            currency = %self.currency,
            "Value assessed"
        );

        ValueAssessment {
            cargo_value,
            value_preserved,
            wasted_value: cargo_value - value_preserved,
            remaining_pct,
            grade: QualityGrade::from_remaining_pct(remaining_pct),
            daily_value,
            hourly_value: daily_value / 24.0,
            currency: self.currency.clone(),
        }
    }
}

impl Default for ProfitOptimizer {
    fn default() -> Self {
        Self::from_config(&ShieldConfig::default())
    }
}
