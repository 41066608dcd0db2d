//! Decay physics: stress conditions to deterministic decay multipliers

use serde::{Deserialize, Serialize};

use crate::config::{BandsConfig, PhysicsConfig};

/// Decay multipliers for one set of conditions. Each factor is >= 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayMultipliers {
    pub temperature: f64,
    pub vibration: f64,
    pub humidity: f64,
}

impl DecayMultipliers {
    /// Overall acceleration of spoilage relative to ideal storage.
    pub fn combined(&self) -> f64 {
        self.temperature * self.vibration * self.humidity
    }

    /// True when no stress accelerates decay at all.
    pub fn is_nominal(&self) -> bool {
        self.temperature == 1.0 && self.vibration == 1.0 && self.humidity == 1.0
    }
}

/// Pure decay model parameterised by the physics constants and the humidity band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayPhysicsModel {
    reference_temperature_c: f64,
    q10_factor: f64,
    q10_interval_c: f64,
    vibration_threshold_g: f64,
    vibration_multiplier: f64,
    humidity_max_pct: f64,
    humidity_sensitivity_per_pct: f64,
}

impl DecayPhysicsModel {
    pub fn new(physics: &PhysicsConfig, bands: &BandsConfig) -> Self {
        Self {
            reference_temperature_c: physics.reference_temperature_c,
            q10_factor: physics.q10_factor,
            q10_interval_c: physics.q10_interval_c,
            vibration_threshold_g: physics.vibration_threshold_g,
            vibration_multiplier: physics.vibration_multiplier,
            humidity_max_pct: bands.humidity_max_pct,
            humidity_sensitivity_per_pct: physics.humidity_sensitivity_per_pct,
        }
    }

    /// Q10 temperature acceleration:
    ///
    /// `q10 ^ ((T - T_ref) / interval)` for T above the reference, 1.0 at or below it.
    /// With the defaults, 14°C doubles decay and 24°C quadruples it.
    pub fn temperature_multiplier(&self, temperature_c: f64) -> f64 {
        if temperature_c <= self.reference_temperature_c {
            return 1.0;
        }
        let exponent = (temperature_c - self.reference_temperature_c) / self.q10_interval_c;
        self.q10_factor.powf(exponent).max(1.0)
    }

    /// Step function, exclusive at the threshold.
    pub fn vibration_multiplier(&self, vibration_g: f64) -> f64 {
        if vibration_g > self.vibration_threshold_g {
            self.vibration_multiplier
        } else {
            1.0
        }
    }

    /// 1.0 inside (and below) the band; grows linearly per %RH above the band's upper edge.
    pub fn humidity_multiplier(&self, humidity_pct: f64) -> f64 {
        let excess = humidity_pct - self.humidity_max_pct;
        if excess <= 0.0 {
            return 1.0;
        }
        1.0 + self.humidity_sensitivity_per_pct * excess
    }

    pub fn multipliers(&self, temperature_c: f64, humidity_pct: f64, vibration_g: f64) -> DecayMultipliers {
        DecayMultipliers {
            temperature: self.temperature_multiplier(temperature_c),
            vibration: self.vibration_multiplier(vibration_g),
            humidity: self.humidity_multiplier(humidity_pct),
        }
    }

    /// Remaining shelf life under constant conditions: `base / combined multiplier`.
    pub fn physics_days(&self, base_shelf_life_days: f64, multipliers: &DecayMultipliers) -> f64 {
        if multipliers.is_nominal() {
            return base_shelf_life_days;
        }
        (base_shelf_life_days / multipliers.combined()).max(0.0)
    }
}

impl Default for DecayPhysicsModel {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default(), &BandsConfig::default())
    }
}
