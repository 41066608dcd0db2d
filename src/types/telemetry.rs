//! Telemetry types: TelemetryReading, TelemetryHistory, HistorySnapshot, ChaosEvent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Lowest cargo temperature accepted at the boundary (°C)
pub const MIN_PLAUSIBLE_TEMPERATURE_C: f64 = -40.0;

/// Highest cargo temperature accepted at the boundary (°C)
pub const MAX_PLAUSIBLE_TEMPERATURE_C: f64 = 80.0;

/// Default ring-buffer capacity for telemetry history
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

// ============================================================================
// Validation Errors
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemetryError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("humidity {0:.1}% is outside 0-100%")]
    HumidityOutOfRange(f64),

    #[error("vibration {0:.3}G cannot be negative")]
    NegativeVibration(f64),

    #[error("distance remaining {0:.1} cannot be negative")]
    NegativeDistance(f64),

    #[error("temperature {0:.1}°C is outside the plausible range (-40..=80°C)")]
    TemperatureOutOfRange(f64),
}

// ============================================================================
// Telemetry Reading
// ============================================================================

/// One immutable sensor snapshot from the cargo hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    /// Cargo temperature (°C)
    pub temperature_c: f64,
    /// Relative humidity (%)
    pub humidity_pct: f64,
    /// Vibration (G)
    pub vibration_g: f64,
    /// Distance remaining to the planned destination (km)
    #[serde(default)]
    pub distance_remaining_km: f64,
    /// Sample time
    pub timestamp: DateTime<Utc>,
}

impl TelemetryReading {
    /// Build a reading, rejecting values the engine cannot trust.
    pub fn new(
        temperature_c: f64,
        humidity_pct: f64,
        vibration_g: f64,
        distance_remaining_km: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, TelemetryError> {
        let reading = Self {
            temperature_c,
            humidity_pct,
            vibration_g,
            distance_remaining_km,
            timestamp,
        };
        reading.validate()?;
        Ok(reading)
    }

    /// Boundary validation. Raw inputs are never clamped.
    pub fn validate(&self) -> Result<(), TelemetryError> {
        for (field, value) in [
            ("temperature_c", self.temperature_c),
            ("humidity_pct", self.humidity_pct),
            ("vibration_g", self.vibration_g),
            ("distance_remaining_km", self.distance_remaining_km),
        ] {
            if !value.is_finite() {
                return Err(TelemetryError::NonFinite { field, value });
            }
        }

        if !(0.0..=100.0).contains(&self.humidity_pct) {
            return Err(TelemetryError::HumidityOutOfRange(self.humidity_pct));
        }
        if self.vibration_g < 0.0 {
            return Err(TelemetryError::NegativeVibration(self.vibration_g));
        }
        if self.distance_remaining_km < 0.0 {
            return Err(TelemetryError::NegativeDistance(self.distance_remaining_km));
        }
        if !(MIN_PLAUSIBLE_TEMPERATURE_C..=MAX_PLAUSIBLE_TEMPERATURE_C)
            .contains(&self.temperature_c)
        {
            return Err(TelemetryError::TemperatureOutOfRange(self.temperature_c));
        }
        Ok(())
    }
}

/// A recorded disruption (cooling failure toggle, door-open alarm, etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaosEvent {
    pub timestamp: DateTime<Utc>,
    pub label: String,
}

// ============================================================================
// Telemetry History (ring buffer)
// ============================================================================

/// Bounded, append-only telemetry history owned by the runner.
///
/// The decision engine never touches this directly; it receives a
/// [`HistorySnapshot`] copied out of it.
#[derive(Debug, Clone)]
pub struct TelemetryHistory {
    readings: VecDeque<TelemetryReading>,
    chaos_events: VecDeque<ChaosEvent>,
    capacity: usize,
}

impl TelemetryHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            chaos_events: VecDeque::new(),
            capacity,
        }
    }

    /// Append a reading, evicting the oldest one when full.
    pub fn push(&mut self, reading: TelemetryReading) {
        if self.readings.len() >= self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    /// Record a chaos/anomaly event. Events share the reading capacity bound.
    pub fn record_chaos_event(&mut self, timestamp: DateTime<Utc>, label: impl Into<String>) {
        if self.chaos_events.len() >= self.capacity {
            self.chaos_events.pop_front();
        }
        self.chaos_events.push_back(ChaosEvent {
            timestamp,
            label: label.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&TelemetryReading> {
        self.readings.back()
    }

    /// Copy out the most recent `window` readings (oldest first).
    ///
    /// Chaos events are included when they occurred at or after the first
    /// reading of the window; with an empty window every retained event is
    /// included.
    pub fn snapshot(&self, window: usize) -> HistorySnapshot {
        let skip = self.readings.len().saturating_sub(window);
        let readings: Vec<TelemetryReading> = self.readings.iter().skip(skip).cloned().collect();

        let chaos_events = match readings.first() {
            Some(first) => self
                .chaos_events
                .iter()
                .filter(|e| e.timestamp >= first.timestamp)
                .cloned()
                .collect(),
            None => self.chaos_events.iter().cloned().collect(),
        };

        HistorySnapshot {
            readings,
            chaos_events,
        }
    }
}

impl Default for TelemetryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Immutable copy of a recent history window handed to the scoring engines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Readings, oldest first
    pub readings: Vec<TelemetryReading>,
    /// Chaos events observed during the window
    pub chaos_events: Vec<ChaosEvent>,
}

impl HistorySnapshot {
    pub fn from_readings(readings: Vec<TelemetryReading>) -> Self {
        Self {
            readings,
            chaos_events: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty() && self.chaos_events.is_empty()
    }
}
