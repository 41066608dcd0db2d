//! Deviation accounting shared by the trust and liability engines.
//!
//! Both engines read the same per-cause excursion summary so their numbers
//! always agree on what went wrong during the run.

use serde::{Deserialize, Serialize};

use crate::config::ShieldConfig;
use crate::types::{Cause, HistorySnapshot, TelemetryReading};

/// Excursion tally for one cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CauseDeviation {
    /// Readings outside the safe band
    pub count: usize,
    /// Worst single excursion (band units: °C, G or %RH)
    pub max_excess: f64,
    /// Sum of excursions over the window
    pub excess_sum: f64,
}

impl CauseDeviation {
    fn record(&mut self, excess: f64) {
        if excess > 0.0 {
            self.count += 1;
            self.max_excess = self.max_excess.max(excess);
            self.excess_sum += excess;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviationSummary {
    pub temperature: CauseDeviation,
    pub vibration: CauseDeviation,
    pub humidity: CauseDeviation,
    /// Readings above the vibration event threshold
    pub vibration_events: usize,
    pub chaos_events: usize,
    pub readings: usize,
}

impl DeviationSummary {
    pub fn cause(&self, cause: Cause) -> &CauseDeviation {
        match cause {
            Cause::Temperature => &self.temperature,
            Cause::Vibration => &self.vibration,
            Cause::Humidity => &self.humidity,
        }
    }

    pub fn has_deviation(&self) -> bool {
        Cause::ALL.iter().any(|c| self.cause(*c).count > 0)
    }
}

/// Safe bands and thresholds used to measure excursions.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviationBands {
    pub temperature_min_c: f64,
    pub temperature_max_c: f64,
    pub humidity_min_pct: f64,
    pub humidity_max_pct: f64,
    pub vibration_ideal_max_g: f64,
    pub vibration_event_g: f64,
    pub cold_excursion_weight: f64,
}

impl DeviationBands {
    pub fn from_config(config: &ShieldConfig) -> Self {
        let b = &config.bands;
        Self {
            temperature_min_c: b.temperature_min_c,
            temperature_max_c: b.temperature_max_c,
            humidity_min_pct: b.humidity_min_pct,
            humidity_max_pct: b.humidity_max_pct,
            vibration_ideal_max_g: b.vibration_ideal_max_g,
            vibration_event_g: config.physics.vibration_threshold_g,
            cold_excursion_weight: b.cold_excursion_weight,
        }
    }

    /// Weighted distance outside the temperature band (cold counts less).
    pub fn temperature_excess(&self, temperature_c: f64) -> f64 {
        if temperature_c > self.temperature_max_c {
            temperature_c - self.temperature_max_c
        } else if temperature_c < self.temperature_min_c {
            (self.temperature_min_c - temperature_c) * self.cold_excursion_weight
        } else {
            0.0
        }
    }

    pub fn humidity_excess(&self, humidity_pct: f64) -> f64 {
        if humidity_pct > self.humidity_max_pct {
            humidity_pct - self.humidity_max_pct
        } else if humidity_pct < self.humidity_min_pct {
            self.humidity_min_pct - humidity_pct
        } else {
            0.0
        }
    }

    pub fn vibration_excess(&self, vibration_g: f64) -> f64 {
        (vibration_g - self.vibration_ideal_max_g).max(0.0)
    }

    fn tally(&self, summary: &mut DeviationSummary, reading: &TelemetryReading) {
        summary.temperature.record(self.temperature_excess(reading.temperature_c));
        summary.humidity.record(self.humidity_excess(reading.humidity_pct));
        summary.vibration.record(self.vibration_excess(reading.vibration_g));
        if reading.vibration_g > self.vibration_event_g {
            summary.vibration_events += 1;
        }
    }

    pub fn summarize(&self, history: &HistorySnapshot) -> DeviationSummary {
        let mut summary = DeviationSummary {
            readings: history.readings.len(),
            chaos_events: history.chaos_events.len(),
            ..DeviationSummary::default()
        };
        for reading in &history.readings {
            self.tally(&mut summary, reading);
        }
        summary
    }
}

impl Default for DeviationBands {
    fn default() -> Self {
        Self::from_config(&ShieldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snap(readings: &[(f64, f64, f64)]) -> HistorySnapshot {
        HistorySnapshot::from_readings(
            readings
                .iter()
                .map(|&(t, h, v)| TelemetryReading::new(t, h, v, 10.0, Utc::now()).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_in_band_history_has_no_deviation() {
        let s = DeviationBands::default().summarize(&snap(&[(3.0, 50.0, 0.1), (4.0, 40.0, 0.3)]));
        assert!(!s.has_deviation());
        assert_eq!(s.readings, 2);
    }

    #[test]
    fn test_cold_excursions_count_at_half_weight() {
        let bands = DeviationBands::default();
        assert_eq!(bands.temperature_excess(0.0), 1.0);
        assert_eq!(bands.temperature_excess(6.0), 2.0);
    }

    #[test]
    fn test_tally_per_cause() {
        let s = DeviationBands::default().summarize(&snap(&[
            (8.0, 50.0, 0.1),
            (10.0, 70.0, 0.8),
            (3.0, 35.0, 0.4),
        ]));
        assert_eq!(s.temperature.count, 2);
        assert_eq!(s.temperature.max_excess, 6.0);
        assert_eq!(s.temperature.excess_sum, 10.0);
        assert_eq!(s.humidity.count, 2);
        assert_eq!(s.humidity.max_excess, 10.0);
        assert_eq!(s.vibration.count, 2);
        assert!((s.vibration.max_excess - 0.5).abs() < 1e-12);
        assert_eq!(s.vibration_events, 1);
    }
}
