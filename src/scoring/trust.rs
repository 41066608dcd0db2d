//! TrustScoreEngine - transport-run quality from the deviation history
//!
//! ## Scoring
//!
//! Starts at 100 and subtracts one capped penalty per deviation type:
//!
//! | Penalty     | Formula                                               | Cap |
//! |-------------|-------------------------------------------------------|-----|
//! | temperature | `10 * worst °C excursion + 0.5 * excursion count`     | 30  |
//! | vibration   | `150 * worst G above 0.3 + 2 * readings above 0.5G`   | 40  |
//! | humidity    | `0.2 * worst %RH excursion + 0.1 * excursion count`   | 15  |
//! | chaos       | `20 * recorded chaos events`                          | 40  |
//!
//! Every term grows with magnitude and frequency, so the score never rises
//! when a deviation gets worse. Temperature variance is reported alongside
//! the score but does not feed it.

use statrs::statistics::Statistics;
use tracing::debug;

use super::deviation::{DeviationBands, DeviationSummary};
use crate::config::{ShieldConfig, TrustConfig};
use crate::types::{
    HistorySnapshot, TemperatureTrend, TransportStatistics, TrustGrade, TrustPenalties, TrustScore,
};

#[derive(Debug, Clone)]
pub struct TrustScoreEngine {
    bands: DeviationBands,
    config: TrustConfig,
}

impl TrustScoreEngine {
    pub fn new(bands: DeviationBands, config: TrustConfig) -> Self {
        Self { bands, config }
    }

    pub fn from_config(config: &ShieldConfig) -> Self {
        Self::new(DeviationBands::from_config(config), config.trust.clone())
    }

    pub fn penalties(&self, deviations: &DeviationSummary) -> TrustPenalties {
        let c = &self.config;
        let capped = |value: f64, cap: f64| value.min(cap).max(0.0);

        TrustPenalties {
            temperature: capped(
                c.temperature_weight_per_c * deviations.temperature.max_excess
                    + c.temperature_count_weight * deviations.temperature.count as f64,
                c.temperature_cap,
            ),
            vibration: capped(
                c.vibration_weight_per_g * deviations.vibration.max_excess
                    + c.vibration_event_weight * deviations.vibration_events as f64,
                c.vibration_cap,
            ),
            humidity: capped(
                c.humidity_weight_per_pct * deviations.humidity.max_excess
                    + c.humidity_count_weight * deviations.humidity.count as f64,
                c.humidity_cap,
            ),
            chaos: capped(c.chaos_penalty * deviations.chaos_events as f64, c.chaos_cap),
        }
    }

    pub fn score(&self, history: &HistorySnapshot) -> TrustScore {
        let deviations = self.bands.summarize(history);
        self.score_with(history, &deviations)
    }

    /// Score from a precomputed deviation summary of the same snapshot.
    pub fn score_with(&self, history: &HistorySnapshot, deviations: &DeviationSummary) -> TrustScore {
        let penalties = self.penalties(deviations);
        let value = (100.0 - penalties.total()).clamp(0.0, 100.0);

        debug!(
            score = value,
            readings = deviations.readings,
            chaos_events = deviations.chaos_events,
            "Trust score computed"
        );

        TrustScore {
            value,
            grade: TrustGrade::from_score(value),
            is_healthy: value >= self.config.healthy_score,
            requires_attention: value < self.config.attention_score,
            penalties,
            readings_analyzed: deviations.readings,
            chaos_events: deviations.chaos_events,
            statistics: self.statistics(history, deviations),
            trend: self.trend(history),
        }
    }

    fn statistics(&self, history: &HistorySnapshot, deviations: &DeviationSummary) -> TransportStatistics {
        let temps: Vec<f64> = history.readings.iter().map(|r| r.temperature_c).collect();
        let vibs: Vec<f64> = history.readings.iter().map(|r| r.vibration_g).collect();
        let hums: Vec<f64> = history.readings.iter().map(|r| r.humidity_pct).collect();

        if temps.is_empty() {
            return TransportStatistics::default();
        }

        TransportStatistics {
            temperature_mean: Some(Statistics::mean(&temps)),
            temperature_std: Some(Statistics::population_std_dev(&temps)),
            temperature_variance: Some(Statistics::population_variance(&temps)),
            temperature_min: Some(Statistics::min(&temps)),
            temperature_max: Some(Statistics::max(&temps)),
            vibration_mean: Some(Statistics::mean(&vibs)),
            vibration_max: Some(Statistics::max(&vibs)),
            vibration_exposure_count: deviations.vibration_events,
            humidity_mean: Some(Statistics::mean(&hums)),
            humidity_min: Some(Statistics::min(&hums)),
            humidity_max: Some(Statistics::max(&hums)),
        }
    }

    /// Mean temperature of the last `trend_window` readings vs the window before.
    fn trend(&self, history: &HistorySnapshot) -> TemperatureTrend {
        let n = self.config.trend_window;
        let readings = &history.readings;
        if n == 0 || readings.len() < 2 * n {
            return TemperatureTrend::InsufficientData;
        }

        let recent: Vec<f64> = readings[readings.len() - n..]
            .iter()
            .map(|r| r.temperature_c)
            .collect();
        let previous: Vec<f64> = readings[readings.len() - 2 * n..readings.len() - n]
            .iter()
            .map(|r| r.temperature_c)
            .collect();

        let delta = Statistics::mean(&recent) - Statistics::mean(&previous);
        if delta > self.config.trend_threshold_c {
            TemperatureTrend::Degrading
        } else if delta < -self.config.trend_threshold_c {
            TemperatureTrend::Improving
        } else {
            TemperatureTrend::Stable
        }
    }
}

impl Default for TrustScoreEngine {
    fn default() -> Self {
        Self::from_config(&ShieldConfig::default())
    }
}
