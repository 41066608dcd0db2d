//! Shelf-life countdown and short-horizon projection.
//!
//! Projection assumes the current conditions persist: every hour consumes
//! `decay_rate / 24` days of shelf life. At nominal conditions this is plain
//! wall-clock countdown.

use chrono::{DateTime, Duration, Utc};

use crate::types::{ForecastPoint, ShelfLifeForecast, ShelfLifePrediction, ShelfLifeStatus};

/// Forecast parameters (status thresholds and projection horizons).
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSettings {
    pub warning_days: f64,
    pub critical_days: f64,
    pub horizons_hrs: Vec<f64>,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            warning_days: 5.0,
            critical_days: 2.0,
            horizons_hrs: vec![1.0, 2.0, 4.0],
        }
    }
}

pub fn forecast(
    prediction: &ShelfLifePrediction,
    now: DateTime<Utc>,
    settings: &ForecastSettings,
) -> ShelfLifeForecast {
    let decay_per_hour = prediction.decay_rate / 24.0;
    let hours_remaining = prediction.hours_left();

    let projections: Vec<ForecastPoint> = settings
        .horizons_hrs
        .iter()
        .map(|&h| {
            let days_left = (prediction.days_left - decay_per_hour * h).max(0.0);
            ForecastPoint {
                hours_ahead: h,
                days_left,
                status: ShelfLifeStatus::classify(
                    days_left,
                    settings.warning_days,
                    settings.critical_days,
                ),
            }
        })
        .collect();

    let urgency = projections
        .iter()
        .max_by(|a, b| a.hours_ahead.total_cmp(&b.hours_ahead))
        .map_or(prediction.status, |p| p.status);

    // Whole seconds keep the arithmetic inside chrono's range for any finite input
    let expires_at = if hours_remaining.is_finite() && hours_remaining < 24.0 * 365.0 * 100.0 {
        now.checked_add_signed(Duration::seconds((hours_remaining * 3600.0).round() as i64))
    } else {
        None
    };

    ShelfLifeForecast {
        hours_remaining,
        whole_days_remaining: prediction.whole_days_remaining(),
        expires_at,
        decay_per_hour,
        projections,
        urgency,
    }
}
