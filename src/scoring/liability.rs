//! LiabilityEngine - attributes spoilage risk to temperature, vibration and humidity
//!
//! Raw damage per cause is `weight * Σ excursion` over the same deviation
//! summary the trust score uses. Shares are raw damage normalised to sum
//! to 1.0; with no deviation at all every share is zero.

use super::deviation::{DeviationBands, DeviationSummary};
use crate::config::{LiabilityConfig, ShieldConfig};
use crate::types::{
    Cause, CauseBreakdown, HistorySnapshot, LiabilityRecommendation, LiabilityReport,
    RecommendationPriority,
};

#[derive(Debug, Clone)]
pub struct LiabilityEngine {
    bands: DeviationBands,
    config: LiabilityConfig,
}

impl LiabilityEngine {
    pub fn new(bands: DeviationBands, config: LiabilityConfig) -> Self {
        Self { bands, config }
    }

    pub fn from_config(config: &ShieldConfig) -> Self {
        Self::new(DeviationBands::from_config(config), config.liability.clone())
    }

    pub fn attribute(&self, history: &HistorySnapshot) -> LiabilityReport {
        self.attribute_with(&self.bands.summarize(history))
    }

    pub fn attribute_with(&self, deviations: &DeviationSummary) -> LiabilityReport {
        let c = &self.config;
        let raw_damage = CauseBreakdown {
            temperature: c.temperature_weight * deviations.temperature.excess_sum,
            vibration: c.vibration_weight * deviations.vibration.excess_sum,
            humidity: c.humidity_weight * deviations.humidity.excess_sum,
        };

        let total = raw_damage.sum();
        let shares = if total > 0.0 && total.is_finite() {
            CauseBreakdown {
                temperature: raw_damage.temperature / total,
                vibration: raw_damage.vibration / total,
                humidity: raw_damage.humidity / total,
            }
        } else {
            CauseBreakdown::default()
        };

        // Largest share wins; Cause::ALL order breaks ties
        let primary_cause = Cause::ALL
            .iter()
            .copied()
            .filter(|cause| shares.get(*cause) > 0.0)
            .fold(None, |best: Option<Cause>, cause| match best {
                Some(b) if shares.get(b) >= shares.get(cause) => Some(b),
                _ => Some(cause),
            });

        LiabilityReport {
            exposure_counts: CauseBreakdown {
                temperature: deviations.temperature.count as f64,
                vibration: deviations.vibration.count as f64,
                humidity: deviations.humidity.count as f64,
            },
            recommendations: self.recommendations(&shares),
            primary_cause,
            shares,
            raw_damage,
        }
    }

    fn recommendations(&self, shares: &CauseBreakdown) -> Vec<LiabilityRecommendation> {
        let c = &self.config;
        let mut recs = Vec::new();

        if shares.temperature > c.temperature_share_threshold {
            recs.push(LiabilityRecommendation {
                cause: Cause::Temperature,
                priority: if shares.temperature > c.temperature_share_high {
                    RecommendationPriority::High
                } else {
                    RecommendationPriority::Medium
                },
                responsible_party: "Refrigeration unit operator".to_string(),
                action: "Inspect and service the refrigeration unit".to_string(),
            });
        }
        if shares.vibration > c.vibration_share_threshold {
            recs.push(LiabilityRecommendation {
                cause: Cause::Vibration,
                priority: if shares.vibration > c.vibration_share_high {
                    RecommendationPriority::High
                } else {
                    RecommendationPriority::Medium
                },
                responsible_party: "Carrier / driver".to_string(),
                action: "Review route conditions, load securing and vehicle suspension".to_string(),
            });
        }
        if shares.humidity > c.humidity_share_threshold {
            recs.push(LiabilityRecommendation {
                cause: Cause::Humidity,
                priority: RecommendationPriority::Medium,
                responsible_party: "Packaging / loading team".to_string(),
                action: "Check container ventilation and packaging seals".to_string(),
            });
        }
        recs
    }
}

impl Default for LiabilityEngine {
    fn default() -> Self {
        Self::from_config(&ShieldConfig::default())
    }
}
