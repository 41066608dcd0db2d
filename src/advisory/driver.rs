//! DriverRecommender: threshold rules over one reading and the route margin
//!
//! ```text
//! Temperature  > critical           CRITICAL  cool to target setpoint
//!              > warning            WARNING   bring back into band
//!              < freezing           WARNING   raise setpoint
//! Vibration    > critical           CRITICAL  reduce speed
//!              > warning            WARNING   reduce speed
//! Humidity     > high | < low       INFO      monitor
//! Margin       < 0                  CRITICAL  dump or reroute
//!              < critical           CRITICAL  reroute
//!              < warning            WARNING   consider reroute
//! ```
//!
//! At most one rule fires per signal; the most severe one wins.

use tracing::debug;

use crate::config::{DriverConfig, ShieldConfig};
use crate::types::{
    AdviceKind, AdvicePriority, DriverAction, DriverAdvisory, DriverRecommendation,
    TelemetryReading,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DriverRecommender {
    thresholds: DriverConfig,
    temperature_band_c: (f64, f64),
    humidity_band_pct: (f64, f64),
}

impl DriverRecommender {
    pub fn new(thresholds: DriverConfig, temperature_band_c: (f64, f64), humidity_band_pct: (f64, f64)) -> Self {
        Self {
            thresholds,
            temperature_band_c,
            humidity_band_pct,
        }
    }

    pub fn from_config(config: &ShieldConfig) -> Self {
        let b = &config.bands;
        Self::new(
            config.driver.clone(),
            (b.temperature_min_c, b.temperature_max_c),
            (b.humidity_min_pct, b.humidity_max_pct),
        )
    }

    /// `margin_hrs` is the survival margin of the route being driven, if any.
    pub fn recommend(&self, reading: &TelemetryReading, margin_hrs: Option<f64>) -> DriverAdvisory {
        let recommendations: Vec<DriverRecommendation> = [
            self.temperature(reading.temperature_c),
            self.vibration(reading.vibration_g),
            self.humidity(reading.humidity_pct),
            margin_hrs.and_then(|m| self.margin(m)),
        ]
        .into_iter()
        .flatten()
        .collect();

        let advisory = DriverAdvisory::from_recommendations(recommendations);
        debug!(
            critical = advisory.critical,
            warning = advisory.warning,
            info = advisory.info,
            "Driver advice generated"
        );
        advisory
    }

    fn temperature(&self, t: f64) -> Option<DriverRecommendation> {
        let th = &self.thresholds;
        let (lo, hi) = self.temperature_band_c;
        let (priority, action, message, target) = if t > th.temperature_critical_c {
            (
                AdvicePriority::Critical,
                DriverAction::ReduceTemperature,
                format!(
                    "Reduce temperature to {:.1}°C immediately; {t:.1}°C is causing rapid spoilage",
                    th.target_temperature_c
                ),
                format!("{:.1}°C", th.target_temperature_c),
            )
        } else if t > th.temperature_warning_c {
            (
                AdvicePriority::Warning,
                DriverAction::AdjustTemperature,
                format!("Temperature {t:.1}°C above optimal; aim for {lo:.0}-{hi:.0}°C"),
                format!("{lo:.0}-{hi:.0}°C"),
            )
        } else if t < th.freezing_c {
            (
                AdvicePriority::Warning,
                DriverAction::IncreaseTemperature,
                format!("Temperature {t:.1}°C near freezing; raise setpoint to avoid freeze damage"),
                format!(">{:.1}°C", th.freezing_c),
            )
        } else {
            return None;
        };
        Some(DriverRecommendation {
            kind: AdviceKind::Temperature,
            priority,
            action,
            message,
            current: t,
            target,
        })
    }

    fn vibration(&self, v: f64) -> Option<DriverRecommendation> {
        let th = &self.thresholds;
        let (priority, message) = if v > th.vibration_critical_g {
            (
                AdvicePriority::Critical,
                format!("Reduce speed immediately; {v:.2}G vibration is damaging the cargo"),
            )
        } else if v > th.vibration_warning_g {
            (
                AdvicePriority::Warning,
                format!("Vibration {v:.2}G elevated; reduce speed"),
            )
        } else {
            return None;
        };
        Some(DriverRecommendation {
            kind: AdviceKind::Vibration,
            priority,
            action: DriverAction::ReduceSpeed,
            message,
            current: v,
            target: format!("<{:.2}G", th.vibration_warning_g),
        })
    }

    fn humidity(&self, h: f64) -> Option<DriverRecommendation> {
        let th = &self.thresholds;
        let message = if h > th.humidity_high_pct {
            format!("Humidity {h:.0}% high; monitor for mold growth")
        } else if h < th.humidity_low_pct {
            format!("Humidity {h:.0}% low; produce may dry out")
        } else {
            return None;
        };
        let (lo, hi) = self.humidity_band_pct;
        Some(DriverRecommendation {
            kind: AdviceKind::Humidity,
            priority: AdvicePriority::Info,
            action: DriverAction::Monitor,
            message,
            current: h,
            target: format!("{lo:.0}-{hi:.0}%"),
        })
    }

    fn margin(&self, m: f64) -> Option<DriverRecommendation> {
        let th = &self.thresholds;
        let (priority, action, message, target) = if m < 0.0 {
            (
                AdvicePriority::Critical,
                DriverAction::DumpOrReroute,
                format!("Cargo spoils {:.1} h before reaching any destination; dump or reroute now", -m),
                ">0 h".to_string(),
            )
        } else if m < th.margin_critical_hrs {
            (
                AdvicePriority::Critical,
                DriverAction::Reroute,
                format!("Only {m:.1} h survival margin; immediate rerouting required"),
                format!(">{:.1} h", th.margin_critical_hrs),
            )
        } else if m < th.margin_warning_hrs {
            (
                AdvicePriority::Warning,
                DriverAction::ConsiderReroute,
                format!("Survival margin {m:.1} h leaves little room for delays; consider a faster route"),
                format!(">{:.1} h", th.margin_warning_hrs),
            )
        } else {
            return None;
        };
        Some(DriverRecommendation {
            kind: AdviceKind::Routing,
            priority,
            action,
            message,
            current: m,
            target,
        })
    }
}

impl Default for DriverRecommender {
    fn default() -> Self {
        Self::from_config(&ShieldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reading(t: f64, h: f64, v: f64) -> TelemetryReading {
        TelemetryReading::new(t, h, v, 50.0, Utc::now()).unwrap()
    }

    fn single(advisory: &DriverAdvisory, kind: AdviceKind) -> Option<&DriverRecommendation> {
        let mut matching = advisory.recommendations.iter().filter(|r| r.kind == kind);
        let first = matching.next();
        assert!(matching.next().is_none(), "more than one {kind:?} rule fired");
        first
    }

    fn temperature_advice(t: f64) -> Option<(AdvicePriority, DriverAction)> {
        let advisory = DriverRecommender::default().recommend(&reading(t, 50.0, 0.1), None);
        single(&advisory, AdviceKind::Temperature).map(|r| (r.priority, r.action))
    }

    fn vibration_advice(v: f64) -> Option<AdvicePriority> {
        let advisory = DriverRecommender::default().recommend(&reading(3.0, 50.0, v), None);
        single(&advisory, AdviceKind::Vibration).map(|r| r.priority)
    }

    fn humidity_advice(h: f64) -> Option<AdvicePriority> {
        let advisory = DriverRecommender::default().recommend(&reading(3.0, h, 0.1), None);
        single(&advisory, AdviceKind::Humidity).map(|r| r.priority)
    }

    fn margin_advice(m: f64) -> Option<(AdvicePriority, DriverAction)> {
        let advisory = DriverRecommender::default().recommend(&reading(3.0, 50.0, 0.1), Some(m));
        single(&advisory, AdviceKind::Routing).map(|r| (r.priority, r.action))
    }

    #[test]
    fn test_nominal_reading_gives_no_advice() {
        let advisory = DriverRecommender::default().recommend(&reading(3.0, 50.0, 0.1), Some(12.0));
        assert!(advisory.is_empty());
        assert!(!advisory.action_required);
    }

    #[test]
    fn test_temperature_thresholds() {
        use AdvicePriority::*;
        use DriverAction::*;
        assert_eq!(temperature_advice(8.1), Some((Critical, ReduceTemperature)));
        assert_eq!(temperature_advice(8.0), Some((Warning, AdjustTemperature)));
        assert_eq!(temperature_advice(6.1), Some((Warning, AdjustTemperature)));
        assert_eq!(temperature_advice(6.0), None);
        assert_eq!(temperature_advice(0.0), None);
        assert_eq!(temperature_advice(-0.5), Some((Warning, IncreaseTemperature)));
    }

    #[test]
    fn test_critical_temperature_quotes_target() {
        let advisory = DriverRecommender::default().recommend(&reading(12.0, 50.0, 0.1), None);
        let rec = &advisory.recommendations[0];
        assert_eq!(rec.target, "3.0°C");
        assert_eq!(rec.current, 12.0);
        assert!(rec.message.starts_with("Reduce temperature to 3.0°C"));
    }

    #[test]
    fn test_vibration_thresholds() {
        assert_eq!(vibration_advice(0.51), Some(AdvicePriority::Critical));
        assert_eq!(vibration_advice(0.5), Some(AdvicePriority::Warning));
        assert_eq!(vibration_advice(0.31), Some(AdvicePriority::Warning));
        assert_eq!(vibration_advice(0.3), None);
    }

    #[test]
    fn test_humidity_thresholds() {
        assert_eq!(humidity_advice(70.5), Some(AdvicePriority::Info));
        assert_eq!(humidity_advice(70.0), None);
        assert_eq!(humidity_advice(40.0), None);
        assert_eq!(humidity_advice(39.5), Some(AdvicePriority::Info));
    }

    #[test]
    fn test_margin_thresholds() {
        use AdvicePriority::*;
        use DriverAction::*;
        assert_eq!(margin_advice(-0.1), Some((Critical, DumpOrReroute)));
        assert_eq!(margin_advice(0.0), Some((Critical, Reroute)));
        assert_eq!(margin_advice(1.99), Some((Critical, Reroute)));
        assert_eq!(margin_advice(2.0), Some((Warning, ConsiderReroute)));
        assert_eq!(margin_advice(4.99), Some((Warning, ConsiderReroute)));
        assert_eq!(margin_advice(5.0), None);
    }

    #[test]
    fn test_no_route_gives_no_routing_advice() {
        let advisory = DriverRecommender::default().recommend(&reading(3.0, 50.0, 0.1), None);
        assert!(single(&advisory, AdviceKind::Routing).is_none());
    }

    #[test]
    fn test_critical_advice_sorted_first() {
        let advisory = DriverRecommender::default().recommend(&reading(7.0, 80.0, 0.8), Some(1.0));
        let priorities: Vec<_> = advisory.recommendations.iter().map(|r| r.priority).collect();
        assert_eq!(
            priorities,
            vec![
                AdvicePriority::Critical,
                AdvicePriority::Critical,
                AdvicePriority::Warning,
                AdvicePriority::Info
            ]
        );
        assert_eq!(advisory.recommendations[0].kind, AdviceKind::Vibration);
        assert_eq!(advisory.recommendations[1].kind, AdviceKind::Routing);
        assert_eq!((advisory.critical, advisory.warning, advisory.info), (2, 1, 1));
    }

    #[test]
    fn test_thresholds_follow_config() {
        let mut config = ShieldConfig::default();
        config.driver.vibration_critical_g = 1.0;
        let advisory = DriverRecommender::from_config(&config).recommend(&reading(3.0, 50.0, 0.8), None);
        assert_eq!(advisory.recommendations[0].priority, AdvicePriority::Warning);
    }
}
