//! ExplanationGenerator - narrates a decision cycle as ordered rationale lines
//!
//! Narration order: decay drivers, prediction mode, remaining shelf life,
//! route audit, salvage, trust, liability. Value preserved and driver advice
//! are appended last. Every line is rendered from a number already present
//! in the decision trace.

pub mod templates;

use crate::config::ShieldConfig;
use crate::pipeline::outcome::resolve;
use crate::types::{
    DecisionOutcome, DriverAdvisory, Explanation, LiabilityReport, MarketPivotDecision,
    PivotOutcome, RerouteDecision, RerouteOutcome, RouteStatus, ShelfLifePrediction, TrustScore,
    ValueAssessment,
};

/// Reference points quoted in decay lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationGenerator {
    reference_temperature_c: f64,
    vibration_threshold_g: f64,
    humidity_max_pct: f64,
    capacity_limit_pct: f64,
}

impl ExplanationGenerator {
    pub fn from_config(config: &ShieldConfig) -> Self {
        Self {
            reference_temperature_c: config.physics.reference_temperature_c,
            vibration_threshold_g: config.physics.vibration_threshold_g,
            humidity_max_pct: config.bands.humidity_max_pct,
            capacity_limit_pct: config.reroute.capacity_risk_threshold_pct,
        }
    }

    pub fn explain(
        &self,
        prediction: &ShelfLifePrediction,
        reroute: &RerouteDecision,
        pivot: Option<&MarketPivotDecision>,
        trust: &TrustScore,
        liability: &LiabilityReport,
    ) -> Explanation {
        let outcome = resolve(reroute, pivot);
        let mut lines = self.decay_lines(prediction);
        lines.push(templates::prediction_mode(prediction));
        lines.push(templates::remaining_shelf_life(prediction));
        lines.extend(self.route_lines(outcome, reroute));
        lines.extend(self.salvage_lines(outcome, reroute, pivot));

        lines.push(templates::trust(trust));
        lines.push(templates::liability(liability));
        lines.extend(liability.recommendations.iter().map(templates::recommendation));

        Explanation {
            outcome,
            headline: templates::headline(outcome, reroute, pivot),
            lines,
        }
    }

    /// Appends the value line and one line per driver recommendation,
    /// most urgent first.
    pub fn append_advisory(
        &self,
        explanation: &mut Explanation,
        value: &ValueAssessment,
        advice: &DriverAdvisory,
    ) {
        explanation.lines.push(templates::value_preserved(value));
        explanation
            .lines
            .extend(advice.recommendations.iter().map(templates::driver_advice));
    }

    fn decay_lines(&self, prediction: &ShelfLifePrediction) -> Vec<String> {
        let b = &prediction.breakdown;
        let mut lines = Vec::new();
        if b.temp_multiplier > 1.0 {
            lines.push(templates::temperature_decay(
                prediction.temperature_c,
                self.reference_temperature_c,
                b.temp_multiplier,
            ));
        }
        if b.vibration_multiplier > 1.0 {
            lines.push(templates::vibration_decay(
                prediction.vibration_g,
                self.vibration_threshold_g,
                b.vibration_multiplier,
            ));
        }
        if b.humidity_multiplier > 1.0 {
            lines.push(templates::humidity_decay(
                prediction.humidity_pct,
                self.humidity_max_pct,
                b.humidity_multiplier,
            ));
        }
        if lines.is_empty() {
            lines.push(templates::nominal_conditions(prediction));
        }
        lines
    }

    fn route_lines(&self, outcome: DecisionOutcome, reroute: &RerouteDecision) -> Vec<String> {
        let mut lines: Vec<String> = reroute
            .assessments
            .iter()
            .filter_map(|a| templates::exclusion(a, self.capacity_limit_pct))
            .collect();

        match outcome {
            DecisionOutcome::Continue => lines.push(templates::destination_chosen(reroute, false)),
            DecisionOutcome::Reroute => lines.push(templates::destination_chosen(reroute, true)),
            DecisionOutcome::Pivoted | DecisionOutcome::Unsalvageable | DecisionOutcome::Dump => {
                lines.extend(reroute.assessments.iter().filter_map(templates::unsurvivable));
                let evaluated = reroute
                    .assessments
                    .iter()
                    .filter(|a| a.status == RouteStatus::Evaluated)
                    .count();
                lines.push(templates::no_survivable_destination(
                    evaluated,
                    reroute.assessments.len(),
                ));
            }
        }
        lines
    }

    fn salvage_lines(
        &self,
        outcome: DecisionOutcome,
        reroute: &RerouteDecision,
        pivot: Option<&MarketPivotDecision>,
    ) -> Vec<String> {
        match (outcome, pivot) {
            (DecisionOutcome::Continue | DecisionOutcome::Reroute, _) => Vec::new(),
            (_, Some(p)) => {
                let mut lines = Vec::new();
                match (p.outcome, p.chosen.as_ref()) {
                    (PivotOutcome::OnTrack, _) => lines.push(templates::pivot_on_track(p)),
                    (PivotOutcome::Pivoted, Some(market)) => {
                        lines.push(templates::planned_eta(p));
                        lines.push(templates::market_chosen(p, market));
                        lines.push(templates::pivot_severity(p.severity, p.alternatives.len()));
                    }
                    (PivotOutcome::Unsalvageable, Some(market)) => {
                        lines.push(templates::planned_eta(p));
                        lines.push(templates::market_unsalvageable(market));
                    }
                    (PivotOutcome::Pivoted | PivotOutcome::Unsalvageable, None) => {
                        lines.push(templates::planned_eta(p));
                    }
                }
                lines
            }
            (_, None) => match reroute.outcome {
                RerouteOutcome::EmergencyRescue => vec![templates::pivot_not_run()],
                _ => vec![templates::pivot_disabled()],
            },
        }
    }
}

impl Default for ExplanationGenerator {
    fn default() -> Self {
        Self::from_config(&ShieldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml_engine::ShelfLifePredictor;
    use crate::optimization::{MarketPivotEngine, SurvivalOptimizer};
    use crate::scoring::{LiabilityEngine, TrustScoreEngine};
    use crate::types::{Destination, HistorySnapshot, RoadStatus, TelemetryReading};
    use chrono::Utc;

    struct Trace {
        prediction: ShelfLifePrediction,
        reroute: RerouteDecision,
        pivot: Option<MarketPivotDecision>,
        trust: TrustScore,
        liability: LiabilityReport,
    }

    fn trace(t: f64, v: f64, destinations: &[Destination], pivot_enabled: bool) -> Trace {
        let config = ShieldConfig::default();
        let reading = TelemetryReading::new(t, 50.0, v, 100.0, Utc::now()).unwrap();
        let prediction = ShelfLifePredictor::from_config(&config).predict(&reading, 14.0);
        let reroute = SurvivalOptimizer::new(90.0, 2.0, pivot_enabled).optimize(prediction.days_left, destinations);
        let pivot = (reroute.outcome == RerouteOutcome::EmergencyRescue).then(|| {
            MarketPivotEngine::from_config(&config)
                .unwrap()
                .pivot(prediction.hours_left(), f64::INFINITY, 700_000.0)
        });
        let history = HistorySnapshot::from_readings(vec![reading]);
        Trace {
            trust: TrustScoreEngine::default().score(&history),
            liability: LiabilityEngine::default().attribute(&history),
            prediction,
            reroute,
            pivot,
        }
    }

    fn explain(tr: &Trace) -> Explanation {
        ExplanationGenerator::default().explain(
            &tr.prediction,
            &tr.reroute,
            tr.pivot.as_ref(),
            &tr.trust,
            &tr.liability,
        )
    }

    #[test]
    fn test_nominal_continue() {
        let dest = vec![Destination::new("Premium_Supermarket", RoadStatus::Open, 60.0, 4.0)];
        let e = explain(&trace(3.0, 0.1, &dest, true));
        assert_eq!(e.outcome, DecisionOutcome::Continue);
        assert!(e.headline.starts_with("CONTINUE"));
        assert!(e.lines[0].starts_with("Conditions within safe bands"));
        assert!(e.lines.iter().any(|l| l.starts_with("Planned destination Premium_Supermarket")));
    }

    #[test]
    fn test_hot_blocked_pivot() {
        let dest = vec![Destination::new("Premium_Supermarket", RoadStatus::Blocked, 60.0, 4.0)];
        let e = explain(&trace(38.0, 0.8, &dest, true));
        assert_eq!(e.outcome, DecisionOutcome::Pivoted);
        assert!(e.lines[0].starts_with("Temperature 38.0°C vs ideal 4.0°C accelerated decay"));
        assert!(e.lines.iter().any(|l| l.starts_with("Vibration 0.80G")));
        assert!(e.lines.iter().any(|l| l == "Premium_Supermarket excluded: road blocked"));
        assert!(e.lines.iter().any(|l| l.starts_with("Pivoted to Plant_Alpha recovering 65%")));
    }

    #[test]
    fn test_hybrid_at_nominal_conditions_does_not_claim_a_blend() {
        use crate::ml_engine::{Hybrid, LinearEstimator, LinearModelArtifact};
        use crate::physics_engine::DecayPhysicsModel;

        let artifact = LinearModelArtifact {
            feature_means: [0.0, 0.0, 0.0],
            feature_scales: [1.0, 1.0, 1.0],
            coefficients: [-0.5, 0.0, 0.0],
            intercept: 14.0,
            trained_at: None,
        };
        let estimator = LinearEstimator::new(artifact).unwrap();
        let predictor = ShelfLifePredictor::new(
            DecayPhysicsModel::default(),
            Box::new(Hybrid::new(Box::new(estimator), 0.6, 2.0)),
        );
        let dest = vec![Destination::new("Premium_Supermarket", RoadStatus::Open, 60.0, 4.0)];
        let mut tr = trace(3.0, 0.1, &dest, true);
        let reading = TelemetryReading::new(3.0, 50.0, 0.1, 100.0, Utc::now()).unwrap();
        tr.prediction = predictor.predict(&reading, 14.0);
        assert_eq!(tr.prediction.mode, crate::types::PredictionMode::Hybrid);
        assert_eq!(tr.prediction.ml_estimate, None);

        let e = explain(&tr);
        let mode_line = &e.lines[1];
        assert!(mode_line.contains("not needed"), "{mode_line}");
        assert!(!mode_line.contains("blended"), "{mode_line}");
    }

    #[test]
    fn test_advisory_lines_follow_the_trace() {
        use crate::advisory::DriverRecommender;
        use crate::optimization::ProfitOptimizer;

        let dest = vec![Destination::new("Premium_Supermarket", RoadStatus::Blocked, 60.0, 4.0)];
        let tr = trace(38.0, 0.8, &dest, true);
        let mut e = explain(&tr);
        let before = e.lines.len();

        let value = ProfitOptimizer::default().assess(700_000.0, tr.prediction.days_left, 14.0);
        let reading = TelemetryReading::new(38.0, 50.0, 0.8, 100.0, Utc::now()).unwrap();
        let advice = DriverRecommender::default().recommend(&reading, tr.reroute.driving_margin_hrs());
        ExplanationGenerator::default().append_advisory(&mut e, &value, &advice);

        assert_eq!(e.lines.len(), before + 1 + advice.recommendations.len());
        assert!(e.lines[before].starts_with("Value preserved"));
        assert!(e.lines[before].contains("grade F Critical"));
        assert!(e.lines[before + 1].starts_with("Driver [CRITICAL]: Reduce temperature to 3.0°C"));
    }

    #[test]
    fn test_dump_when_pivot_disabled() {
        let dest = vec![Destination::new("Premium_Supermarket", RoadStatus::Blocked, 60.0, 4.0)];
        let generator = ExplanationGenerator::default();
        let tr = trace(38.0, 0.8, &dest, false);
        let e = generator.explain(&tr.prediction, &tr.reroute, None, &tr.trust, &tr.liability);
        assert_eq!(e.outcome, DecisionOutcome::Dump);
        assert!(e.lines.iter().any(|l| l == "Market pivot disabled; cargo dumped"));
    }
}
