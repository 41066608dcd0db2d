//! Decision Scenario Tests
//!
//! End-to-end checks of the public decision API: decay physics properties,
//! reroute filtering, the salvage fallback chain, score bounds and the
//! built-in cooling-failure run.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use spoilage_shield::config::ShieldConfig;
use spoilage_shield::sensors::{self, FeedMessage};
use spoilage_shield::types::{
    AdviceKind, AdvicePriority, DecisionOutcome, Destination, DriverAction, HistorySnapshot,
    MarketCategory, MarketOption, PivotOutcome, PivotSeverity, PredictionMode, QualityGrade,
    RerouteAction, RerouteOutcome, RoadStatus, RouteStatus, TelemetryHistory, TelemetryReading,
};
use spoilage_shield::{
    DecayPhysicsModel, DecisionEngine, DecisionRecord, LiabilityEngine, MarketPivotEngine,
    ShelfLifePredictor, ShipmentContext, SurvivalOptimizer, TrustScoreEngine,
};

// ============================================================================
// Helpers
// ============================================================================

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 18, 8, 0, 0).unwrap()
}

fn reading(temperature_c: f64, humidity_pct: f64, vibration_g: f64) -> TelemetryReading {
    TelemetryReading::new(temperature_c, humidity_pct, vibration_g, 120.0, start()).unwrap()
}

fn decide_once(config: &ShieldConfig, r: &TelemetryReading, destinations: &[Destination]) -> DecisionRecord {
    let engine = DecisionEngine::from_config(config).unwrap();
    let history = HistorySnapshot::from_readings(vec![r.clone()]);
    let ctx = ShipmentContext {
        history: &history,
        destinations,
        cargo_value: config.shipment.cargo_value,
    };
    engine.decide(r, &ctx).unwrap()
}

fn all_blocked() -> Vec<Destination> {
    vec![
        Destination::new("Premium_Supermarket", RoadStatus::Blocked, 60.0, 4.0),
        Destination::new("Center_A", RoadStatus::Blocked, 75.0, 6.0),
        Destination::new("Center_B", RoadStatus::Blocked, 85.0, 8.0),
    ]
}

// ============================================================================
// Decay physics
// ============================================================================

#[test]
fn nominal_conditions_keep_full_shelf_life() {
    let config = ShieldConfig::default();
    let predictor = ShelfLifePredictor::from_config(&config);

    for t in [-5.0, 0.0, 2.0, 4.0] {
        for v in [0.0, 0.3, 0.5] {
            for h in [40.0, 50.0, 60.0] {
                let p = predictor.predict(&reading(t, h, v), 14.0);
                assert_eq!(p.days_left, 14.0, "t={t} v={v} h={h}");
                assert_eq!(p.mode, PredictionMode::PhysicsOnly);
            }
        }
    }
}

#[test]
fn q10_doubles_every_ten_degrees() {
    let config = ShieldConfig::default();
    let physics = DecayPhysicsModel::new(&config.physics, &config.bands);
    assert!((physics.temperature_multiplier(14.0) - 2.0).abs() < 1e-12);
    assert!((physics.temperature_multiplier(24.0) - 4.0).abs() < 1e-12);
    assert_eq!(physics.temperature_multiplier(4.0), 1.0);
}

#[test]
fn vibration_threshold_is_exclusive() {
    let config = ShieldConfig::default();
    let physics = DecayPhysicsModel::new(&config.physics, &config.bands);
    assert_eq!(physics.vibration_multiplier(0.5), 1.0);
    assert_eq!(physics.vibration_multiplier(0.5001), 1.5);
}

#[test]
fn shelf_life_strictly_decreases_above_reference() {
    let predictor = ShelfLifePredictor::from_config(&ShieldConfig::default());
    let mut previous = predictor.predict(&reading(4.0, 50.0, 0.1), 14.0).days_left;
    for step in 1..=36 {
        let t = 4.0 + f64::from(step);
        let days = predictor.predict(&reading(t, 50.0, 0.1), 14.0).days_left;
        assert!(days < previous, "days_left did not drop at {t}°C");
        previous = days;
    }
}

#[test]
fn shelf_life_never_increases_with_vibration_or_humidity() {
    let predictor = ShelfLifePredictor::from_config(&ShieldConfig::default());
    let mut previous = f64::INFINITY;
    for v in [0.0, 0.2, 0.5, 0.6, 1.5, 3.0] {
        let days = predictor.predict(&reading(10.0, 50.0, v), 14.0).days_left;
        assert!(days <= previous);
        previous = days;
    }

    let mut previous = f64::INFINITY;
    for h in [40.0, 55.0, 60.0, 70.0, 85.0, 100.0] {
        let days = predictor.predict(&reading(10.0, h, 0.1), 14.0).days_left;
        assert!(days <= previous);
        previous = days;
    }
}

#[test]
fn prediction_stays_within_base_for_random_readings() {
    let predictor = ShelfLifePredictor::from_config(&ShieldConfig::default());
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let r = reading(
            rng.gen_range(-40.0..=80.0),
            rng.gen_range(0.0..=100.0),
            rng.gen_range(0.0..=5.0),
        );
        let p = predictor.predict(&r, 14.0);
        assert!((0.0..=14.0).contains(&p.days_left), "{p:?}");
        assert!(p.decay_rate >= 1.0);
    }
}

// ============================================================================
// Reroute
// ============================================================================

#[test]
fn blocked_or_overbooked_destinations_are_never_chosen() {
    let optimizer = SurvivalOptimizer::new(90.0, 2.0, true);
    let destinations = vec![
        Destination::new("Closest_But_Blocked", RoadStatus::Blocked, 10.0, 0.5),
        Destination::new("Closest_But_Full", RoadStatus::Open, 97.0, 0.5),
        Destination::new("Far_Depot", RoadStatus::Open, 50.0, 20.0),
    ];

    let decision = optimizer.optimize(1.0, &destinations);
    assert_eq!(decision.outcome, RerouteOutcome::Reroute);
    assert_eq!(decision.chosen.as_deref(), Some("Far_Depot"));
    assert_eq!(
        decision.assessment("Closest_But_Blocked").unwrap().status,
        RouteStatus::Blocked
    );
    assert_eq!(
        decision.assessment("Closest_But_Full").unwrap().status,
        RouteStatus::HighCapacity
    );
}

#[test]
fn no_viable_destination_escalates_or_dumps() {
    let destinations = vec![
        Destination::new("Blocked", RoadStatus::Blocked, 10.0, 1.0),
        Destination::new("Full", RoadStatus::Open, 99.0, 1.0),
        Destination::new("Too_Far", RoadStatus::Open, 40.0, 72.0),
    ];

    let rescue = SurvivalOptimizer::new(90.0, 2.0, true).optimize(1.0, &destinations);
    assert_eq!(rescue.outcome, RerouteOutcome::EmergencyRescue);
    assert!(rescue.chosen.is_none());

    let dump = SurvivalOptimizer::new(90.0, 2.0, false).optimize(1.0, &destinations);
    assert_eq!(dump.outcome, RerouteOutcome::Dump);
    assert!(dump.action.is_none());
}

#[test]
fn planned_destination_with_thin_margin_is_urgent() {
    let destinations = vec![Destination::new("Planned", RoadStatus::Open, 50.0, 23.0)];
    let decision = SurvivalOptimizer::new(90.0, 2.0, true).optimize(1.0, &destinations);
    assert_eq!(decision.outcome, RerouteOutcome::Continue);
    assert_eq!(decision.action, Some(RerouteAction::UrgentDelivery));
}

// ============================================================================
// Market pivot
// ============================================================================

fn pivot_engine() -> MarketPivotEngine {
    MarketPivotEngine::new(
        vec![
            MarketOption::new("Plant_Alpha", MarketCategory::Processor, 0.65, 8.0),
            MarketOption::new("Market_Beta", MarketCategory::Wholesale, 0.40, 12.0),
            MarketOption::new("Compost_Delta", MarketCategory::Compost, 0.05, 1.0),
        ],
        "Compost_Delta",
    )
    .unwrap()
}

#[test]
fn pivot_picks_best_reachable_market() {
    let decision = pivot_engine().pivot(10.0, 40.0, 700_000.0);
    assert_eq!(decision.outcome, PivotOutcome::Pivoted);

    let chosen = decision.chosen.as_ref().unwrap();
    assert_eq!(chosen.name, "Plant_Alpha");
    assert!((decision.loss_prevented - 455_000.0).abs() < 1e-6);
    assert!((decision.total_loss - 245_000.0).abs() < 1e-6);
    assert!((decision.recovery_pct - 65.0).abs() < 1e-9);
    assert_eq!(decision.original_eta_hrs, Some(40.0));
    assert!(!decision.fallback_used);
    // Market_Beta needs 12 h and is not reachable
    assert_eq!(decision.alternatives.len(), 1);
    assert_eq!(decision.alternatives[0].name, "Compost_Delta");
}

#[test]
fn pivot_always_returns_a_market() {
    let engine = pivot_engine();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let remaining = rng.gen_range(0.0..30.0);
        let decision = engine.pivot(remaining, 40.0, 100_000.0);
        assert!(decision.chosen.is_some());
        assert!(decision.loss_prevented <= 100_000.0);
    }

    let decision = engine.pivot(0.5, f64::INFINITY, 100_000.0);
    assert!(decision.fallback_used);
    assert_eq!(decision.chosen.unwrap().name, "Compost_Delta");
    assert_eq!(decision.severity, PivotSeverity::Critical);
    assert_eq!(decision.original_eta_hrs, None);
}

// ============================================================================
// Trust and liability
// ============================================================================

fn random_history(rng: &mut StdRng, len: usize, chaos: usize) -> HistorySnapshot {
    let mut history = TelemetryHistory::new(1000);
    for i in 0..len {
        let r = TelemetryReading::new(
            rng.gen_range(-40.0..=80.0),
            rng.gen_range(0.0..=100.0),
            rng.gen_range(0.0..=4.0),
            100.0,
            start() + Duration::minutes(i as i64),
        )
        .unwrap();
        history.push(r);
    }
    for i in 0..chaos {
        history.record_chaos_event(start() + Duration::minutes(i as i64), "cooling_failure");
    }
    history.snapshot(60)
}

#[test]
fn trust_score_stays_in_bounds() {
    let engine = TrustScoreEngine::from_config(&ShieldConfig::default());
    let mut rng = StdRng::seed_from_u64(1);
    for round in 0..50 {
        let snapshot = random_history(&mut rng, 1 + round % 80, round % 6);
        let score = engine.score(&snapshot);
        assert!((0.0..=100.0).contains(&score.value), "{score:?}");
    }

    assert_eq!(engine.score(&HistorySnapshot::default()).value, 100.0);
}

#[test]
fn liability_shares_sum_to_one() {
    let engine = LiabilityEngine::from_config(&ShieldConfig::default());
    let mut rng = StdRng::seed_from_u64(2);
    for round in 0..50 {
        let snapshot = random_history(&mut rng, 5 + round, 0);
        let report = engine.attribute(&snapshot);
        if report.has_deviation() {
            assert!((report.shares.sum() - 1.0).abs() < 1e-9, "{report:?}");
        } else {
            assert_eq!(report.shares.sum(), 0.0);
        }
    }
}

// ============================================================================
// Full decision cycle
// ============================================================================

#[test]
fn mild_warming_keeps_the_plan() {
    let config = ShieldConfig::default();
    let record = decide_once(&config, &reading(5.0, 50.0, 0.2), &config.reroute.destinations);

    // 14 / 2^0.1 ≈ 13.06 days, shown to drivers as 14
    assert!((record.prediction.days_left - 13.06).abs() < 0.01);
    assert_eq!(record.forecast.whole_days_remaining, 14);
    assert_eq!(record.outcome, DecisionOutcome::Continue);
    assert_eq!(record.reroute.chosen.as_deref(), Some("Premium_Supermarket"));
    assert!(record.pivot.is_none());
}

#[test]
fn hot_rough_run_with_every_road_closed_pivots() {
    let config = ShieldConfig::default();
    let record = decide_once(&config, &reading(40.0, 50.0, 0.8), &all_blocked());

    assert_eq!(record.reroute.outcome, RerouteOutcome::EmergencyRescue);
    assert_eq!(record.outcome, DecisionOutcome::Pivoted);
    let pivot = record.pivot.as_ref().unwrap();
    assert_eq!(pivot.chosen.as_ref().unwrap().name, "Plant_Alpha");
    assert_eq!(pivot.original_eta_hrs, None);
    assert!(record
        .explanation
        .lines
        .iter()
        .any(|line| line.contains("Plant_Alpha")));
}

#[test]
fn hot_rough_run_dumps_when_pivot_disabled() {
    let mut config = ShieldConfig::default();
    config.pivot.enabled = false;
    let record = decide_once(&config, &reading(40.0, 50.0, 0.8), &all_blocked());

    assert_eq!(record.reroute.outcome, RerouteOutcome::Dump);
    assert_eq!(record.outcome, DecisionOutcome::Dump);
    assert!(record.pivot.is_none());
    assert_eq!(record.explanation.outcome, DecisionOutcome::Dump);
}

// ============================================================================
// Value and driver advice
// ============================================================================

#[test]
fn thin_margin_tells_the_driver_to_reroute() {
    let config = ShieldConfig::default();
    // 14 / 2^2.6 ≈ 2.31 days ≈ 55.4 h against a 54 h trip
    let destinations = vec![Destination::new("Depot_Far", RoadStatus::Open, 50.0, 54.0)];
    let record = decide_once(&config, &reading(30.0, 50.0, 0.1), &destinations);

    assert_eq!(record.outcome, DecisionOutcome::Continue);
    let routing = record
        .driver_advice
        .recommendations
        .iter()
        .find(|r| r.kind == AdviceKind::Routing)
        .unwrap();
    assert_eq!(routing.priority, AdvicePriority::Critical);
    assert_eq!(routing.action, DriverAction::Reroute);
    assert!((routing.current - 1.42).abs() < 0.01);
    assert!(record.driver_advice.action_required);
}

#[test]
fn unsurvivable_route_advises_dump_or_reroute() {
    let config = ShieldConfig::default();
    let destinations = vec![Destination::new("Depot_Far", RoadStatus::Open, 50.0, 60.0)];
    let record = decide_once(&config, &reading(30.0, 50.0, 0.1), &destinations);

    assert_eq!(record.outcome, DecisionOutcome::Pivoted);
    let routing = record
        .driver_advice
        .recommendations
        .iter()
        .find(|r| r.kind == AdviceKind::Routing)
        .unwrap();
    assert_eq!(routing.priority, AdvicePriority::Critical);
    assert_eq!(routing.action, DriverAction::DumpOrReroute);
    assert!(routing.current < 0.0);
}

#[test]
fn value_preserved_tracks_shelf_life() {
    let config = ShieldConfig::default();
    let nominal = decide_once(&config, &reading(3.0, 50.0, 0.1), &config.reroute.destinations);
    assert_eq!(nominal.value.value_preserved, config.shipment.cargo_value);
    assert_eq!(nominal.value.grade, QualityGrade::A);

    let hot = decide_once(&config, &reading(40.0, 50.0, 0.8), &all_blocked());
    assert_eq!(hot.value.grade, QualityGrade::F);
    assert!(
        (hot.value.value_preserved + hot.value.wasted_value - config.shipment.cargo_value).abs()
            < 1e-6
    );
    assert!(hot
        .explanation
        .lines
        .iter()
        .any(|l| l.starts_with("Value preserved")));
}

#[test]
fn record_serializes_to_json() {
    let config = ShieldConfig::default();
    let record = decide_once(&config, &reading(40.0, 50.0, 0.8), &all_blocked());
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["outcome"], "PIVOTED");
    assert_eq!(json["reroute"]["outcome"], "EMERGENCY_RESCUE");
    // Infinite travel time to a blocked destination is reported as null
    assert!(json["reroute"]["assessments"][0]["travel_time_hrs"].is_null());
    assert_eq!(json["driver_advice"]["recommendations"][0]["priority"], "CRITICAL");
    assert_eq!(json["value"]["grade"], "F");
}

#[test]
fn demo_cooling_failure_run_ends_in_salvage() {
    let config = ShieldConfig::default();
    let engine = DecisionEngine::from_config(&config).unwrap();
    let mut history = TelemetryHistory::new(config.history.capacity);
    let mut destinations = config.reroute.destinations.clone();
    let mut records = Vec::new();

    for message in sensors::demo_scenario() {
        match message {
            FeedMessage::Chaos {
                chaos_event,
                timestamp,
            } => history.record_chaos_event(timestamp.unwrap_or_else(start), chaos_event),
            FeedMessage::Road { road_update } => assert!(road_update.apply(&mut destinations)),
            FeedMessage::Reading(r) => {
                history.push(r.clone());
                let snapshot = history.snapshot(config.trust.window);
                let ctx = ShipmentContext {
                    history: &snapshot,
                    destinations: &destinations,
                    cargo_value: config.shipment.cargo_value,
                };
                records.push(engine.decide(&r, &ctx).unwrap());
            }
        }
    }

    assert_eq!(records.len(), 26);
    assert_eq!(records[0].outcome, DecisionOutcome::Continue);
    assert_eq!(records[0].trust.value, 100.0);

    let last = records.last().unwrap();
    assert_eq!(last.outcome, DecisionOutcome::Pivoted);
    assert_eq!(last.trust.chaos_events, 1);
    assert!(last.trust.value < records[0].trust.value);
    assert!(last.liability.has_deviation());
    assert!(records.iter().all(|r| r.explanation.outcome == r.outcome));
    assert!(records
        .iter()
        .all(|r| r.pivot.is_some() == (r.reroute.outcome == RerouteOutcome::EmergencyRescue)));
}
