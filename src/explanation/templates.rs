//! Sentence templates for decision explanations
//!
//! Each function renders one fact already present in the decision trace.
//! Nothing here computes a new number.

use crate::types::{
    DecisionOutcome, DestinationAssessment, DriverRecommendation, LiabilityReport,
    LiabilityRecommendation, MarketChoice, MarketPivotDecision, PivotSeverity, PredictionMode,
    RecommendationPriority, RerouteAction, RerouteDecision, RouteStatus, ShelfLifePrediction,
    TrustScore, ValueAssessment,
};

/// One-line summary for the terminal outcome.
pub fn headline(
    outcome: DecisionOutcome,
    reroute: &RerouteDecision,
    pivot: Option<&MarketPivotDecision>,
) -> String {
    let chosen = reroute.chosen.as_deref().unwrap_or("none");
    match outcome {
        DecisionOutcome::Continue => format!("CONTINUE: deliver to {chosen} as planned"),
        DecisionOutcome::Reroute => format!("REROUTE: divert to {chosen}"),
        DecisionOutcome::Pivoted => {
            let market = pivot
                .and_then(|p| p.chosen.as_ref())
                .map(|m| m.name.as_str())
                .unwrap_or("none");
            format!("PIVOTED: sell to {market} as emergency salvage")
        }
        DecisionOutcome::Unsalvageable => {
            "UNSALVAGEABLE: no market recovers any value from this cargo".to_string()
        }
        DecisionOutcome::Dump => "DUMP: no destination or market can take this cargo".to_string(),
    }
}

pub fn nominal_conditions(prediction: &ShelfLifePrediction) -> String {
    format!(
        "Conditions within safe bands ({:.1}°C, {:.0}% RH, {:.2}G); no accelerated decay",
        prediction.temperature_c, prediction.humidity_pct, prediction.vibration_g
    )
}

pub fn temperature_decay(temperature_c: f64, reference_c: f64, multiplier: f64) -> String {
    format!(
        "Temperature {temperature_c:.1}°C vs ideal {reference_c:.1}°C accelerated decay {multiplier:.1}×"
    )
}

pub fn vibration_decay(vibration_g: f64, threshold_g: f64, multiplier: f64) -> String {
    format!("Vibration {vibration_g:.2}G above {threshold_g:.2}G threshold accelerated decay {multiplier:.1}×")
}

pub fn humidity_decay(humidity_pct: f64, band_max_pct: f64, multiplier: f64) -> String {
    format!(
        "Humidity {humidity_pct:.0}% above {band_max_pct:.0}% band accelerated decay {multiplier:.2}×"
    )
}

pub fn prediction_mode(prediction: &ShelfLifePrediction) -> String {
    match prediction.mode {
        PredictionMode::PhysicsOnly => format!(
            "Physics model: {:.1} of {:.1} base days remain",
            prediction.physics_days, prediction.base_shelf_life_days
        ),
        PredictionMode::Hybrid => match prediction.ml_estimate {
            Some(ml) => format!(
                "Physics {:.1} days blended with regression estimate {:.1} days (adjustment {:+.2} days)",
                prediction.physics_days, ml, prediction.breakdown.ml_adjustment
            ),
            None => format!(
                "Physics {:.1} days; regression estimate not needed under nominal conditions",
                prediction.physics_days
            ),
        },
        PredictionMode::Degraded => match prediction.ml_estimate {
            Some(ml) => format!(
                "Regression estimate {ml:.1} days rejected as implausible; physics-only {:.1} days used",
                prediction.physics_days
            ),
            None => format!(
                "Regression estimator unavailable; physics-only {:.1} days used",
                prediction.physics_days
            ),
        },
    }
}

pub fn remaining_shelf_life(prediction: &ShelfLifePrediction) -> String {
    format!(
        "Remaining shelf life {:.2} days ({:.1} h), status {}",
        prediction.days_left,
        prediction.hours_left(),
        prediction.status
    )
}

/// `None` for evaluated destinations.
pub fn exclusion(assessment: &DestinationAssessment, capacity_limit_pct: f64) -> Option<String> {
    match assessment.status {
        RouteStatus::Evaluated => None,
        RouteStatus::Blocked => Some(format!("{} excluded: road blocked", assessment.name)),
        RouteStatus::HighCapacity => Some(format!(
            "{} excluded: capacity {:.0}% above {:.0}% limit",
            assessment.name, assessment.capacity_pct, capacity_limit_pct
        )),
    }
}

pub fn unsurvivable(assessment: &DestinationAssessment) -> Option<String> {
    match (assessment.survival_margin_hrs, assessment.travel_time_hrs) {
        (Some(sm), Some(travel)) if sm < 0.0 => Some(format!(
            "{} unsurvivable: {:.1} h trip, cargo spoils {:.1} h before arrival",
            assessment.name, travel, -sm
        )),
        _ => None,
    }
}

pub fn destination_chosen(reroute: &RerouteDecision, rerouted: bool) -> String {
    let name = reroute.chosen.as_deref().unwrap_or("none");
    let margin = reroute.chosen_margin_hrs.unwrap_or(0.0);
    let verb = if rerouted { "Rerouted to" } else { "Planned destination" };
    let action = match reroute.action {
        Some(RerouteAction::UrgentDelivery) => "; urgent delivery required",
        Some(RerouteAction::ProceedAsPlanned) | None => "",
    };
    format!("{verb} {name} survivable with {margin:.1} h margin{action}")
}

pub fn no_survivable_destination(evaluated: usize, total: usize) -> String {
    if total == 0 {
        "No destinations configured".to_string()
    } else if evaluated == 0 {
        format!("No destination survivable: all {total} excluded")
    } else {
        format!("No destination survivable: {evaluated} of {total} evaluated, none with a non-negative margin")
    }
}

pub fn pivot_disabled() -> String {
    "Market pivot disabled; cargo dumped".to_string()
}

pub fn pivot_not_run() -> String {
    "Market pivot was not run; cargo dumped".to_string()
}

pub fn pivot_on_track(pivot: &MarketPivotDecision) -> String {
    match pivot.original_eta_hrs {
        Some(eta) => format!(
            "Market pivot found the {eta:.1} h planned ETA still within {:.1} h shelf life; cargo dumped",
            pivot.remaining_shelf_life_hrs
        ),
        None => "Market pivot reported the planned route on track; cargo dumped".to_string(),
    }
}

pub fn planned_eta(pivot: &MarketPivotDecision) -> String {
    match pivot.original_eta_hrs {
        Some(eta) => format!(
            "Planned ETA {eta:.1} h exceeds remaining {:.1} h shelf life",
            pivot.remaining_shelf_life_hrs
        ),
        None => format!(
            "Planned destination unreachable with {:.1} h shelf life left",
            pivot.remaining_shelf_life_hrs
        ),
    }
}

pub fn market_chosen(pivot: &MarketPivotDecision, market: &MarketChoice) -> String {
    let via = if pivot.fallback_used {
        "No market reachable in time, fell back to"
    } else {
        "Pivoted to"
    };
    format!(
        "{via} {} recovering {:.0}% (loss prevented {:.2}, total loss {:.2})",
        market.name, pivot.recovery_pct, pivot.loss_prevented, pivot.total_loss
    )
}

pub fn market_unsalvageable(market: &MarketChoice) -> String {
    format!("Best available market {} recovers nothing; cargo unsalvageable", market.name)
}

pub fn pivot_severity(severity: PivotSeverity, alternatives: usize) -> String {
    let level = match severity {
        PivotSeverity::Low => "low",
        PivotSeverity::Medium => "medium",
        PivotSeverity::High => "high",
        PivotSeverity::Critical => "critical",
    };
    format!("Pivot severity {level}, {alternatives} alternative market(s) reachable")
}

pub fn trust(trust: &TrustScore) -> String {
    let mut line = format!(
        "Trust score {:.1} (grade {}) over {} readings",
        trust.value, trust.grade, trust.readings_analyzed
    );
    if trust.chaos_events > 0 {
        line.push_str(&format!(", {} chaos event(s) recorded", trust.chaos_events));
    }
    if trust.requires_attention {
        line.push_str("; run requires attention");
    }
    line
}

pub fn liability(report: &LiabilityReport) -> String {
    match report.primary_cause {
        Some(cause) => format!(
            "Primary risk cause {cause} ({:.0}% of attributed risk)",
            report.shares.get(cause) * 100.0
        ),
        None => "No out-of-band exposure attributed to any cause".to_string(),
    }
}

pub fn recommendation(rec: &LiabilityRecommendation) -> String {
    let priority = match rec.priority {
        RecommendationPriority::Medium => "MEDIUM",
        RecommendationPriority::High => "HIGH",
    };
    format!("[{priority}] {}: {}", rec.responsible_party, rec.action)
}

pub fn value_preserved(value: &ValueAssessment) -> String {
    format!(
        "Value preserved {:.2} {} of {:.2} ({:.0}% shelf life left, grade {} {}); {:.2} {} per day at stake",
        value.value_preserved,
        value.currency,
        value.cargo_value,
        value.remaining_pct,
        value.grade,
        value.grade.label(),
        value.daily_value,
        value.currency
    )
}

pub fn driver_advice(rec: &DriverRecommendation) -> String {
    format!("Driver [{}]: {} (target {})", rec.priority, rec.message, rec.target)
}
