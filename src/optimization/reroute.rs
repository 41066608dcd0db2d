//! SurvivalOptimizer: pick the destination the cargo survives the trip to

use tracing::debug;

use crate::config::ShieldConfig;
use crate::types::{
    CapacityRisk, Destination, DestinationAssessment, RerouteAction, RerouteDecision,
    RerouteOutcome, RouteRisk, RouteStatus,
};

/// Survival-margin based destination selection.
///
/// `SM = days_left * 24 - travel_time_hrs`. Blocked and over-capacity
/// destinations are never scored. The highest SM wins; ties go to the
/// destination listed first. Choosing the first (planned) destination
/// means `Continue`, any other choice means `Reroute`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurvivalOptimizer {
    capacity_risk_threshold_pct: f64,
    capacity_medium_pct: f64,
    urgent_margin_hrs: f64,
    pivot_enabled: bool,
}

impl SurvivalOptimizer {
    pub fn new(capacity_risk_threshold_pct: f64, urgent_margin_hrs: f64, pivot_enabled: bool) -> Self {
        Self {
            capacity_risk_threshold_pct,
            capacity_medium_pct: 70.0_f64.min(capacity_risk_threshold_pct),
            urgent_margin_hrs,
            pivot_enabled,
        }
    }

    pub fn from_config(config: &ShieldConfig) -> Self {
        Self {
            capacity_risk_threshold_pct: config.reroute.capacity_risk_threshold_pct,
            capacity_medium_pct: config.reroute.capacity_medium_pct,
            urgent_margin_hrs: config.reroute.urgent_margin_hrs,
            pivot_enabled: config.pivot.enabled,
        }
    }

    pub fn pivot_enabled(&self) -> bool {
        self.pivot_enabled
    }

    fn capacity_risk(&self, capacity_pct: f64) -> CapacityRisk {
        if capacity_pct > self.capacity_risk_threshold_pct {
            CapacityRisk::High
        } else if capacity_pct > self.capacity_medium_pct {
            CapacityRisk::Medium
        } else {
            CapacityRisk::Low
        }
    }

    fn assess(&self, destination: &Destination, shelf_life_hrs: f64) -> DestinationAssessment {
        let capacity_risk = self.capacity_risk(destination.capacity_pct);
        let status = if destination.is_blocked() {
            RouteStatus::Blocked
        } else if capacity_risk == CapacityRisk::High {
            RouteStatus::HighCapacity
        } else {
            RouteStatus::Evaluated
        };

        let travel = destination.effective_travel_time_hrs();
        DestinationAssessment {
            name: destination.name.clone(),
            status,
            capacity_pct: destination.capacity_pct,
            capacity_risk,
            travel_time_hrs: travel.is_finite().then_some(travel),
            survival_margin_hrs: (status == RouteStatus::Evaluated)
                .then(|| shelf_life_hrs - travel),
        }
    }

    pub fn optimize(&self, days_left: f64, destinations: &[Destination]) -> RerouteDecision {
        let shelf_life_hrs = days_left * 24.0;

        // 1. Assess every destination (full audit table, catalog order)
        let assessments: Vec<DestinationAssessment> = destinations
            .iter()
            .map(|d| self.assess(d, shelf_life_hrs))
            .collect();

        // 2. Best survival margin among evaluated destinations; strict `>` keeps the first on ties
        let mut best: Option<(usize, f64)> = None;
        for (i, a) in assessments.iter().enumerate() {
            if let Some(sm) = a.survival_margin_hrs {
                if best.map_or(true, |(_, b)| sm > b) {
                    best = Some((i, sm));
                }
            }
        }

        // 3. Overall route risk
        let overall_risk = if !destinations.is_empty() && destinations.iter().all(Destination::is_blocked) {
            RouteRisk::Critical
        } else if assessments.iter().any(|a| a.capacity_risk == CapacityRisk::High) {
            RouteRisk::High
        } else {
            RouteRisk::Normal
        };

        // 4. Viable only with a non-negative margin
        let decision = match best {
            Some((index, sm)) if sm >= 0.0 => RerouteDecision {
                outcome: if index == 0 {
                    RerouteOutcome::Continue
                } else {
                    RerouteOutcome::Reroute
                },
                chosen: Some(assessments[index].name.clone()),
                chosen_margin_hrs: Some(sm),
                action: Some(if sm >= self.urgent_margin_hrs {
                    RerouteAction::ProceedAsPlanned
                } else {
                    RerouteAction::UrgentDelivery
                }),
                shelf_life_hrs,
                overall_risk,
                assessments,
            },
            _ => RerouteDecision {
                outcome: if self.pivot_enabled {
                    RerouteOutcome::EmergencyRescue
                } else {
                    RerouteOutcome::Dump
                },
                chosen: None,
                chosen_margin_hrs: None,
                action: None,
                shelf_life_hrs,
                overall_risk,
                assessments,
            },
        };

        debug!(
            outcome = ?decision.outcome,
            chosen = decision.chosen.as_deref().unwrap_or("none"),
            shelf_life_hrs,
            "Reroute evaluation"
        );
        decision
    }
}

impl Default for SurvivalOptimizer {
    fn default() -> Self {
        Self::from_config(&ShieldConfig::default())
    }
}
