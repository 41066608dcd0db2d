//! Terminal outcome of the reroute -> pivot -> dump fallback chain

use tracing::warn;

use crate::types::{DecisionOutcome, MarketPivotDecision, PivotOutcome, RerouteDecision, RerouteOutcome};

/// Collapse the reroute decision and the optional pivot into one terminal state.
///
/// | Reroute           | Pivot           | Outcome         |
/// |-------------------|-----------------|-----------------|
/// | `Continue`        | -               | `Continue`      |
/// | `Reroute`         | -               | `Reroute`       |
/// | `Dump`            | -               | `Dump`          |
/// | `EmergencyRescue` | `Pivoted`       | `Pivoted`       |
/// | `EmergencyRescue` | `Unsalvageable` | `Unsalvageable` |
/// | `EmergencyRescue` | `OnTrack`/none  | `Dump`          |
pub fn resolve(reroute: &RerouteDecision, pivot: Option<&MarketPivotDecision>) -> DecisionOutcome {
    match (reroute.outcome, pivot.map(|p| p.outcome)) {
        (RerouteOutcome::Continue, _) => DecisionOutcome::Continue,
        (RerouteOutcome::Reroute, _) => DecisionOutcome::Reroute,
        (RerouteOutcome::Dump, _) => DecisionOutcome::Dump,
        (RerouteOutcome::EmergencyRescue, Some(PivotOutcome::Pivoted)) => DecisionOutcome::Pivoted,
        (RerouteOutcome::EmergencyRescue, Some(PivotOutcome::Unsalvageable)) => {
            DecisionOutcome::Unsalvageable
        }
        (RerouteOutcome::EmergencyRescue, Some(PivotOutcome::OnTrack)) => {
            warn!("Pivot reported on-track after every destination failed, dumping");
            DecisionOutcome::Dump
        }
        (RerouteOutcome::EmergencyRescue, None) => DecisionOutcome::Dump,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PivotSeverity, RouteRisk};

    fn reroute(outcome: RerouteOutcome) -> RerouteDecision {
        RerouteDecision {
            outcome,
            chosen: None,
            chosen_margin_hrs: None,
            action: None,
            shelf_life_hrs: 10.0,
            overall_risk: RouteRisk::Normal,
            assessments: Vec::new(),
        }
    }

    fn pivot(outcome: PivotOutcome) -> MarketPivotDecision {
        MarketPivotDecision {
            outcome,
            chosen: None,
            recovery_pct: 0.0,
            loss_prevented: 0.0,
            total_loss: 0.0,
            remaining_shelf_life_hrs: 10.0,
            original_eta_hrs: None,
            severity: PivotSeverity::Medium,
            fallback_used: false,
            alternatives: Vec::new(),
        }
    }

    #[test]
    fn test_direct_outcomes_ignore_pivot() {
        assert_eq!(resolve(&reroute(RerouteOutcome::Continue), None), DecisionOutcome::Continue);
        assert_eq!(resolve(&reroute(RerouteOutcome::Reroute), None), DecisionOutcome::Reroute);
        assert_eq!(resolve(&reroute(RerouteOutcome::Dump), None), DecisionOutcome::Dump);
    }

    #[test]
    fn test_emergency_rescue_follows_pivot() {
        let r = reroute(RerouteOutcome::EmergencyRescue);
        assert_eq!(resolve(&r, Some(&pivot(PivotOutcome::Pivoted))), DecisionOutcome::Pivoted);
        assert_eq!(
            resolve(&r, Some(&pivot(PivotOutcome::Unsalvageable))),
            DecisionOutcome::Unsalvageable
        );
        assert_eq!(resolve(&r, Some(&pivot(PivotOutcome::OnTrack))), DecisionOutcome::Dump);
        assert_eq!(resolve(&r, None), DecisionOutcome::Dump);
    }
}
