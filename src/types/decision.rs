//! Decision types produced by one cycle of the engine.
//!
//! Every record here is recomputed from scratch each cycle and is plain
//! serialisable data. Unbounded quantities (blocked-road travel time, an
//! unreachable planned ETA) are carried as `None` so the JSON stays valid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::advisory::DriverAdvisory;
use super::catalog::MarketCategory;
use super::scoring::{LiabilityReport, TrustScore};
use super::telemetry::TelemetryReading;

// ============================================================================
// Shelf-life prediction
// ============================================================================

/// Coarse health classification of the remaining shelf life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShelfLifeStatus {
    Normal,
    Warning,
    Critical,
}

impl ShelfLifeStatus {
    pub fn classify(days_left: f64, warning_days: f64, critical_days: f64) -> Self {
        if days_left < critical_days {
            ShelfLifeStatus::Critical
        } else if days_left < warning_days {
            ShelfLifeStatus::Warning
        } else {
            ShelfLifeStatus::Normal
        }
    }
}

impl std::fmt::Display for ShelfLifeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShelfLifeStatus::Normal => write!(f, "NORMAL"),
            ShelfLifeStatus::Warning => write!(f, "WARNING"),
            ShelfLifeStatus::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// How the final `days_left` figure was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMode {
    /// No regression estimator configured
    PhysicsOnly,
    /// Physics blended with a plausible regression estimate
    Hybrid,
    /// Estimator configured but failed or returned an implausible value
    Degraded,
}

/// Per-stress decay factors plus the signed regression adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayBreakdown {
    pub temp_multiplier: f64,
    pub vibration_multiplier: f64,
    pub humidity_multiplier: f64,
    /// `days_left - physics_days`; zero whenever the regression estimate was not used
    pub ml_adjustment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfLifePrediction {
    /// Final remaining shelf life (days, >= 0)
    pub days_left: f64,
    /// Physics-only remaining shelf life (days)
    pub physics_days: f64,
    /// Raw regression estimate, when one was obtained
    pub ml_estimate: Option<f64>,
    pub base_shelf_life_days: f64,
    /// Combined decay multiplier (product of the three stress multipliers)
    pub decay_rate: f64,
    pub breakdown: DecayBreakdown,
    pub status: ShelfLifeStatus,
    pub mode: PredictionMode,
    /// Stresses the prediction was computed from
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub vibration_g: f64,
}

impl ShelfLifePrediction {
    pub fn hours_left(&self) -> f64 {
        self.days_left * 24.0
    }

    /// Remaining shelf life rounded up to whole days, as shown to drivers.
    pub fn whole_days_remaining(&self) -> u32 {
        let days = self.days_left.max(0.0).ceil();
        if days >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            days as u32
        }
    }
}

/// Projected shelf life a few hours ahead at the current decay rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub hours_ahead: f64,
    pub days_left: f64,
    pub status: ShelfLifeStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfLifeForecast {
    pub hours_remaining: f64,
    pub whole_days_remaining: u32,
    /// Wall-clock time at which the cargo is expected to be fully spoiled
    pub expires_at: Option<DateTime<Utc>>,
    /// Days of base shelf life consumed per hour under current conditions
    pub decay_per_hour: f64,
    pub projections: Vec<ForecastPoint>,
    /// Status at the furthest projection horizon
    pub urgency: ShelfLifeStatus,
}

// ============================================================================
// Reroute
// ============================================================================

/// Why a destination was or was not scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Evaluated,
    Blocked,
    HighCapacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapacityRisk {
    Low,
    Medium,
    High,
}

/// One row of the per-destination audit table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationAssessment {
    pub name: String,
    pub status: RouteStatus,
    pub capacity_pct: f64,
    pub capacity_risk: CapacityRisk,
    /// Effective travel time; `None` when the road is blocked
    pub travel_time_hrs: Option<f64>,
    /// Survival margin (hours); only present for evaluated destinations
    pub survival_margin_hrs: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RerouteOutcome {
    Continue,
    Reroute,
    Dump,
    EmergencyRescue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RerouteAction {
    ProceedAsPlanned,
    UrgentDelivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteRisk {
    Normal,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerouteDecision {
    pub outcome: RerouteOutcome,
    /// Selected destination, if any survived filtering with a non-negative margin
    pub chosen: Option<String>,
    pub chosen_margin_hrs: Option<f64>,
    pub action: Option<RerouteAction>,
    /// Remaining shelf life the margins were computed from (hours)
    pub shelf_life_hrs: f64,
    pub overall_risk: RouteRisk,
    /// Full audit table in catalog order
    pub assessments: Vec<DestinationAssessment>,
}

impl RerouteDecision {
    pub fn has_viable_destination(&self) -> bool {
        self.chosen.is_some()
    }

    pub fn assessment(&self, name: &str) -> Option<&DestinationAssessment> {
        self.assessments.iter().find(|a| a.name == name)
    }

    /// Margin the driver is working against: the chosen destination's, or
    /// the best (possibly negative) margin among evaluated destinations
    /// when none survived. `None` when nothing was evaluated.
    pub fn driving_margin_hrs(&self) -> Option<f64> {
        self.chosen_margin_hrs.or_else(|| {
            self.assessments
                .iter()
                .filter_map(|a| a.survival_margin_hrs)
                .fold(None, |best: Option<f64>, m| Some(best.map_or(m, |b| b.max(m))))
        })
    }
}

// ============================================================================
// Market pivot
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PivotOutcome {
    OnTrack,
    Pivoted,
    Unsalvageable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PivotSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketChoice {
    pub name: String,
    pub category: MarketCategory,
    pub recovery_multiplier: f64,
    pub travel_time_hrs: f64,
    /// Shelf life left on arrival (hours); negative when the cargo arrives spoiled
    pub time_buffer_hrs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPivotDecision {
    pub outcome: PivotOutcome,
    pub chosen: Option<MarketChoice>,
    pub recovery_pct: f64,
    pub loss_prevented: f64,
    pub total_loss: f64,
    pub remaining_shelf_life_hrs: f64,
    /// ETA to the planned destination; `None` when it cannot be reached at all
    pub original_eta_hrs: Option<f64>,
    pub severity: PivotSeverity,
    /// True when no market was reachable and the minimum-recovery option was taken
    pub fallback_used: bool,
    /// Other reachable markets, best recovery first
    pub alternatives: Vec<MarketChoice>,
}

// ============================================================================
// Terminal outcome, explanation and the per-cycle record
// ============================================================================

/// Terminal state of the reroute -> pivot -> dump fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionOutcome {
    Continue,
    Reroute,
    Pivoted,
    Unsalvageable,
    Dump,
}

impl std::fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DecisionOutcome::Continue => "CONTINUE",
            DecisionOutcome::Reroute => "REROUTE",
            DecisionOutcome::Pivoted => "PIVOTED",
            DecisionOutcome::Unsalvageable => "UNSALVAGEABLE",
            DecisionOutcome::Dump => "DUMP",
        };
        write!(f, "{s}")
    }
}

/// Human-readable rationale for one decision, in narration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub outcome: DecisionOutcome,
    pub headline: String,
    pub lines: Vec<String>,
}

// ============================================================================
// Value preservation
// ============================================================================

/// Letter grade for the share of shelf life still left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityGrade {
    A,
    B,
    C,
    D,
    F,
}

impl QualityGrade {
    pub fn from_remaining_pct(remaining_pct: f64) -> Self {
        if remaining_pct >= 80.0 {
            QualityGrade::A
        } else if remaining_pct >= 60.0 {
            QualityGrade::B
        } else if remaining_pct >= 40.0 {
            QualityGrade::C
        } else if remaining_pct >= 20.0 {
            QualityGrade::D
        } else {
            QualityGrade::F
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityGrade::A => "Premium",
            QualityGrade::B => "Good",
            QualityGrade::C => "Fair",
            QualityGrade::D => "Poor",
            QualityGrade::F => "Critical",
        }
    }
}

impl std::fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            QualityGrade::A => "A",
            QualityGrade::B => "B",
            QualityGrade::C => "C",
            QualityGrade::D => "D",
            QualityGrade::F => "F",
        };
        write!(f, "{letter}")
    }
}

/// Cargo value still sellable at the current remaining shelf life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAssessment {
    pub cargo_value: f64,
    /// `cargo_value * days_left / base_shelf_life_days`
    pub value_preserved: f64,
    pub wasted_value: f64,
    /// Share of base shelf life remaining (0-100)
    pub remaining_pct: f64,
    pub grade: QualityGrade,
    /// Value lost per day of shelf life at the base rate
    pub daily_value: f64,
    pub hourly_value: f64,
    pub currency: String,
}

/// Everything one decision cycle produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub shipment: String,
    pub reading: TelemetryReading,
    pub prediction: ShelfLifePrediction,
    pub forecast: ShelfLifeForecast,
    pub reroute: RerouteDecision,
    pub pivot: Option<MarketPivotDecision>,
    pub trust: TrustScore,
    pub liability: LiabilityReport,
    pub outcome: DecisionOutcome,
    pub value: ValueAssessment,
    pub driver_advice: DriverAdvisory,
    pub explanation: Explanation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_thresholds() {
        assert_eq!(ShelfLifeStatus::classify(1.9, 5.0, 2.0), ShelfLifeStatus::Critical);
        assert_eq!(ShelfLifeStatus::classify(2.0, 5.0, 2.0), ShelfLifeStatus::Warning);
        assert_eq!(ShelfLifeStatus::classify(5.0, 5.0, 2.0), ShelfLifeStatus::Normal);
    }

    #[test]
    fn test_outcome_serializes_screaming_case() {
        let json = serde_json::to_string(&DecisionOutcome::Unsalvageable).unwrap();
        assert_eq!(json, "\"UNSALVAGEABLE\"");
        let json = serde_json::to_string(&RerouteOutcome::EmergencyRescue).unwrap();
        assert_eq!(json, "\"EMERGENCY_RESCUE\"");
    }

    #[test]
    fn test_quality_grade_boundaries() {
        assert_eq!(QualityGrade::from_remaining_pct(100.0), QualityGrade::A);
        assert_eq!(QualityGrade::from_remaining_pct(80.0), QualityGrade::A);
        assert_eq!(QualityGrade::from_remaining_pct(79.9), QualityGrade::B);
        assert_eq!(QualityGrade::from_remaining_pct(60.0), QualityGrade::B);
        assert_eq!(QualityGrade::from_remaining_pct(40.0), QualityGrade::C);
        assert_eq!(QualityGrade::from_remaining_pct(20.0), QualityGrade::D);
        assert_eq!(QualityGrade::from_remaining_pct(19.9), QualityGrade::F);
        assert_eq!(QualityGrade::from_remaining_pct(0.0).label(), "Critical");
    }

    fn assessment(name: &str, margin: Option<f64>) -> DestinationAssessment {
        DestinationAssessment {
            name: name.to_string(),
            status: if margin.is_some() { RouteStatus::Evaluated } else { RouteStatus::Blocked },
            capacity_pct: 50.0,
            capacity_risk: CapacityRisk::Low,
            travel_time_hrs: margin.map(|_| 4.0),
            survival_margin_hrs: margin,
        }
    }

    #[test]
    fn test_driving_margin_falls_back_to_best_evaluated() {
        let mut decision = RerouteDecision {
            outcome: RerouteOutcome::EmergencyRescue,
            chosen: None,
            chosen_margin_hrs: None,
            action: None,
            shelf_life_hrs: 2.0,
            overall_risk: RouteRisk::Critical,
            assessments: vec![
                assessment("A", Some(-6.0)),
                assessment("B", None),
                assessment("C", Some(-1.5)),
            ],
        };
        assert_eq!(decision.driving_margin_hrs(), Some(-1.5));

        decision.chosen = Some("C".to_string());
        decision.chosen_margin_hrs = Some(3.0);
        assert_eq!(decision.driving_margin_hrs(), Some(3.0));

        decision.chosen = None;
        decision.chosen_margin_hrs = None;
        decision.assessments = vec![assessment("B", None)];
        assert_eq!(decision.driving_margin_hrs(), None);
    }
}
