//! Transport-run scoring types: trust score and liability attribution.

use serde::{Deserialize, Serialize};

/// Physical cause a deviation is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cause {
    Temperature,
    Vibration,
    Humidity,
}

impl Cause {
    pub const ALL: [Cause; 3] = [Cause::Temperature, Cause::Vibration, Cause::Humidity];
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cause::Temperature => write!(f, "temperature"),
            Cause::Vibration => write!(f, "vibration"),
            Cause::Humidity => write!(f, "humidity"),
        }
    }
}

// ============================================================================
// Trust Score
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrustGrade {
    A,
    B,
    C,
    D,
    F,
}

impl TrustGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            TrustGrade::A
        } else if score >= 80.0 {
            TrustGrade::B
        } else if score >= 70.0 {
            TrustGrade::C
        } else if score >= 50.0 {
            TrustGrade::D
        } else {
            TrustGrade::F
        }
    }
}

impl std::fmt::Display for TrustGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TrustGrade::A => "A",
            TrustGrade::B => "B",
            TrustGrade::C => "C",
            TrustGrade::D => "D",
            TrustGrade::F => "F",
        };
        write!(f, "{s}")
    }
}

/// Points deducted from 100, per deviation type (each already capped).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrustPenalties {
    pub temperature: f64,
    pub vibration: f64,
    pub humidity: f64,
    pub chaos: f64,
}

impl TrustPenalties {
    pub fn total(&self) -> f64 {
        self.temperature + self.vibration + self.humidity + self.chaos
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemperatureTrend {
    Improving,
    Degrading,
    Stable,
    InsufficientData,
}

/// Summary statistics over the scored window. All `None` for an empty window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportStatistics {
    pub temperature_mean: Option<f64>,
    pub temperature_std: Option<f64>,
    pub temperature_variance: Option<f64>,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub vibration_mean: Option<f64>,
    pub vibration_max: Option<f64>,
    /// Readings above the vibration event threshold
    pub vibration_exposure_count: usize,
    pub humidity_mean: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustScore {
    /// Score in [0, 100]
    pub value: f64,
    pub grade: TrustGrade,
    pub is_healthy: bool,
    pub requires_attention: bool,
    pub penalties: TrustPenalties,
    pub readings_analyzed: usize,
    pub chaos_events: usize,
    pub statistics: TransportStatistics,
    pub trend: TemperatureTrend,
}

// ============================================================================
// Liability
// ============================================================================

/// One number per cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CauseBreakdown {
    pub temperature: f64,
    pub vibration: f64,
    pub humidity: f64,
}

impl CauseBreakdown {
    pub fn get(&self, cause: Cause) -> f64 {
        match cause {
            Cause::Temperature => self.temperature,
            Cause::Vibration => self.vibration,
            Cause::Humidity => self.humidity,
        }
    }

    pub fn sum(&self) -> f64 {
        self.temperature + self.vibration + self.humidity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationPriority {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityRecommendation {
    pub cause: Cause,
    pub priority: RecommendationPriority,
    pub responsible_party: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityReport {
    /// Normalised risk share per cause; sums to 1.0, or all zero without deviations
    pub shares: CauseBreakdown,
    /// Weighted damage before normalisation
    pub raw_damage: CauseBreakdown,
    /// Number of out-of-band readings per cause
    pub exposure_counts: CauseBreakdown,
    pub primary_cause: Option<Cause>,
    pub recommendations: Vec<LiabilityRecommendation>,
}

impl LiabilityReport {
    pub fn has_deviation(&self) -> bool {
        self.primary_cause.is_some()
    }
}
