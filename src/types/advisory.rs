//! In-cab driver advice derived from the current reading and route margin.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvicePriority {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for AdvicePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvicePriority::Info => write!(f, "INFO"),
            AdvicePriority::Warning => write!(f, "WARNING"),
            AdvicePriority::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Which signal the advice reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdviceKind {
    Temperature,
    Vibration,
    Humidity,
    Routing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverAction {
    ReduceTemperature,
    AdjustTemperature,
    IncreaseTemperature,
    ReduceSpeed,
    Monitor,
    DumpOrReroute,
    Reroute,
    ConsiderReroute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRecommendation {
    pub kind: AdviceKind,
    pub priority: AdvicePriority,
    pub action: DriverAction,
    pub message: String,
    /// Observed value in the signal's unit (°C, G, %RH or hours)
    pub current: f64,
    pub target: String,
}

/// All advice for one cycle, most urgent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverAdvisory {
    pub recommendations: Vec<DriverRecommendation>,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    /// Any critical or warning advice present
    pub action_required: bool,
}

impl DriverAdvisory {
    /// Sorts by priority (stable within a priority) and tallies counts.
    pub fn from_recommendations(mut recommendations: Vec<DriverRecommendation>) -> Self {
        recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
        let count = |p: AdvicePriority| recommendations.iter().filter(|r| r.priority == p).count();
        let critical = count(AdvicePriority::Critical);
        let warning = count(AdvicePriority::Warning);
        let info = count(AdvicePriority::Info);
        Self {
            recommendations,
            critical,
            warning,
            info,
            action_required: critical + warning > 0,
        }
    }

    pub fn has_critical(&self) -> bool {
        self.critical > 0
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(kind: AdviceKind, priority: AdvicePriority) -> DriverRecommendation {
        DriverRecommendation {
            kind,
            priority,
            action: DriverAction::Monitor,
            message: String::new(),
            current: 0.0,
            target: String::new(),
        }
    }

    #[test]
    fn test_advisory_orders_and_counts() {
        let advisory = DriverAdvisory::from_recommendations(vec![
            rec(AdviceKind::Humidity, AdvicePriority::Info),
            rec(AdviceKind::Temperature, AdvicePriority::Warning),
            rec(AdviceKind::Vibration, AdvicePriority::Critical),
            rec(AdviceKind::Routing, AdvicePriority::Critical),
        ]);
        let kinds: Vec<_> = advisory.recommendations.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AdviceKind::Vibration,
                AdviceKind::Routing,
                AdviceKind::Temperature,
                AdviceKind::Humidity
            ]
        );
        assert_eq!((advisory.critical, advisory.warning, advisory.info), (2, 1, 1));
        assert!(advisory.action_required);
        assert!(advisory.has_critical());
    }

    #[test]
    fn test_info_only_needs_no_action() {
        let advisory =
            DriverAdvisory::from_recommendations(vec![rec(AdviceKind::Humidity, AdvicePriority::Info)]);
        assert!(!advisory.action_required);
        assert!(!advisory.has_critical());
        assert!(DriverAdvisory::from_recommendations(Vec::new()).is_empty());
    }
}
