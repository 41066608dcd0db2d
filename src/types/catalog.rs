//! Static catalogs: delivery destinations and secondary salvage markets.
//!
//! Catalog entries are configuration data, never computed. Order matters:
//! the first destination is the planned route, and catalog order breaks
//! ties in both the reroute and the market-pivot selection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("fallback market '{0}' is not present in the market catalog")]
    MissingFallback(String),

    #[error("market '{name}' has recovery multiplier {multiplier}, expected 0..=1")]
    InvalidRecovery { name: String, multiplier: f64 },

    #[error("{kind} '{name}' has invalid travel time {hours}h")]
    InvalidTravelTime {
        kind: &'static str,
        name: String,
        hours: f64,
    },

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },
}

// ============================================================================
// Destinations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadStatus {
    Open,
    Blocked,
}

impl std::fmt::Display for RoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoadStatus::Open => write!(f, "open"),
            RoadStatus::Blocked => write!(f, "blocked"),
        }
    }
}

/// A candidate delivery facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    pub road_status: RoadStatus,
    /// Storage utilisation (%). May exceed 100 when the facility is overbooked.
    pub capacity_pct: f64,
    /// Nominal drive time over an open road (hours)
    pub travel_time_hrs: f64,
}

impl Destination {
    pub fn new(
        name: impl Into<String>,
        road_status: RoadStatus,
        capacity_pct: f64,
        travel_time_hrs: f64,
    ) -> Self {
        Self {
            name: name.into(),
            road_status,
            capacity_pct,
            travel_time_hrs,
        }
    }

    /// Travel time actually achievable: infinite when the road is blocked.
    pub fn effective_travel_time_hrs(&self) -> f64 {
        match self.road_status {
            RoadStatus::Open => self.travel_time_hrs,
            RoadStatus::Blocked => f64::INFINITY,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.road_status == RoadStatus::Blocked
    }
}

// ============================================================================
// Secondary Markets
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCategory {
    Processor,
    Wholesale,
    Retail,
    Fuel,
    Compost,
}

impl std::fmt::Display for MarketCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MarketCategory::Processor => "processor",
            MarketCategory::Wholesale => "wholesale",
            MarketCategory::Retail => "retail",
            MarketCategory::Fuel => "fuel",
            MarketCategory::Compost => "compost",
        };
        write!(f, "{s}")
    }
}

/// A salvage buyer that accepts cargo at a fraction of its full value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOption {
    pub name: String,
    pub category: MarketCategory,
    /// Fraction of cargo value recovered (0..=1)
    pub recovery_multiplier: f64,
    pub travel_time_hrs: f64,
    /// Free-text buyer description shown in reports
    #[serde(default)]
    pub buyer: String,
}

impl MarketOption {
    pub fn new(
        name: impl Into<String>,
        category: MarketCategory,
        recovery_multiplier: f64,
        travel_time_hrs: f64,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            recovery_multiplier,
            travel_time_hrs,
            buyer: String::new(),
        }
    }

    #[must_use]
    pub fn with_buyer(mut self, buyer: impl Into<String>) -> Self {
        self.buyer = buyer.into();
        self
    }
}

/// Check a market catalog for the structural problems that must stop startup.
pub fn check_market_catalog(markets: &[MarketOption], fallback: &str) -> Result<(), CatalogError> {
    let mut seen = std::collections::HashSet::new();
    for m in markets {
        if !seen.insert(m.name.as_str()) {
            return Err(CatalogError::DuplicateName {
                kind: "market",
                name: m.name.clone(),
            });
        }
        if !m.recovery_multiplier.is_finite() || !(0.0..=1.0).contains(&m.recovery_multiplier) {
            return Err(CatalogError::InvalidRecovery {
                name: m.name.clone(),
                multiplier: m.recovery_multiplier,
            });
        }
        if !m.travel_time_hrs.is_finite() || m.travel_time_hrs < 0.0 {
            return Err(CatalogError::InvalidTravelTime {
                kind: "market",
                name: m.name.clone(),
                hours: m.travel_time_hrs,
            });
        }
    }
    if !markets.iter().any(|m| m.name == fallback) {
        return Err(CatalogError::MissingFallback(fallback.to_string()));
    }
    Ok(())
}

/// Destination catalogs may be empty, but entries must be well formed.
pub fn check_destination_catalog(destinations: &[Destination]) -> Result<(), CatalogError> {
    let mut seen = std::collections::HashSet::new();
    for d in destinations {
        if !seen.insert(d.name.as_str()) {
            return Err(CatalogError::DuplicateName {
                kind: "destination",
                name: d.name.clone(),
            });
        }
        if !d.travel_time_hrs.is_finite() || d.travel_time_hrs < 0.0 {
            return Err(CatalogError::InvalidTravelTime {
                kind: "destination",
                name: d.name.clone(),
                hours: d.travel_time_hrs,
            });
        }
    }
    Ok(())
}
