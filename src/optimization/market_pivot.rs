//! MarketPivotEngine: salvage value when no destination is survivable
//!
//! Selection order:
//! 1. Shelf life still covers the planned ETA -> `OnTrack`
//! 2. Highest recovery among markets reachable before total spoilage
//!    (`travel < remaining`), first listed on ties
//! 3. Otherwise the configured minimum-recovery fallback, exempt from reachability

use tracing::{debug, info};

use crate::config::ShieldConfig;
use crate::types::{
    check_market_catalog, CatalogError, MarketChoice, MarketOption, MarketPivotDecision,
    PivotOutcome, PivotSeverity,
};

/// Remaining shelf life (hours) below which any pivot is critical
const CRITICAL_REMAINING_HRS: f64 = 2.0;

/// Remaining / travel ratio below which a pivot is high severity
const HIGH_SEVERITY_TRAVEL_RATIO: f64 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketPivotEngine {
    markets: Vec<MarketOption>,
    fallback_index: usize,
}

impl MarketPivotEngine {
    /// Fails when the fallback market is missing or the catalog is malformed.
    pub fn new(markets: Vec<MarketOption>, fallback_market: &str) -> Result<Self, CatalogError> {
        check_market_catalog(&markets, fallback_market)?;
        let fallback_index = markets
            .iter()
            .position(|m| m.name == fallback_market)
            .ok_or_else(|| CatalogError::MissingFallback(fallback_market.to_string()))?;
        Ok(Self {
            markets,
            fallback_index,
        })
    }

    pub fn from_config(config: &ShieldConfig) -> Result<Self, CatalogError> {
        Self::new(config.pivot.markets.clone(), &config.pivot.fallback_market)
    }

    pub fn markets(&self) -> &[MarketOption] {
        &self.markets
    }

    pub fn fallback(&self) -> &MarketOption {
        &self.markets[self.fallback_index]
    }

    pub fn pivot(
        &self,
        remaining_shelf_life_hrs: f64,
        original_eta_hrs: f64,
        cargo_value: f64,
    ) -> MarketPivotDecision {
        let original_eta = original_eta_hrs.is_finite().then_some(original_eta_hrs);

        // 1. Defensive: the planned delivery still makes it
        if remaining_shelf_life_hrs >= original_eta_hrs {
            return MarketPivotDecision {
                outcome: PivotOutcome::OnTrack,
                chosen: None,
                recovery_pct: 100.0,
                loss_prevented: cargo_value,
                total_loss: 0.0,
                remaining_shelf_life_hrs,
                original_eta_hrs: original_eta,
                severity: PivotSeverity::Low,
                fallback_used: false,
                alternatives: Vec::new(),
            };
        }

        let choice = |m: &MarketOption| MarketChoice {
            name: m.name.clone(),
            category: m.category,
            recovery_multiplier: m.recovery_multiplier,
            travel_time_hrs: m.travel_time_hrs,
            time_buffer_hrs: remaining_shelf_life_hrs - m.travel_time_hrs,
        };

        // 2. Reachable markets, best recovery first; stable sort keeps catalog order on ties
        let mut reachable: Vec<&MarketOption> = self
            .markets
            .iter()
            .filter(|m| m.travel_time_hrs < remaining_shelf_life_hrs)
            .collect();
        reachable.sort_by(|a, b| b.recovery_multiplier.total_cmp(&a.recovery_multiplier));

        // 3. Fallback when nothing is reachable
        let (chosen, alternatives, fallback_used) = match reachable.split_first() {
            Some((best, rest)) => (choice(best), rest.iter().map(|m| choice(m)).collect(), false),
            None => (choice(self.fallback()), Vec::new(), true),
        };

        let recovery = chosen.recovery_multiplier;
        let loss_prevented = cargo_value * recovery;
        let severity = if remaining_shelf_life_hrs < CRITICAL_REMAINING_HRS || fallback_used {
            PivotSeverity::Critical
        } else if remaining_shelf_life_hrs < HIGH_SEVERITY_TRAVEL_RATIO * chosen.travel_time_hrs {
            PivotSeverity::High
        } else {
            PivotSeverity::Medium
        };
        let outcome = if recovery > 0.0 {
            PivotOutcome::Pivoted
        } else {
            PivotOutcome::Unsalvageable
        };

        if fallback_used {
            info!(
                market = %chosen.name,
                remaining_shelf_life_hrs,
                "No market reachable in time, using minimum-recovery fallback"
            );
        }
        debug!(market = %chosen.name, recovery, ?outcome, ?severity, "Market pivot evaluated");

        MarketPivotDecision {
            outcome,
            recovery_pct: recovery * 100.0,
            loss_prevented,
            total_loss: cargo_value - loss_prevented,
            remaining_shelf_life_hrs,
            original_eta_hrs: original_eta,
            severity,
            fallback_used,
            alternatives,
            chosen: Some(chosen),
        }
    }
}
