//! Route and salvage optimization
//!
//! Decides where the cargo goes once its remaining shelf life is known.
//! Entirely algorithmic: survival margins for delivery destinations, then
//! recovery multipliers for secondary markets when no destination survives.
//! `profit` prices the shelf life that is left.

mod market_pivot;
mod profit;
mod reroute;

pub use market_pivot::MarketPivotEngine;
pub use profit::ProfitOptimizer;
pub use reroute::SurvivalOptimizer;
