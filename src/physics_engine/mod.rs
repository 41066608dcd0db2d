//! Physics Engine Module
//!
//! Deterministic decay calculations for perishable cargo.
//! All math here is pure physics - no regression model involved.
//!
//! - `DecayPhysicsModel::multipliers()` - temperature (Q10), vibration (step)
//!   and humidity (linear above band) decay factors
//! - `DecayPhysicsModel::physics_days()` - remaining shelf life under constant conditions
//! - `forecast()` - countdown, expiry timestamp and short-horizon projection

pub mod decay;
pub mod forecast;

pub use decay::{DecayMultipliers, DecayPhysicsModel};
pub use forecast::{forecast, ForecastSettings};
