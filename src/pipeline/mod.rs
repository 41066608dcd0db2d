//! Decision pipeline
//!
//! `engine` runs one decision cycle; `outcome` collapses the reroute and
//! pivot results into the terminal state the explanation narrates.

mod engine;
pub mod outcome;

pub use engine::{DecisionEngine, DecisionError, ShipmentContext};
pub use outcome::resolve;
