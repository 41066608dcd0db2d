//! Driver advisory
//!
//! Rule-based, in-cab advice for the current reading. Runs every cycle
//! alongside the decision and never changes its outcome.

mod driver;

pub use driver::DriverRecommender;
