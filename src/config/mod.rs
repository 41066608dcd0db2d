//! Shield Configuration Module
//!
//! Provides per-shipment configuration loaded from TOML files: decay
//! constants, safe bands, catalogs and scoring weights.
//!
//! ## Loading Order
//!
//! 1. `SHIELD_CONFIG` environment variable (path to TOML file)
//! 2. `shield_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! There is no global config. Load once at startup and hand a reference to
//! whatever needs it:
//!
//! ```ignore
//! let config = ShieldConfig::load();
//! let engine = DecisionEngine::from_config(&config)?;
//! ```

mod shield_config;
pub mod validation;

pub use shield_config::*;
