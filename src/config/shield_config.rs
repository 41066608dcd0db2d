//! Shield Configuration - every decision tunable as an operator-editable TOML value
//!
//! Each struct implements `Default` with the calibrated constants, so the
//! engine behaves identically with or without a config file present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::types::{Destination, MarketCategory, MarketOption, RoadStatus};

/// Environment variable naming a config file to load
pub const CONFIG_ENV_VAR: &str = "SHIELD_CONFIG";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "shield_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one shipment deployment.
///
/// Load with `ShieldConfig::load()` which searches:
/// 1. `$SHIELD_CONFIG` env var
/// 2. `./shield_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShieldConfig {
    /// Shipment identification and value
    #[serde(default)]
    pub shipment: ShipmentInfo,

    /// Decay physics constants
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// Safe operating bands shared by physics and scoring
    #[serde(default)]
    pub bands: BandsConfig,

    /// Hybrid predictor tuning
    #[serde(default)]
    pub prediction: PredictionConfig,

    /// Destination catalog and reroute thresholds
    #[serde(default)]
    pub reroute: RerouteConfig,

    /// Secondary market catalog
    #[serde(default)]
    pub pivot: PivotConfig,

    /// Trust score penalty weights
    #[serde(default)]
    pub trust: TrustConfig,

    /// Liability attribution weights and recommendation thresholds
    #[serde(default)]
    pub liability: LiabilityConfig,

    /// Driver advice thresholds
    #[serde(default)]
    pub driver: DriverConfig,

    /// Telemetry ring buffer
    #[serde(default)]
    pub history: HistoryConfig,
}

impl ShieldConfig {
    /// Load configuration using the standard search order:
    /// 1. `$SHIELD_CONFIG` environment variable
    /// 2. `./shield_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), shipment = %config.shipment.name, "Loaded shield config from SHIELD_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from SHIELD_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "SHIELD_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(shipment = %config.shipment.name, "Loaded shield config from ./shield_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./shield_config.toml, using defaults");
                }
            }
        }

        info!("No shield_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path. Unknown keys are logged as
    /// warnings; range and consistency problems are fatal.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in &super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Write the configuration to disk.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Saved shield config");
        Ok(())
    }

    /// Check internal consistency. Returns every problem found, not just the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        // Bands: min < max
        Self::check_band(
            self.bands.temperature_min_c,
            self.bands.temperature_max_c,
            "bands.temperature",
            &mut errors,
        );
        Self::check_band(
            self.bands.humidity_min_pct,
            self.bands.humidity_max_pct,
            "bands.humidity",
            &mut errors,
        );

        // Status thresholds: warning >= critical
        Self::check_band(
            self.prediction.critical_days,
            self.prediction.warning_days,
            "prediction.status_days",
            &mut errors,
        );

        // Capacity risk levels: medium below high
        Self::check_band(
            self.reroute.capacity_medium_pct,
            self.reroute.capacity_risk_threshold_pct,
            "reroute.capacity",
            &mut errors,
        );

        // Liability recommendation escalation
        let l = &self.liability;
        Self::check_band(
            l.temperature_share_threshold,
            l.temperature_share_high,
            "liability.temperature_share",
            &mut errors,
        );
        Self::check_band(
            l.vibration_share_threshold,
            l.vibration_share_high,
            "liability.vibration_share",
            &mut errors,
        );

        // Driver advice escalation
        let d = &self.driver;
        Self::check_band(
            d.temperature_warning_c,
            d.temperature_critical_c,
            "driver.temperature",
            &mut errors,
        );
        Self::check_band(d.freezing_c, d.temperature_warning_c, "driver.freezing", &mut errors);
        Self::check_band(
            d.vibration_warning_g,
            d.vibration_critical_g,
            "driver.vibration",
            &mut errors,
        );
        Self::check_band(d.humidity_low_pct, d.humidity_high_pct, "driver.humidity", &mut errors);
        Self::check_band(
            d.margin_critical_hrs,
            d.margin_warning_hrs,
            "driver.margin",
            &mut errors,
        );

        if !(0.0..=1.0).contains(&self.prediction.blend_weight) {
            errors.push(format!(
                "prediction.blend_weight ({:.2}) must be within [0, 1]",
                self.prediction.blend_weight
            ));
        }
        if self.prediction.implausible_factor <= 0.0 {
            errors.push("prediction.implausible_factor must be > 0".to_string());
        }

        let p = &self.physics;
        if p.q10_factor < 1.0 {
            errors.push(format!(
                "physics.q10_factor ({:.2}) must be >= 1 (warmer cargo cannot decay slower)",
                p.q10_factor
            ));
        }
        if p.q10_interval_c <= 0.0 {
            errors.push("physics.q10_interval_c must be > 0".to_string());
        }
        if p.vibration_multiplier < 1.0 {
            errors.push("physics.vibration_multiplier must be >= 1".to_string());
        }
        if p.humidity_sensitivity_per_pct < 0.0 {
            errors.push("physics.humidity_sensitivity_per_pct cannot be negative".to_string());
        }

        if self.history.capacity == 0 {
            errors.push("history.capacity must be > 0".to_string());
        }
        if self.trust.window == 0 {
            errors.push("trust.window must be > 0".to_string());
        }
        if self.trust.trend_window == 0 {
            errors.push("trust.trend_window must be > 0".to_string());
        }

        // Catalogs
        if let Err(e) = crate::types::check_destination_catalog(&self.reroute.destinations) {
            errors.push(format!("reroute.destinations: {e}"));
        }
        if let Err(e) =
            crate::types::check_market_catalog(&self.pivot.markets, &self.pivot.fallback_market)
        {
            errors.push(format!("pivot.markets: {e}"));
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_band(low: f64, high: f64, name: &str, errors: &mut Vec<String>) {
        // NaN/Inf comparisons silently pass, so reject them first
        if !low.is_finite() || !high.is_finite() {
            errors.push(format!(
                "{name}: values must be finite (got low={low}, high={high})"
            ));
            return;
        }
        if high <= low {
            errors.push(format!(
                "{name}: upper bound ({high:.3}) must be > lower bound ({low:.3})"
            ));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {e}"),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Shipment Info
// ============================================================================

/// Identification and economics of the cargo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentInfo {
    #[serde(default = "default_shipment_name")]
    pub name: String,

    #[serde(default = "default_commodity")]
    pub commodity: String,

    /// Shelf life under ideal conditions (days)
    #[serde(default = "default_base_shelf_life")]
    pub base_shelf_life_days: f64,

    /// Full market value of the cargo
    #[serde(default = "default_cargo_value")]
    pub cargo_value: f64,

    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_shipment_name() -> String {
    "DEFAULT".to_string()
}
fn default_commodity() -> String {
    "fresh produce".to_string()
}
fn default_base_shelf_life() -> f64 {
    14.0
}
fn default_cargo_value() -> f64 {
    700_000.0
}
fn default_currency() -> String {
    "INR".to_string()
}

impl Default for ShipmentInfo {
    fn default() -> Self {
        Self {
            name: default_shipment_name(),
            commodity: default_commodity(),
            base_shelf_life_days: default_base_shelf_life(),
            cargo_value: default_cargo_value(),
            currency: default_currency(),
        }
    }
}

// ============================================================================
// Physics
// ============================================================================

/// Decay acceleration constants.
///
/// Temperature follows a Q10 rule above the reference point:
/// `q10_factor ^ ((T - reference) / q10_interval)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    #[serde(default = "default_reference_temperature")]
    pub reference_temperature_c: f64,

    #[serde(default = "default_q10_factor")]
    pub q10_factor: f64,

    #[serde(default = "default_q10_interval")]
    pub q10_interval_c: f64,

    /// Vibration above this level (exclusive) accelerates decay
    #[serde(default = "default_vibration_threshold")]
    pub vibration_threshold_g: f64,

    #[serde(default = "default_vibration_multiplier")]
    pub vibration_multiplier: f64,

    /// Fractional decay increase per % RH above the humidity band
    #[serde(default = "default_humidity_sensitivity")]
    pub humidity_sensitivity_per_pct: f64,
}

fn default_reference_temperature() -> f64 {
    4.0
}
fn default_q10_factor() -> f64 {
    2.0
}
fn default_q10_interval() -> f64 {
    10.0
}
fn default_vibration_threshold() -> f64 {
    0.5
}
fn default_vibration_multiplier() -> f64 {
    1.5
}
fn default_humidity_sensitivity() -> f64 {
    0.01
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            reference_temperature_c: default_reference_temperature(),
            q10_factor: default_q10_factor(),
            q10_interval_c: default_q10_interval(),
            vibration_threshold_g: default_vibration_threshold(),
            vibration_multiplier: default_vibration_multiplier(),
            humidity_sensitivity_per_pct: default_humidity_sensitivity(),
        }
    }
}

// ============================================================================
// Safe Bands
// ============================================================================

/// Safe operating bands. The humidity band drives the physics humidity
/// multiplier and the scoring excursions alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandsConfig {
    #[serde(default = "default_temperature_min")]
    pub temperature_min_c: f64,

    #[serde(default = "default_temperature_max")]
    pub temperature_max_c: f64,

    #[serde(default = "default_humidity_min")]
    pub humidity_min_pct: f64,

    #[serde(default = "default_humidity_max")]
    pub humidity_max_pct: f64,

    /// Vibration above this counts as a (minor) excursion for scoring
    #[serde(default = "default_vibration_ideal_max")]
    pub vibration_ideal_max_g: f64,

    /// Weight applied to excursions below the temperature band
    #[serde(default = "default_cold_excursion_weight")]
    pub cold_excursion_weight: f64,
}

fn default_temperature_min() -> f64 {
    2.0
}
fn default_temperature_max() -> f64 {
    4.0
}
fn default_humidity_min() -> f64 {
    40.0
}
fn default_humidity_max() -> f64 {
    60.0
}
fn default_vibration_ideal_max() -> f64 {
    0.3
}
fn default_cold_excursion_weight() -> f64 {
    0.5
}

impl Default for BandsConfig {
    fn default() -> Self {
        Self {
            temperature_min_c: default_temperature_min(),
            temperature_max_c: default_temperature_max(),
            humidity_min_pct: default_humidity_min(),
            humidity_max_pct: default_humidity_max(),
            vibration_ideal_max_g: default_vibration_ideal_max(),
            cold_excursion_weight: default_cold_excursion_weight(),
        }
    }
}

// ============================================================================
// Prediction
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Weight of the regression estimate in the hybrid blend
    #[serde(default = "default_blend_weight")]
    pub blend_weight: f64,

    /// Estimates above `base_shelf_life_days * implausible_factor` are discarded
    #[serde(default = "default_implausible_factor")]
    pub implausible_factor: f64,

    /// JSON regression artifact; physics-only prediction when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,

    #[serde(default = "default_warning_days")]
    pub warning_days: f64,

    #[serde(default = "default_critical_days")]
    pub critical_days: f64,

    /// Forecast horizons (hours ahead)
    #[serde(default = "default_forecast_horizons")]
    pub forecast_horizons_hrs: Vec<f64>,
}

fn default_blend_weight() -> f64 {
    0.6
}
fn default_implausible_factor() -> f64 {
    2.0
}
fn default_warning_days() -> f64 {
    5.0
}
fn default_critical_days() -> f64 {
    2.0
}
fn default_forecast_horizons() -> Vec<f64> {
    vec![1.0, 2.0, 4.0]
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            blend_weight: default_blend_weight(),
            implausible_factor: default_implausible_factor(),
            model_path: None,
            warning_days: default_warning_days(),
            critical_days: default_critical_days(),
            forecast_horizons_hrs: default_forecast_horizons(),
        }
    }
}

// ============================================================================
// Reroute
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerouteConfig {
    /// Destinations above this utilisation (%) are excluded
    #[serde(default = "default_capacity_risk_threshold")]
    pub capacity_risk_threshold_pct: f64,

    /// Destinations above this utilisation (%) are reported as medium risk
    #[serde(default = "default_capacity_medium")]
    pub capacity_medium_pct: f64,

    /// Margins below this (hours) turn a delivery into an urgent one
    #[serde(default = "default_urgent_margin")]
    pub urgent_margin_hrs: f64,

    /// Destination catalog; the first entry is the planned route
    #[serde(default = "default_destinations")]
    pub destinations: Vec<Destination>,
}

fn default_capacity_risk_threshold() -> f64 {
    90.0
}
fn default_capacity_medium() -> f64 {
    70.0
}
fn default_urgent_margin() -> f64 {
    2.0
}
fn default_destinations() -> Vec<Destination> {
    vec![
        Destination::new("Premium_Supermarket", RoadStatus::Open, 60.0, 4.0),
        Destination::new("Center_A", RoadStatus::Open, 75.0, 6.0),
        Destination::new("Center_B", RoadStatus::Open, 85.0, 8.0),
    ]
}

impl Default for RerouteConfig {
    fn default() -> Self {
        Self {
            capacity_risk_threshold_pct: default_capacity_risk_threshold(),
            capacity_medium_pct: default_capacity_medium(),
            urgent_margin_hrs: default_urgent_margin(),
            destinations: default_destinations(),
        }
    }
}

// ============================================================================
// Market Pivot
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotConfig {
    /// When false, a shipment with no viable destination is dumped
    #[serde(default = "default_pivot_enabled")]
    pub enabled: bool,

    /// Minimum-recovery market used when nothing else is reachable
    #[serde(default = "default_fallback_market")]
    pub fallback_market: String,

    #[serde(default = "default_markets")]
    pub markets: Vec<MarketOption>,
}

fn default_pivot_enabled() -> bool {
    true
}
fn default_fallback_market() -> String {
    "BioFuel_Gamma".to_string()
}
fn default_markets() -> Vec<MarketOption> {
    vec![
        MarketOption::new("Plant_Alpha", MarketCategory::Processor, 0.65, 2.5)
            .with_buyer("Juice processor"),
        MarketOption::new("Market_Beta", MarketCategory::Wholesale, 0.40, 1.5)
            .with_buyer("Wholesale market"),
        MarketOption::new("BioFuel_Gamma", MarketCategory::Fuel, 0.15, 1.0)
            .with_buyer("Ethanol plant"),
    ]
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            enabled: default_pivot_enabled(),
            fallback_market: default_fallback_market(),
            markets: default_markets(),
        }
    }
}

// ============================================================================
// Trust
// ============================================================================

/// Penalty weights for the transport trust score. Each penalty is
/// `min(cap, magnitude_weight * worst_excess + count_weight * count)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustConfig {
    /// Readings scored per decision
    #[serde(default = "default_trust_window")]
    pub window: usize,

    #[serde(default = "default_temperature_weight")]
    pub temperature_weight_per_c: f64,
    #[serde(default = "default_temperature_count_weight")]
    pub temperature_count_weight: f64,
    #[serde(default = "default_temperature_cap")]
    pub temperature_cap: f64,

    #[serde(default = "default_vibration_weight")]
    pub vibration_weight_per_g: f64,
    #[serde(default = "default_vibration_event_weight")]
    pub vibration_event_weight: f64,
    #[serde(default = "default_vibration_cap")]
    pub vibration_cap: f64,

    #[serde(default = "default_humidity_weight")]
    pub humidity_weight_per_pct: f64,
    #[serde(default = "default_humidity_count_weight")]
    pub humidity_count_weight: f64,
    #[serde(default = "default_humidity_cap")]
    pub humidity_cap: f64,

    #[serde(default = "default_chaos_penalty")]
    pub chaos_penalty: f64,
    #[serde(default = "default_chaos_cap")]
    pub chaos_cap: f64,

    /// Readings per half of the trend comparison
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold_c: f64,

    #[serde(default = "default_healthy_score")]
    pub healthy_score: f64,
    #[serde(default = "default_attention_score")]
    pub attention_score: f64,
}

fn default_trust_window() -> usize {
    60
}
fn default_temperature_weight() -> f64 {
    10.0
}
fn default_temperature_count_weight() -> f64 {
    0.5
}
fn default_temperature_cap() -> f64 {
    30.0
}
fn default_vibration_weight() -> f64 {
    150.0
}
fn default_vibration_event_weight() -> f64 {
    2.0
}
fn default_vibration_cap() -> f64 {
    40.0
}
fn default_humidity_weight() -> f64 {
    0.2
}
fn default_humidity_count_weight() -> f64 {
    0.1
}
fn default_humidity_cap() -> f64 {
    15.0
}
fn default_chaos_penalty() -> f64 {
    20.0
}
fn default_chaos_cap() -> f64 {
    40.0
}
fn default_trend_window() -> usize {
    10
}
fn default_trend_threshold() -> f64 {
    1.0
}
fn default_healthy_score() -> f64 {
    70.0
}
fn default_attention_score() -> f64 {
    50.0
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            window: default_trust_window(),
            temperature_weight_per_c: default_temperature_weight(),
            temperature_count_weight: default_temperature_count_weight(),
            temperature_cap: default_temperature_cap(),
            vibration_weight_per_g: default_vibration_weight(),
            vibration_event_weight: default_vibration_event_weight(),
            vibration_cap: default_vibration_cap(),
            humidity_weight_per_pct: default_humidity_weight(),
            humidity_count_weight: default_humidity_count_weight(),
            humidity_cap: default_humidity_cap(),
            chaos_penalty: default_chaos_penalty(),
            chaos_cap: default_chaos_cap(),
            trend_window: default_trend_window(),
            trend_threshold_c: default_trend_threshold(),
            healthy_score: default_healthy_score(),
            attention_score: default_attention_score(),
        }
    }
}

// ============================================================================
// Liability
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiabilityConfig {
    /// Damage weight per °C-reading of excursion
    #[serde(default = "default_temperature_weight")]
    pub temperature_weight: f64,
    /// Damage weight per G-reading above the ideal vibration level
    #[serde(default = "default_vibration_weight")]
    pub vibration_weight: f64,
    /// Damage weight per %RH-reading outside the band
    #[serde(default = "default_humidity_weight")]
    pub humidity_weight: f64,

    /// Temperature share (0-1) above which refrigeration is flagged
    #[serde(default = "default_temperature_share_threshold")]
    pub temperature_share_threshold: f64,
    #[serde(default = "default_temperature_share_high")]
    pub temperature_share_high: f64,

    #[serde(default = "default_vibration_share_threshold")]
    pub vibration_share_threshold: f64,
    #[serde(default = "default_vibration_share_high")]
    pub vibration_share_high: f64,

    #[serde(default = "default_humidity_share_threshold")]
    pub humidity_share_threshold: f64,
}

fn default_temperature_share_threshold() -> f64 {
    0.30
}
fn default_temperature_share_high() -> f64 {
    0.50
}
fn default_vibration_share_threshold() -> f64 {
    0.20
}
fn default_vibration_share_high() -> f64 {
    0.40
}
fn default_humidity_share_threshold() -> f64 {
    0.20
}

impl Default for LiabilityConfig {
    fn default() -> Self {
        Self {
            temperature_weight: default_temperature_weight(),
            vibration_weight: default_vibration_weight(),
            humidity_weight: default_humidity_weight(),
            temperature_share_threshold: default_temperature_share_threshold(),
            temperature_share_high: default_temperature_share_high(),
            vibration_share_threshold: default_vibration_share_threshold(),
            vibration_share_high: default_vibration_share_high(),
            humidity_share_threshold: default_humidity_share_threshold(),
        }
    }
}

// ============================================================================
// Driver Advice
// ============================================================================

/// Thresholds for in-cab driver advice. Each rule fires strictly above
/// (or below, for the low-side rules) its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    #[serde(default = "default_driver_temperature_critical")]
    pub temperature_critical_c: f64,
    #[serde(default = "default_driver_temperature_warning")]
    pub temperature_warning_c: f64,
    /// Below this the cargo risks freezing damage
    #[serde(default = "default_driver_freezing")]
    pub freezing_c: f64,
    /// Setpoint quoted when the temperature is critical
    #[serde(default = "default_driver_target_temperature")]
    pub target_temperature_c: f64,

    #[serde(default = "default_driver_vibration_critical")]
    pub vibration_critical_g: f64,
    #[serde(default = "default_driver_vibration_warning")]
    pub vibration_warning_g: f64,

    #[serde(default = "default_driver_humidity_high")]
    pub humidity_high_pct: f64,
    #[serde(default = "default_driver_humidity_low")]
    pub humidity_low_pct: f64,

    /// Survival margin (hours) below which rerouting is mandatory
    #[serde(default = "default_driver_margin_critical")]
    pub margin_critical_hrs: f64,
    #[serde(default = "default_driver_margin_warning")]
    pub margin_warning_hrs: f64,
}

fn default_driver_temperature_critical() -> f64 {
    8.0
}
fn default_driver_temperature_warning() -> f64 {
    6.0
}
fn default_driver_freezing() -> f64 {
    0.0
}
fn default_driver_target_temperature() -> f64 {
    3.0
}
fn default_driver_vibration_critical() -> f64 {
    0.5
}
fn default_driver_vibration_warning() -> f64 {
    0.3
}
fn default_driver_humidity_high() -> f64 {
    70.0
}
fn default_driver_humidity_low() -> f64 {
    40.0
}
fn default_driver_margin_critical() -> f64 {
    2.0
}
fn default_driver_margin_warning() -> f64 {
    5.0
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            temperature_critical_c: default_driver_temperature_critical(),
            temperature_warning_c: default_driver_temperature_warning(),
            freezing_c: default_driver_freezing(),
            target_temperature_c: default_driver_target_temperature(),
            vibration_critical_g: default_driver_vibration_critical(),
            vibration_warning_g: default_driver_vibration_warning(),
            humidity_high_pct: default_driver_humidity_high(),
            humidity_low_pct: default_driver_humidity_low(),
            margin_critical_hrs: default_driver_margin_critical(),
            margin_warning_hrs: default_driver_margin_warning(),
        }
    }
}

// ============================================================================
// History
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Ring buffer capacity (readings)
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

fn default_history_capacity() -> usize {
    crate::types::DEFAULT_HISTORY_CAPACITY
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_calibration() {
        let config = ShieldConfig::default();
        assert_eq!(config.shipment.base_shelf_life_days, 14.0);
        assert_eq!(config.shipment.cargo_value, 700_000.0);
        assert_eq!(config.physics.reference_temperature_c, 4.0);
        assert_eq!(config.physics.vibration_threshold_g, 0.5);
        assert_eq!(config.physics.vibration_multiplier, 1.5);
        assert_eq!(config.prediction.blend_weight, 0.6);
        assert_eq!(config.reroute.capacity_risk_threshold_pct, 90.0);
        assert_eq!(config.pivot.fallback_market, "BioFuel_Gamma");
        assert_eq!(config.driver.temperature_critical_c, 8.0);
        assert_eq!(config.driver.margin_warning_hrs, 5.0);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ShieldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_str = r#"
[shipment]
name = "TRUCK-42"
base_shelf_life_days = 10.0

[bands]
humidity_max_pct = 70.0
"#;
        let config: ShieldConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.shipment.name, "TRUCK-42");
        assert_eq!(config.shipment.base_shelf_life_days, 10.0);
        assert_eq!(config.shipment.cargo_value, 700_000.0);
        assert_eq!(config.bands.humidity_max_pct, 70.0);
        assert_eq!(config.bands.humidity_min_pct, 40.0);
        assert_eq!(config.reroute.destinations.len(), 3);
    }

    #[test]
    fn test_catalog_from_toml() {
        let toml_str = r#"
[[reroute.destinations]]
name = "Depot_North"
road_status = "blocked"
capacity_pct = 30.0
travel_time_hrs = 5.0

[pivot]
fallback_market = "Compost_Yard"

[[pivot.markets]]
name = "Compost_Yard"
category = "compost"
recovery_multiplier = 0.05
travel_time_hrs = 0.5
"#;
        let config = ShieldConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.reroute.destinations.len(), 1);
        assert!(config.reroute.destinations[0].is_blocked());
        assert_eq!(config.pivot.markets[0].category, MarketCategory::Compost);
    }

    #[test]
    fn test_validation_catches_inverted_band() {
        let mut config = ShieldConfig::default();
        config.bands.humidity_min_pct = 70.0;
        config.bands.humidity_max_pct = 60.0;
        let result = config.validate();
        assert!(result.is_err());
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("bands.humidity")));
        }
    }

    #[test]
    fn test_validation_catches_blend_weight() {
        let mut config = ShieldConfig::default();
        config.prediction.blend_weight = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_catches_missing_fallback() {
        let mut config = ShieldConfig::default();
        config.pivot.fallback_market = "Landfill".to_string();
        let result = config.validate();
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("Landfill")));
        } else {
            panic!("missing fallback market must fail validation");
        }
    }

    #[test]
    fn test_validation_catches_inverted_driver_margin() {
        let mut config = ShieldConfig::default();
        config.driver.margin_critical_hrs = 6.0;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.starts_with("driver.margin")));
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_catches_nan() {
        let mut config = ShieldConfig::default();
        config.bands.temperature_max_c = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_toml() {
        let original = ShieldConfig::default();
        let toml_str = original.to_toml().expect("serialization should work");
        let parsed: ShieldConfig = toml::from_str(&toml_str).expect("deserialization should work");
        assert_eq!(parsed.pivot.markets.len(), original.pivot.markets.len());
        assert_eq!(parsed.trust.chaos_penalty, original.trust.chaos_penalty);
        assert!(toml_str.contains("[physics]"));
        assert!(toml_str.contains("[[reroute.destinations]]"));
    }
}
