//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for ShieldConfig.
///
/// Maintained by hand to match the struct hierarchy in shield_config.rs.
/// Entries of `[[array]]` tables are listed under the array's own path.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [shipment]
        "shipment",
        "shipment.name",
        "shipment.commodity",
        "shipment.base_shelf_life_days",
        "shipment.cargo_value",
        "shipment.currency",
        // [physics]
        "physics",
        "physics.reference_temperature_c",
        "physics.q10_factor",
        "physics.q10_interval_c",
        "physics.vibration_threshold_g",
        "physics.vibration_multiplier",
        "physics.humidity_sensitivity_per_pct",
        // [bands]
        "bands",
        "bands.temperature_min_c",
        "bands.temperature_max_c",
        "bands.humidity_min_pct",
        "bands.humidity_max_pct",
        "bands.vibration_ideal_max_g",
        "bands.cold_excursion_weight",
        // [prediction]
        "prediction",
        "prediction.blend_weight",
        "prediction.implausible_factor",
        "prediction.model_path",
        "prediction.warning_days",
        "prediction.critical_days",
        "prediction.forecast_horizons_hrs",
        // [reroute]
        "reroute",
        "reroute.capacity_risk_threshold_pct",
        "reroute.capacity_medium_pct",
        "reroute.urgent_margin_hrs",
        "reroute.destinations",
        "reroute.destinations.name",
        "reroute.destinations.road_status",
        "reroute.destinations.capacity_pct",
        "reroute.destinations.travel_time_hrs",
        // [pivot]
        "pivot",
        "pivot.enabled",
        "pivot.fallback_market",
        "pivot.markets",
        "pivot.markets.name",
        "pivot.markets.category",
        "pivot.markets.recovery_multiplier",
        "pivot.markets.travel_time_hrs",
        "pivot.markets.buyer",
        // [trust]
        "trust",
        "trust.window",
        "trust.temperature_weight_per_c",
        "trust.temperature_count_weight",
        "trust.temperature_cap",
        "trust.vibration_weight_per_g",
        "trust.vibration_event_weight",
        "trust.vibration_cap",
        "trust.humidity_weight_per_pct",
        "trust.humidity_count_weight",
        "trust.humidity_cap",
        "trust.chaos_penalty",
        "trust.chaos_cap",
        "trust.trend_window",
        "trust.trend_threshold_c",
        "trust.healthy_score",
        "trust.attention_score",
        // [liability]
        "liability",
        "liability.temperature_weight",
        "liability.vibration_weight",
        "liability.humidity_weight",
        "liability.temperature_share_threshold",
        "liability.temperature_share_high",
        "liability.vibration_share_threshold",
        "liability.vibration_share_high",
        "liability.humidity_share_threshold",
        // [driver]
        "driver",
        "driver.temperature_critical_c",
        "driver.temperature_warning_c",
        "driver.freezing_c",
        "driver.target_temperature_c",
        "driver.vibration_critical_g",
        "driver.vibration_warning_g",
        "driver.humidity_high_pct",
        "driver.humidity_low_pct",
        "driver.margin_critical_hrs",
        "driver.margin_warning_hrs",
        // [history]
        "history",
        "history.capacity",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields
/// `["a", "a.b", "a.c"]`. Tables inside arrays are walked under the
/// array's path, so `[[a.list]] x = 1` yields `["a", "a.list", "a.list.x"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            match v {
                toml::Value::Table(_) => keys.extend(walk_toml_keys(v, &path)),
                toml::Value::Array(items) => {
                    for item in items.iter().filter(|i| i.is_table()) {
                        for nested in walk_toml_keys(item, &path) {
                            if !keys.contains(&nested) {
                                keys.push(nested);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties go to the alphabetically first key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist > 3 {
            continue;
        }
        best = match best {
            Some((bk, bd)) if bd < dist || (bd == dist && bk <= k) => Some((bk, bd)),
            _ => Some((k, dist)),
        };
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are reported by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed ShieldConfig.
///
/// Returns (errors, warnings). Errors are impossible values that must
/// prevent startup; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(
    config: &super::ShieldConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let s = &config.shipment;
    if !s.base_shelf_life_days.is_finite() || s.base_shelf_life_days <= 0.0 {
        errors.push(format!(
            "shipment.base_shelf_life_days = {} must be a positive number of days",
            s.base_shelf_life_days
        ));
    } else if s.base_shelf_life_days > 365.0 {
        warnings.push(ValidationWarning {
            field: "shipment.base_shelf_life_days".to_string(),
            message: format!(
                "base_shelf_life_days = {:.0} is unusually long for perishable cargo",
                s.base_shelf_life_days
            ),
            suggestion: None,
        });
    }

    if !s.cargo_value.is_finite() || s.cargo_value < 0.0 {
        errors.push(format!(
            "shipment.cargo_value = {} cannot be negative",
            s.cargo_value
        ));
    }

    // Humidity band: must sit inside 0-100 %RH
    let b = &config.bands;
    if b.humidity_min_pct < 0.0 || b.humidity_max_pct > 100.0 {
        errors.push(format!(
            "bands.humidity ({:.0}-{:.0}%) must lie within 0-100%",
            b.humidity_min_pct, b.humidity_max_pct
        ));
    }
    if b.vibration_ideal_max_g < 0.0 {
        errors.push("bands.vibration_ideal_max_g cannot be negative".to_string());
    }
    if !(0.0..=1.0).contains(&b.cold_excursion_weight) {
        errors.push(format!(
            "bands.cold_excursion_weight = {:.2} must be within [0, 1]",
            b.cold_excursion_weight
        ));
    }

    // Cold-chain reference point: suspicious outside refrigerated range
    let reference = config.physics.reference_temperature_c;
    if !(-30.0..=25.0).contains(&reference) {
        warnings.push(ValidationWarning {
            field: "physics.reference_temperature_c".to_string(),
            message: format!(
                "reference_temperature_c = {reference:.1} is outside typical cold-chain range (-30 to 25°C)"
            ),
            suggestion: None,
        });
    }
    if config.physics.vibration_threshold_g < b.vibration_ideal_max_g {
        warnings.push(ValidationWarning {
            field: "physics.vibration_threshold_g".to_string(),
            message: format!(
                "vibration_threshold_g ({:.2}) is below bands.vibration_ideal_max_g ({:.2})",
                config.physics.vibration_threshold_g, b.vibration_ideal_max_g
            ),
            suggestion: None,
        });
    }

    for d in &config.reroute.destinations {
        if !d.capacity_pct.is_finite() || d.capacity_pct < 0.0 {
            errors.push(format!(
                "reroute.destinations '{}': capacity_pct = {} cannot be negative",
                d.name, d.capacity_pct
            ));
        }
    }

    for m in &config.pivot.markets {
        if m.recovery_multiplier <= 0.0 {
            errors.push(format!(
                "pivot.markets '{}': recovery_multiplier must be > 0 (got {})",
                m.name, m.recovery_multiplier
            ));
        }
    }

    if config.reroute.destinations.is_empty() {
        warnings.push(ValidationWarning {
            field: "reroute.destinations".to_string(),
            message: "no destinations configured; every decision will fall back to pivot or dump"
                .to_string(),
            suggestion: None,
        });
    }

    let t = &config.trust;
    for (name, value) in [
        ("trust.temperature_cap", t.temperature_cap),
        ("trust.vibration_cap", t.vibration_cap),
        ("trust.humidity_cap", t.humidity_cap),
        ("trust.chaos_cap", t.chaos_cap),
        ("trust.chaos_penalty", t.chaos_penalty),
    ] {
        if value < 0.0 {
            errors.push(format!("{name} = {value} cannot be negative"));
        }
    }

    let d = &config.driver;
    if d.margin_critical_hrs < 0.0 {
        errors.push(format!(
            "driver.margin_critical_hrs = {} cannot be negative",
            d.margin_critical_hrs
        ));
    }
    if d.target_temperature_c <= d.freezing_c || d.target_temperature_c > d.temperature_warning_c {
        warnings.push(ValidationWarning {
            field: "driver.target_temperature_c".to_string(),
            message: format!(
                "target_temperature_c = {:.1} lies outside the advised range ({:.1} to {:.1}°C)",
                d.target_temperature_c, d.freezing_c, d.temperature_warning_c
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
