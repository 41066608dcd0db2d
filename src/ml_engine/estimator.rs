//! Regression estimator seam and the linear artifact shipped with the crate.
//!
//! The predictor treats the estimator as a black box with the contract
//! `(temperature °C, humidity %, vibration G) -> raw days estimate`.
//! Any implementation may be substituted; the linear model below loads the
//! standard-scaled coefficients exported by the offline training job.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Number of input features: temperature, humidity, vibration
pub const FEATURE_COUNT: usize = 3;

#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("estimator unavailable: {0}")]
    Unavailable(String),

    #[error("estimator produced a non-finite value ({0})")]
    NonFinite(f64),
}

/// Black-box shelf-life estimator.
///
/// Implementations must be thread-safe (Send + Sync) and must not block
/// indefinitely; the predictor calls them once per decision and never retries.
pub trait RegressionEstimator: Send + Sync {
    /// Estimator name for logging
    fn name(&self) -> &str;

    /// Raw remaining-days estimate for the given conditions
    fn estimate(
        &self,
        temperature_c: f64,
        humidity_pct: f64,
        vibration_g: f64,
    ) -> Result<f64, EstimatorError>;
}

// ============================================================================
// Linear artifact
// ============================================================================

/// On-disk layout of a standard-scaled linear regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModelArtifact {
    pub feature_means: [f64; FEATURE_COUNT],
    pub feature_scales: [f64; FEATURE_COUNT],
    pub coefficients: [f64; FEATURE_COUNT],
    pub intercept: f64,
    #[serde(default)]
    pub trained_at: Option<String>,
}

impl LinearModelArtifact {
    fn validate(&self) -> Result<(), EstimatorError> {
        let mut all = self
            .feature_means
            .iter()
            .chain(&self.feature_scales)
            .chain(&self.coefficients)
            .chain(std::iter::once(&self.intercept));
        if all.any(|v| !v.is_finite()) {
            return Err(EstimatorError::InvalidArtifact(
                "all parameters must be finite".to_string(),
            ));
        }
        if self.feature_scales.iter().any(|s| *s <= 0.0) {
            return Err(EstimatorError::InvalidArtifact(
                "feature scales must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Linear regression over standard-scaled features:
/// `intercept + Σ coef_i * (x_i - mean_i) / scale_i`
#[derive(Debug, Clone)]
pub struct LinearEstimator {
    artifact: LinearModelArtifact,
}

impl LinearEstimator {
    pub fn new(artifact: LinearModelArtifact) -> Result<Self, EstimatorError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    /// Load a JSON artifact from disk.
    pub fn load(path: &Path) -> Result<Self, EstimatorError> {
        let contents = std::fs::read_to_string(path)?;
        let artifact: LinearModelArtifact = serde_json::from_str(&contents)?;
        let estimator = Self::new(artifact)?;
        tracing::info!(
            path = %path.display(),
            trained_at = estimator.artifact.trained_at.as_deref().unwrap_or("unknown"),
            "Loaded linear shelf-life model"
        );
        Ok(estimator)
    }

    pub fn artifact(&self) -> &LinearModelArtifact {
        &self.artifact
    }
}

impl RegressionEstimator for LinearEstimator {
    fn name(&self) -> &str {
        "linear"
    }

    fn estimate(
        &self,
        temperature_c: f64,
        humidity_pct: f64,
        vibration_g: f64,
    ) -> Result<f64, EstimatorError> {
        let a = &self.artifact;
        let features = [temperature_c, humidity_pct, vibration_g];
        let value = features
            .iter()
            .enumerate()
            .fold(a.intercept, |acc, (i, x)| {
                acc + a.coefficients[i] * (x - a.feature_means[i]) / a.feature_scales[i]
            });
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EstimatorError::NonFinite(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn artifact() -> LinearModelArtifact {
        LinearModelArtifact {
            feature_means: [4.0, 50.0, 0.2],
            feature_scales: [5.0, 10.0, 0.1],
            coefficients: [-2.0, -0.5, -1.0],
            intercept: 12.0,
            trained_at: None,
        }
    }

    #[test]
    fn test_linear_estimate_at_means_is_intercept() {
        let est = LinearEstimator::new(artifact()).unwrap();
        assert!((est.estimate(4.0, 50.0, 0.2).unwrap() - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_estimate_scaled() {
        let est = LinearEstimator::new(artifact()).unwrap();
        // temp +5 (1 sd) -> -2 days; humidity +10 (1 sd) -> -0.5 days
        let v = est.estimate(9.0, 60.0, 0.2).unwrap();
        assert!((v - 9.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut a = artifact();
        a.feature_scales[1] = 0.0;
        assert!(matches!(
            LinearEstimator::new(a),
            Err(EstimatorError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&artifact()).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        let est = LinearEstimator::load(file.path()).unwrap();
        assert_eq!(est.artifact().intercept, 12.0);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = LinearEstimator::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, EstimatorError::Io(_)));
    }
}
