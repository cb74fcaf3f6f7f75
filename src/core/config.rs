//! Forecast configuration with documented constants
//!
//! All calibration numbers are collected here with explanations of their
//! purpose and how they interact with each other. Defaults reproduce the
//! reference 2020 run.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{ForecastError, Result};

/// Number of trials in a standard run
pub const DEFAULT_TRIALS: u64 = 100_000;

/// Seed used when none is supplied
pub const DEFAULT_SEED: u64 = 2020;

/// Trials per independent random stream
pub const DEFAULT_CHUNK_SIZE: u64 = 1024;

/// Calibration constants for the hierarchical error model
///
/// The shape of the model (which error terms exist and how they combine)
/// is fixed. Only the magnitudes live here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    // === NATIONAL ===
    /// Current average margin in national polls
    pub trailing_national_average: f64,

    /// Std of the drift between today's national average and the
    /// Election Day national average
    ///
    /// Every locale in a trial shares the same drift draw, which is what
    /// makes locale outcomes correlated.
    pub national_drift_std: f64,

    /// Std of the average state-poll error on Election Day
    ///
    /// Positive draws mean the Democratic side was underestimated. Polled
    /// locales scale an independent standard-normal draw by this value.
    pub state_poll_error_std: f64,

    /// Std of the extra national-poll error layered on top of the
    /// state-poll error
    ///
    /// national error = state-poll error + N(0, this)
    pub national_poll_error_std: f64,

    // === LOCALE ===
    /// Std of the shift in a locale's polls between now and Election Day,
    /// after removing the national drift
    pub poll_shift_std: f64,

    /// Std of a locale's year-over-year margin change relative to the
    /// national change
    ///
    /// Only unpolled locales use this; their forecast is the prior result
    /// swung by the national movement.
    pub unpolled_drift_std: f64,

    /// National Democratic margin in the prior election
    ///
    /// Subtracted from prior locale margins to turn them into a lean
    /// relative to the nation.
    pub prior_national_margin: f64,

    // === SPLIT DISTRICTS ===
    /// Mean margin gap between the two districts of a paired split state
    pub district_gap_mean: f64,

    /// Std of the margin gap between the two districts of a paired split
    /// state
    pub district_gap_std: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            trailing_national_average: 6.33,
            national_drift_std: 2.5,
            state_poll_error_std: 3.17,
            national_poll_error_std: 2.22,

            poll_shift_std: 4.0,
            unpolled_drift_std: 5.59,
            prior_national_margin: 2.1,

            // Average and spread of ME1 - ME2 over 2012 and 2016
            district_gap_mean: 19.0,
            district_gap_std: 8.7,
        }
    }
}

impl Calibration {
    /// Create a calibration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Every standard deviation must be finite and non-negative, every mean
    /// finite
    pub fn validate(&self) -> Result<()> {
        let stds = [
            ("national_drift_std", self.national_drift_std),
            ("state_poll_error_std", self.state_poll_error_std),
            ("national_poll_error_std", self.national_poll_error_std),
            ("poll_shift_std", self.poll_shift_std),
            ("unpolled_drift_std", self.unpolled_drift_std),
            ("district_gap_std", self.district_gap_std),
        ];
        for (name, value) in stds {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::InvalidCalibration(format!(
                    "{} must be finite and >= 0, got {}",
                    name, value
                )));
            }
        }

        let means = [
            ("trailing_national_average", self.trailing_national_average),
            ("prior_national_margin", self.prior_national_margin),
            ("district_gap_mean", self.district_gap_mean),
        ];
        for (name, value) in means {
            if !value.is_finite() {
                return Err(ForecastError::InvalidCalibration(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

/// How many trials to run and how to split them up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub trials: u64,
    pub seed: u64,
    /// Trials sharing one random stream
    ///
    /// Results for a seed depend on this value but not on thread count.
    pub chunk_size: u64,
    /// Worker threads; `None` uses the global rayon pool
    pub threads: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
            chunk_size: DEFAULT_CHUNK_SIZE,
            threads: None,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(ForecastError::InvalidCalibration(
                "trial count must be positive".into(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(ForecastError::InvalidCalibration(
                "chunk_size must be positive".into(),
            ));
        }
        if self.threads == Some(0) {
            return Err(ForecastError::InvalidCalibration(
                "threads must be positive when set".into(),
            ));
        }
        Ok(())
    }
}

/// Complete forecast configuration, as read from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub calibration: Calibration,
    pub run: RunConfig,
}

impl ForecastConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: ForecastConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.calibration.validate()?;
        self.run.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_calibration_is_valid() {
        assert!(Calibration::default().validate().is_ok());
    }

    #[test]
    fn test_negative_std_rejected() {
        let calibration = Calibration {
            poll_shift_std: -1.0,
            ..Calibration::default()
        };
        let err = calibration.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("poll_shift_std"));
    }

    #[test]
    fn test_nan_mean_rejected() {
        let calibration = Calibration {
            trailing_national_average: f64::NAN,
            ..Calibration::default()
        };
        assert!(calibration.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ForecastConfig::parse_toml(
            r#"
            [calibration]
            trailing_national_average = 4.0

            [run]
            trials = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.calibration.trailing_national_average, 4.0);
        assert_eq!(config.calibration.poll_shift_std, 4.0);
        assert_eq!(config.run.trials, 500);
        assert_eq!(config.run.seed, DEFAULT_SEED);
        assert_eq!(config.run.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = ForecastConfig::parse_toml("").unwrap();
        assert_eq!(config, ForecastConfig::default());
    }

    #[test]
    fn test_zero_trials_rejected() {
        let result = ForecastConfig::parse_toml("[run]\ntrials = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_toml_is_toml_error() {
        let err = ForecastConfig::parse_toml("[calibration\n").unwrap_err();
        assert!(matches!(err, ForecastError::Toml(_)));
    }
}
