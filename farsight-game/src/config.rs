//! Tunable quiz configuration with serde defaults and invariant checks.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_COMPARISON_SEED, DEFAULT_DAMPING_FACTOR, DEFAULT_ILLUSION_SEED,
    DEFAULT_PROCEDURAL_STAGE_COUNT, DEFAULT_TIER_THRESHOLDS,
};

const DAMPING_MIN: f64 = 0.1;
const DAMPING_MAX: f64 = 2.0;
const STAGE_COUNT_MIN: u32 = 1;
const STAGE_COUNT_MAX: u32 = 999;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be positive and finite (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("tier thresholds must ascend: threshold {index} is {value:.2}, not above {previous:.2}")]
    ThresholdsNotAscending {
        index: usize,
        previous: f64,
        value: f64,
    },
    #[error("invalid quiz configuration JSON")]
    Parse(#[from] serde_json::Error),
}

/// Scoring constants for numeric stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Points lost per percent of combined error.
    #[serde(default = "ScoringConfig::default_damping_factor")]
    pub damping_factor: f64,
    /// Upper error bounds (percent, inclusive) of the first five accuracy tiers.
    #[serde(default = "ScoringConfig::default_tier_thresholds")]
    pub tier_thresholds: [f64; 5],
}

impl ScoringConfig {
    #[must_use]
    pub const fn default_damping_factor() -> f64 {
        DEFAULT_DAMPING_FACTOR
    }

    #[must_use]
    pub const fn default_tier_thresholds() -> [f64; 5] {
        DEFAULT_TIER_THRESHOLDS
    }

    /// # Errors
    ///
    /// Returns `ConfigError` when the damping factor is out of range or the
    /// thresholds are not strictly ascending positive values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(DAMPING_MIN..=DAMPING_MAX).contains(&self.damping_factor) {
            return Err(ConfigError::RangeViolation {
                field: "scoring.damping_factor",
                min: DAMPING_MIN,
                max: DAMPING_MAX,
                value: self.damping_factor,
            });
        }
        let mut previous = 0.0;
        for (index, &value) in self.tier_thresholds.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive {
                    field: "scoring.tier_thresholds",
                    value,
                });
            }
            if index > 0 && value <= previous {
                return Err(ConfigError::ThresholdsNotAscending {
                    index,
                    previous,
                    value,
                });
            }
            previous = value;
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            damping_factor: Self::default_damping_factor(),
            tier_thresholds: Self::default_tier_thresholds(),
        }
    }
}

/// Seeds and sizes of the procedural catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "CatalogConfig::default_comparison_seed")]
    pub comparison_seed: u64,
    #[serde(default = "CatalogConfig::default_stage_count")]
    pub comparison_count: u32,
    #[serde(default = "CatalogConfig::default_illusion_seed")]
    pub illusion_seed: u64,
    #[serde(default = "CatalogConfig::default_stage_count")]
    pub illusion_count: u32,
}

impl CatalogConfig {
    #[must_use]
    pub const fn default_comparison_seed() -> u64 {
        DEFAULT_COMPARISON_SEED
    }

    #[must_use]
    pub const fn default_illusion_seed() -> u64 {
        DEFAULT_ILLUSION_SEED
    }

    #[must_use]
    pub const fn default_stage_count() -> u32 {
        DEFAULT_PROCEDURAL_STAGE_COUNT
    }

    /// Default sizes with both procedural catalogs reseeded.
    #[must_use]
    pub const fn with_seeds(comparison_seed: u64, illusion_seed: u64) -> Self {
        Self {
            comparison_seed,
            comparison_count: DEFAULT_PROCEDURAL_STAGE_COUNT,
            illusion_seed,
            illusion_count: DEFAULT_PROCEDURAL_STAGE_COUNT,
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError` when a stage count is outside the supported range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("catalog.comparison_count", self.comparison_count),
            ("catalog.illusion_count", self.illusion_count),
        ] {
            if !(STAGE_COUNT_MIN..=STAGE_COUNT_MAX).contains(&value) {
                return Err(ConfigError::RangeViolation {
                    field,
                    min: f64::from(STAGE_COUNT_MIN),
                    max: f64::from(STAGE_COUNT_MAX),
                    value: f64::from(value),
                });
            }
        }
        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::with_seeds(DEFAULT_COMPARISON_SEED, DEFAULT_ILLUSION_SEED)
    }
}

/// Top-level configuration consumed by [`crate::QuizEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QuizConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl QuizConfig {
    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and the matching
    /// violation when a field is out of bounds.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError` when any section violates its bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.catalog.validate()?;
        Ok(())
    }
}
