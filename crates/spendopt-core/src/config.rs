//! Optimizer tuning parameters
//!
//! Stored as TOML in `~/.config/spendopt/config.toml`. Every field has a default,
//! so a partial file only overrides what it names and a missing file means the
//! stock engine.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Most recent usable days considered
pub const DEFAULT_WINDOW_SIZE: usize = 60;
/// Fewer usable days than this yields a `gathering` result
pub const DEFAULT_MIN_DATA_POINTS: usize = 5;
/// Spend range must exceed this fraction of the minimum spend...
pub const DEFAULT_RELATIVE_VARIATION_FLOOR: f64 = 0.15;
/// ...and this many dollars, whichever is larger
pub const DEFAULT_ABSOLUTE_VARIATION_FLOOR: f64 = 50.0;
/// Candidates evaluated by the marginal-efficiency scan
pub const DEFAULT_SCAN_POINTS: usize = 21;
/// Relative step of the forward-difference derivative
pub const DEFAULT_DERIVATIVE_STEP: f64 = 0.01;
/// Industry benchmark cost per lead (USD)
pub const DEFAULT_BENCHMARK_CPL: f64 = 125.0;
/// R² below this falls back to basic analysis
pub const DEFAULT_BASIC_THRESHOLD: f64 = 0.2;
/// R² at or above this is an advanced analysis
pub const DEFAULT_ADVANCED_THRESHOLD: f64 = 0.4;
/// Confidence ceiling for low-confidence fits
pub const DEFAULT_LOW_CONFIDENCE_CAP: u8 = 60;
/// Distance from current spend (fraction) still reported as optimal
pub const DEFAULT_HOLD_BAND: f64 = 0.10;

/// Tuning parameters for [`crate::optimizer::SpendOptimizer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerConfig {
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    #[serde(default = "default_min_data_points")]
    pub min_data_points: usize,

    #[serde(default = "default_relative_variation_floor")]
    pub relative_variation_floor: f64,

    #[serde(default = "default_absolute_variation_floor")]
    pub absolute_variation_floor: f64,

    #[serde(default = "default_scan_points")]
    pub scan_points: usize,

    #[serde(default = "default_derivative_step")]
    pub derivative_step: f64,

    #[serde(default = "default_benchmark_cpl")]
    pub benchmark_cpl: f64,

    #[serde(default = "default_basic_threshold")]
    pub basic_threshold: f64,

    #[serde(default = "default_advanced_threshold")]
    pub advanced_threshold: f64,

    #[serde(default = "default_low_confidence_cap")]
    pub low_confidence_cap: u8,

    #[serde(default = "default_hold_band")]
    pub hold_band: f64,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_min_data_points() -> usize {
    DEFAULT_MIN_DATA_POINTS
}

fn default_relative_variation_floor() -> f64 {
    DEFAULT_RELATIVE_VARIATION_FLOOR
}

fn default_absolute_variation_floor() -> f64 {
    DEFAULT_ABSOLUTE_VARIATION_FLOOR
}

fn default_scan_points() -> usize {
    DEFAULT_SCAN_POINTS
}

fn default_derivative_step() -> f64 {
    DEFAULT_DERIVATIVE_STEP
}

fn default_benchmark_cpl() -> f64 {
    DEFAULT_BENCHMARK_CPL
}

fn default_basic_threshold() -> f64 {
    DEFAULT_BASIC_THRESHOLD
}

fn default_advanced_threshold() -> f64 {
    DEFAULT_ADVANCED_THRESHOLD
}

fn default_low_confidence_cap() -> u8 {
    DEFAULT_LOW_CONFIDENCE_CAP
}

fn default_hold_band() -> f64 {
    DEFAULT_HOLD_BAND
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            min_data_points: DEFAULT_MIN_DATA_POINTS,
            relative_variation_floor: DEFAULT_RELATIVE_VARIATION_FLOOR,
            absolute_variation_floor: DEFAULT_ABSOLUTE_VARIATION_FLOOR,
            scan_points: DEFAULT_SCAN_POINTS,
            derivative_step: DEFAULT_DERIVATIVE_STEP,
            benchmark_cpl: DEFAULT_BENCHMARK_CPL,
            basic_threshold: DEFAULT_BASIC_THRESHOLD,
            advanced_threshold: DEFAULT_ADVANCED_THRESHOLD,
            low_confidence_cap: DEFAULT_LOW_CONFIDENCE_CAP,
            hold_band: DEFAULT_HOLD_BAND,
        }
    }
}

impl OptimizerConfig {
    /// Default config location: `<config_dir>/spendopt/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("spendopt").join("config.toml"))
    }

    /// Parse and validate a TOML config string
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(content).map_err(|e| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    ///
    /// A file that exists but cannot be read or parsed is an error: silently
    /// ignoring a typo would change recommendations without notice.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No optimizer config, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(CoreError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let config = Self::from_toml_str(&content, path)?;
        tracing::debug!(path = %path.display(), "Loaded optimizer config");
        Ok(config)
    }

    /// Render as TOML (for `spendopt config`)
    pub fn to_toml_string(&self) -> Result<String, CoreError> {
        toml::to_string_pretty(self).map_err(|e| CoreError::InvalidConfig {
            message: format!("cannot serialize config: {e}"),
        })
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |message: String| Err(CoreError::InvalidConfig { message });

        if self.min_data_points < 3 {
            return invalid(format!(
                "minDataPoints must be at least 3 (got {})",
                self.min_data_points
            ));
        }
        if self.window_size < self.min_data_points {
            return invalid(format!(
                "windowSize ({}) must not be smaller than minDataPoints ({})",
                self.window_size, self.min_data_points
            ));
        }
        if self.scan_points < 2 {
            return invalid(format!(
                "scanPoints must be at least 2 (got {})",
                self.scan_points
            ));
        }
        if !(self.derivative_step > 0.0 && self.derivative_step < 1.0) {
            return invalid(format!(
                "derivativeStep must be in (0, 1) (got {})",
                self.derivative_step
            ));
        }
        if !(self.benchmark_cpl > 0.0) {
            return invalid(format!(
                "benchmarkCpl must be positive (got {})",
                self.benchmark_cpl
            ));
        }
        if self.relative_variation_floor < 0.0 || self.absolute_variation_floor < 0.0 {
            return invalid("variation floors must not be negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.basic_threshold)
            || !(0.0..=1.0).contains(&self.advanced_threshold)
            || self.basic_threshold > self.advanced_threshold
        {
            return invalid(format!(
                "thresholds must satisfy 0 <= basicThreshold ({}) <= advancedThreshold ({}) <= 1",
                self.basic_threshold, self.advanced_threshold
            ));
        }
        if self.low_confidence_cap > 100 {
            return invalid(format!(
                "lowConfidenceCap must be at most 100 (got {})",
                self.low_confidence_cap
            ));
        }
        if self.hold_band < 0.0 {
            return invalid(format!("holdBand must not be negative (got {})", self.hold_band));
        }
        Ok(())
    }
}
