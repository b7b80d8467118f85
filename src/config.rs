use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::analysis::{DEFAULT_STREAK_THRESHOLD, DEFAULT_WEEKS, DEFAULT_WINDOW, DEFAULT_Z_THRESH};
use crate::error::{MoodError, Result};

/// Which dataset anomaly statistics are computed over when a date range is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ComputeOn {
    /// Flag against the whole history, then narrow to the range.
    #[default]
    Full,
    /// Narrow to the range first, then flag against that subset only.
    Filtered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub window: usize,
    pub z_thresh: f64,
    pub weeks: usize,
    pub streak_threshold: f64,
    pub compute_on: ComputeOn,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            z_thresh: DEFAULT_Z_THRESH,
            weeks: DEFAULT_WEEKS,
            streak_threshold: DEFAULT_STREAK_THRESHOLD,
            compute_on: ComputeOn::Full,
        }
    }
}

/// Per-field overrides, typically from command-line flags or the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub window: Option<usize>,
    pub z_thresh: Option<f64>,
    pub weeks: Option<usize>,
    pub streak_threshold: Option<f64>,
    pub compute_on: Option<ComputeOn>,
}

impl AnalysisConfig {
    /// Reads a JSON config file; missing fields keep their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Loads the file if given, applies overrides and validates the result.
    pub fn resolve(path: Option<&Path>, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(window) = overrides.window {
            self.window = window;
        }
        if let Some(z_thresh) = overrides.z_thresh {
            self.z_thresh = z_thresh;
        }
        if let Some(weeks) = overrides.weeks {
            self.weeks = weeks;
        }
        if let Some(threshold) = overrides.streak_threshold {
            self.streak_threshold = threshold;
        }
        if let Some(compute_on) = overrides.compute_on {
            self.compute_on = compute_on;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(MoodError::invalid_parameter("window", "must be at least 1"));
        }
        if !self.z_thresh.is_finite() || self.z_thresh <= 0.0 {
            return Err(MoodError::invalid_parameter(
                "z_thresh",
                "must be a positive number",
            ));
        }
        if self.weeks == 0 {
            return Err(MoodError::invalid_parameter("weeks", "must be at least 1"));
        }
        if !self.streak_threshold.is_finite() {
            return Err(MoodError::invalid_parameter(
                "streak_threshold",
                "must be a finite number",
            ));
        }
        Ok(())
    }
}
