//! Run-wide settings shared by the indicators, loadable from JSON.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::IntensityError;

/// What Courtyards does when a component's merged outline cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Return the error to the caller.
    #[default]
    Raise,
    /// Log a warning and assign NaN to every member of the failing component.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtyardsConfig {
    /// Buffer applied to each shape before the union.
    pub tolerance: f64,
    pub on_failure: FailurePolicy,
}

impl Default for CourtyardsConfig {
    fn default() -> Self {
        Self { tolerance: 0.01, on_failure: FailurePolicy::Raise }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntensityConfig {
    /// Evaluate rows (or components) on the rayon thread pool.
    pub parallel: bool,
    pub courtyards: CourtyardsConfig,
}

impl IntensityConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .context("[config] Failed to parse intensity configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read configuration file: {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("[config] Invalid configuration in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let tolerance = self.courtyards.tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            bail!(IntensityError::config(format!(
                "courtyards tolerance must be finite and non-negative, got {tolerance}"
            )))
        }
        Ok(())
    }
}
