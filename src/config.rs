// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{VISUALIZATION_MAX_DEFAULT, VISUALIZATION_MIN_DEFAULT};
use crate::errors::{ReprojectError, ReprojectResult};
use crate::source::DeviceConfig;
use serde::{Deserialize, Serialize};

/// Raw sample window mapped onto 0-255 by the visualization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationRange {
    /// Samples at or below this are black
    pub min: f64,
    /// Samples at or above this are white
    pub max: f64,
}

impl Default for VisualizationRange {
    fn default() -> Self {
        Self {
            min: VISUALIZATION_MIN_DEFAULT,
            max: VISUALIZATION_MAX_DEFAULT,
        }
    }
}

impl VisualizationRange {
    pub fn new(min: f64, max: f64) -> ReprojectResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// `min` must be strictly below `max` (NaN never is)
    pub fn validate(&self) -> ReprojectResult<()> {
        if self.min < self.max {
            Ok(())
        } else {
            Err(ReprojectError::InvalidRange {
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Host-facing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window for the depth/IR visualization
    pub visualization: VisualizationRange,
    /// Attach aligned colors to emitted points
    pub color_output: bool,
    /// Sensor mode requested from the device
    pub device: DeviceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            visualization: VisualizationRange::default(),
            color_output: true,
            device: DeviceConfig::default(),
        }
    }
}

impl Config {
    /// Parse and validate a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> ReprojectResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ReprojectError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ReprojectResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ReprojectError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ReprojectResult<()> {
        self.visualization.validate()?;
        self.device.validate()?;
        Ok(())
    }
}
