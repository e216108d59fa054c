//! Session configuration.
//!
//! Bundles every sub-component configuration into one value that is fixed for
//! the life of a session. Every field has a default, so a configuration file
//! only needs to name what it changes:
//!
//! ```toml
//! stride_length = 0.75
//!
//! [step]
//! upper_threshold = 12.0
//! ```

use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::error::{PdrError, PdrResult};
use crate::gyro_integration::GyroIntegratorConfig;
use crate::heading::HeadingConfig;
use crate::step_detection::StepDetectorConfig;

/// Stride applied to every detected step when nothing else is configured.
pub const DEFAULT_STRIDE_LENGTH: f32 = 2.5;

/// Configuration for a complete tracking session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Displacement per detected step, in path units.
    pub stride_length: f32,

    /// Name of the person walking. Informational only.
    pub user_name: Option<String>,

    /// Step detector thresholds.
    pub step: StepDetectorConfig,

    /// Gyroscope bias window and noise gate.
    pub gyro: GyroIntegratorConfig,

    /// Orientation bookkeeping.
    pub heading: HeadingConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stride_length: DEFAULT_STRIDE_LENGTH,
            user_name: None,
            step: StepDetectorConfig::default(),
            gyro: GyroIntegratorConfig::default(),
            heading: HeadingConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Parses a configuration from TOML text and validates it.
    pub fn from_toml_str(contents: &str) -> PdrResult<Self> {
        let config: SessionConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> PdrResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded session config from {}", path.display());
        Ok(config)
    }

    /// Replaces the stride length, keeping everything else.
    pub fn with_stride_length(mut self, stride_length: f32) -> Self {
        self.stride_length = stride_length;
        self
    }

    /// Checks every field against its accepted domain.
    ///
    /// Stride length is not checked for physical plausibility, only that it
    /// is a finite, non-negative number.
    pub fn validate(&self) -> PdrResult<()> {
        if !self.stride_length.is_finite() || self.stride_length < 0.0 {
            return Err(PdrError::InvalidConfig(format!(
                "stride_length must be finite and non-negative, got {}",
                self.stride_length
            )));
        }

        let step = &self.step;
        if !step.upper_threshold.is_finite() || !step.lower_threshold.is_finite() {
            return Err(PdrError::InvalidConfig(
                "step thresholds must be finite".to_string(),
            ));
        }
        if step.upper_threshold <= step.lower_threshold {
            return Err(PdrError::InvalidConfig(format!(
                "step upper_threshold ({}) must be greater than lower_threshold ({})",
                step.upper_threshold, step.lower_threshold
            )));
        }

        if !self.gyro.noise_gate.is_finite() || self.gyro.noise_gate < 0.0 {
            return Err(PdrError::InvalidConfig(format!(
                "gyro noise_gate must be finite and non-negative, got {}",
                self.gyro.noise_gate
            )));
        }

        if self.heading.renormalize_interval == 0 {
            return Err(PdrError::InvalidConfig(
                "heading renormalize_interval must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
