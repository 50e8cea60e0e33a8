use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allocator::GreenBounds;
use crate::history::DEFAULT_SAMPLE_INTERVAL_US;

/// Prefix for environment overrides, e.g. `VISOTRAF__BOUNDS__MAX_GREEN_S=75`.
pub const ENV_PREFIX: &str = "VISOTRAF";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Minimum spacing between samples accepted into the history.
    pub sample_interval_us: i64,
    pub bounds: GreenBounds,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sample_interval_us: DEFAULT_SAMPLE_INTERVAL_US,
            bounds: GreenBounds::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: SchedulerConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a config file (format by extension) with environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        let cfg: SchedulerConfig = settings.try_deserialize()?;
        cfg.validate()?;
        log::debug!("loaded scheduler config from {}", path.as_ref().display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.bounds;
        if self.sample_interval_us <= 0 {
            return Err(ConfigError::Invalid(format!(
                "sample_interval_us must be positive, got {}",
                self.sample_interval_us
            )));
        }
        let finite = [b.min_green_s, b.max_green_s, b.min_turn_s, b.max_turn_s, b.turn_saturation_count];
        if finite.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::Invalid("green bounds must be finite and non-negative".into()));
        }
        if b.min_green_s > b.max_green_s {
            return Err(ConfigError::Invalid(format!(
                "min_green_s {} exceeds max_green_s {}",
                b.min_green_s, b.max_green_s
            )));
        }
        if b.min_turn_s > b.max_turn_s {
            return Err(ConfigError::Invalid(format!(
                "min_turn_s {} exceeds max_turn_s {}",
                b.min_turn_s, b.max_turn_s
            )));
        }
        if b.turn_saturation_count == 0.0 {
            return Err(ConfigError::Invalid("turn_saturation_count must be positive".into()));
        }
        Ok(())
    }
}
