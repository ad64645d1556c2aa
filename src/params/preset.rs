//! TOML preset files.
//!
//! A preset overrides the compiled defaults before command-line flags are applied:
//!
//! ```toml
//! volume = 0.8
//! smoothing_rate = 0.05
//! snap_epsilon = 0.0001
//!
//! [settings]
//! iterations = 300
//! kaleidoscopeSegments = 8
//! ```

use std::path::Path;

use serde::Deserialize;

use super::{Settings, SmoothingConfig};
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    /// Starting settings (missing keys keep their defaults)
    #[serde(default)]
    pub settings: Option<Settings>,

    pub volume: Option<f32>,

    pub smoothing_rate: Option<f32>,

    pub snap_epsilon: Option<f32>,
}

impl Preset {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let preset: Preset = toml::from_str(text)?;
        if let Some(settings) = &preset.settings {
            settings.validate()?;
        }
        Ok(preset)
    }

    /// Apply smoothing overrides on top of `config`
    pub fn apply_smoothing(&self, config: &mut SmoothingConfig) {
        if let Some(rate) = self.smoothing_rate {
            config.rate = rate;
        }
        if let Some(eps) = self.snap_epsilon {
            config.snap_epsilon = eps;
        }
    }
}
