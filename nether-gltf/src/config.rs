//! Tool configuration (nether-gltf.toml)
//!
//! Every section and field is optional; missing values fall back to the
//! defaults below.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Tool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Validation gate settings
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Animation sampling settings
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// CLI output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Validation gate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Validate documents before decoding (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Animation sampling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Frames per second when baking channels (default: 30)
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Maximum tuples or frames printed per command (default: 32)
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

fn default_true() -> bool {
    true
}
fn default_frame_rate() -> f32 {
    30.0
}
fn default_max_rows() -> usize {
    32
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
        }
    }
}

impl Config {
    /// Parse and check a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid configuration TOML")?;
        config.check()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Failed to load config: {:?}", path))
    }

    fn check(&self) -> Result<()> {
        let rate = self.sampling.frame_rate;
        if !(rate > 0.0) || !rate.is_finite() {
            bail!("sampling.frame_rate must be a positive number, got {}", rate);
        }
        Ok(())
    }
}
