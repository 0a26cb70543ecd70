//! Session options and file-based configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::recalc::ShadingMode;
use crate::erosion::ErosionConfig;
use crate::export::Viewport;
use crate::noise::{FractalConfig, NoiseKind, Seed};
use crate::shading::ColorMode;

/// Errors that can occur while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Named options a host stores between interactions.
///
/// Values are kept as the host stored them and interpreted at call time,
/// so an unknown mode string degrades to a no-op instead of a load error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Seed text; empty or missing means "draw one".
    pub seed: Option<String>,
    /// `"stylized"`, `"real"`, or anything else for no-op.
    pub shading: Option<String>,
    /// `"clay"`, `"heatmap"`, or anything else for neutral gray.
    pub color: Option<String>,
}

impl SessionOptions {
    /// The configured seed, if any.
    pub fn seed(&self) -> Option<Seed> {
        self.seed.as_deref().and_then(Seed::parse)
    }

    pub fn shading_mode(&self) -> ShadingMode {
        ShadingMode::parse(self.shading.as_deref())
    }

    pub fn color_mode(&self) -> ColorMode {
        ColorMode::parse(self.color.as_deref())
    }
}

/// Everything a terrain session needs, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub noise: NoiseKind,
    pub fractal: FractalConfig,
    pub erosion: ErosionConfig,
    pub session: SessionOptions,
    pub viewport: Viewport,
}

impl TerrainConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = TerrainConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TerrainConfig::default());
        assert_eq!(config.fractal.octaves, 8);
        assert_eq!(config.noise, NoiseKind::Perlin);
    }

    #[test]
    fn test_partial_json() {
        let config = TerrainConfig::from_json_str(
            r#"{
                "noise": "simplex",
                "fractal": { "octaves": 4 },
                "erosion": { "hydraulic_steps": 5 },
                "session": { "seed": "test", "shading": "real", "color": "heatmap" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.noise, NoiseKind::Simplex);
        assert_eq!(config.fractal.octaves, 4);
        assert_eq!(config.fractal.scale, 0.06);
        assert_eq!(config.erosion.hydraulic_steps, 5);
        assert_eq!(config.session.seed(), Seed::parse("test"));
        assert_eq!(config.session.shading_mode(), ShadingMode::Real);
        assert_eq!(config.session.color_mode(), ColorMode::Heatmap);
    }

    #[test]
    fn test_unknown_modes_degrade() {
        let config =
            TerrainConfig::from_json_str(r#"{ "session": { "seed": "", "shading": "toon", "color": "sepia" } }"#).unwrap();
        assert_eq!(config.session.seed(), None);
        assert_eq!(config.session.shading_mode(), ShadingMode::None);
        assert_eq!(config.session.color_mode(), ColorMode::Unset);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(TerrainConfig::from_json_str("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = TerrainConfig::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
