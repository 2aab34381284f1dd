//! Render configuration loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.
//! Every field is optional; missing ones take the defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mesh::{Framing, DEFAULT_FACE_COLOR};
use crate::rasterizer::{Light, RasterSettings, ShadingMode, Vec3, WorldBounds, HEIGHT, WIDTH};

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Everything that stays fixed for one render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// World window mapped onto the canvas
    pub world: WorldBounds,
    pub framing: Framing,
    /// Ignore `framing` and fit the model's extent to the window
    pub auto_fit: bool,
    /// Face color for faces without an `rgb=(...)` block
    pub default_color: Vec3,
    pub background: Vec3,
    pub light: Light,
    pub shading: ShadingMode,
    pub parallel: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            world: WorldBounds::default(),
            framing: Framing::default(),
            auto_fit: false,
            default_color: DEFAULT_FACE_COLOR,
            background: Vec3::ZERO,
            light: Light::default(),
            shading: ShadingMode::Flat,
            parallel: false,
        }
    }
}

/// Fraction of the world window an auto-fitted model spans
pub const AUTO_FIT_FILL: f32 = 0.9;

/// Largest canvas side a TGA header can describe
pub const MAX_CANVAS_SIDE: usize = u16::MAX as usize;

/// Values given on the command line; each one set replaces the config's.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigOverrides {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub scale: Option<f32>,
    pub x_offset: Option<f32>,
    pub y_offset: Option<f32>,
    pub shading: Option<ShadingMode>,
    /// Flags can only switch these on
    pub auto_fit: bool,
    pub parallel: bool,
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_CANVAS_SIDE || self.height > MAX_CANVAS_SIDE {
            return Err(ConfigError::Invalid(format!(
                "canvas sides are limited to {}, got {}x{}",
                MAX_CANVAS_SIDE, self.width, self.height
            )));
        }
        let w = &self.world;
        let finite = [w.x_min, w.x_max, w.y_min, w.y_max].iter().all(|v| v.is_finite());
        if !finite || w.width() == 0.0 || w.height() == 0.0 {
            return Err(ConfigError::Invalid(format!(
                "world window must have finite, non-zero size, got {:?}",
                w
            )));
        }
        if !self.framing.scale.is_finite() {
            return Err(ConfigError::Invalid("framing scale must be finite".to_string()));
        }
        if self.light.direction.try_normalize().is_none() {
            return Err(ConfigError::Invalid("light direction must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(w) = overrides.width {
            self.width = w;
        }
        if let Some(h) = overrides.height {
            self.height = h;
        }
        if let Some(s) = overrides.scale {
            self.framing.scale = s;
        }
        if let Some(x) = overrides.x_offset {
            self.framing.x_offset = x;
        }
        if let Some(y) = overrides.y_offset {
            self.framing.y_offset = y;
        }
        if let Some(shading) = overrides.shading {
            self.shading = shading;
        }
        self.auto_fit |= overrides.auto_fit;
        self.parallel |= overrides.parallel;
    }

    pub fn raster_settings(&self) -> RasterSettings {
        RasterSettings {
            light: self.light,
            shading: self.shading,
            parallel: self.parallel,
        }
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load a config from a RON string
pub fn load_config_from_str(s: &str) -> Result<RenderConfig, ConfigError> {
    let config: RenderConfig = ron::from_str(s)?;
    config.validate()?;
    Ok(config)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RenderConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_setup() {
        let c = RenderConfig::default();
        assert_eq!((c.width, c.height), (400, 400));
        assert_eq!(c.world, WorldBounds { x_min: -1.0, x_max: 1.0, y_min: -1.0, y_max: 1.0 });
        assert_eq!(c.default_color, Vec3::ONE);
        assert_eq!(c.shading, ShadingMode::Flat);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let c = load_config_from_str(
            "(width: 64, shading: Smooth, default_color: (x: 1.0, y: 0.0, z: 0.0), framing: (scale: 2.5))",
        )
        .unwrap();
        assert_eq!(c.width, 64);
        assert_eq!(c.height, 400);
        assert_eq!(c.shading, ShadingMode::Smooth);
        assert_eq!(c.default_color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(c.framing.scale, 2.5);
        assert_eq!(c.framing.x_offset, 0.0);
        assert_eq!(c.light, Light::default());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(matches!(load_config_from_str("(width: 0)"), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            load_config_from_str("(world: (x_min: 1.0, x_max: 1.0, y_min: -1.0, y_max: 1.0))"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            load_config_from_str("(light: (direction: (x: 0.0, y: 0.0, z: 0.0)))"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(load_config_from_str("(width: \"wide\")"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let too_wide = RenderConfig { width: 70_000, ..Default::default() };
        assert!(matches!(too_wide.validate(), Err(ConfigError::Invalid(_))));

        let overflowing = RenderConfig { width: usize::MAX, height: 2, ..Default::default() };
        assert!(matches!(overflowing.validate(), Err(ConfigError::Invalid(_))));

        let widest = RenderConfig { width: MAX_CANVAS_SIDE, height: 1, ..Default::default() };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut c = load_config_from_str(
            "(width: 64, height: 32, framing: (x_offset: 0.5, scale: 2.0), shading: Smooth, auto_fit: true)",
        )
        .unwrap();
        c.apply_overrides(&ConfigOverrides {
            width: Some(128),
            scale: Some(0.25),
            y_offset: Some(-0.75),
            shading: Some(ShadingMode::None),
            parallel: true,
            ..Default::default()
        });

        assert_eq!((c.width, c.height), (128, 32));
        assert_eq!(c.framing, Framing { x_offset: 0.5, y_offset: -0.75, scale: 0.25 });
        assert_eq!(c.shading, ShadingMode::None);
        // an unset flag does not turn the file's setting off
        assert!(c.auto_fit);
        assert!(c.parallel);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let mut c = RenderConfig { height: 77, ..Default::default() };
        let before = c.clone();
        c.apply_overrides(&ConfigOverrides::default());
        assert_eq!(c, before);

        c.apply_overrides(&ConfigOverrides { auto_fit: true, ..Default::default() });
        assert!(c.auto_fit);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.ron");
        let config = RenderConfig {
            width: 123,
            auto_fit: true,
            background: Vec3::new(0.1, 0.2, 0.3),
            parallel: true,
            ..Default::default()
        };
        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_config(dir.path().join("nope.ron")), Err(ConfigError::Io(_))));
    }
}
