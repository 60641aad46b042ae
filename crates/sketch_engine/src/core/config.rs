//! # Engine Configuration
//!
//! Configuration structures for the runtime: logging and debug switches,
//! the spatial index covering the world, and scene drawing limits.
//!
//! ## Design Goals
//!
//! - **Serializable**: Support for multiple config file formats (TOML, RON)
//! - **Type Safe**: Strong typing with validation and defaults

use serde::{Serialize, Deserialize};

use crate::foundation::math::Rect;

// Re-export from the config module for convenience
pub use crate::config::{Config, ConfigError};

/// Highest draw layer a Viewer can sit on
pub const MAX_VIEW_LAYER: u8 = 50;

/// # Spatial Index Configuration
///
/// Describes the region covered by the per-frame region tree and how
/// eagerly it subdivides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Area covered by the root node; positions outside are not indexed
    pub world_bounds: Rect,
    /// Entries a node holds before it subdivides
    pub node_capacity: usize,
    /// Number of cells per axis created on subdivision
    pub divisions: usize,
    /// Depth at which nodes stop subdividing and keep appending, so that
    /// many entries at one position cannot recurse forever
    pub max_depth: u32,
}

impl SpatialConfig {
    /// Create a spatial configuration covering `world_bounds`
    pub fn new(world_bounds: Rect) -> Self {
        Self {
            world_bounds,
            ..Self::default()
        }
    }

    /// Set the node capacity
    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.node_capacity = capacity;
        self
    }

    /// Set the per-axis subdivision count
    pub fn with_divisions(mut self, divisions: usize) -> Self {
        self.divisions = divisions;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_capacity == 0 {
            return Err(ConfigError::Invalid("Node capacity must be at least 1".to_string()));
        }
        if self.divisions < 2 {
            return Err(ConfigError::Invalid("Divisions must be at least 2".to_string()));
        }
        if self.world_bounds.w <= 0.0 || self.world_bounds.h <= 0.0 {
            return Err(ConfigError::Invalid("World bounds must have a positive size".to_string()));
        }
        Ok(())
    }
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            world_bounds: Rect::new(-5000.0, -5000.0, 10000.0, 10000.0),
            node_capacity: 8,
            divisions: 4,
            max_depth: 12,
        }
    }
}

/// # Scene Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Last layer the display pass visits
    pub max_view_layer: u8,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_view_layer: MAX_VIEW_LAYER,
        }
    }
}

/// # Engine Configuration
///
/// Core engine behavior configuration including logging, debug features,
/// and the spatial and scene settings every Scene is created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
    /// Target FPS the host loop aims for
    pub target_fps: Option<u32>,
    /// Spatial index settings
    pub spatial: SpatialConfig,
    /// Scene settings
    pub scene: SceneConfig,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
            target_fps: Some(60),
            spatial: SpatialConfig::default(),
            scene: SceneConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Set target FPS
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = Some(fps);
        self
    }

    /// Replace the spatial settings
    pub fn with_spatial(mut self, spatial: SpatialConfig) -> Self {
        self.spatial = spatial;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spatial.validate()?;
        if self.scene.max_view_layer > MAX_VIEW_LAYER {
            return Err(ConfigError::Invalid(format!(
                "max_view_layer must not exceed {MAX_VIEW_LAYER}"
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_spatial_validation() {
        let config = SpatialConfig::default().with_divisions(1);
        assert!(config.validate().is_err());
        let config = SpatialConfig::default().with_node_capacity(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ron_round_trip_keeps_bounds() {
        let config = EngineConfig::new()
            .with_log_level("debug")
            .with_spatial(SpatialConfig::new(Rect::new(0.0, 0.0, 640.0, 480.0)));
        let text = config.render(ConfigFormat::Ron).unwrap();
        let parsed = EngineConfig::parse(&text, ConfigFormat::Ron).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_toml_parse() {
        let text = r#"
            log_level = "warn"
            debug_mode = false

            [spatial]
            node_capacity = 4
            divisions = 2
            world_bounds = { x = 0.0, y = 0.0, w = 100.0, h = 100.0 }

            [scene]
            max_view_layer = 20
        "#;
        let config = EngineConfig::parse(text, ConfigFormat::Toml).unwrap();
        assert_eq!(config.spatial.node_capacity, 4);
        assert_eq!(config.scene.max_view_layer, 20);
        assert_eq!(config.target_fps, None);
    }
}
