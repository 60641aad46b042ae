//! # Core Engine Module
//!
//! Shared configuration types used by every subsystem.

pub mod config;

// Re-export commonly used config types
pub use config::{
    EngineConfig,
    SpatialConfig,
    SceneConfig,
    Config,
    ConfigError,
    MAX_VIEW_LAYER,
};
