//! # Core Engine Module
//!
//! Shared configuration used by every subsystem.

pub mod config;

// Re-export commonly used config types
pub use config::{
    Config,
    ConfigError,
    EngineConfig,
    PlacementConfig,
    SnapConfig,
    SpatialConfig,
    ZoneConfig,
};
