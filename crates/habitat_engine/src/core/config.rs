//! # Engine Configuration
//!
//! All tunable constants of the collision, placement, snapping and zone
//! subsystems, grouped per subsystem. Every section has a `Default` holding the
//! values the editor ships with, and the whole tree can be loaded from TOML or
//! RON through the [`Config`] trait.

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// # Spatial Index Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Edge length of a grid cell in world units (habitat scale: 5)
    pub cell_size: f32,
    /// Bodies covering more cells than this are tracked as oversize
    pub max_cells_per_body: u64,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            cell_size: 5.0,
            max_cells_per_body: 4096,
        }
    }
}

/// # Placement Resolver Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Bisection steps when searching along a movement segment
    pub binary_search_iterations: u32,
    /// Distance kept from the first contact along the direction of travel
    pub safety_margin: f32,
    /// Movements shorter than this are not searched
    pub min_move_distance: f32,
    /// Spacing of the square spiral used to push overlapping bodies out
    pub spiral_step: f32,
    /// Largest spiral offset tried before giving up
    pub spiral_max_radius: f32,
    /// Largest ring radius tried when spawning new objects
    pub spawn_max_radius: f32,
    /// Lower bound for spawn ring spacing (tiny geometries)
    pub spawn_min_ring_spacing: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            binary_search_iterations: 10,
            safety_margin: 0.05,
            min_move_distance: 1.0e-3,
            spiral_step: 1.0,
            spiral_max_radius: 20.0,
            spawn_max_radius: 50.0,
            spawn_min_ring_spacing: 0.5,
        }
    }
}

/// # Magnetic Snap Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Attachment points closer than this attract each other
    pub snap_distance: f32,
    /// Normals must have a dot product below this to be compatible
    pub antiparallel_threshold: f32,
    /// Maximum nominal diameter mismatch for compatible points
    pub diameter_tolerance: f32,
    /// Force magnitude at zero distance
    pub magnetic_strength: f32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            snap_distance: 4.5,
            antiparallel_threshold: -0.8,
            diameter_tolerance: 0.5,
            magnetic_strength: 1.0,
        }
    }
}

/// # Zone Constraint Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Fraction of a box container's extent a zone may occupy per axis
    pub size_fraction: f32,
    /// Fraction of a cylinder's length a zone may occupy along its axis
    pub cylinder_length_fraction: f32,
    /// Passes of pairwise separation before giving up
    pub max_collision_iterations: u32,
    /// Radius increment of the compass search for a free zone position
    pub safe_position_step: f32,
    /// Rings tried by the compass search
    pub safe_position_attempts: u32,
    /// Adapt-then-constrain repetitions when fitting a zone into a container
    pub fit_passes: u32,
    /// Penetration below this is treated as touching, not overlapping
    pub contact_tolerance: f32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            size_fraction: 0.85,
            cylinder_length_fraction: 0.85,
            max_collision_iterations: 10,
            safe_position_step: 0.5,
            safe_position_attempts: 20,
            fit_passes: 2,
            contact_tolerance: 1.0e-4,
        }
    }
}

/// # Engine Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Broad-phase grid
    pub spatial: SpatialConfig,
    /// Safe-position and spawn searches
    pub placement: PlacementConfig,
    /// Attachment snapping and magnetic pull
    pub snap: SnapConfig,
    /// Zone fitting and separation
    pub zones: ZoneConfig,
}

impl EngineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the broad-phase cell size
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.spatial.cell_size = cell_size;
        self
    }

    /// Set the snap distance
    pub fn with_snap_distance(mut self, distance: f32) -> Self {
        self.snap.snap_distance = distance;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive finite number, got {value}"),
                })
            }
        }

        fn fraction(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be in (0, 1], got {value}"),
                })
            }
        }

        positive("spatial.cell_size", self.spatial.cell_size)?;
        if self.spatial.max_cells_per_body == 0 {
            return Err(ConfigError::Invalid {
                field: "spatial.max_cells_per_body",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.placement.binary_search_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "placement.binary_search_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.placement.safety_margin.is_nan() || self.placement.safety_margin < 0.0 {
            return Err(ConfigError::Invalid {
                field: "placement.safety_margin",
                reason: format!("must not be negative, got {}", self.placement.safety_margin),
            });
        }
        positive("placement.min_move_distance", self.placement.min_move_distance)?;
        positive("placement.spiral_step", self.placement.spiral_step)?;
        positive("placement.spiral_max_radius", self.placement.spiral_max_radius)?;
        positive("placement.spawn_max_radius", self.placement.spawn_max_radius)?;
        positive("placement.spawn_min_ring_spacing", self.placement.spawn_min_ring_spacing)?;

        positive("snap.snap_distance", self.snap.snap_distance)?;
        if !(-1.0..=1.0).contains(&self.snap.antiparallel_threshold) {
            return Err(ConfigError::Invalid {
                field: "snap.antiparallel_threshold",
                reason: format!("must be in [-1, 1], got {}", self.snap.antiparallel_threshold),
            });
        }
        positive("snap.diameter_tolerance", self.snap.diameter_tolerance)?;
        positive("snap.magnetic_strength", self.snap.magnetic_strength)?;

        fraction("zones.size_fraction", self.zones.size_fraction)?;
        fraction("zones.cylinder_length_fraction", self.zones.cylinder_length_fraction)?;
        positive("zones.safe_position_step", self.zones.safe_position_step)?;
        positive("zones.contact_tolerance", self.zones.contact_tolerance)?;

        Ok(())
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spatial.cell_size, 5.0);
        assert_eq!(config.placement.binary_search_iterations, 10);
        assert_eq!(config.snap.snap_distance, 4.5);
        assert_eq!(config.zones.size_fraction, 0.85);
    }

    #[test]
    fn test_validation_names_offending_field() {
        let config = EngineConfig::new().with_cell_size(0.0);
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "spatial.cell_size"),
            other => panic!("expected invalid cell size, got {other:?}"),
        }

        let mut config = EngineConfig::default();
        config.zones.size_fraction = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "zones.size_fraction", .. })
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [snap]
            snap_distance = 6.0

            [spatial]
            cell_size = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(config.snap.snap_distance, 6.0);
        assert_eq!(config.snap.diameter_tolerance, 0.5);
        assert_eq!(config.spatial.cell_size, 2.5);
        assert_eq!(config.placement, PlacementConfig::default());
    }

    #[test]
    fn test_save_and_load_ron_file() {
        let path = std::env::temp_dir().join(format!("habitat_engine_cfg_{}.ron", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let config = EngineConfig::new().with_snap_distance(3.0);
        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        assert!(matches!(
            EngineConfig::default().save_to_file("engine.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            EngineConfig::load_from_file("/definitely/not/here.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
