//! Simulation configuration with documented constants
//!
//! All tunable numbers of the model live here. Values are read from TOML
//! (every field optional) and validated before an engine is built from them.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SegregationError};
use crate::core::types::{OccupantType, NEIGHBOUR_RADIUS, RESIDENCY_WEIGHT, SCHOOL_WEIGHT};

/// Configuration for the segregation model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Minimum weighted share of same-type neighbours a cell needs to be satisfied
    ///
    /// Must lie in `[0, 1]`. At 0.0 every cell is satisfied; at 1.0 a single
    /// different neighbour is enough to trigger relocation.
    pub tolerance_threshold: f32,

    /// Radius of the neighbour query around a cell centre (world units)
    pub neighbour_radius: f32,

    /// Vote weight of a school, both static and detection-placed
    pub school_weight: u32,

    /// Vote weight of a residency
    pub residency_weight: u32,

    /// Mapping from normalised image coordinates onto the world plane
    pub world_mapping: WorldMapping,

    /// Cut-offs used when seeding random occupants
    pub seeding: SeedingThresholds,

    /// Which cells a dissatisfied occupant may be swapped into
    pub relocation: RelocationPolicy,

    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tolerance_threshold: 0.5,
            neighbour_radius: NEIGHBOUR_RADIUS,
            school_weight: SCHOOL_WEIGHT,
            residency_weight: RESIDENCY_WEIGHT,
            world_mapping: WorldMapping::default(),
            seeding: SeedingThresholds::default(),
            relocation: RelocationPolicy::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate().map_err(SegregationError::InvalidConfig)?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=1.0).contains(&self.tolerance_threshold) {
            return Err(format!(
                "tolerance_threshold ({}) must lie in [0, 1]",
                self.tolerance_threshold
            ));
        }

        if self.neighbour_radius.is_nan() || self.neighbour_radius <= 0.0 {
            return Err(format!(
                "neighbour_radius ({}) must be positive",
                self.neighbour_radius
            ));
        }

        if self.school_weight == 0 || self.residency_weight == 0 {
            return Err("Weights must be positive".into());
        }

        self.seeding.validate()?;
        self.world_mapping.validate()?;

        Ok(())
    }

    /// Weight assigned to a cell of the given kind
    pub fn weight_for(&self, kind: crate::core::types::BuildingKind) -> u32 {
        match kind {
            crate::core::types::BuildingKind::School => self.school_weight,
            crate::core::types::BuildingKind::Residency => self.residency_weight,
        }
    }
}

/// Affine mapping from the unit square (origin top-left) to the world XZ plane
///
/// The default maps onto a 10×10 plane centred on the origin with the
/// image's vertical axis flipped: `(0,0)` lands at `(-5, 5)` and `(1,1)`
/// at `(5, -5)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldMapping {
    pub x_min: f32,
    pub x_max: f32,
    /// World Z of the image's top edge
    pub z_top: f32,
    /// World Z of the image's bottom edge
    pub z_bottom: f32,
    /// Height (world Y) at which detection markers are placed
    pub marker_height: f32,
}

impl Default for WorldMapping {
    fn default() -> Self {
        Self {
            x_min: -5.0,
            x_max: 5.0,
            z_top: 5.0,
            z_bottom: -5.0,
            marker_height: 0.1,
        }
    }
}

impl WorldMapping {
    /// Map a normalised `(x, y)` image position onto the world plane
    pub fn to_world(&self, normalised: Vec2) -> Vec3 {
        Vec3::new(
            self.x_min + (self.x_max - self.x_min) * normalised.x,
            self.marker_height,
            self.z_top + (self.z_bottom - self.z_top) * normalised.y,
        )
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let finite = [self.x_min, self.x_max, self.z_top, self.z_bottom, self.marker_height]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err("world_mapping values must be finite".into());
        }
        if self.x_min == self.x_max || self.z_top == self.z_bottom {
            return Err("world_mapping must span a non-empty plane".into());
        }
        Ok(())
    }
}

/// Cut-offs for random seeding
///
/// A draw `d` in `[0, range)` maps to Vacant below `vacant`, Red below `red`,
/// Green below `green`, Blue below `blue` and Vacant otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedingThresholds {
    pub vacant: u32,
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    pub range: u32,
}

impl Default for SeedingThresholds {
    fn default() -> Self {
        // Just over half vacant, the rest split evenly
        Self {
            vacant: 50,
            red: 65,
            green: 80,
            blue: 95,
            range: 95,
        }
    }
}

impl SeedingThresholds {
    /// Classify a single draw from `[0, range)`
    pub fn classify(&self, draw: u32) -> OccupantType {
        if draw < self.vacant {
            OccupantType::Vacant
        } else if draw < self.red {
            OccupantType::Red
        } else if draw < self.green {
            OccupantType::Green
        } else if draw < self.blue {
            OccupantType::Blue
        } else {
            OccupantType::Vacant
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.range == 0 {
            return Err("seeding.range must be positive".into());
        }
        if !(self.vacant <= self.red && self.red <= self.green && self.green <= self.blue) {
            return Err(format!(
                "seeding thresholds must be non-decreasing (got {}/{}/{}/{})",
                self.vacant, self.red, self.green, self.blue
            ));
        }
        if self.blue > self.range {
            return Err(format!(
                "seeding.blue ({}) must not exceed seeding.range ({})",
                self.blue, self.range
            ));
        }
        Ok(())
    }
}

/// Target pool used when relocating a dissatisfied occupant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelocationPolicy {
    /// Swap with any static cell, drawn uniformly with replacement.
    /// Relocation only happens while at least one vacant cell exists.
    #[default]
    Legacy,
    /// Swap only into vacant cells, each vacant cell used at most once per step
    VacantOnly,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_tolerance_out_of_range_rejected() {
        let config = SimulationConfig {
            tolerance_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            tolerance_threshold: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_radius_rejected() {
        let config = SimulationConfig {
            neighbour_radius: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_seeding_classify_boundaries() {
        let s = SeedingThresholds::default();
        assert_eq!(s.classify(0), OccupantType::Vacant);
        assert_eq!(s.classify(49), OccupantType::Vacant);
        assert_eq!(s.classify(50), OccupantType::Red);
        assert_eq!(s.classify(64), OccupantType::Red);
        assert_eq!(s.classify(65), OccupantType::Green);
        assert_eq!(s.classify(79), OccupantType::Green);
        assert_eq!(s.classify(80), OccupantType::Blue);
        assert_eq!(s.classify(94), OccupantType::Blue);
        assert_eq!(s.classify(95), OccupantType::Vacant);
    }

    #[test]
    fn test_unordered_seeding_rejected() {
        let config = SimulationConfig {
            seeding: SeedingThresholds {
                vacant: 70,
                red: 65,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_world_mapping_corners() {
        let m = WorldMapping::default();
        let top_left = m.to_world(Vec2::new(0.0, 0.0));
        assert_eq!((top_left.x, top_left.z), (-5.0, 5.0));
        let bottom_right = m.to_world(Vec2::new(1.0, 1.0));
        assert_eq!((bottom_right.x, bottom_right.z), (5.0, -5.0));
        let centre = m.to_world(Vec2::new(0.5, 0.5));
        assert_eq!((centre.x, centre.z), (0.0, 0.0));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = SimulationConfig::from_toml_str(
            r#"
            tolerance_threshold = 0.3
            relocation = "vacant_only"
            seed = 7

            [world_mapping]
            x_min = -10.0
            x_max = 10.0
            "#,
        )
        .unwrap();
        assert_eq!(config.tolerance_threshold, 0.3);
        assert_eq!(config.relocation, RelocationPolicy::VacantOnly);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.world_mapping.x_min, -10.0);
        assert_eq!(config.world_mapping.z_top, 5.0);
        assert_eq!(config.neighbour_radius, 2.0);
    }

    #[test]
    fn test_from_toml_invalid_threshold() {
        let err = SimulationConfig::from_toml_str("tolerance_threshold = 2.0").unwrap_err();
        assert!(matches!(err, SegregationError::InvalidConfig(_)));
    }
}
