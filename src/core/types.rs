//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Radius (world units) within which two cells count as neighbours
pub const NEIGHBOUR_RADIUS: f32 = 2.0;

/// Vote weight of an ordinary residency
pub const RESIDENCY_WEIGHT: u32 = 1;

/// Vote weight of a school
pub const SCHOOL_WEIGHT: u32 = 1000;

/// Stable handle to a cell stored in the [`CellArena`](crate::city::arena::CellArena)
///
/// The generation distinguishes a live cell from an earlier cell that
/// occupied the same slot, so a handle to a retracted school never
/// aliases the school that replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId {
    pub index: u32,
    pub generation: u32,
}

impl CellId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Simulation tick counter
pub type Tick = u64;

/// Who lives in a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupantType {
    #[default]
    Vacant,
    Red,
    Green,
    Blue,
}

impl OccupantType {
    pub const ALL: [OccupantType; 4] = [
        OccupantType::Vacant,
        OccupantType::Red,
        OccupantType::Green,
        OccupantType::Blue,
    ];

    /// Map a detector class name onto an occupant type
    ///
    /// Returns `None` for labels the detector may emit but the model
    /// does not know about.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "vacant" => Some(OccupantType::Vacant),
            "red" => Some(OccupantType::Red),
            "green" => Some(OccupantType::Green),
            "blue" => Some(OccupantType::Blue),
            _ => None,
        }
    }

    pub fn is_vacant(&self) -> bool {
        *self == OccupantType::Vacant
    }
}

/// What a plot is used for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    #[default]
    Residency,
    School,
}

impl BuildingKind {
    /// Vote weight a cell of this kind starts with
    pub fn default_weight(&self) -> u32 {
        match self {
            BuildingKind::Residency => RESIDENCY_WEIGHT,
            BuildingKind::School => SCHOOL_WEIGHT,
        }
    }
}

/// Marks whether a cell still takes part in neighbour queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CellTag {
    /// Live building, visible to spatial queries
    #[default]
    Building,
    /// Scheduled for removal; ignored by spatial queries
    Retired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_known() {
        assert_eq!(OccupantType::from_label("red"), Some(OccupantType::Red));
        assert_eq!(OccupantType::from_label("green"), Some(OccupantType::Green));
        assert_eq!(OccupantType::from_label("blue"), Some(OccupantType::Blue));
        assert_eq!(OccupantType::from_label("vacant"), Some(OccupantType::Vacant));
    }

    #[test]
    fn test_from_label_is_case_sensitive() {
        assert_eq!(OccupantType::from_label("Red"), None);
        assert_eq!(OccupantType::from_label("purple"), None);
        assert_eq!(OccupantType::from_label(""), None);
    }

    #[test]
    fn test_default_weights() {
        assert_eq!(BuildingKind::Residency.default_weight(), 1);
        assert_eq!(BuildingKind::School.default_weight(), 1000);
    }

    #[test]
    fn test_cell_id_generation_distinguishes() {
        let a = CellId::new(3, 0);
        let b = CellId::new(3, 1);
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "#3v0");
    }
}
