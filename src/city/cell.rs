//! A single plot in the city: occupant, kind, weight and neighbour set

use ahash::AHashSet;
use glam::{Affine3A, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::types::{BuildingKind, CellId, CellTag, OccupantType, RESIDENCY_WEIGHT, SCHOOL_WEIGHT};

/// Placement of a cell in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Transform a model-local point into world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
            .transform_point3(local)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Axis-aligned bounds of a cell's mesh in model-local space
///
/// Imported building models rarely have their origin at the visual centre,
/// so the centre used for neighbour queries comes from these bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshBounds {
    pub center: Vec3,
    pub extents: Vec3,
}

/// One plot of the city
#[derive(Debug, Clone)]
pub struct Cell {
    transform: Transform,
    mesh: Option<MeshBounds>,
    occupant: OccupantType,
    kind: BuildingKind,
    weight: u32,
    tag: CellTag,
    neighbours: AHashSet<CellId>,
}

impl Cell {
    /// A vacant residency with the given placement
    pub fn new(transform: Transform, mesh: Option<MeshBounds>, kind: BuildingKind) -> Self {
        Self {
            transform,
            mesh,
            occupant: OccupantType::Vacant,
            kind,
            weight: RESIDENCY_WEIGHT,
            tag: CellTag::Building,
            neighbours: AHashSet::new(),
        }
    }

    /// A mesh-less school marker, as placed for a detection
    pub fn school_marker(position: Vec3, occupant: OccupantType) -> Self {
        Self {
            transform: Transform::from_translation(position),
            mesh: None,
            occupant,
            kind: BuildingKind::School,
            weight: SCHOOL_WEIGHT,
            tag: CellTag::Building,
            neighbours: AHashSet::new(),
        }
    }

    pub fn occupant_type(&self) -> OccupantType {
        self.occupant
    }

    pub fn set_occupant_type(&mut self, occupant: OccupantType) {
        self.occupant = occupant;
    }

    pub fn kind(&self) -> BuildingKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: BuildingKind) {
        self.kind = kind;
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Set the vote weight; zero is raised to one
    pub fn set_weight(&mut self, weight: u32) {
        self.weight = weight.max(1);
    }

    pub fn tag(&self) -> CellTag {
        self.tag
    }

    pub fn set_tag(&mut self, tag: CellTag) {
        self.tag = tag;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn mesh(&self) -> Option<&MeshBounds> {
        self.mesh.as_ref()
    }

    pub fn neighbours(&self) -> &AHashSet<CellId> {
        &self.neighbours
    }

    pub fn has_neighbour(&self, id: CellId) -> bool {
        self.neighbours.contains(&id)
    }

    pub fn add_neighbour(&mut self, id: CellId) {
        self.neighbours.insert(id);
    }

    /// Remove a neighbour; absent ids are ignored
    pub fn remove_neighbour(&mut self, id: CellId) -> bool {
        self.neighbours.remove(&id)
    }

    pub fn clear_neighbours(&mut self) {
        self.neighbours.clear();
    }

    /// Centre used for spatial queries
    ///
    /// Meshed cells use their bounds centre carried into world space.
    /// Markers without a mesh fall back to their translation.
    pub fn center(&self) -> Vec3 {
        match &self.mesh {
            Some(bounds) => self.transform.transform_point(bounds.center),
            None => self.transform.translation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_new_cell_is_vacant_residency() {
        let cell = Cell::new(Transform::default(), None, BuildingKind::Residency);
        assert_eq!(cell.occupant_type(), OccupantType::Vacant);
        assert_eq!(cell.kind(), BuildingKind::Residency);
        assert_eq!(cell.weight(), 1);
        assert!(cell.neighbours().is_empty());
    }

    #[test]
    fn test_school_marker_defaults() {
        let cell = Cell::school_marker(Vec3::new(1.0, 0.1, 2.0), OccupantType::Green);
        assert_eq!(cell.kind(), BuildingKind::School);
        assert_eq!(cell.weight(), 1000);
        assert_eq!(cell.occupant_type(), OccupantType::Green);
        assert!(cell.mesh().is_none());
    }

    #[test]
    fn test_remove_absent_neighbour_is_noop() {
        let mut cell = Cell::new(Transform::default(), None, BuildingKind::Residency);
        cell.add_neighbour(CellId::new(1, 0));
        assert!(!cell.remove_neighbour(CellId::new(2, 0)));
        assert!(!cell.remove_neighbour(CellId::new(1, 1)));
        assert_eq!(cell.neighbours().len(), 1);
        assert!(cell.remove_neighbour(CellId::new(1, 0)));
        assert!(!cell.remove_neighbour(CellId::new(1, 0)));
    }

    #[test]
    fn test_clear_neighbours_idempotent() {
        let mut cell = Cell::new(Transform::default(), None, BuildingKind::Residency);
        cell.add_neighbour(CellId::new(1, 0));
        cell.add_neighbour(CellId::new(2, 0));
        cell.clear_neighbours();
        assert!(cell.neighbours().is_empty());
        cell.clear_neighbours();
        assert!(cell.neighbours().is_empty());
    }

    #[test]
    fn test_set_weight_never_zero() {
        let mut cell = Cell::new(Transform::default(), None, BuildingKind::Residency);
        cell.set_weight(0);
        assert_eq!(cell.weight(), 1);
        cell.set_weight(3);
        assert_eq!(cell.weight(), 3);
    }

    #[test]
    fn test_center_without_mesh_uses_translation() {
        let cell = Cell::school_marker(Vec3::new(-2.5, 0.1, 2.5), OccupantType::Red);
        assert!(approx_eq(cell.center(), Vec3::new(-2.5, 0.1, 2.5)));
    }

    #[test]
    fn test_center_with_mesh_applies_transform() {
        // Model origin sits at a corner; bounds centre is offset by (1, 0, 1)
        let transform = Transform {
            translation: Vec3::new(10.0, 0.0, 0.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(2.0),
        };
        let bounds = MeshBounds {
            center: Vec3::new(1.0, 0.0, 1.0),
            extents: Vec3::ONE,
        };
        let cell = Cell::new(transform, Some(bounds), BuildingKind::Residency);
        assert!(approx_eq(cell.center(), Vec3::new(12.0, 0.0, 2.0)));
    }

    #[test]
    fn test_center_with_rotated_mesh() {
        let transform = Transform {
            translation: Vec3::ZERO,
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            scale: Vec3::ONE,
        };
        let bounds = MeshBounds {
            center: Vec3::new(1.0, 0.0, 0.0),
            extents: Vec3::ONE,
        };
        let cell = Cell::new(transform, Some(bounds), BuildingKind::Residency);
        // +X rotated a quarter turn about Y lands on -Z
        assert!(approx_eq(cell.center(), Vec3::new(0.0, 0.0, -1.0)));
    }
}
