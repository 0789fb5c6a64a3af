//! Neighbour graph maintenance
//!
//! There is no central graph object: every cell owns its side of each edge.
//! Keeping the relation symmetric is a two-phase protocol.
//!
//! - Insertion: [`update_neighbour_set`] then [`add_self_to_neighbours`].
//! - Retraction: [`remove_self_from_neighbours`] then discard the cell.
//!
//! [`insert_cell`] and [`retract_cell`] run those sequences in order and
//! keep the spatial index in step with the arena.

use crate::city::arena::CellArena;
use crate::city::cell::Cell;
use crate::core::types::{CellId, CellTag};
use crate::spatial::SpatialIndex;

/// Recompute `id`'s own neighbour set from the spatial index
///
/// Only `id`'s side of each edge is touched. Candidates must be live,
/// tagged as buildings and not `id` itself.
pub fn update_neighbour_set<S: SpatialIndex + ?Sized>(
    arena: &mut CellArena,
    index: &S,
    id: CellId,
    radius: f32,
) {
    let Some(center) = arena.get(id).map(Cell::center) else {
        return;
    };

    let found: Vec<CellId> = index
        .query_radius(center, radius)
        .into_iter()
        .filter(|&other| other != id)
        .filter(|&other| {
            arena
                .get(other)
                .is_some_and(|cell| cell.tag() == CellTag::Building)
        })
        .collect();

    if let Some(cell) = arena.get_mut(id) {
        cell.clear_neighbours();
        for other in found {
            cell.add_neighbour(other);
        }
    }
}

/// Add `id` to the neighbour set of every cell in its own set
pub fn add_self_to_neighbours(arena: &mut CellArena, id: CellId) {
    let Some(neighbours) = arena.get(id).map(|cell| cell.neighbours().clone()) else {
        return;
    };
    for other in neighbours {
        if let Some(cell) = arena.get_mut(other) {
            cell.add_neighbour(id);
        }
    }
}

/// Remove `id` from the neighbour set of every cell in its own set
pub fn remove_self_from_neighbours(arena: &mut CellArena, id: CellId) {
    let Some(neighbours) = arena.get(id).map(|cell| cell.neighbours().clone()) else {
        return;
    };
    for other in neighbours {
        if let Some(cell) = arena.get_mut(other) {
            cell.remove_neighbour(id);
        }
    }
}

/// Store a new cell and link it into the graph from both sides
pub fn insert_cell<S: SpatialIndex + ?Sized>(
    arena: &mut CellArena,
    index: &mut S,
    cell: Cell,
    radius: f32,
) -> CellId {
    let center = cell.center();
    let id = arena.insert(cell);
    index.insert(id, center);
    update_neighbour_set(arena, &*index, id, radius);
    add_self_to_neighbours(arena, id);
    id
}

/// Unlink a cell from every neighbour and discard it
pub fn retract_cell<S: SpatialIndex + ?Sized>(
    arena: &mut CellArena,
    index: &mut S,
    id: CellId,
) -> Option<Cell> {
    arena.get_mut(id)?.set_tag(CellTag::Retired);
    remove_self_from_neighbours(arena, id);
    index.remove(id);
    arena.remove(id)
}

/// Every directed edge `(a, b)` whose reverse `(b, a)` is missing
///
/// Edges pointing at cells that no longer exist are reported too.
pub fn asymmetric_edges(arena: &CellArena) -> Vec<(CellId, CellId)> {
    let mut broken = Vec::new();
    for (id, cell) in arena.iter() {
        for &other in cell.neighbours() {
            let reciprocated = arena
                .get(other)
                .is_some_and(|neighbour| neighbour.has_neighbour(id));
            if !reciprocated {
                broken.push((id, other));
            }
        }
    }
    broken.sort_unstable();
    broken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::cell::Transform;
    use crate::core::types::{BuildingKind, OccupantType, NEIGHBOUR_RADIUS};
    use crate::spatial::BruteForceIndex;
    use glam::Vec3;

    fn residency_at(x: f32, z: f32) -> Cell {
        Cell::new(
            Transform::from_translation(Vec3::new(x, 0.0, z)),
            None,
            BuildingKind::Residency,
        )
    }

    /// Three cells in a row, 1.5 apart: a-b and b-c are neighbours, a-c are not
    fn row() -> (CellArena, BruteForceIndex, [CellId; 3]) {
        let mut arena = CellArena::new();
        let mut index = BruteForceIndex::new();
        let a = arena.insert(residency_at(0.0, 0.0));
        let b = arena.insert(residency_at(1.5, 0.0));
        let c = arena.insert(residency_at(3.0, 0.0));
        for id in [a, b, c] {
            index.insert(id, arena.get(id).unwrap().center());
        }
        for id in [a, b, c] {
            update_neighbour_set(&mut arena, &index, id, NEIGHBOUR_RADIUS);
        }
        (arena, index, [a, b, c])
    }

    #[test]
    fn test_update_neighbour_set_excludes_self_and_far_cells() {
        let (arena, _, [a, b, c]) = row();
        let a_set = arena.get(a).unwrap().neighbours();
        assert!(a_set.contains(&b));
        assert!(!a_set.contains(&a));
        assert!(!a_set.contains(&c));
        assert_eq!(arena.get(b).unwrap().neighbours().len(), 2);
        assert!(asymmetric_edges(&arena).is_empty());
    }

    #[test]
    fn test_update_neighbour_set_is_one_directional() {
        let (mut arena, mut index, [a, b, _]) = row();
        let d = arena.insert(residency_at(0.0, 1.0));
        index.insert(d, arena.get(d).unwrap().center());
        update_neighbour_set(&mut arena, &index, d, NEIGHBOUR_RADIUS);

        assert!(arena.get(d).unwrap().has_neighbour(a));
        assert!(arena.get(d).unwrap().has_neighbour(b));
        assert!(!arena.get(a).unwrap().has_neighbour(d));
        assert_eq!(asymmetric_edges(&arena).len(), 2);

        add_self_to_neighbours(&mut arena, d);
        assert!(asymmetric_edges(&arena).is_empty());
    }

    #[test]
    fn test_update_ignores_retired_cells() {
        let (mut arena, index, [a, b, _]) = row();
        arena.get_mut(b).unwrap().set_tag(CellTag::Retired);
        update_neighbour_set(&mut arena, &index, a, NEIGHBOUR_RADIUS);
        assert!(arena.get(a).unwrap().neighbours().is_empty());
    }

    #[test]
    fn test_insert_then_retract_leaves_no_edges() {
        let (mut arena, mut index, [a, b, c]) = row();
        let school = insert_cell(
            &mut arena,
            &mut index,
            Cell::school_marker(Vec3::new(1.5, 0.1, 0.5), OccupantType::Red),
            NEIGHBOUR_RADIUS,
        );
        for id in [a, b, c] {
            assert!(arena.get(id).unwrap().has_neighbour(school));
        }
        assert!(asymmetric_edges(&arena).is_empty());

        let removed = retract_cell(&mut arena, &mut index, school).unwrap();
        assert_eq!(removed.tag(), CellTag::Retired);
        for id in [a, b, c] {
            assert!(!arena.get(id).unwrap().has_neighbour(school));
        }
        assert!(asymmetric_edges(&arena).is_empty());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_retract_unknown_is_none() {
        let (mut arena, mut index, [a, ..]) = row();
        let stale = CellId::new(a.index, a.generation + 1);
        assert!(retract_cell(&mut arena, &mut index, stale).is_none());
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_discard_without_retraction_is_detected() {
        let (mut arena, _, [a, b, _]) = row();
        arena.remove(a);
        assert_eq!(asymmetric_edges(&arena), vec![(b, a)]);
    }
}
