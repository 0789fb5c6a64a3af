//! Satisfaction of a cell with its neighbourhood
//!
//! Neighbours vote with their weight. Same-type neighbours count towards
//! `same`, occupied neighbours of another type towards `different`, and
//! vacant neighbours abstain.

use crate::city::arena::CellArena;
use crate::city::cell::Cell;
use crate::core::types::BuildingKind;

/// Weighted votes of a cell's neighbours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeighbourTally {
    pub same: u64,
    pub different: u64,
}

impl NeighbourTally {
    /// Count the weighted votes around `cell`
    ///
    /// Neighbour ids that no longer resolve are skipped.
    pub fn of(cell: &Cell, cells: &CellArena) -> Self {
        let own = cell.occupant_type();
        let mut tally = NeighbourTally::default();
        for neighbour in cell.neighbours().iter().filter_map(|&id| cells.get(id)) {
            let other = neighbour.occupant_type();
            if other == own {
                tally.same += neighbour.weight() as u64;
            } else if !other.is_vacant() {
                tally.different += neighbour.weight() as u64;
            }
        }
        tally
    }

    pub fn total(&self) -> u64 {
        self.same + self.different
    }

    /// Share of same-type votes, or `None` when no neighbour has an opinion
    pub fn same_ratio(&self) -> Option<f32> {
        match self.total() {
            0 => None,
            total => Some(self.same as f32 / total as f32),
        }
    }
}

/// Whether `cell` is content to stay where it is
///
/// Vacant cells and schools are always satisfied, as is a cell with no
/// occupied neighbours.
pub fn is_satisfied(cell: &Cell, cells: &CellArena, tolerance_threshold: f32) -> bool {
    if cell.occupant_type().is_vacant() || cell.kind() == BuildingKind::School {
        return true;
    }

    match NeighbourTally::of(cell, cells).same_ratio() {
        None => true,
        Some(ratio) => ratio >= tolerance_threshold,
    }
}
