//! Per-tick reports and population census

use serde::{Deserialize, Serialize};

use crate::city::arena::CellArena;
use crate::core::types::{BuildingKind, CellId, OccupantType, Tick};
use crate::simulation::satisfaction::{is_satisfied, NeighbourTally};

/// Result of one relocation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Occupied cells that failed the tolerance check
    pub dissatisfied: usize,
    /// Vacant cells at the start of the step
    pub vacant: usize,
    /// Swaps performed
    pub relocations: usize,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: Tick,
    /// Schools standing after the refresh
    pub schools_placed: usize,
    /// Whether the model stepped this tick
    pub running: bool,
    /// Relocation pass, when the model stepped
    pub step: Option<StepOutcome>,
}

/// Snapshot of the static population
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Census {
    pub vacant: usize,
    pub red: usize,
    pub green: usize,
    pub blue: usize,
    /// Occupied residencies failing the tolerance check
    pub dissatisfied: usize,
    /// Mean same-type share over occupied cells that have occupied neighbours
    pub mean_same_ratio: Option<f32>,
}

impl Census {
    /// Count the static cells listed in `ids`
    pub fn collect(cells: &CellArena, ids: &[CellId], tolerance_threshold: f32) -> Self {
        let mut census = Census::default();
        let mut ratio_sum = 0.0f64;
        let mut ratio_count = 0usize;

        for cell in ids.iter().filter_map(|&id| cells.get(id)) {
            match cell.occupant_type() {
                OccupantType::Vacant => census.vacant += 1,
                OccupantType::Red => census.red += 1,
                OccupantType::Green => census.green += 1,
                OccupantType::Blue => census.blue += 1,
            }

            if cell.occupant_type().is_vacant() || cell.kind() == BuildingKind::School {
                continue;
            }
            if !is_satisfied(cell, cells, tolerance_threshold) {
                census.dissatisfied += 1;
            }
            if let Some(ratio) = NeighbourTally::of(cell, cells).same_ratio() {
                ratio_sum += ratio as f64;
                ratio_count += 1;
            }
        }

        if ratio_count > 0 {
            census.mean_same_ratio = Some((ratio_sum / ratio_count as f64) as f32);
        }
        census
    }

    pub fn total(&self) -> usize {
        self.vacant + self.red + self.green + self.blue
    }

    pub fn occupied(&self) -> usize {
        self.red + self.green + self.blue
    }

    pub fn count(&self, occupant: OccupantType) -> usize {
        match occupant {
            OccupantType::Vacant => self.vacant,
            OccupantType::Red => self.red,
            OccupantType::Green => self.green,
            OccupantType::Blue => self.blue,
        }
    }

    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        let ratio = self
            .mean_same_ratio
            .map(|r| format!("{:.1}%", r * 100.0))
            .unwrap_or_else(|| "n/a".into());
        format!(
            "vacant {} | red {} | green {} | blue {} | dissatisfied {} | same-type share {}",
            self.vacant, self.red, self.green, self.blue, self.dissatisfied, ratio
        )
    }
}
