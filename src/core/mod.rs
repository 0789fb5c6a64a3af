pub mod config;
pub mod error;
pub mod types;

pub use config::{RelocationPolicy, SeedingThresholds, SimulationConfig, WorldMapping};
pub use error::{Result, SegregationError};
pub use types::{BuildingKind, CellId, CellTag, OccupantType, Tick};
