//! Simulation layer - satisfaction, relocation, and per-tick orchestration

pub mod engine;
pub mod report;
pub mod satisfaction;

pub use engine::SegregationEngine;
pub use report::{Census, StepOutcome, TickReport};
pub use satisfaction::{is_satisfied, NeighbourTally};
