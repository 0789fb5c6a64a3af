//! Static world description

pub mod layout;

pub use layout::{Layout, Plot, PlotBounds};
