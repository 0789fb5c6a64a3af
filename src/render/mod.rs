//! Visual side effects of the model
//!
//! The engine never draws. It reports occupant changes and marker lifecycle
//! to a [`CellObserver`] that a renderer implements.

pub mod colors;

pub use colors::{marker_sort_order, occupant_color, CellObserver, Color, ColorTable, NoopObserver};
