//! Color definitions for occupant types and the observer hook renderers implement

use ahash::AHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{CellId, OccupantType};

/// RGBA color (0.0 to 1.0 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::new(1.0, 0.0, 1.0, 1.0);
    pub const CYAN: Color = Color::new(0.0, 1.0, 1.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
}

/// Display color for an occupant type
pub fn occupant_color(occupant: OccupantType) -> Color {
    match occupant {
        OccupantType::Vacant => Color::WHITE,
        OccupantType::Red => Color::MAGENTA,
        OccupantType::Blue => Color::CYAN,
        OccupantType::Green => Color::GREEN,
    }
}

/// Draw order of a school marker; higher draws on top
pub fn marker_sort_order(occupant: OccupantType) -> i32 {
    match occupant {
        OccupantType::Vacant => 0,
        OccupantType::Red => 1,
        OccupantType::Blue => 2,
        OccupantType::Green => 3,
    }
}

/// Receives visual side effects from the engine
///
/// All methods default to doing nothing so implementors only override
/// what they draw.
pub trait CellObserver {
    /// A cell's occupant was (re)assigned
    fn occupant_changed(&mut self, _id: CellId, _occupant: OccupantType, _color: Color) {}

    /// A school marker was placed for a detection
    fn marker_placed(&mut self, _id: CellId, _position: Vec3, _occupant: OccupantType, _sort_order: i32) {}

    /// A transient cell and its marker were discarded
    fn cell_retired(&mut self, _id: CellId) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CellObserver for NoopObserver {}

/// Keeps the latest color of every live cell
///
/// Useful as a render-side mirror of the model and in tests.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    colors: AHashMap<CellId, Color>,
    updates: u64,
}

impl ColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&self, id: CellId) -> Option<Color> {
        self.colors.get(&id).copied()
    }

    /// Total number of color assignments received
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl CellObserver for ColorTable {
    fn occupant_changed(&mut self, id: CellId, _occupant: OccupantType, color: Color) {
        self.colors.insert(id, color);
        self.updates += 1;
    }

    fn cell_retired(&mut self, id: CellId) {
        self.colors.remove(&id);
    }
}
