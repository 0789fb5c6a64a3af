//! Proximity queries over cell centres
//!
//! The model only needs "which cells lie within radius R of this point".
//! [`BruteForceIndex`] answers that by scanning every entry, which is plenty
//! for city-sized layouts; [`SparseHashGrid`] buckets entries for larger ones.

pub mod brute_force;
pub mod sparse_hash;

pub use brute_force::BruteForceIndex;
pub use sparse_hash::SparseHashGrid;

use glam::Vec3;

use crate::core::types::CellId;

/// Bounding-radius query over tracked cell centres
pub trait SpatialIndex {
    /// Track a cell at the given centre, replacing any previous entry for it
    fn insert(&mut self, id: CellId, center: Vec3);

    /// Stop tracking a cell; unknown ids are ignored
    fn remove(&mut self, id: CellId);

    /// All tracked cells whose centre lies within `radius` of `center`,
    /// boundary included, sorted by id
    fn query_radius(&self, center: Vec3, radius: f32) -> Vec<CellId>;

    /// Drop every entry
    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
