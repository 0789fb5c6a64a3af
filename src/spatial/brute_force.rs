//! Linear-scan spatial index

use ahash::AHashMap;
use glam::Vec3;

use super::SpatialIndex;
use crate::core::types::CellId;

/// Checks every tracked centre on each query
#[derive(Debug, Clone, Default)]
pub struct BruteForceIndex {
    centers: AHashMap<CellId, Vec3>,
}

impl BruteForceIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialIndex for BruteForceIndex {
    fn insert(&mut self, id: CellId, center: Vec3) {
        self.centers.insert(id, center);
    }

    fn remove(&mut self, id: CellId) {
        self.centers.remove(&id);
    }

    fn query_radius(&self, center: Vec3, radius: f32) -> Vec<CellId> {
        let radius_sq = radius * radius;
        let mut found: Vec<CellId> = self
            .centers
            .iter()
            .filter(|(_, pos)| pos.distance_squared(center) <= radius_sq)
            .map(|(id, _)| *id)
            .collect();
        found.sort_unstable();
        found
    }

    fn clear(&mut self) {
        self.centers.clear();
    }

    fn len(&self) -> usize {
        self.centers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_includes_boundary() {
        let mut index = BruteForceIndex::new();
        index.insert(CellId::new(0, 0), Vec3::ZERO);
        index.insert(CellId::new(1, 0), Vec3::new(2.0, 0.0, 0.0));
        index.insert(CellId::new(2, 0), Vec3::new(2.01, 0.0, 0.0));

        let found = index.query_radius(Vec3::ZERO, 2.0);
        assert_eq!(found, vec![CellId::new(0, 0), CellId::new(1, 0)]);
    }

    #[test]
    fn test_remove_and_reinsert() {
        let mut index = BruteForceIndex::new();
        let id = CellId::new(4, 1);
        index.insert(id, Vec3::ZERO);
        index.remove(id);
        assert!(index.query_radius(Vec3::ZERO, 1.0).is_empty());
        index.remove(id);
        index.insert(id, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(index.query_radius(Vec3::ZERO, 1.0), vec![id]);
        assert_eq!(index.len(), 1);
    }
}
