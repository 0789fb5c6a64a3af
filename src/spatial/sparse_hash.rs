//! Sparse hash grid for efficient spatial queries

use ahash::AHashMap;
use glam::Vec3;

use super::SpatialIndex;
use crate::core::types::CellId;

type Bucket = (i32, i32, i32);

/// Buckets cell centres into cubes of `bucket_size` so radius queries only
/// visit nearby buckets
#[derive(Debug, Clone)]
pub struct SparseHashGrid {
    bucket_size: f32,
    buckets: AHashMap<Bucket, Vec<(CellId, Vec3)>>,
    locations: AHashMap<CellId, Bucket>,
}

impl SparseHashGrid {
    /// Create a grid; a bucket size near the query radius works best
    pub fn new(bucket_size: f32) -> Self {
        Self {
            bucket_size: bucket_size.max(f32::EPSILON),
            buckets: AHashMap::new(),
            locations: AHashMap::new(),
        }
    }

    #[inline]
    fn bucket_of(&self, pos: Vec3) -> Bucket {
        (
            (pos.x / self.bucket_size).floor() as i32,
            (pos.y / self.bucket_size).floor() as i32,
            (pos.z / self.bucket_size).floor() as i32,
        )
    }
}

impl SpatialIndex for SparseHashGrid {
    fn insert(&mut self, id: CellId, center: Vec3) {
        self.remove(id);
        let bucket = self.bucket_of(center);
        self.buckets.entry(bucket).or_default().push((id, center));
        self.locations.insert(id, bucket);
    }

    fn remove(&mut self, id: CellId) {
        let Some(bucket) = self.locations.remove(&id) else {
            return;
        };
        if let Some(entries) = self.buckets.get_mut(&bucket) {
            entries.retain(|(e, _)| *e != id);
            if entries.is_empty() {
                self.buckets.remove(&bucket);
            }
        }
    }

    fn query_radius(&self, center: Vec3, radius: f32) -> Vec<CellId> {
        let radius_sq = radius * radius;
        let reach = (radius / self.bucket_size).ceil() as i32;
        let (cx, cy, cz) = self.bucket_of(center);

        let mut found = Vec::new();
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                for dz in -reach..=reach {
                    let Some(entries) = self.buckets.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    found.extend(
                        entries
                            .iter()
                            .filter(|(_, pos)| pos.distance_squared(center) <= radius_sq)
                            .map(|(id, _)| *id),
                    );
                }
            }
        }
        found.sort_unstable();
        found
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.locations.clear();
    }

    fn len(&self) -> usize {
        self.locations.len()
    }
}
