//! R-tree over entity positions for radius queries.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use ut_core::{EntityId, Vec2F};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IndexEntry {
    pub id:    EntityId,
    pub point: [f32; 2],
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Snapshot index, rebuilt in bulk whenever positions change.
#[derive(Default)]
pub(crate) struct SpatialIndex {
    tree: RTree<IndexEntry>,
}

impl SpatialIndex {
    pub fn rebuild(&mut self, entries: impl Iterator<Item = (EntityId, Vec2F)>) {
        let entries: Vec<IndexEntry> = entries
            .map(|(id, p)| IndexEntry { id, point: [p.x, p.y] })
            .collect();
        self.tree = RTree::bulk_load(entries);
    }

    /// Ids within `radius` of `center`, unordered.
    pub fn within(&self, center: Vec2F, radius: f32) -> impl Iterator<Item = EntityId> + '_ {
        self.tree
            .locate_within_distance([center.x, center.y], radius * radius)
            .map(|e| e.id)
    }
}
