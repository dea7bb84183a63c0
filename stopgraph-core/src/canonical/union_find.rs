use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::StopId;

/// Disjoint-set forest over stop ids
///
/// Only merged ids are stored; any other id is its own root. Roots are
/// always the minimum id of their cluster, so the result does not depend
/// on the order in which pairs are merged.
#[derive(Debug, Clone, Default)]
pub struct StopUnionFind {
    parent: HashMap<StopId, StopId>,
}

impl StopUnionFind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical id of `id`, repointing every visited node straight at the root
    pub fn find(&mut self, id: StopId) -> StopId {
        let root = self.resolve(id);

        let mut current = id;
        while let Some(&next) = self.parent.get(&current) {
            if next == root {
                break;
            }
            self.parent.insert(current, root);
            current = next;
        }

        root
    }

    /// Canonical id of `id` without touching the forest
    pub fn resolve(&self, id: StopId) -> StopId {
        let mut current = id;
        while let Some(&next) = self.parent.get(&current) {
            current = next;
        }
        current
    }

    /// Merges the clusters of `a` and `b`; the larger root points at the smaller one.
    ///
    /// Returns `false` if both were already in the same cluster.
    pub fn union(&mut self, a: StopId, b: StopId) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }

        let (min_id, max_id) = if root_a < root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent.insert(max_id, min_id);
        true
    }

    /// Direct parent link of `id`, `None` for roots
    pub fn parent(&self, id: StopId) -> Option<StopId> {
        self.parent.get(&id).copied()
    }

    /// Number of ids that resolve to some other id
    pub fn merged_count(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Fully compressed `raw id -> canonical id` map of every merged id
    pub fn canonical_map(&mut self) -> BTreeMap<StopId, StopId> {
        let ids: Vec<StopId> = self.parent.keys().copied().collect();
        ids.into_iter().map(|id| (id, self.find(id))).collect()
    }

    /// Members of every non-trivial cluster, keyed by canonical id
    pub fn clusters(&mut self) -> BTreeMap<StopId, Vec<StopId>> {
        let mut clusters: BTreeMap<StopId, Vec<StopId>> = BTreeMap::new();
        for (id, root) in self.canonical_map() {
            clusters.entry(root).or_insert_with(|| vec![root]).push(id);
        }
        for members in clusters.values_mut() {
            members.sort_unstable();
        }
        clusters
    }
}
