//! Ordered registry of tracked folding regions.

use crate::{IntervalKey, TextEdit, TrackedRegion};
use crate::interval::RegionId;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Tracked regions sorted by `(offset, length)`.
///
/// The registry is the reconciler's memory of which intervals are currently
/// folded and which annotation renders each of them. Once a reconcile
/// finishes, its entries are pairwise non-overlapping.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    regions: BTreeMap<IntervalKey, RegionId>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, key: &IntervalKey) -> Option<TrackedRegion> {
        self.regions
            .get(key)
            .map(|&id| TrackedRegion::new(*key, id))
    }

    pub fn contains(&self, key: &IntervalKey) -> bool {
        self.regions.contains_key(key)
    }

    /// Iterates regions in key order.
    pub fn iter(&self) -> impl Iterator<Item = TrackedRegion> + '_ {
        self.regions
            .iter()
            .map(|(&key, &id)| TrackedRegion::new(key, id))
    }

    /// The greatest region strictly less than `key` whose end does not pass
    /// `key.offset`.
    pub fn predecessor(&self, key: &IntervalKey) -> Option<TrackedRegion> {
        self.regions
            .range(..*key)
            .rev()
            .find(|(k, _)| k.end() <= key.offset)
            .map(|(&k, &id)| TrackedRegion::new(k, id))
    }

    /// The least region greater than or equal to `key` that starts at or
    /// after `key.end()`.
    pub fn successor(&self, key: &IntervalKey) -> Option<TrackedRegion> {
        self.regions
            .range(*key..)
            .find(|(k, _)| k.offset >= key.end())
            .map(|(&k, &id)| TrackedRegion::new(k, id))
    }

    /// All regions strictly between two bounds, in key order.
    ///
    /// A missing bound leaves that side of the range open.
    pub fn sub_range_exclusive(
        &self,
        lo: Option<&TrackedRegion>,
        hi: Option<&TrackedRegion>,
    ) -> Vec<TrackedRegion> {
        let lower = lo.map_or(Bound::Unbounded, |r| Bound::Excluded(r.key));
        let upper = hi.map_or(Bound::Unbounded, |r| Bound::Excluded(r.key));
        if let (Bound::Excluded(l), Bound::Excluded(u)) = (lower, upper)
            && l >= u
        {
            return Vec::new();
        }

        self.regions
            .range((lower, upper))
            .map(|(&k, &id)| TrackedRegion::new(k, id))
            .collect()
    }

    /// Finds the region in `candidates` whose key equals `key`.
    ///
    /// `candidates` must be sorted by key, as returned by
    /// [`sub_range_exclusive`](Self::sub_range_exclusive).
    pub fn lookup_equal(candidates: &[TrackedRegion], key: &IntervalKey) -> Option<TrackedRegion> {
        candidates
            .binary_search_by(|region| region.key.cmp(key))
            .ok()
            .map(|index| candidates[index])
    }

    pub fn insert(&mut self, region: TrackedRegion) -> Option<RegionId> {
        self.regions.insert(region.key, region.id)
    }

    pub fn insert_all(&mut self, regions: impl IntoIterator<Item = TrackedRegion>) {
        self.regions
            .extend(regions.into_iter().map(|region| (region.key, region.id)));
    }

    pub fn remove_all<'a>(&mut self, regions: impl IntoIterator<Item = &'a TrackedRegion>) {
        for region in regions {
            self.regions.remove(&region.key);
        }
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Returns true if no two regions overlap.
    pub fn is_consistent(&self) -> bool {
        let mut previous: Option<IntervalKey> = None;
        for key in self.regions.keys() {
            if let Some(prev) = previous
                && prev.end() > key.offset
            {
                return false;
            }
            previous = Some(*key);
        }
        true
    }

    /// Moves regions along with a document edit.
    ///
    /// Regions that end before the edit keep their keys. Regions touched by
    /// or following the edit are re-keyed with [`TextEdit::map_range`]; any
    /// whose range collapses is dropped and returned.
    pub fn apply_edit(&mut self, edit: &TextEdit) -> Vec<TrackedRegion> {
        if edit.is_noop() {
            return Vec::new();
        }

        let mut affected = self.regions.split_off(&IntervalKey::new(edit.offset, 0));
        if let Some((&key, &id)) = self.regions.last_key_value()
            && key.end() > edit.offset
        {
            self.regions.remove(&key);
            affected.insert(key, id);
        }

        let mut dropped = Vec::new();
        for (key, id) in affected {
            match edit.map_range(key.range()) {
                Some(range) => {
                    self.regions.insert(IntervalKey::from_range(range), id);
                }
                None => dropped.push(TrackedRegion::new(key, id)),
            }
        }

        if !dropped.is_empty() {
            tracing::debug!(
                offset = edit.offset,
                dropped = dropped.len(),
                "edit collapsed tracked regions"
            );
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::RegionIdAllocator;
    use pretty_assertions::assert_eq;

    fn build_registry(keys: &[(usize, usize)]) -> (RegionRegistry, Vec<TrackedRegion>) {
        let mut ids = RegionIdAllocator::new();
        let regions: Vec<_> = keys
            .iter()
            .map(|&(offset, length)| {
                TrackedRegion::new(IntervalKey::new(offset, length), ids.mint())
            })
            .collect();
        let mut registry = RegionRegistry::new();
        registry.insert_all(regions.iter().copied());
        (registry, regions)
    }

    fn keys(regions: &[TrackedRegion]) -> Vec<(usize, usize)> {
        regions.iter().map(|r| (r.offset(), r.length())).collect()
    }

    #[test]
    fn test_iterates_in_key_order() {
        let (registry, _) = build_registry(&[(40, 5), (0, 10), (20, 8)]);
        let all: Vec<_> = registry.iter().collect();
        assert_eq!(keys(&all), vec![(0, 10), (20, 8), (40, 5)]);
    }

    #[test]
    fn test_predecessor_requires_end_before_offset() {
        let (registry, _) = build_registry(&[(0, 10), (20, 8), (40, 5)]);

        let left = registry.predecessor(&IntervalKey::new(25, 3)).unwrap();
        assert_eq!(left.key, IntervalKey::new(0, 10));

        let left = registry.predecessor(&IntervalKey::new(28, 3)).unwrap();
        assert_eq!(left.key, IntervalKey::new(20, 8));

        assert_eq!(registry.predecessor(&IntervalKey::new(5, 0)), None);
    }

    #[test]
    fn test_successor_requires_start_after_end() {
        let (registry, _) = build_registry(&[(0, 10), (20, 8), (40, 5)]);

        let right = registry.successor(&IntervalKey::new(22, 3)).unwrap();
        assert_eq!(right.key, IntervalKey::new(40, 5));

        let right = registry.successor(&IntervalKey::new(12, 8)).unwrap();
        assert_eq!(right.key, IntervalKey::new(20, 8));

        assert_eq!(registry.successor(&IntervalKey::new(41, 1)), None);
    }

    #[test]
    fn test_neighbours_of_empty_key_inside_region() {
        let (registry, _) = build_registry(&[(0, 10), (20, 8), (40, 5)]);
        let damaged = IntervalKey::new(23, 0);

        assert_eq!(
            registry.predecessor(&damaged).map(|r| r.key),
            Some(IntervalKey::new(0, 10))
        );
        assert_eq!(
            registry.successor(&damaged).map(|r| r.key),
            Some(IntervalKey::new(40, 5))
        );
    }

    #[test]
    fn test_sub_range_exclusive() {
        let (registry, regions) = build_registry(&[(0, 10), (20, 8), (30, 2), (40, 5)]);

        let between = registry.sub_range_exclusive(Some(&regions[0]), Some(&regions[3]));
        assert_eq!(keys(&between), vec![(20, 8), (30, 2)]);

        let head = registry.sub_range_exclusive(None, Some(&regions[2]));
        assert_eq!(keys(&head), vec![(0, 10), (20, 8)]);

        let tail = registry.sub_range_exclusive(Some(&regions[1]), None);
        assert_eq!(keys(&tail), vec![(30, 2), (40, 5)]);

        assert_eq!(registry.sub_range_exclusive(None, None).len(), 4);
        assert!(
            registry
                .sub_range_exclusive(Some(&regions[3]), Some(&regions[0]))
                .is_empty()
        );
    }

    #[test]
    fn test_lookup_equal_needs_exact_key() {
        let (_, regions) = build_registry(&[(0, 10), (20, 8), (40, 5)]);

        let found = RegionRegistry::lookup_equal(&regions, &IntervalKey::new(20, 8));
        assert_eq!(found, Some(regions[1]));
        assert_eq!(
            RegionRegistry::lookup_equal(&regions, &IntervalKey::new(20, 9)),
            None
        );
    }

    #[test]
    fn test_remove_all_then_insert_all() {
        let (mut registry, regions) = build_registry(&[(0, 10), (20, 8), (40, 5)]);
        registry.remove_all(&regions[1..]);
        assert_eq!(registry.len(), 1);

        registry.insert_all([regions[2]]);
        assert_eq!(registry.get(&IntervalKey::new(40, 5)), Some(regions[2]));
    }

    #[test]
    fn test_is_consistent() {
        let (touching, _) = build_registry(&[(0, 10), (10, 8)]);
        assert!(touching.is_consistent());

        let (overlapping, _) = build_registry(&[(0, 10), (9, 8)]);
        assert!(!overlapping.is_consistent());
    }

    #[test]
    fn test_apply_edit_shifts_following_regions() {
        let (mut registry, regions) = build_registry(&[(0, 10), (20, 8), (40, 5)]);

        let dropped = registry.apply_edit(&TextEdit::insert(15, 3));
        assert!(dropped.is_empty());

        let all: Vec<_> = registry.iter().collect();
        assert_eq!(keys(&all), vec![(0, 10), (23, 8), (43, 5)]);
        assert_eq!(all[1].id, regions[1].id);
    }

    #[test]
    fn test_apply_edit_grows_containing_region() {
        let (mut registry, _) = build_registry(&[(0, 10), (20, 8)]);

        registry.apply_edit(&TextEdit::insert(5, 2));

        let all: Vec<_> = registry.iter().collect();
        assert_eq!(keys(&all), vec![(0, 12), (22, 8)]);
    }

    #[test]
    fn test_apply_edit_drops_collapsed_regions() {
        let (mut registry, regions) = build_registry(&[(0, 10), (20, 8), (40, 5)]);

        let dropped = registry.apply_edit(&TextEdit::delete(18, 12));

        assert_eq!(dropped, vec![regions[1]]);
        let all: Vec<_> = registry.iter().collect();
        assert_eq!(keys(&all), vec![(0, 10), (28, 5)]);
        assert!(registry.is_consistent());
    }
}
