//! Ordered `u64`-keyed index used throughout the layout engine: children
//! indices, `tiles_by_id`, per-screen/workspace "current" pointers.
//!
//! The C sources this crate is grounded on (`tree.h`/`tree.c` in the
//! original `fion` window manager) expose a resumable cursor API
//! (`tree_iter`/`tree_iterfrom`) because C has no iterator protocol. In
//! Rust the same traversal is just a `BTreeMap` range turned into a
//! standard iterator; callers drive it with `.next()` instead of
//! threading an opaque cursor token through.

use std::collections::BTreeMap;
use std::fmt::Debug;

/// Ordered `K -> V` mapping with the "x" (fatal-on-violation) family of
/// accessors the spec's component design calls for.
#[derive(Debug, Clone)]
pub struct TreeIndex<K, V> {
    map: BTreeMap<K, V>,
}

impl<K, V> Default for TreeIndex<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        TreeIndex { map: BTreeMap::new() }
    }
}

impl<K, V> TreeIndex<K, V>
where
    K: Ord + Copy + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.map.get(&key)
    }

    /// Fatal-on-absent lookup. A caller reaching for `xget` is asserting
    /// that `key` cannot be missing; if it is, that is an
    /// `InvariantViolation` and we abort with a diagnostic rather than
    /// silently propagate `None`.
    pub fn xget(&self, key: K) -> &V {
        self.map
            .get(&key)
            .unwrap_or_else(|| panic!("invariant violation: key {:?} absent from tree index", key))
    }

    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    /// Insert, forbidding overwrite of an existing key.
    pub fn xset(&mut self, key: K, value: V) {
        if self.map.insert(key, value).is_some() {
            panic!("invariant violation: key {:?} already present in tree index", key);
        }
    }

    pub fn pop(&mut self, key: K) -> Option<V> {
        self.map.remove(&key)
    }

    pub fn xpop(&mut self, key: K) -> V {
        self.map
            .remove(&key)
            .unwrap_or_else(|| panic!("invariant violation: key {:?} absent on pop", key))
    }

    /// First element in key order, non-destructive.
    pub fn root(&self) -> Option<(K, &V)> {
        self.map.iter().next().map(|(k, v)| (*k, v))
    }

    pub fn count(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: K) -> bool {
        self.map.contains_key(&key)
    }

    /// In-order traversal from the head.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.map.iter().map(|(k, v)| (*k, v))
    }

    /// In-order traversal starting at the least key >= `start`.
    pub fn iter_from(&self, start: K) -> impl Iterator<Item = (K, &V)> {
        self.map.range(start..).map(|(k, v)| (*k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.map.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xget_panics_on_absent_key() {
        let idx: TreeIndex<u64, &str> = TreeIndex::new();
        let result = std::panic::catch_unwind(|| idx.xget(7));
        assert!(result.is_err());
    }

    #[test]
    fn xset_panics_on_overwrite() {
        let mut idx: TreeIndex<u64, &str> = TreeIndex::new();
        idx.xset(1, "a");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut idx = idx;
            idx.xset(1, "b");
        }));
        assert!(result.is_err());
    }

    #[test]
    fn iter_from_wraps_via_chain() {
        let mut idx: TreeIndex<u64, u64> = TreeIndex::new();
        idx.xset(1, 10);
        idx.xset(3, 30);
        idx.xset(5, 50);

        // simulate "cycle next, wrapping" the way the engine does it:
        // iter_from(current + 1), falling back to iter() on exhaustion.
        let current = 5u64;
        let next = idx
            .iter_from(current + 1)
            .next()
            .or_else(|| idx.iter().next())
            .map(|(k, _)| k);
        assert_eq!(next, Some(1));
    }

    #[test]
    fn root_is_first_in_key_order() {
        let mut idx: TreeIndex<u64, &str> = TreeIndex::new();
        idx.xset(9, "nine");
        idx.xset(2, "two");
        idx.xset(5, "five");
        assert_eq!(idx.root(), Some((2, &"two")));
    }
}
