//! Insertion-ordered buckets keyed by category.
//!
//! Iteration follows the order in which keys were first pushed, so "arbitrary
//! but stable" category orders are reproducible for identical input.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

/// A multimap that remembers the first-seen order of its keys.
#[derive(Debug, Clone)]
pub struct OrderedBuckets<K, V> {
    order: Vec<K>,
    buckets: HashMap<K, Vec<V>>,
}

impl<K, V> Default for OrderedBuckets<K, V> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            buckets: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash, V> OrderedBuckets<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the bucket for `key`, creating it at the end if new.
    pub fn push(&mut self, key: K, value: V) {
        match self.buckets.entry(key) {
            Entry::Occupied(entry) => entry.into_mut().push(value),
            Entry::Vacant(entry) => {
                self.order.push(key);
                entry.insert(vec![value]);
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.buckets.contains_key(key)
    }

    /// Number of non-empty buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.order.iter().copied()
    }

    /// Buckets in first-seen key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &[V])> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.buckets.get(key).map(|bucket| (*key, bucket.as_slice())))
    }

    /// Stable-sort every bucket with `compare`.
    pub fn sort_each_by(&mut self, mut compare: impl FnMut(&V, &V) -> Ordering) {
        for bucket in self.buckets.values_mut() {
            bucket.sort_by(&mut compare);
        }
    }

    /// Keep at most `cap` values per bucket.
    pub fn truncate_each(&mut self, cap: usize) {
        for bucket in self.buckets.values_mut() {
            bucket.truncate(cap);
        }
    }
}
