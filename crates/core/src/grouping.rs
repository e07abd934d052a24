//! Insertion-ordered grouping.
//!
//! Every fold-by-key in the engine (investments by name, spending by
//! category, history by year) must report groups in the order their key was
//! first seen, and must distinguish "first entry of a group" from "later
//! entry". `OrderedGroups` makes both explicit.

use std::collections::HashMap;
use std::hash::Hash;

/// Groups values by key, remembering first-seen key order.
#[derive(Debug, Clone)]
pub struct OrderedGroups<K, V> {
    index: HashMap<K, usize>,
    groups: Vec<(K, V)>,
}

impl<K, V> OrderedGroups<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty grouping.
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Folds one item into the group for `key`.
    ///
    /// `seed` builds the group when `key` is new; `merge` updates it otherwise.
    /// Exactly one of the two runs.
    pub fn fold(&mut self, key: K, seed: impl FnOnce() -> V, merge: impl FnOnce(&mut V)) {
        if let Some(&position) = self.index.get(&key) {
            merge(&mut self.groups[position].1);
        } else {
            self.index.insert(key.clone(), self.groups.len());
            self.groups.push((key, seed()));
        }
    }

    /// Returns the group for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&position| &self.groups[position].1)
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if nothing has been folded in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Consumes the grouping, yielding `(key, group)` in first-seen order.
    pub fn into_groups(self) -> impl Iterator<Item = (K, V)> {
        self.groups.into_iter()
    }
}

impl<K, V> Default for OrderedGroups<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
