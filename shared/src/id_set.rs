//! Id sets for many-to-many grants
//!
//! Role→menu, role→api and role→button grants are sets of ids. [`IdSet`]
//! keeps them de-duplicated and ordered so that set algebra and iteration
//! are deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ordered, de-duplicated set of entity ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdSet(BTreeSet<i64>);

impl IdSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Insert an id, returning `true` if it was not present
    pub fn insert(&mut self, id: i64) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: i64) -> bool {
        self.0.remove(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    pub fn union(&self, other: &IdSet) -> IdSet {
        Self(self.0.union(&other.0).copied().collect())
    }

    pub fn intersection(&self, other: &IdSet) -> IdSet {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    /// Ids in `self` that are not in `other`
    pub fn difference(&self, other: &IdSet) -> IdSet {
        Self(self.0.difference(&other.0).copied().collect())
    }

    /// In-place union
    pub fn extend_from(&mut self, other: &IdSet) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn to_vec(&self) -> Vec<i64> {
        self.0.iter().copied().collect()
    }
}

impl FromIterator<i64> for IdSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<i64> for IdSet {
    fn extend<I: IntoIterator<Item = i64>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl From<Vec<i64>> for IdSet {
    fn from(ids: Vec<i64>) -> Self {
        ids.into_iter().collect()
    }
}

impl IntoIterator for IdSet {
    type Item = i64;
    type IntoIter = std::collections::btree_set::IntoIter<i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
