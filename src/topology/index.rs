// Copyright (c) 2025 - Cowboy AI, Inc.
//! Parent → children adjacency index
//!
//! Each relation the engine walks (location tree, rack group tree, racks per
//! group, devices per rack, ...) is kept as an [`Adjacency`] so cascades and
//! protect checks never scan whole tables.

use std::collections::{BTreeMap, BTreeSet};

/// One-to-many index from a parent key to the children that reference it
#[derive(Debug, Clone)]
pub struct Adjacency<P, C> {
    children: BTreeMap<P, BTreeSet<C>>,
}

impl<P: Ord + Copy, C: Ord + Copy> Adjacency<P, C> {
    pub fn new() -> Self {
        Self {
            children: BTreeMap::new(),
        }
    }

    pub fn link(&mut self, parent: P, child: C) {
        self.children.entry(parent).or_default().insert(child);
    }

    pub fn unlink(&mut self, parent: P, child: C) {
        if let Some(set) = self.children.get_mut(&parent) {
            set.remove(&child);
            if set.is_empty() {
                self.children.remove(&parent);
            }
        }
    }

    /// Move `child` from `old` to `new`; either side may be absent
    pub fn relink(&mut self, old: Option<P>, new: Option<P>, child: C) {
        if old == new {
            return;
        }
        if let Some(old) = old {
            self.unlink(old, child);
        }
        if let Some(new) = new {
            self.link(new, child);
        }
    }

    /// Children of `parent` in key order
    pub fn children(&self, parent: P) -> impl Iterator<Item = C> + '_ {
        self.children
            .get(&parent)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn count(&self, parent: P) -> usize {
        self.children.get(&parent).map_or(0, BTreeSet::len)
    }

    pub fn has_children(&self, parent: P) -> bool {
        self.children.contains_key(&parent)
    }
}

impl<P: Ord + Copy, C: Ord + Copy> Default for Adjacency<P, C> {
    fn default() -> Self {
        Self::new()
    }
}
