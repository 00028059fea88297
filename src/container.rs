//! Filepath: src/container.rs
//!
//! Leaf container: a short ordered run of [`PermutationItem`]s.
//!
//! The container is the unit of storage and of local rebalancing. It knows
//! nothing about occupancy bounds; the owning tree decides when to split,
//! borrow or merge, and is responsible for rewriting the link table whenever
//! an item moves to a different container.

use crate::item::{ItemId, PermutationItem};
use crate::node::NodeId;

/// Ordered sequence of items held at a tree leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermutationContainer {
    parent: Option<NodeId>,
    items: Vec<PermutationItem>,
}

impl PermutationContainer {
    /// Create an empty, parentless container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            parent: None,
            items: Vec::new(),
        }
    }

    /// Create an empty container able to hold `capacity` items without
    /// reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            parent: None,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Create a container from an ordered run of items.
    #[must_use]
    pub const fn from_items(items: Vec<PermutationItem>) -> Self {
        Self {
            parent: None,
            items,
        }
    }

    // ========================================================================
    //  Accessors
    // ========================================================================

    /// Parent internal node, `None` if this leaf is the root.
    #[must_use]
    #[inline(always)]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Set the parent internal node.
    #[inline(always)]
    pub const fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Number of items.
    #[must_use]
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the container holds no items.
    #[must_use]
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `pos`, if any.
    #[must_use]
    #[inline(always)]
    pub fn get(&self, pos: usize) -> Option<PermutationItem> {
        self.items.get(pos).copied()
    }

    /// Items in order.
    #[must_use]
    #[inline(always)]
    pub fn as_slice(&self) -> &[PermutationItem] {
        &self.items
    }

    /// Iterate over items in order.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, PermutationItem>> {
        self.items.iter().copied()
    }

    /// Position of the item linked to `id`.
    ///
    /// Linear scan; a container never holds more than `MAX_DEGREE` items.
    #[must_use]
    #[inline]
    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.link == id)
    }

    // ========================================================================
    //  Mutation
    // ========================================================================

    /// Insert `item` at `pos`, shifting later items right.
    ///
    /// # Panics
    /// Panics if `pos > len`.
    #[inline]
    pub fn insert(&mut self, pos: usize, item: PermutationItem) {
        self.items.insert(pos, item);
    }

    /// Remove and return the item at `pos`.
    ///
    /// # Panics
    /// Panics if `pos >= len`.
    #[inline]
    pub fn remove(&mut self, pos: usize) -> PermutationItem {
        self.items.remove(pos)
    }

    /// Overwrite the item at `pos`.
    ///
    /// # Panics
    /// Panics if `pos >= len`.
    #[inline]
    pub fn set(&mut self, pos: usize, item: PermutationItem) {
        self.items[pos] = item;
    }

    /// Append one item.
    #[inline]
    pub fn push_back(&mut self, item: PermutationItem) {
        self.items.push(item);
    }

    /// Prepend one item.
    #[inline]
    pub fn push_front(&mut self, item: PermutationItem) {
        self.items.insert(0, item);
    }

    /// Remove the last item.
    #[inline]
    pub fn pop_back(&mut self) -> Option<PermutationItem> {
        self.items.pop()
    }

    /// Remove the first item.
    #[inline]
    pub fn pop_front(&mut self) -> Option<PermutationItem> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    /// Move items `[at, len)` into a new parentless container with room for
    /// `capacity` items.
    ///
    /// # Panics
    /// Panics if `at > len`.
    #[must_use]
    pub fn split_off(&mut self, at: usize, capacity: usize) -> Self {
        let mut items = Vec::with_capacity(capacity.max(self.items.len() - at));
        items.extend(self.items.drain(at..));
        Self::from_items(items)
    }

    /// Move every item of `other` to the end of `self`.
    pub fn append(&mut self, other: &mut Self) {
        self.items.append(&mut other.items);
    }

    /// Drop every item (the parent link is kept).
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Rewrite every item's link through `remap` (indexed by old slot index).
    pub fn remap_links(&mut self, remap: &[ItemId]) {
        for item in &mut self.items {
            item.link = remap[item.link.index()];
        }
    }

    /// Release unused capacity, keeping room for `capacity` items.
    pub fn shrink_to(&mut self, capacity: usize) {
        self.items.shrink_to(capacity);
    }

    /// Heap bytes owned by the container.
    #[must_use]
    pub const fn heap_bytes(&self) -> usize {
        self.items.capacity() * size_of::<PermutationItem>()
    }

    /// Bytes of allocated but unused item capacity.
    #[must_use]
    pub const fn unused_bytes(&self) -> usize {
        (self.items.capacity() - self.items.len()) * size_of::<PermutationItem>()
    }

    // ========================================================================
    //  Invariant Checker
    // ========================================================================

    /// Verify that no link appears twice (debug builds only).
    ///
    /// # Panics
    /// If two items share a link.
    #[cfg(debug_assertions)]
    pub fn debug_assert_invariants(&self) {
        for (i, a) in self.items.iter().enumerate() {
            for b in &self.items[i + 1..] {
                assert!(a.link != b.link, "duplicate item {:?} in leaf", a.link);
            }
        }
    }

    /// No-op in release builds.
    #[cfg(not(debug_assertions))]
    #[inline]
    pub const fn debug_assert_invariants(&self) {}
}

impl<'a> IntoIterator for &'a PermutationContainer {
    type Item = PermutationItem;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, PermutationItem>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
