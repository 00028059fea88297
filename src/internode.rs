//! Filepath: src/internode.rs
//!
//! Internal routing node shared by the pi-tree and the inverse-pi-tree.
//!
//! An internal node holds an ordered run of child ids and, per child, the
//! number of items stored in that child's subtree. There are no routing keys:
//! descent is by rank, subtracting child counts until the target falls inside
//! one child.
//!
//! # Routing Model
//!
//! ```text
//!            [ 4 | 3 | 5 ]            <- counts (total 12)
//!           /     |     \
//!         C0     C1     C2            <- children
//!
//!   rank 0..4  -> C0, offset rank
//!   rank 4..7  -> C1, offset rank - 4
//!   rank 7..12 -> C2, offset rank - 7
//! ```
//!
//! The node does not know the degree bound; the owning tree checks occupancy
//! after every change and splits or rebalances.

use crate::node::NodeId;

// ============================================================================
//  InternalNode
// ============================================================================

/// A routing node: children in order plus cached subtree counts.
///
/// # Invariants
/// - `children.len() == counts.len()`
/// - `counts[i]` equals the number of items below `children[i]`
/// - every child sits at `height - 1` (leaves when `height == 0`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InternalNode {
    /// Parent node (`None` for root).
    parent: Option<NodeId>,

    /// Height above the leaf level (0 = children are leaves).
    height: u32,

    /// Child ids in order.
    children: Vec<NodeId>,

    /// Item count of each child's subtree.
    counts: Vec<usize>,
}

impl InternalNode {
    /// Create an empty node at the given height.
    ///
    /// # Arguments
    /// * `height` - Height above the leaf level (0 = children are leaves)
    #[must_use]
    pub const fn new(height: u32) -> Self {
        Self {
            parent: None,
            height,
            children: Vec::new(),
            counts: Vec::new(),
        }
    }

    /// Create an empty node with room for `capacity` children.
    #[must_use]
    pub fn with_capacity(height: u32, capacity: usize) -> Self {
        Self {
            parent: None,
            height,
            children: Vec::with_capacity(capacity),
            counts: Vec::with_capacity(capacity),
        }
    }

    // ========================================================================
    //  Accessors
    // ========================================================================

    /// Parent node, `None` for the root.
    #[must_use]
    #[inline(always)]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Set the parent node.
    #[inline(always)]
    pub const fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Height above the leaf level.
    #[must_use]
    #[inline(always)]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` if the children are leaf containers.
    #[must_use]
    #[inline(always)]
    pub const fn children_are_leaves(&self) -> bool {
        self.height == 0
    }

    /// Number of children.
    #[must_use]
    #[inline(always)]
    pub const fn degree(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if the node has no children.
    #[must_use]
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child id at `idx`.
    ///
    /// # Panics
    /// Panics if `idx >= degree`.
    #[must_use]
    #[inline(always)]
    pub fn child(&self, idx: usize) -> NodeId {
        self.children[idx]
    }

    /// Cached item count of the child at `idx`.
    ///
    /// # Panics
    /// Panics if `idx >= degree`.
    #[must_use]
    #[inline(always)]
    pub fn count(&self, idx: usize) -> usize {
        self.counts[idx]
    }

    /// Child ids in order.
    #[must_use]
    #[inline(always)]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Cached child counts in order.
    #[must_use]
    #[inline(always)]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Total number of items below this node.
    #[must_use]
    #[inline]
    pub fn total_count(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Sum of the counts of the children before `idx`.
    #[must_use]
    #[inline]
    pub fn count_before(&self, idx: usize) -> usize {
        self.counts[..idx].iter().sum()
    }

    /// Route a rank to a child.
    ///
    /// Returns `(child index, rank within child)`. A rank equal to the total
    /// count routes to the end of the last child, which is where an append
    /// lands.
    ///
    /// # Panics
    /// Panics in debug mode if the node is empty or `rank > total_count`.
    #[must_use]
    pub fn locate(&self, mut rank: usize) -> (usize, usize) {
        debug_assert!(!self.children.is_empty(), "locate: empty internal node");

        let last: usize = self.counts.len().saturating_sub(1);
        for (idx, &count) in self.counts.iter().enumerate() {
            if rank < count || idx == last {
                debug_assert!(rank <= count, "locate: rank past end of node");
                return (idx, rank);
            }
            rank -= count;
        }

        (0, rank)
    }

    /// Position of `child` among this node's children.
    #[must_use]
    #[inline]
    pub fn child_index_of(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    // ========================================================================
    //  Mutation
    // ========================================================================

    /// Insert a child with its subtree count at `idx`.
    ///
    /// # Panics
    /// Panics if `idx > degree`.
    #[inline]
    pub fn insert_child(&mut self, idx: usize, child: NodeId, count: usize) {
        self.children.insert(idx, child);
        self.counts.insert(idx, count);
    }

    /// Append a child with its subtree count.
    #[inline]
    pub fn push_child(&mut self, child: NodeId, count: usize) {
        self.children.push(child);
        self.counts.push(count);
    }

    /// Remove the child at `idx`, returning it with its count.
    ///
    /// # Panics
    /// Panics if `idx >= degree`.
    #[inline]
    pub fn remove_child(&mut self, idx: usize) -> (NodeId, usize) {
        (self.children.remove(idx), self.counts.remove(idx))
    }

    /// Replace the child id at `idx`, keeping its count.
    #[inline]
    pub fn set_child(&mut self, idx: usize, child: NodeId) {
        self.children[idx] = child;
    }

    /// Overwrite the cached count of the child at `idx`.
    #[inline]
    pub fn set_count(&mut self, idx: usize, count: usize) {
        self.counts[idx] = count;
    }

    /// Add `delta` to the cached count of the child at `idx`.
    #[inline(always)]
    pub fn add_count(&mut self, idx: usize, delta: usize) {
        self.counts[idx] += delta;
    }

    /// Subtract `delta` from the cached count of the child at `idx`.
    #[inline(always)]
    pub fn sub_count(&mut self, idx: usize, delta: usize) {
        debug_assert!(self.counts[idx] >= delta, "sub_count: count underflow");
        self.counts[idx] -= delta;
    }

    /// Move children `[at, degree)` into a new parentless node at the same
    /// height with room for `capacity` children.
    ///
    /// # Panics
    /// Panics if `at > degree`.
    #[must_use]
    pub fn split_off(&mut self, at: usize, capacity: usize) -> Self {
        let mut right = Self::with_capacity(self.height, capacity);
        right.children.extend(self.children.drain(at..));
        right.counts.extend(self.counts.drain(at..));
        right
    }

    /// Move every child of `other` to the end of `self`.
    pub fn append(&mut self, other: &mut Self) {
        debug_assert_eq!(self.height, other.height, "append: height mismatch");
        self.children.append(&mut other.children);
        self.counts.append(&mut other.counts);
    }

    /// Rewrite child ids through `remap` (indexed by old arena index).
    pub fn remap_children(&mut self, remap: &[NodeId]) {
        for child in &mut self.children {
            *child = remap[child.index()];
        }
    }

    /// Release unused capacity, keeping room for `capacity` children.
    pub fn shrink_to(&mut self, capacity: usize) {
        self.children.shrink_to(capacity);
        self.counts.shrink_to(capacity);
    }

    /// Heap bytes owned by the node.
    #[must_use]
    pub const fn heap_bytes(&self) -> usize {
        self.children.capacity() * size_of::<NodeId>()
            + self.counts.capacity() * size_of::<usize>()
    }

    // ========================================================================
    //  Invariant Checker
    // ========================================================================

    /// Verify local node invariants (debug builds only).
    ///
    /// # Panics
    /// If the child and count arrays disagree in length, or a child id is
    /// dangling or repeated.
    #[cfg(debug_assertions)]
    pub fn debug_assert_invariants(&self) {
        assert_eq!(
            self.children.len(),
            self.counts.len(),
            "children/counts length mismatch"
        );

        for (i, child) in self.children.iter().enumerate() {
            assert!(!child.is_dangling(), "dangling child at {i}");
            assert!(
                !self.children[i + 1..].contains(child),
                "child {child:?} appears twice"
            );
        }
    }

    /// No-op in release builds.
    #[cfg(not(debug_assertions))]
    #[inline]
    pub const fn debug_assert_invariants(&self) {}
}
