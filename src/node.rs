//! Filepath: src/node.rs
//!
//! Arena slots shared by both trees.
//!
//! A tree stores all of its nodes in one `Vec<Node>` and refers to them by
//! [`NodeId`]. The node kind set is closed, so it is a tagged variant rather
//! than a trait object: routing code matches on it directly.

use std::fmt as StdFmt;

use crate::container::PermutationContainer;
use crate::internode::InternalNode;

/// Index of a node in its tree's arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Placeholder for "not placed in any leaf yet".
    pub const DANGLING: Self = Self(u32::MAX);

    /// Wrap an arena index.
    ///
    /// # Panics
    /// Panics if `index` does not fit in `u32` (the arena is bounded by
    /// `u32::MAX - 1` nodes).
    #[must_use]
    #[inline(always)]
    pub fn new(index: usize) -> Self {
        let raw = u32::try_from(index).unwrap_or(u32::MAX);
        assert!(raw != u32::MAX, "node arena exhausted");
        Self(raw)
    }

    /// Arena index.
    #[must_use]
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` for [`NodeId::DANGLING`].
    #[must_use]
    #[inline(always)]
    pub const fn is_dangling(self) -> bool {
        self.0 == u32::MAX
    }
}

impl StdFmt::Debug for NodeId {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        if self.is_dangling() {
            write!(f, "n-")
        } else {
            write!(f, "n{}", self.0)
        }
    }
}

/// One arena slot.
#[derive(Debug, Clone, Default)]
pub enum Node {
    /// Routing node.
    Internal(InternalNode),

    /// Leaf container.
    Leaf(PermutationContainer),

    /// Free slot, listed in the tree's vacant list.
    #[default]
    Vacant,
}

impl Node {
    /// Returns `true` for a leaf container.
    #[must_use]
    #[inline(always)]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Returns `true` for a free slot.
    #[must_use]
    #[inline(always)]
    pub const fn is_vacant(&self) -> bool {
        matches!(self, Self::Vacant)
    }

    /// Parent of the node, `None` for the root (and for vacant slots).
    #[must_use]
    #[inline]
    pub const fn parent(&self) -> Option<NodeId> {
        match self {
            Self::Internal(node) => node.parent(),
            Self::Leaf(leaf) => leaf.parent(),
            Self::Vacant => None,
        }
    }

    /// Set the parent of a live node.
    ///
    /// # Panics
    /// Panics in debug mode on a vacant slot.
    #[inline]
    pub fn set_parent(&mut self, parent: Option<NodeId>) {
        match self {
            Self::Internal(node) => node.set_parent(parent),
            Self::Leaf(leaf) => leaf.set_parent(parent),
            Self::Vacant => debug_assert!(false, "set_parent on a vacant slot"),
        }
    }

    /// Number of items stored below this node.
    ///
    /// For internal nodes this is the sum of the cached child counts.
    #[must_use]
    #[inline]
    pub fn item_count(&self) -> usize {
        match self {
            Self::Internal(node) => node.total_count(),
            Self::Leaf(leaf) => leaf.len(),
            Self::Vacant => 0,
        }
    }

    /// Heap bytes owned by the node, not counting the slot itself.
    #[must_use]
    pub fn heap_bytes(&self) -> usize {
        match self {
            Self::Internal(node) => node.heap_bytes(),
            Self::Leaf(leaf) => leaf.heap_bytes(),
            Self::Vacant => 0,
        }
    }
}
