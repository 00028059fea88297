//! Insertion and split propagation.
//!
//! An insert descends once, bumping the cached count of every child it
//! passes through, then places the item in its leaf. If the leaf now holds
//! `MAX_DEGREE + 1` items it is split in two and the new right sibling is
//! inserted into the parent next to the old node. That can overflow the
//! parent, so the step repeats upward; when the root itself splits, a new
//! root is created above it and the tree grows by exactly one level.
//!
//! ```text
//!   before:        [ 4 | 5 ]                 after leaf split:   [ 4 | 3 | 3 ]
//!                 /       \                                     /    |    \
//!           [....]    [.....+]   (6 items, D = 5)         [....] [...]  [...]
//! ```
//!
//! Counts above the split point are already correct: they were bumped on the
//! way down and a split only redistributes items below them.

use crate::container::PermutationContainer;
use crate::internode::InternalNode;
use crate::item::PermutationItem;
use crate::link::LinkTable;
use crate::node::{Node, NodeId};
use crate::tracing_helpers::{debug_log, trace_log};

use super::{BpTree, DescentPath};

impl<const MAX_DEGREE: usize> BpTree<MAX_DEGREE> {
    /// Insert `item` so that it ends up at in-order rank `index`.
    ///
    /// Records the item's new leaf in `links`, including every move caused
    /// by splits.
    ///
    /// # Panics
    /// Panics in debug mode if `index > len`.
    pub fn insert(&mut self, index: usize, item: PermutationItem, links: &mut LinkTable) {
        debug_assert!(index <= self.len, "insert: index {index} > len {}", self.len);

        let mut path: DescentPath = Vec::with_capacity(self.height);
        let (leaf_id, offset) = self.descend_adjusting(index, true, &mut path);

        let leaf: &mut PermutationContainer = self.leaf_mut(leaf_id);
        leaf.insert(offset, item);
        let overflow: bool = leaf.len() > MAX_DEGREE;

        links.set_leaf(self.side, item.link, leaf_id);
        self.len += 1;
        self.counters.inserts += 1;

        trace_log!(
            side = self.side.name(),
            index,
            leaf = ?leaf_id,
            "insert"
        );

        if overflow {
            self.split_leaf(leaf_id, &mut path, links);
        }
    }

    /// Split an overflowing leaf and propagate the new sibling upward.
    fn split_leaf(&mut self, leaf_id: NodeId, path: &mut DescentPath, links: &mut LinkTable) {
        let leaf: &mut PermutationContainer = self.leaf_mut(leaf_id);
        let keep: usize = leaf.len().div_ceil(2);
        let right: PermutationContainer = leaf.split_off(keep, MAX_DEGREE + 1);
        let right_count: usize = right.len();

        let right_id: NodeId = self.alloc(Node::Leaf(right));
        for moved in self.leaf_ref(right_id).iter() {
            links.set_leaf(self.side, moved.link, right_id);
        }
        self.counters.splits += 1;

        trace_log!(
            side = self.side.name(),
            left = ?leaf_id,
            right = ?right_id,
            left_count = keep,
            right_count,
            "leaf split"
        );

        self.propagate_split(leaf_id, right_id, keep, right_count, path);
    }

    /// Hook `right` into the tree as the sibling after `left`, splitting
    /// ancestors as long as they overflow.
    fn propagate_split(
        &mut self,
        mut left: NodeId,
        mut right: NodeId,
        mut left_count: usize,
        mut right_count: usize,
        path: &mut DescentPath,
    ) {
        loop {
            let Some((parent_id, idx)) = path.pop() else {
                self.create_root(left, right, left_count, right_count);
                return;
            };

            self.set_parent(right, Some(parent_id));
            let parent: &mut InternalNode = self.internal_mut(parent_id);
            parent.set_count(idx, left_count);
            parent.insert_child(idx + 1, right, right_count);

            if parent.degree() <= MAX_DEGREE {
                return;
            }

            let keep: usize = parent.degree().div_ceil(2);
            let sibling: InternalNode = parent.split_off(keep, MAX_DEGREE + 1);
            let parent_total: usize = parent.total_count();
            let sibling_total: usize = sibling.total_count();
            let sibling_degree: usize = sibling.degree();

            let sibling_id: NodeId = self.alloc(Node::Internal(sibling));
            for i in 0..sibling_degree {
                let child: NodeId = self.internal_ref(sibling_id).child(i);
                self.set_parent(child, Some(sibling_id));
            }
            self.counters.splits += 1;

            trace_log!(
                side = self.side.name(),
                left = ?parent_id,
                right = ?sibling_id,
                left_degree = keep,
                right_degree = sibling_degree,
                "internal split"
            );

            left = parent_id;
            right = sibling_id;
            left_count = parent_total;
            right_count = sibling_total;
        }
    }

    /// Grow the tree by one level: a new root with `left` and `right` as its
    /// only children.
    fn create_root(&mut self, left: NodeId, right: NodeId, left_count: usize, right_count: usize) {
        debug_assert_eq!(left, self.root, "create_root: left is not the root");

        let height: u32 = match &self.nodes[left.index()] {
            Node::Internal(node) => node.height() + 1,
            _ => 0,
        };

        let mut root = InternalNode::with_capacity(height, MAX_DEGREE + 1);
        root.push_child(left, left_count);
        root.push_child(right, right_count);

        let root_id: NodeId = self.alloc(Node::Internal(root));
        self.set_parent(left, Some(root_id));
        self.set_parent(right, Some(root_id));
        self.root = root_id;
        self.height += 1;

        debug_log!(
            side = self.side.name(),
            root = ?root_id,
            height = self.height,
            "root created"
        );
    }
}
