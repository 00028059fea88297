//! Removal, underflow repair and root collapse.
//!
//! A removal descends once, decrementing every count it passes through, and
//! takes the item out of its leaf. If the leaf drops below `MIN_OCCUPANCY`
//! it is repaired against an adjacent sibling under the same parent:
//!
//! 1. borrow one entry from the left sibling if it has more than the minimum
//! 2. else borrow one entry from the right sibling if it has more than the
//!    minimum
//! 3. else merge with a sibling (the left one absorbs the right one)
//!
//! A merge removes a child from the parent, which may underflow in turn, so
//! the repair repeats upward. When the root is an internal node left with a
//! single child, that child becomes the root and the tree shrinks by exactly
//! one level.

use crate::container::PermutationContainer;
use crate::internode::InternalNode;
use crate::item::PermutationItem;
use crate::link::LinkTable;
use crate::node::{Node, NodeId};
use crate::tracing_helpers::{debug_log, trace_log};

use super::{BpTree, DescentPath};

impl<const MAX_DEGREE: usize> BpTree<MAX_DEGREE> {
    /// Remove and return the item at in-order rank `index`.
    ///
    /// The removed item's link slot is left alone; the caller either
    /// releases it or re-inserts the item. Items moved between leaves by
    /// the repair have their link slots rewritten.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize, links: &mut LinkTable) -> PermutationItem {
        assert!(index < self.len, "erase: index {index} >= len {}", self.len);

        let mut path: DescentPath = Vec::with_capacity(self.height);
        let (leaf_id, offset) = self.descend_adjusting(index, false, &mut path);

        let leaf: &mut PermutationContainer = self.leaf_mut(leaf_id);
        let item: PermutationItem = leaf.remove(offset);
        let underflow: bool = leaf.len() < Self::MIN_OCCUPANCY;

        self.len -= 1;
        self.counters.removals += 1;

        trace_log!(
            side = self.side.name(),
            index,
            leaf = ?leaf_id,
            "erase"
        );

        if underflow && !path.is_empty() {
            self.repair_underflow(leaf_id, &mut path, links);
        }
        item
    }

    /// Erase the item at `from` and re-insert it at `to`, keeping its link.
    ///
    /// `to` is a rank in the tree after the removal, so it must be `< len`.
    pub fn move_item(&mut self, from: usize, to: usize, links: &mut LinkTable) -> PermutationItem {
        let item: PermutationItem = self.erase(from, links);
        self.insert(to, item, links);
        item
    }

    /// Restore minimum occupancy from `node` upward along `path`.
    fn repair_underflow(&mut self, node: NodeId, path: &mut DescentPath, links: &mut LinkTable) {
        let mut id: NodeId = node;

        while let Some((parent_id, idx)) = path.pop() {
            if self.occupancy(id) >= Self::MIN_OCCUPANCY {
                break;
            }

            let parent: &InternalNode = self.internal_ref(parent_id);
            let degree: usize = parent.degree();
            let left: Option<NodeId> = (idx > 0).then(|| parent.child(idx - 1));
            let right: Option<NodeId> = (idx + 1 < degree).then(|| parent.child(idx + 1));

            if left.is_some_and(|l| self.occupancy(l) > Self::MIN_OCCUPANCY) {
                self.borrow_from_left(parent_id, idx, links);
                break;
            }
            if right.is_some_and(|r| self.occupancy(r) > Self::MIN_OCCUPANCY) {
                self.borrow_from_right(parent_id, idx, links);
                break;
            }

            if left.is_some() {
                self.merge_children(parent_id, idx - 1, links);
            } else if right.is_some() {
                self.merge_children(parent_id, idx, links);
            } else {
                debug_assert!(false, "non-root node {id:?} has no sibling");
                break;
            }

            id = parent_id;
        }

        self.collapse_root();
    }

    /// Move the last entry of child `idx - 1` to the front of child `idx`.
    fn borrow_from_left(&mut self, parent_id: NodeId, idx: usize, links: &mut LinkTable) {
        let parent: &InternalNode = self.internal_ref(parent_id);
        let donor: NodeId = parent.child(idx - 1);
        let target: NodeId = parent.child(idx);

        let moved: usize = if self.nodes[target.index()].is_leaf() {
            let Some(item) = self.leaf_mut(donor).pop_back() else {
                unreachable!("borrow from empty leaf {donor:?}");
            };
            self.leaf_mut(target).push_front(item);
            links.set_leaf(self.side, item.link, target);
            1
        } else {
            let last: usize = self.internal_ref(donor).degree() - 1;
            let (child, count) = self.internal_mut(donor).remove_child(last);
            self.internal_mut(target).insert_child(0, child, count);
            self.set_parent(child, Some(target));
            count
        };

        let parent: &mut InternalNode = self.internal_mut(parent_id);
        parent.sub_count(idx - 1, moved);
        parent.add_count(idx, moved);
        self.counters.borrows += 1;

        trace_log!(
            side = self.side.name(),
            donor = ?donor,
            target = ?target,
            moved,
            "borrow from left"
        );
    }

    /// Move the first entry of child `idx + 1` to the back of child `idx`.
    fn borrow_from_right(&mut self, parent_id: NodeId, idx: usize, links: &mut LinkTable) {
        let parent: &InternalNode = self.internal_ref(parent_id);
        let target: NodeId = parent.child(idx);
        let donor: NodeId = parent.child(idx + 1);

        let moved: usize = if self.nodes[target.index()].is_leaf() {
            let Some(item) = self.leaf_mut(donor).pop_front() else {
                unreachable!("borrow from empty leaf {donor:?}");
            };
            self.leaf_mut(target).push_back(item);
            links.set_leaf(self.side, item.link, target);
            1
        } else {
            let (child, count) = self.internal_mut(donor).remove_child(0);
            self.internal_mut(target).push_child(child, count);
            self.set_parent(child, Some(target));
            count
        };

        let parent: &mut InternalNode = self.internal_mut(parent_id);
        parent.add_count(idx, moved);
        parent.sub_count(idx + 1, moved);
        self.counters.borrows += 1;

        trace_log!(
            side = self.side.name(),
            donor = ?donor,
            target = ?target,
            moved,
            "borrow from right"
        );
    }

    /// Fold child `left_idx + 1` into child `left_idx` and free its slot.
    fn merge_children(&mut self, parent_id: NodeId, left_idx: usize, links: &mut LinkTable) {
        let parent: &mut InternalNode = self.internal_mut(parent_id);
        let left: NodeId = parent.child(left_idx);
        let (right, right_count) = parent.remove_child(left_idx + 1);
        parent.add_count(left_idx, right_count);

        match self.release(right) {
            Node::Leaf(mut absorbed) => {
                for item in absorbed.iter() {
                    links.set_leaf(self.side, item.link, left);
                }
                self.leaf_mut(left).append(&mut absorbed);
            }
            Node::Internal(mut absorbed) => {
                for &child in absorbed.children() {
                    self.set_parent(child, Some(left));
                }
                self.internal_mut(left).append(&mut absorbed);
            }
            Node::Vacant => unreachable!("merge with vacant slot {right:?}"),
        }
        self.counters.merges += 1;

        trace_log!(
            side = self.side.name(),
            left = ?left,
            right = ?right,
            "merge"
        );
    }

    /// Replace a single-child internal root by its child, repeatedly.
    fn collapse_root(&mut self) {
        loop {
            let only_child: NodeId = match &self.nodes[self.root.index()] {
                Node::Internal(root) if root.degree() == 1 => root.child(0),
                _ => return,
            };

            let old_root: NodeId = self.root;
            self.release(old_root);
            self.set_parent(only_child, None);
            self.root = only_child;
            self.height -= 1;

            debug_log!(
                side = self.side.name(),
                root = ?only_child,
                height = self.height,
                "root collapsed"
            );
        }
    }
}
