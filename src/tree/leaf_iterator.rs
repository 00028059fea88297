//! In-order iteration over leaves and items.
//!
//! [`LeafIter`] walks the tree depth-first with an explicit stack, so it
//! yields leaves left to right in O(n / MAX_DEGREE) node visits plus the
//! stack. [`ItemIter`] flattens the leaves into their items.

use crate::container::PermutationContainer;
use crate::item::PermutationItem;
use crate::node::{Node, NodeId};

use super::BpTree;

/// Iterator over the leaves of a tree, in order.
///
/// Yields `(leaf id, container)` pairs.
#[derive(Debug, Clone)]
pub struct LeafIter<'a, const MAX_DEGREE: usize> {
    nodes: &'a [Node],

    /// Nodes still to visit, next on top.
    stack: Vec<NodeId>,
}

impl<'a, const MAX_DEGREE: usize> LeafIter<'a, MAX_DEGREE> {
    pub(super) fn new(tree: &'a BpTree<MAX_DEGREE>) -> Self {
        let mut stack: Vec<NodeId> = Vec::with_capacity(tree.height() * MAX_DEGREE + 1);
        stack.push(tree.root());
        Self {
            nodes: &tree.nodes,
            stack,
        }
    }
}

impl<'a, const MAX_DEGREE: usize> Iterator for LeafIter<'a, MAX_DEGREE> {
    type Item = (NodeId, &'a PermutationContainer);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            match self.nodes.get(id.index())? {
                Node::Internal(node) => self.stack.extend(node.children().iter().rev()),
                Node::Leaf(leaf) => return Some((id, leaf)),
                Node::Vacant => {}
            }
        }
        None
    }
}

/// Iterator over the items of a tree, in order.
#[derive(Debug, Clone)]
pub struct ItemIter<'a, const MAX_DEGREE: usize> {
    leaves: LeafIter<'a, MAX_DEGREE>,
    current: std::slice::Iter<'a, PermutationItem>,
    remaining: usize,
}

impl<'a, const MAX_DEGREE: usize> ItemIter<'a, MAX_DEGREE> {
    pub(super) fn new(tree: &'a BpTree<MAX_DEGREE>) -> Self {
        Self {
            leaves: LeafIter::new(tree),
            current: [].iter(),
            remaining: tree.len(),
        }
    }
}

impl<const MAX_DEGREE: usize> Iterator for ItemIter<'_, MAX_DEGREE> {
    type Item = PermutationItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(&item) = self.current.next() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some(item);
            }
            let (_, leaf) = self.leaves.next()?;
            self.current = leaf.as_slice().iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const MAX_DEGREE: usize> ExactSizeIterator for ItemIter<'_, MAX_DEGREE> {}

#[cfg(test)]
mod tests {
    use crate::item::PermutationItem;
    use crate::link::{LinkTable, Side};
    use crate::tree::BpTree;

    #[test]
    fn test_leaves_cover_all_items_in_order() {
        let mut links = LinkTable::new();
        let mut tree: BpTree<3> = BpTree::new(Side::Pi);
        let mut ids = Vec::new();
        for i in 0..60 {
            let id = links.allocate();
            tree.insert(i, PermutationItem::new(id), &mut links);
            ids.push(id);
        }

        let from_leaves: Vec<_> = tree
            .leaves()
            .flat_map(|(_, leaf)| leaf.iter().map(|item| item.link))
            .collect();
        assert_eq!(from_leaves, ids);

        let items = tree.items();
        assert_eq!(items.len(), 60);
        let from_items: Vec<_> = items.map(|item| item.link).collect();
        assert_eq!(from_items, ids);
    }

    #[test]
    fn test_empty_tree_yields_one_empty_leaf() {
        let tree: BpTree<4> = BpTree::new(Side::Pi);
        assert_eq!(tree.leaves().count(), 1);
        assert_eq!(tree.items().count(), 0);
    }
}
