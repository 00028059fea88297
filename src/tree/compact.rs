//! Arena compaction.
//!
//! After many splits and merges the arena is fragmented: leaves sit in
//! allocation order and freed slots are scattered between them. Sorting
//! renumbers every live node so that leaves occupy `0..leaves` in in-order
//! sequence, followed by internal nodes level by level from the root, and
//! drops the vacant slots. Logical content is unchanged.

use std::collections::VecDeque;
use std::mem as StdMem;

use crate::item::ItemId;
use crate::link::LinkTable;
use crate::node::{Node, NodeId};
use crate::tracing_helpers::debug_log;

use super::BpTree;

impl<const MAX_DEGREE: usize> BpTree<MAX_DEGREE> {
    /// Renumber the arena: in-order leaves first, then internal nodes in
    /// breadth-first order. Rewrites child ids, parent ids and this tree's
    /// side of the link table; frees every vacant slot. O(n).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(side = self.side.name()))
    )]
    pub fn sort_leaf_containers(&mut self, links: &mut LinkTable) {
        let live: usize = self.nodes.len() - self.vacant.len();
        let mut order: Vec<NodeId> = Vec::with_capacity(live);
        order.extend(self.leaves().map(|(id, _)| id));

        let mut queue: VecDeque<NodeId> = VecDeque::new();
        if !self.nodes[self.root.index()].is_leaf() {
            queue.push_back(self.root);
        }
        while let Some(id) = queue.pop_front() {
            order.push(id);
            let node = self.internal_ref(id);
            if !node.children_are_leaves() {
                queue.extend(node.children());
            }
        }
        debug_assert_eq!(order.len(), live, "sort: live nodes unreachable");

        let mut remap: Vec<NodeId> = vec![NodeId::DANGLING; self.nodes.len()];
        for (new, old) in order.iter().enumerate() {
            remap[old.index()] = NodeId::new(new);
        }

        let mut old_nodes: Vec<Node> = StdMem::take(&mut self.nodes);
        let mut nodes: Vec<Node> = Vec::with_capacity(order.len());
        for &old in &order {
            let new: NodeId = remap[old.index()];
            let mut node: Node = StdMem::take(&mut old_nodes[old.index()]);

            match &mut node {
                Node::Internal(internal) => internal.remap_children(&remap),
                Node::Leaf(leaf) => {
                    for item in leaf.iter() {
                        links.set_leaf(self.side, item.link, new);
                    }
                }
                Node::Vacant => {}
            }

            let parent: Option<NodeId> = node.parent().map(|p| remap[p.index()]);
            node.set_parent(parent);
            nodes.push(node);
        }

        self.nodes = nodes;
        self.vacant = Vec::new();
        self.root = remap[self.root.index()];

        debug_log!(
            side = self.side.name(),
            nodes = self.nodes.len(),
            freed = old_nodes.len() - self.nodes.len(),
            "arena sorted"
        );
    }

    /// Rewrite every item's link id through `remap` (indexed by old slot
    /// index), after the link table has been compacted.
    pub fn remap_links(&mut self, remap: &[ItemId]) {
        for node in &mut self.nodes {
            if let Node::Leaf(leaf) = node {
                leaf.remap_links(remap);
            }
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "fail fast in tests")]
mod tests {
    use crate::item::PermutationItem;
    use crate::link::{LinkTable, Side};
    use crate::node::NodeId;
    use crate::tree::BpTree;

    #[test]
    fn test_sort_places_leaves_first_in_order() {
        let mut links = LinkTable::new();
        let mut tree: BpTree<3> = BpTree::new(Side::Pi);
        for _ in 0..80 {
            let id = links.allocate();
            tree.insert(0, PermutationItem::new(id), &mut links);
        }
        for i in (0..40).rev() {
            let item = tree.erase(i * 2 % tree.len(), &mut links);
            links.release(item.link);
        }
        let before: Vec<_> = tree.items().collect();
        assert!(tree.statistics().vacant_slots > 0);

        tree.sort_leaf_containers(&mut links);

        assert_eq!(tree.items().collect::<Vec<_>>(), before);
        assert_eq!(tree.statistics().vacant_slots, 0);
        tree.verify(&links).unwrap();

        let leaf_ids: Vec<NodeId> = tree.leaves().map(|(id, _)| id).collect();
        let expected: Vec<NodeId> = (0..leaf_ids.len()).map(NodeId::new).collect();
        assert_eq!(leaf_ids, expected);
        assert_eq!(tree.root(), NodeId::new(tree.statistics().leaves));
    }

    #[test]
    fn test_sort_single_leaf() {
        let mut links = LinkTable::new();
        let mut tree: BpTree<4> = BpTree::new(Side::Inverse);
        let id = links.allocate();
        tree.insert(0, PermutationItem::new(id), &mut links);

        tree.sort_leaf_containers(&mut links);
        assert_eq!(tree.root(), NodeId::new(0));
        assert_eq!(links.leaf(Side::Inverse, id), Some(NodeId::new(0)));
        tree.verify(&links).unwrap();
    }
}
