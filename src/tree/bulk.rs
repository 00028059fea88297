//! Bottom-up bulk loading.
//!
//! Builds a tree from an ordered run of item ids in O(n) without a single
//! split: the ids are cut into `ceil(n / MAX_DEGREE)` leaves whose sizes
//! differ by at most one, then every level of internal nodes is cut from the
//! level below the same way until a single root remains.
//!
//! Cutting `k > MAX_DEGREE` entries into `ceil(k / MAX_DEGREE)` even chunks
//! always yields chunks of at least `MAX_DEGREE.div_ceil(2)`, so the result
//! satisfies the occupancy bounds without a fix-up pass.

use std::ops::Range;

use crate::container::PermutationContainer;
use crate::internode::InternalNode;
use crate::item::{ItemId, PermutationItem};
use crate::link::LinkTable;
use crate::node::{Node, NodeId};
use crate::tracing_helpers::debug_log;

use super::BpTree;

/// Cut `0..len` into `parts` consecutive ranges whose lengths differ by at
/// most one, longer ranges first.
pub(crate) fn even_chunks(len: usize, parts: usize) -> impl Iterator<Item = Range<usize>> {
    let base: usize = len.checked_div(parts).unwrap_or(0);
    let extra: usize = len.checked_rem(parts).unwrap_or(0);

    (0..parts).scan(0usize, move |start, part| {
        let size: usize = base + usize::from(part < extra);
        let range: Range<usize> = *start..*start + size;
        *start += size;
        Some(range)
    })
}

impl<const MAX_DEGREE: usize> BpTree<MAX_DEGREE> {
    /// Replace the tree's contents with `ids` in order.
    ///
    /// Records every item's leaf in `links`. Performance counters are kept.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip_all,
            fields(side = self.side.name(), n = ids.len())
        )
    )]
    pub fn bulk_load(&mut self, ids: &[ItemId], links: &mut LinkTable) {
        self.clear();
        let n: usize = ids.len();

        if n <= MAX_DEGREE {
            let (root, side) = (self.root, self.side);
            let leaf: &mut PermutationContainer = self.leaf_mut(root);
            for &id in ids {
                leaf.push_back(PermutationItem::new(id));
                links.set_leaf(side, id, root);
            }
            self.len = n;
            return;
        }

        self.nodes.clear();
        self.nodes.reserve(Self::node_estimate(n));

        // Leaf level.
        let mut level: Vec<(NodeId, usize)> = Vec::with_capacity(n.div_ceil(MAX_DEGREE));
        for range in even_chunks(n, n.div_ceil(MAX_DEGREE)) {
            let mut leaf = PermutationContainer::with_capacity(MAX_DEGREE);
            for &id in &ids[range.clone()] {
                leaf.push_back(PermutationItem::new(id));
            }
            let leaf_id: NodeId = self.alloc(Node::Leaf(leaf));
            for &id in &ids[range.clone()] {
                links.set_leaf(self.side, id, leaf_id);
            }
            level.push((leaf_id, range.len()));
        }

        // Internal levels.
        let mut height: u32 = 0;
        while level.len() > 1 {
            let parts: usize = level.len().div_ceil(MAX_DEGREE);
            let mut next: Vec<(NodeId, usize)> = Vec::with_capacity(parts);

            for range in even_chunks(level.len(), parts) {
                let mut node = InternalNode::with_capacity(height, MAX_DEGREE);
                for &(child, count) in &level[range.clone()] {
                    node.push_child(child, count);
                }
                let total: usize = node.total_count();
                let node_id: NodeId = self.alloc(Node::Internal(node));
                for &(child, _) in &level[range] {
                    self.set_parent(child, Some(node_id));
                }
                next.push((node_id, total));
            }

            level = next;
            height += 1;
        }

        self.root = level[0].0;
        self.height = height as usize;
        self.len = n;

        debug_log!(
            side = self.side.name(),
            n,
            height = self.height,
            nodes = self.nodes.len(),
            "bulk load"
        );
    }

    /// Upper bound on the nodes a bulk load of `n` items creates.
    fn node_estimate(n: usize) -> usize {
        let mut total: usize = 0;
        let mut level: usize = n.div_ceil(MAX_DEGREE);
        loop {
            total += level;
            if level <= 1 {
                return total;
            }
            level = level.div_ceil(MAX_DEGREE);
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "fail fast in tests")]
mod tests {
    use super::*;
    use crate::link::Side;

    #[test]
    fn test_even_chunks() {
        let sizes: Vec<usize> = even_chunks(10, 3).map(|r| r.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);

        let ranges: Vec<Range<usize>> = even_chunks(6, 2).collect();
        assert_eq!(ranges, vec![0..3, 3..6]);

        assert_eq!(even_chunks(0, 0).count(), 0);
    }

    #[test]
    fn test_even_chunks_respect_minimum() {
        for degree in 3..=9usize {
            for n in degree + 1..degree * degree * 2 {
                let parts = n.div_ceil(degree);
                for range in even_chunks(n, parts) {
                    assert!(range.len() <= degree);
                    assert!(range.len() >= degree.div_ceil(2), "n={n} D={degree}");
                }
            }
        }
    }

    fn load<const D: usize>(n: usize) -> (BpTree<D>, LinkTable) {
        let mut links = LinkTable::with_dense(n);
        let ids: Vec<ItemId> = (0..n).map(ItemId::dense).collect();
        let mut tree: BpTree<D> = BpTree::new(Side::Pi);
        tree.bulk_load(&ids, &mut links);
        (tree, links)
    }

    #[test]
    fn test_small_load_is_single_leaf() {
        let (tree, links) = load::<8>(8);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.len(), 8);
        tree.verify(&links).unwrap();
    }

    #[test]
    fn test_bulk_load_shapes() {
        for n in [0, 1, 4, 5, 17, 64, 65, 300, 1000] {
            let (tree, links) = load::<4>(n);
            assert_eq!(tree.len(), n);
            tree.verify(&links).unwrap();
            assert_eq!(tree.performance_counters().splits, 0);

            for i in 0..n {
                assert_eq!(tree.rank_of(&links, ItemId::dense(i)), Some(i));
            }
        }
    }

    #[test]
    fn test_bulk_load_then_insert() {
        let (mut tree, mut links) = load::<5>(100);
        let id = links.allocate();
        tree.insert(50, PermutationItem::new(id), &mut links);
        assert_eq!(tree.rank_of(&links, id), Some(50));
        assert_eq!(tree.rank_of(&links, ItemId::dense(50)), Some(51));
        tree.verify(&links).unwrap();
    }
}
