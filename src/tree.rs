//! Filepath: src/tree.rs
//!
//! Count-indexed B+tree used for both halves of a dynamic permutation.
//!
//! A [`BpTree`] stores [`PermutationItem`]s in in-order sequence. It has no
//! keys: internal nodes cache the item count of every child, and descent by
//! rank subtracts those counts. The pi-tree and the inverse-pi-tree are two
//! instances of this type that differ only in their [`Side`], which selects
//! the half of the [`LinkTable`] slot they maintain.
//!
//! # Layout
//!
//! ```text
//!   nodes: [ Leaf | Internal | Leaf | Vacant | Leaf | ... ]   <- arena
//!             ^                                               <- NodeId = index
//!   vacant: [3, ...]                                          <- free slots
//!   root:   NodeId of an Internal, or of a Leaf while len <= MAX_DEGREE
//! ```
//!
//! The root always exists; an empty tree is a single empty root leaf.
//!
//! # Operations
//!
//! | Operation | Module | Cost |
//! |-----------|--------|------|
//! | `access`, `locate`, `rank_of` | here | O(log n) |
//! | `insert` + split propagation | `split` | O(log n) |
//! | `erase` + borrow/merge | `rebalance` | O(log n) |
//! | `bulk_load` | `bulk` | O(n) |
//! | `sort_leaf_containers` | `compact` | O(n) |
//! | `verify` | `verify` | O(n) |

use std::mem as StdMem;

use crate::DEFAULT_MAX_DEGREE;
use crate::container::PermutationContainer;
use crate::internode::InternalNode;
use crate::item::{ItemId, PermutationItem};
use crate::link::{LinkTable, Side};
use crate::node::{Node, NodeId};
use crate::stats::{PerformanceCounters, TreeMemoryUsage, TreeStatistics};

mod bulk;
mod compact;
mod leaf_iterator;
mod rebalance;
mod split;
mod verify;

pub use leaf_iterator::{ItemIter, LeafIter};

/// Path from the root to a leaf: `(internal node, child index taken)` per
/// level, root first.
pub(crate) type DescentPath = Vec<(NodeId, usize)>;

// ============================================================================
//  BpTree
// ============================================================================

/// One of the two count-indexed trees of a dynamic permutation.
///
/// # Type Parameters
/// * `MAX_DEGREE` - Maximum children per internal node and maximum items per
///   leaf (default: 64, min: 3)
///
/// # Invariants
/// - every leaf is at depth `height`
/// - every non-root node holds between `MIN_OCCUPANCY` and `MAX_DEGREE`
///   entries; a root internal node has at least 2 children
/// - every cached count equals the number of items below that child
/// - for every item, the link table records its leaf on this tree's side
#[derive(Debug, Clone)]
pub struct BpTree<const MAX_DEGREE: usize = DEFAULT_MAX_DEGREE> {
    /// Which half of each link slot this tree maintains.
    side: Side,

    /// Node arena.
    nodes: Vec<Node>,

    /// Free arena slots.
    vacant: Vec<NodeId>,

    /// Root node (a leaf while the tree is small).
    root: NodeId,

    /// Number of internal levels (0 = root is a leaf).
    height: usize,

    /// Number of items.
    len: usize,

    /// Cumulative structural events.
    counters: PerformanceCounters,
}

// Compile-time assertion: MAX_DEGREE must be at least 3
impl<const MAX_DEGREE: usize> BpTree<MAX_DEGREE> {
    const DEGREE_CHECK: () = {
        assert!(MAX_DEGREE >= 3, "MAX_DEGREE must be at least 3");
    };

    /// Minimum entries of a non-root node.
    pub const MIN_OCCUPANCY: usize = MAX_DEGREE.div_ceil(2);
}

impl<const MAX_DEGREE: usize> BpTree<MAX_DEGREE> {
    /// Create an empty tree maintaining `side` of the link table.
    #[must_use]
    pub fn new(side: Side) -> Self {
        // Trigger compile-time MAX_DEGREE check
        let _: () = Self::DEGREE_CHECK;

        Self {
            side,
            nodes: vec![Node::Leaf(PermutationContainer::new())],
            vacant: Vec::new(),
            root: NodeId::new(0),
            height: 0,
            len: 0,
            counters: PerformanceCounters::default(),
        }
    }

    // ========================================================================
    //  Accessors
    // ========================================================================

    /// Which tree this is.
    #[must_use]
    #[inline(always)]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Number of items.
    #[must_use]
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no items.
    #[must_use]
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of internal levels (0 when the root is a leaf).
    #[must_use]
    #[inline(always)]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Root node id.
    #[must_use]
    #[inline(always)]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Node at `id`, if the id is inside the arena.
    #[must_use]
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Cumulative structural-event counters.
    #[must_use]
    #[inline]
    pub const fn performance_counters(&self) -> PerformanceCounters {
        self.counters
    }

    /// Zero the structural-event counters.
    pub const fn reset_performance_counters(&mut self) {
        self.counters.reset();
    }

    // ========================================================================
    //  Arena
    // ========================================================================

    /// Store `node` in a free slot (or a new one) and return its id.
    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.vacant.pop() {
            debug_assert!(self.nodes[id.index()].is_vacant());
            self.nodes[id.index()] = node;
            id
        } else {
            let id = NodeId::new(self.nodes.len());
            self.nodes.push(node);
            id
        }
    }

    /// Take the node out of its slot and put the slot on the free list.
    fn release(&mut self, id: NodeId) -> Node {
        let node: Node = StdMem::take(&mut self.nodes[id.index()]);
        debug_assert!(!node.is_vacant(), "release of vacant slot {id:?}");
        self.vacant.push(id);
        node
    }

    fn leaf_ref(&self, id: NodeId) -> &PermutationContainer {
        match &self.nodes[id.index()] {
            Node::Leaf(leaf) => leaf,
            other => unreachable!("{id:?} is not a leaf: {other:?}"),
        }
    }

    fn leaf_mut(&mut self, id: NodeId) -> &mut PermutationContainer {
        match &mut self.nodes[id.index()] {
            Node::Leaf(leaf) => leaf,
            other => unreachable!("{id:?} is not a leaf: {other:?}"),
        }
    }

    fn internal_ref(&self, id: NodeId) -> &InternalNode {
        match &self.nodes[id.index()] {
            Node::Internal(node) => node,
            other => unreachable!("{id:?} is not an internal node: {other:?}"),
        }
    }

    fn internal_mut(&mut self, id: NodeId) -> &mut InternalNode {
        match &mut self.nodes[id.index()] {
            Node::Internal(node) => node,
            other => unreachable!("{id:?} is not an internal node: {other:?}"),
        }
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.nodes[id.index()].set_parent(parent);
    }

    /// Entries held by a node: items for a leaf, children for an internal.
    fn occupancy(&self, id: NodeId) -> usize {
        match &self.nodes[id.index()] {
            Node::Internal(node) => node.degree(),
            Node::Leaf(leaf) => leaf.len(),
            Node::Vacant => 0,
        }
    }

    /// Drop every item and node, leaving a single empty root leaf.
    ///
    /// Link slots for the dropped items are not touched; the owner clears
    /// or releases them.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.vacant.clear();
        self.nodes.push(Node::Leaf(PermutationContainer::new()));
        self.root = NodeId::new(0);
        self.height = 0;
        self.len = 0;
    }

    // ========================================================================
    //  Lookup
    // ========================================================================

    /// Leaf and in-leaf offset of the item at `index`.
    #[must_use]
    pub fn locate(&self, index: usize) -> Option<(NodeId, usize)> {
        if index >= self.len {
            return None;
        }

        let mut id: NodeId = self.root;
        let mut rank: usize = index;
        loop {
            match self.nodes.get(id.index())? {
                Node::Internal(node) => {
                    let (child, offset) = node.locate(rank);
                    id = node.child(child);
                    rank = offset;
                }
                Node::Leaf(_) => return Some((id, rank)),
                Node::Vacant => return None,
            }
        }
    }

    /// Item at in-order rank `index`.
    #[must_use]
    pub fn access(&self, index: usize) -> Option<PermutationItem> {
        let (leaf, offset) = self.locate(index)?;
        match self.nodes.get(leaf.index())? {
            Node::Leaf(container) => container.get(offset),
            _ => None,
        }
    }

    /// In-order rank of the item linked to `id`.
    ///
    /// Finds the item's leaf through the link table, then climbs parent
    /// links adding the counts of left siblings at every level. Returns
    /// `None` if the link is stale or does not lead back to this tree's root.
    #[must_use]
    pub fn rank_of(&self, links: &LinkTable, id: ItemId) -> Option<usize> {
        let leaf_id: NodeId = links.leaf(self.side, id)?;
        let Node::Leaf(leaf) = self.nodes.get(leaf_id.index())? else {
            return None;
        };

        let mut rank: usize = leaf.position_of(id)?;
        let mut child: NodeId = leaf_id;
        let mut parent: Option<NodeId> = leaf.parent();

        while let Some(parent_id) = parent {
            let Node::Internal(node) = self.nodes.get(parent_id.index())? else {
                return None;
            };
            let idx: usize = node.child_index_of(child)?;
            rank += node.count_before(idx);
            child = parent_id;
            parent = node.parent();
        }

        (child == self.root).then_some(rank)
    }

    /// Walk from the root to the leaf holding rank `index`, recording the
    /// path and bumping every count on the way up (`grow`) or down.
    ///
    /// Returns the leaf and the offset inside it. When growing, the rank may
    /// equal `len` (append).
    fn descend_adjusting(
        &mut self,
        index: usize,
        grow: bool,
        path: &mut DescentPath,
    ) -> (NodeId, usize) {
        let mut id: NodeId = self.root;
        let mut rank: usize = index;

        while let Node::Internal(node) = &mut self.nodes[id.index()] {
            let (child, offset) = node.locate(rank);
            if grow {
                node.add_count(child, 1);
            } else {
                node.sub_count(child, 1);
            }
            path.push((id, child));
            id = node.child(child);
            rank = offset;
        }

        (id, rank)
    }

    // ========================================================================
    //  Iteration
    // ========================================================================

    /// Leaves in in-order sequence.
    #[must_use]
    pub fn leaves(&self) -> LeafIter<'_, MAX_DEGREE> {
        LeafIter::new(self)
    }

    /// Items in in-order sequence.
    #[must_use]
    pub fn items(&self) -> ItemIter<'_, MAX_DEGREE> {
        ItemIter::new(self)
    }

    // ========================================================================
    //  Introspection
    // ========================================================================

    /// Shape statistics.
    #[must_use]
    pub fn statistics(&self) -> TreeStatistics {
        let mut stats = TreeStatistics {
            height: self.height,
            values: self.len,
            max_degree: MAX_DEGREE,
            leaf_occupancy_histogram: vec![0; MAX_DEGREE + 1],
            vacant_slots: self.vacant.len(),
            ..TreeStatistics::default()
        };

        let mut children: usize = 0;
        for node in &self.nodes {
            match node {
                Node::Internal(internal) => {
                    stats.internal_nodes += 1;
                    children += internal.degree();
                }
                Node::Leaf(leaf) => {
                    stats.leaves += 1;
                    let bucket: usize = leaf.len().min(MAX_DEGREE);
                    stats.leaf_occupancy_histogram[bucket] += 1;
                }
                Node::Vacant => {}
            }
        }

        #[expect(
            clippy::cast_precision_loss,
            reason = "averages are for display only"
        )]
        let (average_internal_degree, average_leaf_occupancy) = (
            if stats.internal_nodes == 0 {
                0.0
            } else {
                children as f64 / stats.internal_nodes as f64
            },
            if stats.leaves == 0 {
                0.0
            } else {
                self.len as f64 / stats.leaves as f64
            },
        );
        stats.average_internal_degree = average_internal_degree;
        stats.average_leaf_occupancy = average_leaf_occupancy;
        stats
    }

    /// Byte accounting. Counts capacities, so the figure only grows while
    /// items are inserted.
    #[must_use]
    pub fn memory_usage(&self) -> TreeMemoryUsage {
        let mut usage = TreeMemoryUsage {
            arena_bytes: self.nodes.capacity() * size_of::<Node>()
                + self.vacant.capacity() * size_of::<NodeId>(),
            ..TreeMemoryUsage::default()
        };

        for node in &self.nodes {
            match node {
                Node::Internal(internal) => {
                    usage.internal_nodes += 1;
                    usage.internal_bytes += internal.heap_bytes();
                }
                Node::Leaf(leaf) => {
                    usage.leaves += 1;
                    usage.leaf_bytes += leaf.heap_bytes();
                }
                Node::Vacant => {}
            }
        }

        usage.total_bytes =
            size_of::<Self>() + usage.arena_bytes + usage.internal_bytes + usage.leaf_bytes;
        usage
    }

    /// Total bytes owned by the tree.
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        self.memory_usage().total_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a tree of `n` fresh items appended in order.
    fn appended<const D: usize>(n: usize) -> (BpTree<D>, LinkTable, Vec<ItemId>) {
        let mut links = LinkTable::new();
        let mut tree: BpTree<D> = BpTree::new(Side::Pi);
        let mut ids = Vec::with_capacity(n);
        for i in 0..n {
            let id = links.allocate();
            tree.insert(i, PermutationItem::new(id), &mut links);
            ids.push(id);
        }
        (tree, links, ids)
    }

    #[test]
    fn test_empty_tree() {
        let tree: BpTree<4> = BpTree::new(Side::Pi);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.access(0), None);
        assert_eq!(tree.locate(0), None);
        assert_eq!(BpTree::<4>::MIN_OCCUPANCY, 2);
        assert_eq!(BpTree::<5>::MIN_OCCUPANCY, 3);
    }

    #[test]
    fn test_access_and_rank_agree() {
        let (tree, links, ids) = appended::<4>(50);
        assert_eq!(tree.len(), 50);
        assert!(tree.height() >= 2);

        for (i, &id) in ids.iter().enumerate() {
            assert_eq!(tree.access(i), Some(PermutationItem::new(id)));
            assert_eq!(tree.rank_of(&links, id), Some(i));
        }
        assert_eq!(tree.access(50), None);
    }

    #[test]
    fn test_rank_of_stale_id_is_none() {
        let (mut tree, mut links, ids) = appended::<4>(10);
        let removed = tree.erase(3, &mut links);
        assert_eq!(removed.link, ids[3]);
        links.release(ids[3]);

        assert_eq!(tree.rank_of(&links, ids[3]), None);
        assert_eq!(tree.rank_of(&links, ids[4]), Some(3));
    }

    #[test]
    fn test_statistics_and_memory() {
        let (tree, _links, _ids) = appended::<4>(30);
        let stats = tree.statistics();

        assert_eq!(stats.values, 30);
        assert_eq!(stats.max_degree, 4);
        assert_eq!(stats.height, tree.height());
        assert_eq!(stats.leaf_occupancy_histogram.len(), 5);
        assert_eq!(
            stats
                .leaf_occupancy_histogram
                .iter()
                .enumerate()
                .map(|(k, &c)| k * c)
                .sum::<usize>(),
            30
        );
        assert!(stats.average_leaf_occupancy >= 2.0);

        let usage = tree.memory_usage();
        assert_eq!(usage.leaves, stats.leaves);
        assert_eq!(usage.internal_nodes, stats.internal_nodes);
        assert_eq!(tree.size_in_bytes(), usage.total_bytes);
    }

    #[test]
    fn test_clear_keeps_counters() {
        let (mut tree, _links, _ids) = appended::<3>(20);
        let counters = tree.performance_counters();
        assert_eq!(counters.inserts, 20);
        assert!(counters.splits > 0);

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.performance_counters(), counters);

        tree.reset_performance_counters();
        assert_eq!(tree.performance_counters(), PerformanceCounters::default());
    }
}
