//! Filepath: src/permutation.rs
//!
//! [`DynamicPermutation`]: a permutation π over `[0, n)` with O(log n)
//! evaluation of π and π⁻¹, insertion and deletion.
//!
//! # Representation
//!
//! ```text
//!   pi-tree (by position)          inverse-pi-tree (by value)
//!   [ #0 #1 #2 ]                   [ #1 #2 #0 ]
//!      │  │  │                        ▲  ▲  ▲
//!      └──┼──┼── LinkTable ───────────┼──┼──┘     π = [2, 0, 1]
//!         └──┼────────────────────────┘  │
//!            └───────────────────────────┘
//! ```
//!
//! Element `#k` sits at its position in the pi-tree and at its value in the
//! inverse-pi-tree. π(i) is the rank of the inverse copy of the item at pi
//! rank `i`; π⁻¹(v) is the rank of the pi copy of the item at inverse rank
//! `v`. Inserting or erasing an element shifts all later positions and values
//! implicitly, because ranks are never stored.
//!
//! # Atomicity
//!
//! Every argument is validated, and every link followed, before the first
//! structural change. A call that returns `Err` leaves the permutation as it
//! was.

use std::fmt as StdFmt;

use crate::DEFAULT_MAX_DEGREE;
use crate::builder;
use crate::error::PermutationError;
use crate::item::{ItemId, PermutationItem};
use crate::link::{LinkTable, Side};
use crate::stats::{MemoryUsageInfo, PerTree, PerformanceCounters, TreeStatistics};
use crate::tracing_helpers::{debug_log, trace_log};
use crate::tree::{BpTree, ItemIter};

// ============================================================================
//  DynamicPermutation
// ============================================================================

/// A dynamic permutation backed by a pair of cross-linked B+trees.
///
/// # Type Parameters
/// * `MAX_DEGREE` - Node fan-out and leaf capacity of both trees (default:
///   64, min: 3). Smaller values give deeper trees with cheaper splits.
///
/// # Example
///
/// ```rust
/// use dynperm::DynamicPermutation;
///
/// let mut perm: DynamicPermutation = DynamicPermutation::from_slice(&[2, 0, 1])?;
/// assert_eq!(perm.access(0)?, 2);
/// assert_eq!(perm.inverse(0)?, 1);
///
/// perm.insert(1, 3)?;
/// assert_eq!(perm.to_pi_vector(), vec![2, 3, 0, 1]);
///
/// assert_eq!(perm.erase(0)?, 2);
/// assert_eq!(perm.to_pi_vector(), vec![2, 0, 1]);
/// # Ok::<(), dynperm::PermutationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DynamicPermutation<const MAX_DEGREE: usize = DEFAULT_MAX_DEGREE> {
    /// Ordered by position; in-order traversal yields π.
    pi: BpTree<MAX_DEGREE>,

    /// Ordered by value; in-order traversal yields π⁻¹.
    inverse: BpTree<MAX_DEGREE>,

    /// Per-element cross-links between the two trees.
    links: LinkTable,
}

impl<const MAX_DEGREE: usize> Default for DynamicPermutation<MAX_DEGREE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const MAX_DEGREE: usize> DynamicPermutation<MAX_DEGREE> {
    /// Create an empty permutation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pi: BpTree::new(Side::Pi),
            inverse: BpTree::new(Side::Inverse),
            links: LinkTable::new(),
        }
    }

    /// Create a permutation with `π(i) = values[i]`.
    ///
    /// # Errors
    /// [`PermutationError::InvalidPermutation`] if `values` is not a
    /// bijection on `[0, values.len())`.
    pub fn from_slice(values: &[usize]) -> Result<Self, PermutationError> {
        let mut perm = Self::new();
        perm.build(values)?;
        Ok(perm)
    }

    /// Replace the contents with `π(i) = values[i]`, bulk-loading both trees
    /// in O(n).
    ///
    /// # Errors
    /// [`PermutationError::InvalidPermutation`] if `values` is not a
    /// bijection on `[0, values.len())`; the permutation is left unchanged.
    pub fn build(&mut self, values: &[usize]) -> Result<(), PermutationError> {
        let inverse: Vec<usize> = builder::invert(values)?;
        self.load(&inverse);
        Ok(())
    }

    /// Bulk-load from a validated inverse array.
    ///
    /// Element ids are dense: element `i` is the one at position `i`, so the
    /// pi-tree holds ids `0..n` in order and the inverse-pi-tree holds
    /// `inverse[v]` at rank `v`.
    pub(crate) fn load(&mut self, inverse: &[usize]) {
        let n: usize = inverse.len();
        let mut links = LinkTable::with_dense(n);

        let pi_ids: Vec<ItemId> = (0..n).map(ItemId::dense).collect();
        let inverse_ids: Vec<ItemId> = inverse.iter().map(|&pos| ItemId::dense(pos)).collect();

        self.pi.bulk_load(&pi_ids, &mut links);
        self.inverse.bulk_load(&inverse_ids, &mut links);
        self.links = links;

        debug_log!(n, height = self.pi.height(), "permutation built");
        self.debug_assert_invariants();
    }

    // ========================================================================
    //  Size
    // ========================================================================

    /// Number of elements.
    #[must_use]
    #[inline(always)]
    pub const fn size(&self) -> usize {
        self.pi.len()
    }

    /// Number of elements.
    #[must_use]
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.pi.len()
    }

    /// Returns `true` if the permutation has no elements.
    #[must_use]
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.pi.is_empty()
    }

    /// Configured maximum degree of both trees.
    #[must_use]
    #[inline(always)]
    pub const fn max_degree(&self) -> usize {
        MAX_DEGREE
    }

    // ========================================================================
    //  Queries
    // ========================================================================

    /// π(i). O(log n).
    ///
    /// # Errors
    /// [`PermutationError::OutOfRange`] if `i >= size()`;
    /// [`PermutationError::InvariantViolation`] if the element's cross-link
    /// is broken.
    pub fn access(&self, i: usize) -> Result<usize, PermutationError> {
        let item: PermutationItem = self
            .pi
            .access(i)
            .ok_or_else(|| PermutationError::position_out_of_range(i, self.len()))?;
        self.counterpart_rank(&self.inverse, item.link, i)
    }

    /// π⁻¹(v). O(log n).
    ///
    /// # Errors
    /// [`PermutationError::OutOfRange`] if `v >= size()`;
    /// [`PermutationError::InvariantViolation`] if the element's cross-link
    /// is broken.
    pub fn inverse(&self, v: usize) -> Result<usize, PermutationError> {
        let item: PermutationItem = self
            .inverse
            .access(v)
            .ok_or_else(|| PermutationError::value_out_of_range(v, self.len()))?;
        self.counterpart_rank(&self.pi, item.link, v)
    }

    /// Rank of `id` in `tree`, found through the link table.
    fn counterpart_rank(
        &self,
        tree: &BpTree<MAX_DEGREE>,
        id: ItemId,
        from: usize,
    ) -> Result<usize, PermutationError> {
        tree.rank_of(&self.links, id).ok_or_else(|| {
            PermutationError::InvariantViolation(format!(
                "element {id:?} at {} rank {from} has no counterpart in the {} tree",
                tree.side().opposite().name(),
                tree.side().name()
            ))
        })
    }

    /// Iterate over π(0), π(1), …, π(n-1). O(n log n) in total.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, MAX_DEGREE> {
        Iter {
            items: self.pi.items(),
            inverse: &self.inverse,
            links: &self.links,
        }
    }

    // ========================================================================
    //  Mutation
    // ========================================================================

    /// Insert a new element so that π(i) = v.
    ///
    /// Every position `>= i` moves one later and every value `>= v` grows by
    /// one. O(log n).
    ///
    /// # Errors
    /// [`PermutationError::OutOfRange`] if `i > size()` or `v > size()`.
    pub fn insert(&mut self, i: usize, v: usize) -> Result<(), PermutationError> {
        let n: usize = self.len();
        if i > n {
            return Err(PermutationError::position_out_of_range(i, n + 1));
        }
        if v > n {
            return Err(PermutationError::value_out_of_range(v, n + 1));
        }

        let id: ItemId = self.links.allocate();
        let item = PermutationItem::new(id);
        self.pi.insert(i, item, &mut self.links);
        self.inverse.insert(v, item, &mut self.links);

        trace_log!(i, v, id = ?id, "permutation insert");
        self.debug_assert_invariants();
        Ok(())
    }

    /// Remove the element at position `i` and return its value π(i).
    ///
    /// Every later position moves one earlier and every larger value shrinks
    /// by one. O(log n).
    ///
    /// # Errors
    /// [`PermutationError::OutOfRange`] if `i >= size()`;
    /// [`PermutationError::InvariantViolation`] if the element's cross-link
    /// is broken (nothing is removed).
    pub fn erase(&mut self, i: usize) -> Result<usize, PermutationError> {
        let item: PermutationItem = self
            .pi
            .access(i)
            .ok_or_else(|| PermutationError::position_out_of_range(i, self.len()))?;
        let v: usize = self.counterpart_rank(&self.inverse, item.link, i)?;

        let from_pi: PermutationItem = self.pi.erase(i, &mut self.links);
        let from_inverse: PermutationItem = self.inverse.erase(v, &mut self.links);
        debug_assert_eq!(from_pi, item);
        debug_assert_eq!(from_inverse, item);
        self.links.release(item.link);

        trace_log!(i, v, id = ?item.link, "permutation erase");
        self.debug_assert_invariants();
        Ok(v)
    }

    /// Move the element at position `from` to position `to`, keeping its
    /// value. Positions between the two shift by one toward `from`.
    ///
    /// Only the pi-tree changes: the element keeps its link, and its rank in
    /// the inverse-pi-tree (its value) is untouched, while π⁻¹ of the
    /// shifted elements follows implicitly. O(log n).
    ///
    /// # Errors
    /// [`PermutationError::OutOfRange`] if `from >= size()` or
    /// `to >= size()`.
    pub fn move_pi_index(&mut self, from: usize, to: usize) -> Result<(), PermutationError> {
        let n: usize = self.len();
        if from >= n {
            return Err(PermutationError::position_out_of_range(from, n));
        }
        if to >= n {
            return Err(PermutationError::position_out_of_range(to, n));
        }
        if from == to {
            return Ok(());
        }

        self.pi.move_item(from, to, &mut self.links);

        trace_log!(from, to, "permutation move");
        self.debug_assert_invariants();
        Ok(())
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.pi.clear();
        self.inverse.clear();
        self.links.clear();
    }

    // ========================================================================
    //  Materialization
    // ========================================================================

    /// `[π(0), …, π(n-1)]`. O(n).
    #[must_use]
    pub fn to_pi_vector(&self) -> Vec<usize> {
        Self::compose(&self.inverse, &self.pi, &self.links)
    }

    /// `[π⁻¹(0), …, π⁻¹(n-1)]`. O(n).
    #[must_use]
    pub fn to_inverse_pi_vector(&self) -> Vec<usize> {
        Self::compose(&self.pi, &self.inverse, &self.links)
    }

    /// For each item of `outer` in order, its rank in `ranked`.
    ///
    /// One pass over `ranked` records each element's rank by slot index, one
    /// pass over `outer` reads them back.
    fn compose(
        ranked: &BpTree<MAX_DEGREE>,
        outer: &BpTree<MAX_DEGREE>,
        links: &LinkTable,
    ) -> Vec<usize> {
        let mut rank_by_slot: Vec<usize> = vec![usize::MAX; links.capacity_slots()];
        for (rank, item) in ranked.items().enumerate() {
            rank_by_slot[item.link.index()] = rank;
        }
        outer
            .items()
            .map(|item| rank_by_slot[item.link.index()])
            .collect()
    }

    // ========================================================================
    //  Verification
    // ========================================================================

    /// Full consistency audit. O(n log n).
    ///
    /// Checks both trees' balance, occupancy and count invariants, that both
    /// trees and the link table agree on the element set, and that `access`
    /// and `inverse` are mutual inverses at every index.
    ///
    /// # Errors
    /// [`PermutationError::InvariantViolation`] describing the first
    /// inconsistency found.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(n = self.len()))
    )]
    pub fn verify(&self) -> Result<(), PermutationError> {
        let n: usize = self.len();
        if self.inverse.len() != n || self.links.len() != n {
            return Err(PermutationError::InvariantViolation(format!(
                "pi tree holds {n} items, inverse-pi tree {}, link table {}",
                self.inverse.len(),
                self.links.len()
            )));
        }

        self.pi.verify(&self.links)?;
        self.inverse.verify(&self.links)?;
        self.verify_same_elements()?;

        for i in 0..n {
            let v: usize = self.access(i)?;
            let back: usize = self.inverse(v)?;
            if back != i {
                return Err(PermutationError::InvariantViolation(format!(
                    "inverse(access({i})) = inverse({v}) = {back}"
                )));
            }
        }

        Ok(())
    }

    /// Both trees hold exactly the live ids, each once.
    fn verify_same_elements(&self) -> Result<(), PermutationError> {
        // 0 = unseen, 1 = seen in pi, 2 = seen in both.
        let mut seen: Vec<u8> = vec![0; self.links.capacity_slots()];

        for item in self.pi.items() {
            let id: ItemId = item.link;
            if !self.links.is_live(id) {
                return Err(PermutationError::InvariantViolation(format!(
                    "pi tree holds released element {id:?}"
                )));
            }
            if seen[id.index()] != 0 {
                return Err(PermutationError::InvariantViolation(format!(
                    "pi tree holds element {id:?} twice"
                )));
            }
            seen[id.index()] = 1;
        }

        for item in self.inverse.items() {
            let id: ItemId = item.link;
            match seen.get(id.index()) {
                Some(1) if self.links.is_live(id) => seen[id.index()] = 2,
                _ => {
                    return Err(PermutationError::InvariantViolation(format!(
                        "inverse-pi tree element {id:?} is duplicated or missing from the pi tree"
                    )));
                }
            }
        }

        Ok(())
    }

    #[cfg(debug_assertions)]
    fn debug_assert_invariants(&self) {
        debug_assert_eq!(self.pi.len(), self.inverse.len(), "tree sizes differ");
        debug_assert_eq!(self.pi.len(), self.links.len(), "link table size differs");
    }

    #[cfg(not(debug_assertions))]
    #[inline]
    const fn debug_assert_invariants(&self) {}

    // ========================================================================
    //  Maintenance & Introspection
    // ========================================================================

    /// Compact both arenas and the link table for locality. O(n).
    ///
    /// Leaves of each tree end up contiguous and in order, and element ids
    /// are renumbered densely in position order. Logical content is
    /// unchanged.
    pub fn sort_leaf_containers(&mut self) {
        self.pi.sort_leaf_containers(&mut self.links);
        self.inverse.sort_leaf_containers(&mut self.links);

        let order: Vec<ItemId> = self.pi.items().map(|item| item.link).collect();
        let remap: Vec<ItemId> = self.links.compact(order);
        self.pi.remap_links(&remap);
        self.inverse.remap_links(&remap);

        debug_log!(n = self.len(), "leaf containers sorted");
    }

    /// The position-ordered tree.
    #[must_use]
    #[inline]
    pub const fn pi_tree(&self) -> &BpTree<MAX_DEGREE> {
        &self.pi
    }

    /// The value-ordered tree.
    #[must_use]
    #[inline]
    pub const fn inverse_pi_tree(&self) -> &BpTree<MAX_DEGREE> {
        &self.inverse
    }

    /// The cross-link table.
    #[must_use]
    #[inline]
    pub const fn link_table(&self) -> &LinkTable {
        &self.links
    }

    /// Shape statistics of both trees.
    #[must_use]
    pub fn statistics(&self) -> PerTree<TreeStatistics> {
        PerTree {
            pi: self.pi.statistics(),
            inverse: self.inverse.statistics(),
        }
    }

    /// Cumulative structural-event counters of both trees.
    #[must_use]
    pub const fn performance_counters(&self) -> PerTree<PerformanceCounters> {
        PerTree {
            pi: self.pi.performance_counters(),
            inverse: self.inverse.performance_counters(),
        }
    }

    /// Zero the structural-event counters of both trees.
    pub const fn reset_performance_counters(&mut self) {
        self.pi.reset_performance_counters();
        self.inverse.reset_performance_counters();
    }

    /// Byte accounting for both trees and the link table.
    #[must_use]
    pub fn get_memory_usage_info(&self) -> MemoryUsageInfo {
        let pi = self.pi.memory_usage();
        let inverse = self.inverse.memory_usage();
        let link_table_bytes: usize = self.links.size_in_bytes();

        // Tree and table headers are counted by their own reports.
        let header_bytes: usize =
            size_of::<Self>() - 2 * size_of::<BpTree<MAX_DEGREE>>() - size_of::<LinkTable>();

        MemoryUsageInfo {
            pi,
            inverse,
            link_table_bytes,
            total_bytes: header_bytes + pi.total_bytes + inverse.total_bytes + link_table_bytes,
        }
    }

    /// Total bytes owned by the permutation.
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        self.get_memory_usage_info().total_bytes
    }
}

impl<const MAX_DEGREE: usize> StdFmt::Display for DynamicPermutation<MAX_DEGREE> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_list().entries(self.to_pi_vector()).finish()
    }
}

impl<const MAX_DEGREE: usize> PartialEq for DynamicPermutation<MAX_DEGREE> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<const MAX_DEGREE: usize> Eq for DynamicPermutation<MAX_DEGREE> {}

impl<const MAX_DEGREE: usize> TryFrom<&[usize]> for DynamicPermutation<MAX_DEGREE> {
    type Error = PermutationError;

    fn try_from(values: &[usize]) -> Result<Self, Self::Error> {
        Self::from_slice(values)
    }
}

impl<'a, const MAX_DEGREE: usize> IntoIterator for &'a DynamicPermutation<MAX_DEGREE> {
    type Item = usize;
    type IntoIter = Iter<'a, MAX_DEGREE>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
//  Iter
// ============================================================================

/// Iterator over π(0), π(1), … returned by [`DynamicPermutation::iter`].
#[derive(Debug, Clone)]
pub struct Iter<'a, const MAX_DEGREE: usize> {
    items: ItemIter<'a, MAX_DEGREE>,
    inverse: &'a BpTree<MAX_DEGREE>,
    links: &'a LinkTable,
}

impl<const MAX_DEGREE: usize> Iterator for Iter<'_, MAX_DEGREE> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let item: PermutationItem = self.items.next()?;
        let value: Option<usize> = self.inverse.rank_of(self.links, item.link);
        debug_assert!(value.is_some(), "broken link for {:?}", item.link);
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<const MAX_DEGREE: usize> ExactSizeIterator for Iter<'_, MAX_DEGREE> {}
