//! Filepath: src/stats.rs
//!
//! Read-only reports about the two trees: shape statistics, byte accounting
//! and cumulative structural-event counters.
//!
//! Every report implements `Display`, rendering the same lines a diagnostic
//! printer would emit; the structured fields are there for callers that want
//! to log or assert on them instead.

use std::fmt as StdFmt;

// ============================================================================
//  PerTree
// ============================================================================

/// A pair of reports, one per tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerTree<T> {
    /// Report for the position-ordered tree.
    pub pi: T,

    /// Report for the value-ordered tree.
    pub inverse: T,
}

impl<T: StdFmt::Display> StdFmt::Display for PerTree<T> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        writeln!(f, "pi-tree:")?;
        writeln!(f, "{}", self.pi)?;
        writeln!(f, "inverse-pi-tree:")?;
        write!(f, "{}", self.inverse)
    }
}

// ============================================================================
//  TreeStatistics
// ============================================================================

/// Shape of one tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeStatistics {
    /// Number of internal nodes.
    pub internal_nodes: usize,

    /// Number of leaf containers.
    pub leaves: usize,

    /// Number of internal levels (0 when the root is a leaf).
    pub height: usize,

    /// Number of stored items.
    pub values: usize,

    /// Configured maximum degree.
    pub max_degree: usize,

    /// Mean number of children per internal node (0 when there are none).
    pub average_internal_degree: f64,

    /// Mean number of items per leaf.
    pub average_leaf_occupancy: f64,

    /// `leaf_occupancy_histogram[k]` is the number of leaves holding `k`
    /// items, for `k` in `0..=max_degree`.
    pub leaf_occupancy_histogram: Vec<usize>,

    /// Free arena slots awaiting reuse.
    pub vacant_slots: usize,
}

impl StdFmt::Display for TreeStatistics {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        writeln!(f, "  values:                 {}", self.values)?;
        writeln!(f, "  height:                 {}", self.height)?;
        writeln!(f, "  max degree:             {}", self.max_degree)?;
        writeln!(f, "  internal nodes:         {}", self.internal_nodes)?;
        writeln!(f, "  leaves:                 {}", self.leaves)?;
        writeln!(
            f,
            "  avg internal degree:    {:.2}",
            self.average_internal_degree
        )?;
        writeln!(
            f,
            "  avg leaf occupancy:     {:.2}",
            self.average_leaf_occupancy
        )?;
        writeln!(f, "  vacant arena slots:     {}", self.vacant_slots)?;
        write!(f, "  leaf occupancy:")?;
        for (occupancy, &count) in self.leaf_occupancy_histogram.iter().enumerate() {
            if count > 0 {
                write!(f, " {occupancy}:{count}")?;
            }
        }
        Ok(())
    }
}

// ============================================================================
//  PerformanceCounters
// ============================================================================

/// Cumulative structural events of one tree.
///
/// Counters survive `clear` and bulk builds; reset them explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceCounters {
    /// Single-item insertions.
    pub inserts: u64,

    /// Node splits (leaf and internal), including the one that grows a root.
    pub splits: u64,

    /// Single-item removals.
    pub removals: u64,

    /// Sibling merges.
    pub merges: u64,

    /// One-entry transfers from a sibling.
    pub borrows: u64,
}

impl PerformanceCounters {
    /// Zero every counter.
    pub const fn reset(&mut self) {
        *self = Self {
            inserts: 0,
            splits: 0,
            removals: 0,
            merges: 0,
            borrows: 0,
        };
    }
}

impl StdFmt::Display for PerformanceCounters {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        writeln!(f, "  insert operations:      {}", self.inserts)?;
        writeln!(f, "  splits:                 {}", self.splits)?;
        writeln!(f, "  removal operations:     {}", self.removals)?;
        writeln!(f, "  merges:                 {}", self.merges)?;
        write!(f, "  borrows:                {}", self.borrows)
    }
}

// ============================================================================
//  Memory usage
// ============================================================================

/// Byte accounting for one tree. Capacities, not lengths, are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeMemoryUsage {
    /// Number of internal nodes.
    pub internal_nodes: usize,

    /// Number of leaf containers.
    pub leaves: usize,

    /// Heap bytes owned by internal nodes (child and count arrays).
    pub internal_bytes: usize,

    /// Heap bytes owned by leaf containers (item arrays).
    pub leaf_bytes: usize,

    /// Bytes of the node arena and its free list, vacant slots included.
    pub arena_bytes: usize,

    /// Everything above plus the tree header.
    pub total_bytes: usize,
}

impl StdFmt::Display for TreeMemoryUsage {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        writeln!(
            f,
            "  internal nodes: {} ({} bytes)",
            self.internal_nodes, self.internal_bytes
        )?;
        writeln!(f, "  leaves:         {} ({} bytes)", self.leaves, self.leaf_bytes)?;
        writeln!(f, "  arena:          {} bytes", self.arena_bytes)?;
        write!(f, "  total:          {} bytes", self.total_bytes)
    }
}

/// Byte accounting for a whole permutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryUsageInfo {
    /// The position-ordered tree.
    pub pi: TreeMemoryUsage,

    /// The value-ordered tree.
    pub inverse: TreeMemoryUsage,

    /// Bytes owned by the cross-link table.
    pub link_table_bytes: usize,

    /// Sum of both trees, the link table and the permutation header.
    pub total_bytes: usize,
}

impl StdFmt::Display for MemoryUsageInfo {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        writeln!(f, "pi-tree:")?;
        writeln!(f, "{}", self.pi)?;
        writeln!(f, "inverse-pi-tree:")?;
        writeln!(f, "{}", self.inverse)?;
        writeln!(f, "link table: {} bytes", self.link_table_bytes)?;
        write!(f, "total: {} bytes", self.total_bytes)
    }
}
