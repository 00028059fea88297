//! # `dynperm`
//!
//! A dynamic permutation: a bijection π over `[0, n)` that supports O(log n)
//! evaluation of π and π⁻¹ together with insertion and deletion of elements
//! at arbitrary positions.
//!
//! ## Design
//!
//! The permutation is stored twice, in two count-indexed B+trees:
//!
//! - the **pi-tree** holds one item per element in position order
//! - the **inverse-pi-tree** holds one item per element in value order
//!
//! Both copies of an element carry the same [`ItemId`], whose slot in a
//! shared [`LinkTable`](link::LinkTable) records the leaf holding each copy.
//! π(i) is the in-order rank of the counterpart of the i-th pi item, found by
//! climbing parent links from its leaf. Values and positions are never
//! stored, so an insert or erase shifts every later index for free.
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `access`, `inverse` | O(log n) |
//! | `insert`, `erase`, `move_pi_index` | O(log n) amortized |
//! | `build`, `to_pi_vector`, `sort_leaf_containers` | O(n) |
//! | `verify` | O(n log n) |
//!
//! ## Example
//!
//! ```rust
//! use dynperm::DynamicPermutation;
//!
//! let mut perm: DynamicPermutation = DynamicPermutation::new();
//! perm.insert(0, 0)?; // [0]
//! perm.insert(0, 0)?; // [0, 1]
//! perm.insert(1, 2)?; // [0, 2, 1]
//!
//! assert_eq!(perm.access(1)?, 2);
//! assert_eq!(perm.inverse(1)?, 2);
//! assert_eq!(perm.to_string(), "[0, 2, 1]");
//! perm.verify()?;
//! # Ok::<(), dynperm::PermutationError>(())
//! ```
//!
//! ## Tuning
//!
//! `MAX_DEGREE` (default [`DEFAULT_MAX_DEGREE`]) bounds both the fan-out of
//! internal nodes and the capacity of leaves. Instances with different
//! degrees are different types and coexist freely.
//!
//! ## Logging
//!
//! With the `tracing` feature, structural events (splits, merges, borrows,
//! root changes, bulk loads, compaction, failed audits) are emitted through
//! the `tracing` crate. Without it the logging macros compile to nothing.
//!
//! ## Thread Safety
//!
//! There is no internal synchronization. Shared references may be read from
//! several threads at once; mutation needs `&mut` and therefore exclusive
//! access.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::inline_always)]

pub mod builder;
pub mod container;
pub mod error;
pub mod internode;
pub mod item;
pub mod link;
pub mod node;
pub mod permutation;
pub mod stats;
pub mod tree;

mod tracing_helpers;

/// Default maximum degree of both trees.
pub const DEFAULT_MAX_DEGREE: usize = 64;

// Re-export main types for convenience
pub use builder::DynamicPermutationBuilder;
pub use error::PermutationError;
pub use item::{ItemId, PermutationItem};
pub use permutation::DynamicPermutation;
pub use stats::{MemoryUsageInfo, PerTree, PerformanceCounters, TreeStatistics};
