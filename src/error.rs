//! Filepath: src/error.rs
//!
//! Error type shared by every fallible permutation operation.

use std::fmt as StdFmt;

// ============================================================================
//  RangeKind
// ============================================================================

/// Which argument of an operation was out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// A logical position (an index into π).
    Position,

    /// A permutation value (an index into π⁻¹).
    Value,
}

impl StdFmt::Display for RangeKind {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::Position => write!(f, "position"),
            Self::Value => write!(f, "value"),
        }
    }
}

// ============================================================================
//  InvalidPermutationReason
// ============================================================================

/// Why an input array is not a bijection on `[0, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPermutationReason {
    /// The value is `>= n`.
    ValueOutOfDomain,

    /// The value already appeared at an earlier position.
    DuplicateValue {
        /// Position of the first occurrence.
        first_position: usize,
    },
}

// ============================================================================
//  PermutationError
// ============================================================================

/// Errors returned by [`DynamicPermutation`](crate::DynamicPermutation) and
/// its builder.
///
/// Argument errors are detected before any structural mutation, so the
/// permutation is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermutationError {
    /// A position or value argument fell outside the accepted range.
    ///
    /// `bound` is the exclusive upper limit that was violated.
    OutOfRange {
        /// Which argument was rejected.
        kind: RangeKind,
        /// The rejected argument.
        index: usize,
        /// Exclusive upper bound at the time of the call.
        bound: usize,
    },

    /// The input of a bulk build is not a bijection on `[0, n)`.
    InvalidPermutation {
        /// Position of the offending entry.
        position: usize,
        /// The offending value.
        value: usize,
        /// What is wrong with it.
        reason: InvalidPermutationReason,
    },

    /// The two trees (or one tree's balance/count bookkeeping) disagree.
    ///
    /// This indicates a defect, not a runtime condition; callers should treat
    /// it as fatal.
    InvariantViolation(String),
}

impl PermutationError {
    /// Shorthand for an out-of-range position.
    #[must_use]
    pub const fn position_out_of_range(index: usize, bound: usize) -> Self {
        Self::OutOfRange {
            kind: RangeKind::Position,
            index,
            bound,
        }
    }

    /// Shorthand for an out-of-range value.
    #[must_use]
    pub const fn value_out_of_range(index: usize, bound: usize) -> Self {
        Self::OutOfRange {
            kind: RangeKind::Value,
            index,
            bound,
        }
    }

    /// Returns `true` for [`PermutationError::InvariantViolation`].
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

impl StdFmt::Display for PermutationError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::OutOfRange { kind, index, bound } => {
                write!(f, "{kind} {index} out of range (must be < {bound})")
            }

            Self::InvalidPermutation {
                position,
                value,
                reason: InvalidPermutationReason::ValueOutOfDomain,
            } => write!(
                f,
                "not a permutation: value {value} at position {position} is outside the domain"
            ),

            Self::InvalidPermutation {
                position,
                value,
                reason: InvalidPermutationReason::DuplicateValue { first_position },
            } => write!(
                f,
                "not a permutation: value {value} at position {position} already appeared at position {first_position}"
            ),

            Self::InvariantViolation(detail) => write!(f, "invariant violated: {detail}"),
        }
    }
}

impl std::error::Error for PermutationError {}
