//! Filepath: src/builder.rs
//!
//! One-shot batch construction of a [`DynamicPermutation`].
//!
//! The builder collects a complete permutation, validates it, and bulk-loads
//! both trees bottom-up in O(n) instead of performing n single inserts. It
//! accepts the permutation either as π (values in position order) or as π⁻¹
//! (positions in value order); the latter can be streamed back to front
//! with [`push_front`](DynamicPermutationBuilder::push_front).
//!
//! ```rust
//! use dynperm::{DynamicPermutation, DynamicPermutationBuilder};
//!
//! // π = [2, 0, 1], given as π⁻¹ = [1, 2, 0] streamed from the end.
//! let mut builder: DynamicPermutationBuilder = DynamicPermutationBuilder::new_inverse();
//! for pos in [0, 2, 1] {
//!     builder.push_front(pos);
//! }
//! let perm: DynamicPermutation = builder.finish()?;
//! assert_eq!(perm.to_pi_vector(), vec![2, 0, 1]);
//! # Ok::<(), dynperm::PermutationError>(())
//! ```

use std::collections::VecDeque;

use crate::DEFAULT_MAX_DEGREE;
use crate::error::{InvalidPermutationReason, PermutationError};
use crate::permutation::DynamicPermutation;

/// Which array the builder is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// `values[i] = π(i)`.
    Pi,

    /// `values[v] = π⁻¹(v)`.
    Inverse,
}

/// Batch constructor for [`DynamicPermutation`].
#[derive(Debug, Clone)]
pub struct DynamicPermutationBuilder<const MAX_DEGREE: usize = DEFAULT_MAX_DEGREE> {
    orientation: Orientation,
    values: VecDeque<usize>,
}

impl<const MAX_DEGREE: usize> Default for DynamicPermutationBuilder<MAX_DEGREE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const MAX_DEGREE: usize> DynamicPermutationBuilder<MAX_DEGREE> {
    /// Builder collecting π in position order.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            orientation: Orientation::Pi,
            values: VecDeque::new(),
        }
    }

    /// Builder collecting π in position order, with room for `n` values.
    #[must_use]
    pub fn with_capacity(n: usize) -> Self {
        Self {
            orientation: Orientation::Pi,
            values: VecDeque::with_capacity(n),
        }
    }

    /// Builder collecting π⁻¹ in value order.
    #[must_use]
    pub const fn new_inverse() -> Self {
        Self {
            orientation: Orientation::Inverse,
            values: VecDeque::new(),
        }
    }

    /// What the collected values mean.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of values collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append the next value.
    pub fn push(&mut self, value: usize) {
        self.values.push_back(value);
    }

    /// Prepend a value, for arrays streamed from the end.
    pub fn push_front(&mut self, value: usize) {
        self.values.push_front(value);
    }

    /// Validate the collected array and build a new permutation.
    ///
    /// # Errors
    /// [`PermutationError::InvalidPermutation`] if the array is not a
    /// bijection on `[0, len)`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(n = self.values.len()))
    )]
    pub fn finish(self) -> Result<DynamicPermutation<MAX_DEGREE>, PermutationError> {
        let mut perm = DynamicPermutation::new();
        self.build_into(&mut perm)?;
        Ok(perm)
    }

    /// Validate the collected array and replace the contents of `perm`.
    ///
    /// # Errors
    /// [`PermutationError::InvalidPermutation`] if the array is not a
    /// bijection on `[0, len)`; `perm` is left unchanged.
    pub fn build_into(
        self,
        perm: &mut DynamicPermutation<MAX_DEGREE>,
    ) -> Result<(), PermutationError> {
        let values: Vec<usize> = Vec::from(self.values);
        match self.orientation {
            Orientation::Pi => {
                let inverse: Vec<usize> = invert(&values)?;
                perm.load(&inverse);
            }
            Orientation::Inverse => {
                invert(&values)?;
                perm.load(&values);
            }
        }
        Ok(())
    }
}

impl<const MAX_DEGREE: usize> Extend<usize> for DynamicPermutationBuilder<MAX_DEGREE> {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}

impl<const MAX_DEGREE: usize> FromIterator<usize> for DynamicPermutationBuilder<MAX_DEGREE> {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut builder = Self::new();
        builder.extend(iter);
        builder
    }
}

/// Inverse of `values`, checking that it is a bijection on `[0, len)`.
///
/// # Errors
/// [`PermutationError::InvalidPermutation`] naming the first offending
/// position.
pub(crate) fn invert(values: &[usize]) -> Result<Vec<usize>, PermutationError> {
    let n: usize = values.len();
    let mut inverse: Vec<usize> = vec![usize::MAX; n];

    for (position, &value) in values.iter().enumerate() {
        if value >= n {
            return Err(PermutationError::InvalidPermutation {
                position,
                value,
                reason: InvalidPermutationReason::ValueOutOfDomain,
            });
        }
        let first_position: usize = inverse[value];
        if first_position != usize::MAX {
            return Err(PermutationError::InvalidPermutation {
                position,
                value,
                reason: InvalidPermutationReason::DuplicateValue { first_position },
            });
        }
        inverse[value] = position;
    }

    Ok(inverse)
}
