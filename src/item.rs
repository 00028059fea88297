//! Filepath: src/item.rs
//!
//! The atomic payload stored in both trees.
//!
//! An element of the permutation is stored twice: once in the pi-tree at its
//! position and once in the inverse-pi-tree at its value. Both copies carry
//! the same [`ItemId`], which names the element's slot in the
//! [`LinkTable`](crate::link::LinkTable). The slot records which leaf holds
//! each copy, so either copy can find its counterpart without any pointer
//! between the trees.
//!
//! The logical value is never stored: π(i) is the in-order rank of the
//! counterpart copy, so shifting every later value on insert or erase costs
//! nothing.

use std::fmt as StdFmt;

/// Identity of one permutation element.
///
/// `index` selects a slot in the link table; `generation` is bumped every time
/// that slot is released, so an id that outlives its element never resolves.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId {
    index: u32,
    generation: u32,
}

impl ItemId {
    /// Create an id from its raw parts.
    #[must_use]
    #[inline(always)]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Generation-0 id for slot `index`, as issued by a dense table.
    ///
    /// # Panics
    /// Panics if `index` does not fit in `u32`.
    #[must_use]
    #[inline]
    pub fn dense(index: usize) -> Self {
        let raw = u32::try_from(index).unwrap_or(u32::MAX);
        assert!(raw != u32::MAX, "link table exhausted");
        Self::new(raw, 0)
    }

    /// Slot index in the link table.
    #[must_use]
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Generation of the slot when this id was issued.
    #[must_use]
    #[inline(always)]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl StdFmt::Debug for ItemId {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        write!(f, "#{}g{}", self.index, self.generation)
    }
}

/// A single permutation entry as stored in a leaf container.
///
/// The same value is stored in the pi-tree and the inverse-pi-tree; `link`
/// is the cross-reference that ties the two copies together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PermutationItem {
    /// The element's slot in the link table.
    pub link: ItemId,
}

impl PermutationItem {
    /// Wrap an element id.
    #[must_use]
    #[inline(always)]
    pub const fn new(link: ItemId) -> Self {
        Self { link }
    }
}

impl From<ItemId> for PermutationItem {
    fn from(link: ItemId) -> Self {
        Self::new(link)
    }
}
