//! Filepath: src/link.rs
//!
//! Cross-reference table between the pi-tree and the inverse-pi-tree.
//!
//! Each permutation element owns one [`LinkSlot`]. The slot records the arena
//! id of the leaf that currently holds the element's item on each side. Trees
//! never point into each other; they only rewrite their own side of a slot
//! whenever an item changes leaf.
//!
//! ```text
//!   pi-tree leaf n3            LinkTable            inverse-pi-tree leaf n7
//!   [.., #5g0, ..]   ──►   slot 5: pi=n3 inv=n7   ◄──   [.., #5g0, ..]
//! ```
//!
//! Released slots bump their generation before going on the free list, so a
//! stale [`ItemId`] resolves to `None` instead of to a recycled element.

use crate::item::ItemId;
use crate::node::NodeId;

// ============================================================================
//  Side
// ============================================================================

/// Which of the two trees a leaf id refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The position-ordered tree.
    Pi = 0,

    /// The value-ordered tree.
    Inverse = 1,
}

impl Side {
    /// The other tree.
    #[must_use]
    #[inline(always)]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Pi => Self::Inverse,
            Self::Inverse => Self::Pi,
        }
    }

    /// Short name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pi => "pi",
            Self::Inverse => "inverse-pi",
        }
    }
}

// ============================================================================
//  LinkSlot
// ============================================================================

/// One element's entry in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkSlot {
    generation: u32,
    live: bool,
    leaves: [NodeId; 2],
}

impl LinkSlot {
    const fn fresh(generation: u32) -> Self {
        Self {
            generation,
            live: true,
            leaves: [NodeId::DANGLING; 2],
        }
    }

    /// Leaf holding the element on `side`.
    #[must_use]
    #[inline(always)]
    pub const fn leaf(&self, side: Side) -> NodeId {
        self.leaves[side as usize]
    }
}

// ============================================================================
//  LinkTable
// ============================================================================

/// Slot table indexed by [`ItemId`].
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    slots: Vec<LinkSlot>,
    free: Vec<u32>,
    live: usize,
}

impl LinkTable {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Create a table with `n` live slots, ids `0..n` at generation 0.
    ///
    /// Used by the bulk builder; leaves start dangling and are filled in as
    /// the trees are loaded.
    ///
    /// # Panics
    /// Panics if `n` ids do not fit in `u32`.
    #[must_use]
    pub fn with_dense(n: usize) -> Self {
        assert!(
            u32::try_from(n).is_ok_and(|n| n != u32::MAX),
            "link table exhausted"
        );
        Self {
            slots: vec![LinkSlot::fresh(0); n],
            free: Vec::new(),
            live: n,
        }
    }

    /// Number of live elements.
    #[must_use]
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no element is live.
    #[must_use]
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots, live or free.
    #[must_use]
    #[inline(always)]
    pub const fn capacity_slots(&self) -> usize {
        self.slots.len()
    }

    /// Issue an id for a new element, reusing a freed slot when possible.
    pub fn allocate(&mut self) -> ItemId {
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(!slot.live, "allocate: free list holds a live slot");
            *slot = LinkSlot::fresh(slot.generation);
            return ItemId::new(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        assert!(index != u32::MAX, "link table exhausted");
        self.slots.push(LinkSlot::fresh(0));
        ItemId::new(index, 0)
    }

    /// Release an element's slot. Its id (and every copy of it) goes stale.
    ///
    /// # Panics
    /// Panics if `id` is not live.
    pub fn release(&mut self, id: ItemId) {
        let slot = &mut self.slots[id.index()];
        assert!(
            slot.live && slot.generation == id.generation(),
            "release of stale item {id:?}"
        );

        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.leaves = [NodeId::DANGLING; 2];
        self.live -= 1;

        #[expect(
            clippy::cast_possible_truncation,
            reason = "slot indexes are issued as u32"
        )]
        self.free.push(id.index() as u32);
    }

    /// Resolve a live id.
    #[must_use]
    #[inline]
    pub fn get(&self, id: ItemId) -> Option<&LinkSlot> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.live && slot.generation == id.generation())
    }

    /// Returns `true` if `id` names a live element.
    #[must_use]
    #[inline]
    pub fn is_live(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Leaf holding `id` on `side`, if the id is live and placed.
    #[must_use]
    #[inline]
    pub fn leaf(&self, side: Side, id: ItemId) -> Option<NodeId> {
        self.get(id)
            .map(|slot| slot.leaf(side))
            .filter(|leaf| !leaf.is_dangling())
    }

    /// Record that `id` now lives in `leaf` on `side`.
    ///
    /// # Panics
    /// Panics in debug mode if `id` is stale.
    #[inline]
    pub fn set_leaf(&mut self, side: Side, id: ItemId, leaf: NodeId) {
        let slot = &mut self.slots[id.index()];
        debug_assert!(
            slot.live && slot.generation == id.generation(),
            "set_leaf on stale item {id:?}"
        );
        slot.leaves[side as usize] = leaf;
    }

    /// Drop every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }

    /// Renumber live slots densely in the order given by `order`.
    ///
    /// `order` must list every live id exactly once. Returns the remap table
    /// indexed by old slot index; the caller rewrites the items in both trees.
    /// Generations restart at 0 because no old id survives the remap.
    pub fn compact(&mut self, order: impl IntoIterator<Item = ItemId>) -> Vec<ItemId> {
        let mut remap = vec![ItemId::new(u32::MAX, u32::MAX); self.slots.len()];
        let mut slots = Vec::with_capacity(self.live);

        for old in order {
            let slot = self.slots[old.index()];
            debug_assert!(slot.live && slot.generation == old.generation());

            #[expect(
                clippy::cast_possible_truncation,
                reason = "compacted table is no larger than the old one"
            )]
            let new = ItemId::new(slots.len() as u32, 0);
            remap[old.index()] = new;
            slots.push(LinkSlot { generation: 0, ..slot });
        }

        debug_assert_eq!(slots.len(), self.live, "compact: order missed live ids");
        self.slots = slots;
        self.free = Vec::new();
        remap
    }

    /// Bytes owned by the table.
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        size_of::<Self>()
            + self.slots.capacity() * size_of::<LinkSlot>()
            + self.free.capacity() * size_of::<u32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_resolve() {
        let mut table = LinkTable::new();
        let a = table.allocate();
        let b = table.allocate();

        assert_eq!(table.len(), 2);
        assert_ne!(a, b);
        assert!(table.is_live(a));
        assert_eq!(table.leaf(Side::Pi, a), None);

        table.set_leaf(Side::Pi, a, NodeId::new(3));
        table.set_leaf(Side::Inverse, a, NodeId::new(8));
        assert_eq!(table.leaf(Side::Pi, a), Some(NodeId::new(3)));
        assert_eq!(table.leaf(Side::Inverse, a), Some(NodeId::new(8)));
        assert_eq!(table.leaf(Side::Pi, b), None);
    }

    #[test]
    fn test_release_invalidates_stale_id() {
        let mut table = LinkTable::new();
        let a = table.allocate();
        table.set_leaf(Side::Pi, a, NodeId::new(1));
        table.release(a);

        assert!(!table.is_live(a));
        assert_eq!(table.leaf(Side::Pi, a), None);
        assert!(table.is_empty());

        // Slot is reused under a new generation.
        let b = table.allocate();
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
        assert!(!table.is_live(a));
        assert!(table.is_live(b));
        assert_eq!(table.leaf(Side::Pi, b), None);
    }

    #[test]
    #[should_panic(expected = "release of stale item")]
    fn test_double_release_panics() {
        let mut table = LinkTable::new();
        let a = table.allocate();
        table.release(a);
        table.release(a);
    }

    #[test]
    fn test_compact_renumbers_in_order() {
        let mut table = LinkTable::new();
        let ids: Vec<ItemId> = (0..5).map(|_| table.allocate()).collect();
        for (i, &id) in ids.iter().enumerate() {
            table.set_leaf(Side::Pi, id, NodeId::new(i));
        }
        table.release(ids[1]);
        table.release(ids[3]);

        let order = [ids[4], ids[0], ids[2]];
        let remap = table.compact(order);

        assert_eq!(table.len(), 3);
        assert_eq!(table.capacity_slots(), 3);
        assert_eq!(remap[ids[4].index()], ItemId::new(0, 0));
        assert_eq!(remap[ids[0].index()], ItemId::new(1, 0));
        assert_eq!(remap[ids[2].index()], ItemId::new(2, 0));
        assert_eq!(table.leaf(Side::Pi, ItemId::new(0, 0)), Some(NodeId::new(4)));
        assert_eq!(table.leaf(Side::Pi, ItemId::new(2, 0)), Some(NodeId::new(2)));
    }

    #[test]
    fn test_with_dense() {
        let table = LinkTable::with_dense(4);
        assert_eq!(table.len(), 4);
        assert!(table.is_live(ItemId::new(3, 0)));
        assert!(!table.is_live(ItemId::new(4, 0)));
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Pi.opposite(), Side::Inverse);
        assert_eq!(Side::Inverse.opposite(), Side::Pi);
    }
}
