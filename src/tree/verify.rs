//! Full structural audit of one tree.
//!
//! Recomputes every cached count from the leaves up and checks it against
//! the stored value, together with the balance, occupancy, height, parent
//! and link-table invariants. Intended for tests and debugging; O(n).

use crate::error::PermutationError;
use crate::link::LinkTable;
use crate::node::{Node, NodeId};
use crate::tracing_helpers::warn_log;

use super::BpTree;

impl<const MAX_DEGREE: usize> BpTree<MAX_DEGREE> {
    /// Check every invariant of this tree.
    ///
    /// # Errors
    /// [`PermutationError::InvariantViolation`] describing the first
    /// inconsistency found.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(side = self.side.name()))
    )]
    pub fn verify(&self, links: &LinkTable) -> Result<(), PermutationError> {
        let result: Result<(), PermutationError> = self.verify_inner(links);

        if result.is_err() {
            warn_log!(side = self.side.name(), result = ?result, "verify failed");
        }

        result
    }

    fn verify_inner(&self, links: &LinkTable) -> Result<(), PermutationError> {
        let total: usize = self.verify_node(self.root, None, 0, links)?;
        if total != self.len {
            return Err(self.violation(format_args!(
                "holds {total} items but records len {}",
                self.len
            )));
        }

        let live: usize = self.nodes.iter().filter(|n| !n.is_vacant()).count();
        if live + self.vacant.len() != self.nodes.len() {
            return Err(self.violation(format_args!(
                "{} live nodes and {} vacant slots in an arena of {}",
                live,
                self.vacant.len(),
                self.nodes.len()
            )));
        }
        for &id in &self.vacant {
            if !self.nodes.get(id.index()).is_some_and(Node::is_vacant) {
                return Err(self.violation(format_args!("free list entry {id:?} is in use")));
            }
        }

        let reachable: usize = self.count_reachable();
        if reachable != live {
            return Err(self.violation(format_args!(
                "{reachable} nodes reachable from the root but {live} in the arena"
            )));
        }

        Ok(())
    }

    /// Audit the subtree at `id` and return its item count.
    fn verify_node(
        &self,
        id: NodeId,
        parent: Option<NodeId>,
        depth: usize,
        links: &LinkTable,
    ) -> Result<usize, PermutationError> {
        let Some(node) = self.nodes.get(id.index()) else {
            return Err(self.violation(format_args!("{id:?} is outside the arena")));
        };

        if node.parent() != parent {
            return Err(self.violation(format_args!(
                "{id:?} records parent {:?}, expected {parent:?}",
                node.parent()
            )));
        }

        let is_root: bool = parent.is_none();
        match node {
            Node::Vacant => Err(self.violation(format_args!("{id:?} is vacant but linked"))),

            Node::Leaf(leaf) => {
                if depth != self.height {
                    return Err(self.violation(format_args!(
                        "leaf {id:?} at depth {depth}, tree height {}",
                        self.height
                    )));
                }
                self.check_occupancy(id, leaf.len(), is_root, 0)?;

                for (pos, item) in leaf.iter().enumerate() {
                    if links.leaf(self.side, item.link) != Some(id) {
                        return Err(self.violation(format_args!(
                            "item {:?} at {id:?}[{pos}] is linked to {:?}",
                            item.link,
                            links.leaf(self.side, item.link)
                        )));
                    }
                }
                Ok(leaf.len())
            }

            Node::Internal(internal) => {
                let Some(expected_height) = self.height.checked_sub(depth + 1) else {
                    return Err(self.violation(format_args!(
                        "internal {id:?} at depth {depth}, tree height {}",
                        self.height
                    )));
                };
                if internal.height() as usize != expected_height {
                    return Err(self.violation(format_args!(
                        "internal {id:?} has height {}, expected {expected_height}",
                        internal.height()
                    )));
                }
                if internal.children().len() != internal.counts().len() {
                    return Err(self.violation(format_args!(
                        "internal {id:?} has mismatched child and count arrays"
                    )));
                }
                self.check_occupancy(id, internal.degree(), is_root, 2)?;

                let mut total: usize = 0;
                for (idx, (&child, &cached)) in
                    internal.children().iter().zip(internal.counts()).enumerate()
                {
                    let actual: usize = self.verify_node(child, Some(id), depth + 1, links)?;
                    if actual != cached {
                        return Err(self.violation(format_args!(
                            "internal {id:?} caches {cached} for child {idx} ({child:?}) holding {actual}"
                        )));
                    }
                    total += actual;
                }
                Ok(total)
            }
        }
    }

    /// Occupancy bounds: `[MIN_OCCUPANCY, MAX_DEGREE]` for non-root nodes,
    /// `[root_min, MAX_DEGREE]` for the root.
    fn check_occupancy(
        &self,
        id: NodeId,
        occupancy: usize,
        is_root: bool,
        root_min: usize,
    ) -> Result<(), PermutationError> {
        let min: usize = if is_root { root_min } else { Self::MIN_OCCUPANCY };
        if occupancy < min || occupancy > MAX_DEGREE {
            return Err(self.violation(format_args!(
                "{id:?} holds {occupancy} entries, outside [{min}, {MAX_DEGREE}]"
            )));
        }
        Ok(())
    }

    fn count_reachable(&self) -> usize {
        let mut stack: Vec<NodeId> = vec![self.root];
        let mut count: usize = 0;
        while let Some(id) = stack.pop() {
            count += 1;
            if let Some(Node::Internal(node)) = self.nodes.get(id.index()) {
                stack.extend_from_slice(node.children());
            }
        }
        count
    }

    fn violation(&self, detail: std::fmt::Arguments<'_>) -> PermutationError {
        PermutationError::InvariantViolation(format!("{} tree: {detail}", self.side.name()))
    }
}
