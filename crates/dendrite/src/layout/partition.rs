//! The root-only left/right partition of children.
//!
//! Only the root grows in both directions. Its children are split into two
//! ordered groups purely by index: the first half (rounded up) grows right,
//! the remainder grows left. No side attribute is stored, so inserting or
//! reordering a root child can silently reassign later siblings' sides -
//! preserved behavior, not a bug.

use dendrite_core::tree::NodeId;

/// The two ordered sibling groups of a partitioned root.
#[derive(Debug, Clone, Copy)]
pub struct RootSplit<'a> {
    right: &'a [NodeId],
    left: &'a [NodeId],
}

impl<'a> RootSplit<'a> {
    /// Children growing to the right of the root, in index order.
    pub fn right(&self) -> &'a [NodeId] {
        self.right
    }

    /// Children growing to the left of the root, in index order.
    pub fn left(&self) -> &'a [NodeId] {
        self.left
    }
}

/// The root-only partition policy.
#[derive(Debug, Clone, Copy)]
pub struct RootPartitioner;

impl RootPartitioner {
    /// Splits a root's children by index: the first half (rounded up) goes
    /// right, the rest goes left.
    pub fn split(children: &[NodeId]) -> RootSplit<'_> {
        let right_count = children.len().div_ceil(2);
        let (right, left) = children.split_at(right_count);
        RootSplit { right, left }
    }
}
