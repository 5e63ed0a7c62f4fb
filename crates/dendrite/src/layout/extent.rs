//! Subtree extent calculation.
//!
//! A subtree's *extent* is the total vertical space the node and its
//! currently visible descendants must occupy so sibling subtrees never
//! overlap. Extents are recomputed fully on every call and never cached
//! across edits: content size and expand state both vary between calls.

use dendrite_core::tree::{NodeId, NodeTree};

/// Computes subtree extents for one spacing configuration.
///
/// For a node with no visible children the extent is its own height.
/// Otherwise it is `max(height, sum of child extents plus inter-sibling
/// spacing)` - a node's box never exceeds being hidden by a thinner subtree,
/// and children below a collapsed node are not counted at all.
///
/// The root's two sides are governed independently; callers aggregate them
/// per side via [`group_extent`](Self::group_extent) rather than calling
/// [`extent`](Self::extent) on the root itself.
#[derive(Debug, Clone, Copy)]
pub struct ExtentCalculator {
    spacing: f32,
}

impl ExtentCalculator {
    /// Creates a calculator with the given inter-sibling spacing.
    pub fn new(spacing: f32) -> Self {
        Self { spacing }
    }

    /// Returns the vertical extent of `node` and its visible descendants.
    pub fn extent(&self, tree: &NodeTree, node: NodeId) -> f32 {
        let current = tree.node(node);
        if !current.expanded() || current.children().is_empty() {
            return current.size().height();
        }
        let children_extent = self.group_extent(tree, current.children());
        current.size().height().max(children_extent)
    }

    /// Returns the combined extent of an ordered sibling group: the sum of
    /// each member's extent plus spacing between adjacent members.
    ///
    /// An empty group contributes zero extent.
    pub fn group_extent(&self, tree: &NodeTree, siblings: &[NodeId]) -> f32 {
        if siblings.is_empty() {
            return 0.0;
        }
        let total: f32 = siblings
            .iter()
            .map(|&sibling| self.extent(tree, sibling))
            .sum();
        total + self.spacing * (siblings.len() - 1) as f32
    }
}
