//! Sibling distribution along a growth anchor.
//!
//! The distributor places an ordered group of sibling subtrees so that each
//! occupies its own vertical band, the bands never overlap, and the whole
//! group is centered on the parent's vertical center. Horizontal placement
//! depends on the growth direction: children grow away from the root.

use log::trace;

use dendrite_core::{
    geometry::Point,
    tree::{NodeId, NodeTree},
};

use crate::{config::LayoutConfig, layout::extent::ExtentCalculator};

/// The horizontal side along which a subtree's descendants are laid out.
///
/// Direction is decided once at the root (by the partition policy) and
/// threaded through the recursion; it is never stored on nodes. Before the
/// first layout pass a node's side is therefore undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthDirection {
    /// Subtree grows to the left of the root: x decreases with depth.
    Left,
    /// Subtree grows to the right of the root: x increases with depth.
    Right,
}

impl GrowthDirection {
    /// Returns true for the leftward direction.
    pub fn is_left(self) -> bool {
        matches!(self, GrowthDirection::Left)
    }
}

/// Positions sibling subtrees in vertical bands.
///
/// For each sibling in order, its band is as tall as its subtree extent; the
/// sibling's own box is centered within the band, so a parent shorter than
/// its subtree sits at the subtree's vertical middle. The cursor then
/// advances by the band height plus spacing, which is what guarantees
/// sibling subtrees never vertically overlap regardless of depth or width.
#[derive(Debug, Clone, Copy)]
pub struct Distributor {
    spacing: f32,
    horizontal_gap: f32,
}

impl Distributor {
    /// Creates a distributor reading spacing and gap from the configuration.
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            spacing: config.sibling_spacing(),
            horizontal_gap: config.horizontal_gap(),
        }
    }

    /// Positions each sibling around `center_y` along `growth_anchor_x`.
    ///
    /// For rightward growth the anchor is the children's left edge (the
    /// parent's right edge plus the horizontal gap). For leftward growth the
    /// anchor is the parent's left edge; each sibling ends at
    /// `anchor - width - gap`.
    pub fn distribute(
        &self,
        tree: &mut NodeTree,
        siblings: &[NodeId],
        growth_anchor_x: f32,
        center_y: f32,
        direction: GrowthDirection,
    ) {
        if siblings.is_empty() {
            return;
        }

        let calc = ExtentCalculator::new(self.spacing);
        let extents: Vec<f32> = siblings
            .iter()
            .map(|&sibling| calc.extent(tree, sibling))
            .collect();
        let total_extent =
            extents.iter().sum::<f32>() + self.spacing * (siblings.len() - 1) as f32;

        let mut cursor = center_y - total_extent / 2.0;
        for (&sibling, &band) in siblings.iter().zip(&extents) {
            let size = tree.node(sibling).size();
            let y = cursor + (band - size.height()) / 2.0;
            let x = match direction {
                GrowthDirection::Right => growth_anchor_x,
                GrowthDirection::Left => growth_anchor_x - size.width() - self.horizontal_gap,
            };
            trace!(
                node:? = sibling,
                band = band,
                y = y;
                "Placed sibling band"
            );
            tree.node_mut(sibling).set_position(Point::new(x, y));
            cursor += band + self.spacing;
        }
    }
}
