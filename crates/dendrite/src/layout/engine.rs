//! Layout orchestration and the public layout operations.
//!
//! The engine walks the tree top-down, measuring then positioning,
//! dispatching to the root partition at depth 0 and to single-direction
//! recursion below. It holds no state between calls: every invocation
//! performs a full pass over the visible tree and writes node fields in
//! place.

use log::{debug, trace};

use dendrite_core::{
    content::ImagePlacement,
    geometry::{Point, Size},
    measure::{ContentMeasurer, MeasureConstraints, ShapedTextMeasurer},
    tree::{Node, NodeId, NodeTree},
};

use crate::{
    config::LayoutConfig,
    layout::{
        distribute::{Distributor, GrowthDirection},
        extent::ExtentCalculator,
        partition::RootPartitioner,
    },
};

/// Whether a layout pass consults the measurer or trusts existing sizes.
///
/// One engine body serves both cases; [`LayoutEngine::layout`] and
/// [`LayoutEngine::layout_positions_only`] are thin wrappers selecting the
/// policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementPolicy {
    /// Remeasure every node's content before positioning.
    Remeasure,
    /// Trust the sizes already on the nodes (for example when the host
    /// measured rich text in its own renderer) and only recompute positions.
    ReuseExisting,
}

/// The mind-map layout engine.
///
/// Owns a [`LayoutConfig`] and a [`ContentMeasurer`] and exposes the four
/// layout operations. Layout never fails: degenerate trees (no children, or
/// everything collapsed) yield a root centered on the anchor, and broken
/// measurements clamp to the configured minimum box.
///
/// Calls are synchronous and single-threaded; callers in multi-threaded
/// hosts must serialize layout calls per tree. Cost is O(N) in total node
/// count for both the measuring and the positioning pass.
///
/// # Examples
///
/// ```
/// use dendrite::{LayoutEngine, config::LayoutConfig};
/// use dendrite::{content::NodeContent, geometry::Point, tree::NodeTree};
///
/// let mut tree = NodeTree::new("root", NodeContent::plain_text("Central topic"));
/// tree.add_child(tree.root(), "a", NodeContent::plain_text("First"))
///     .expect("fresh id");
///
/// let engine = LayoutEngine::new().with_config(LayoutConfig::default());
/// engine.layout(&mut tree, Point::new(400.0, 300.0));
///
/// let center = tree.node(tree.root()).bounds().center();
/// assert!((center.x() - 400.0).abs() < 0.01);
/// assert!((center.y() - 300.0).abs() < 0.01);
/// ```
pub struct LayoutEngine {
    config: LayoutConfig,
    measurer: Box<dyn ContentMeasurer>,
}

impl LayoutEngine {
    /// Creates an engine with default configuration and the shaped text
    /// measurer.
    pub fn new() -> Self {
        Self {
            config: LayoutConfig::default(),
            measurer: Box::new(ShapedTextMeasurer::new()),
        }
    }

    /// Replaces the configuration (builder style).
    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the content measurer (builder style).
    pub fn with_measurer(mut self, measurer: Box<dyn ContentMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    /// Returns the engine's configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Measures and positions the root and every currently visible
    /// descendant, centering the root's box on `anchor`.
    ///
    /// Collapsed subtrees keep whatever coordinates a prior pass gave them.
    pub fn layout(&self, tree: &mut NodeTree, anchor: Point) {
        debug!(anchor:? = anchor, nodes = tree.node_count(); "Full layout pass");
        self.run(tree, anchor, MeasurementPolicy::Remeasure);
    }

    /// Repositions without remeasuring.
    ///
    /// Used when an external collaborator (for example DOM-measured rich
    /// text) already wrote sizes and only positions need recomputation.
    pub fn layout_positions_only(&self, tree: &mut NodeTree, anchor: Point) {
        debug!(anchor:? = anchor, nodes = tree.node_count(); "Positions-only layout pass");
        self.run(tree, anchor, MeasurementPolicy::ReuseExisting);
    }

    /// Remeasures every node bottom-up without repositioning anything.
    ///
    /// Used when content changed but repositioning is deferred.
    pub fn recalculate_sizes(&self, tree: &mut NodeTree) {
        debug!(nodes = tree.node_count(); "Recalculating sizes");
        self.measure_subtree(tree, tree.root());
    }

    /// Returns the vertical extent of a node and its visible descendants.
    ///
    /// For the root the extent spans whichever is tallest of its own box and
    /// its two independently expanded sides, since both sides center on the
    /// root. Read-only; positions and sizes are left untouched.
    pub fn subtree_height(&self, tree: &NodeTree, node: NodeId) -> f32 {
        let calc = ExtentCalculator::new(self.config.sibling_spacing());
        if node != tree.root() {
            return calc.extent(tree, node);
        }
        let root = tree.node(node);
        let split = RootPartitioner::split(root.children());
        let mut height = root.size().height();
        if root.expanded_right() {
            height = height.max(calc.group_extent(tree, split.right()));
        }
        if root.expanded_left() {
            height = height.max(calc.group_extent(tree, split.left()));
        }
        height
    }

    /// The single engine body behind both layout operations.
    fn run(&self, tree: &mut NodeTree, anchor: Point, policy: MeasurementPolicy) {
        if policy == MeasurementPolicy::Remeasure {
            // One full bottom-up walk so every extent is available before
            // any positioning happens. Collapsed descendants are measured
            // too; only their positions stay stale.
            self.measure_subtree(tree, tree.root());
        }

        let root = tree.root();
        let root_size = tree.node(root).size();
        tree.node_mut(root).set_position(Point::new(
            anchor.x() - root_size.width() / 2.0,
            anchor.y() - root_size.height() / 2.0,
        ));

        let root_node = tree.node(root);
        if root_node.children().is_empty() {
            return;
        }
        let children = root_node.children().to_vec();
        let expanded_right = root_node.expanded_right();
        let expanded_left = root_node.expanded_left();
        let root_x = root_node.position().x();

        let split = RootPartitioner::split(&children);
        let distributor = Distributor::new(&self.config);
        let center_y = anchor.y();

        if expanded_right && !split.right().is_empty() {
            let anchor_x = root_x + root_size.width() + self.config.horizontal_gap();
            self.flow(
                tree,
                &distributor,
                split.right(),
                anchor_x,
                center_y,
                GrowthDirection::Right,
            );
        }
        if expanded_left && !split.left().is_empty() {
            self.flow(
                tree,
                &distributor,
                split.left(),
                root_x,
                center_y,
                GrowthDirection::Left,
            );
        }
        trace!(nodes = tree.node_count(); "Layout pass complete");
    }

    /// Distributes one sibling group, then recurses into each expanded
    /// member in the same growth direction, anchored at its leading edge.
    fn flow(
        &self,
        tree: &mut NodeTree,
        distributor: &Distributor,
        siblings: &[NodeId],
        growth_anchor_x: f32,
        center_y: f32,
        direction: GrowthDirection,
    ) {
        distributor.distribute(tree, siblings, growth_anchor_x, center_y, direction);

        for &sibling in siblings {
            let node = tree.node(sibling);
            if !node.expanded() || node.children().is_empty() {
                continue;
            }
            let children = node.children().to_vec();
            let position = node.position();
            let size = node.size();

            let child_anchor_x = match direction {
                GrowthDirection::Right => {
                    position.x() + size.width() + self.config.horizontal_gap()
                }
                GrowthDirection::Left => position.x(),
            };
            let child_center_y = position.y() + size.height() / 2.0;
            self.flow(
                tree,
                distributor,
                &children,
                child_anchor_x,
                child_center_y,
                direction,
            );
        }
    }

    /// Measures `from` and all its descendants bottom-up.
    fn measure_subtree(&self, tree: &mut NodeTree, from: NodeId) {
        for node in tree.post_order(from) {
            let size = self.measure_node(tree.node(node));
            tree.node_mut(node).set_size(size);
        }
    }

    /// Measures one node's content box, merges the image box, and applies
    /// the configured floors.
    fn measure_node(&self, node: &Node) -> Size {
        let content = node.content();
        let constraints = MeasureConstraints::wrapped(self.config.max_node_width());
        let mut size = self
            .measurer
            .measure(content.body(), self.config.text(), constraints);

        if content.body().has_kind_icon() {
            size = Size::new(size.width() + self.config.icon_reserved_width(), size.height());
        }

        if let Some(image) = content.image() {
            size = match image.placement() {
                ImagePlacement::Left | ImagePlacement::Right => {
                    size.merge_horizontal(image.size())
                }
                ImagePlacement::Above | ImagePlacement::Below => size.merge_vertical(image.size()),
            };
        }

        size.clamp_min(self.config.min_node_size())
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use float_cmp::assert_approx_eq;

    use dendrite_core::{
        content::{ImageAttachment, ImagePlacement, NodeContent},
        measure::TextStyle,
    };

    use super::*;

    /// Measurer returning prescribed boxes per text content, so tests control
    /// every size exactly.
    struct FixedMeasurer {
        sizes: HashMap<String, Size>,
        fallback: Size,
    }

    impl FixedMeasurer {
        fn new(sizes: &[(&str, f32, f32)]) -> Self {
            Self {
                sizes: sizes
                    .iter()
                    .map(|&(text, width, height)| (text.to_string(), Size::new(width, height)))
                    .collect(),
                fallback: Size::new(50.0, 20.0),
            }
        }
    }

    impl ContentMeasurer for FixedMeasurer {
        fn measure_text(
            &self,
            text: &str,
            _style: &TextStyle,
            _constraints: MeasureConstraints,
        ) -> Size {
            self.sizes.get(text).copied().unwrap_or(self.fallback)
        }
    }

    fn test_engine(sizes: &[(&str, f32, f32)]) -> LayoutEngine {
        LayoutEngine::new()
            .with_config(
                LayoutConfig::default()
                    .with_sibling_spacing(30.0)
                    .with_horizontal_gap(100.0)
                    .with_min_node_size(1.0, 1.0)
                    .with_icon_reserved_width(0.0),
            )
            .with_measurer(Box::new(FixedMeasurer::new(sizes)))
    }

    #[test]
    fn test_childless_root_centers_on_anchor() {
        let mut tree = NodeTree::new("root", NodeContent::plain_text("Central"));
        let engine = test_engine(&[("Central", 80.0, 40.0)]);

        engine.layout(&mut tree, Point::new(100.0, 100.0));

        let root = tree.node(tree.root());
        assert_approx_eq!(f32, root.position().x(), 60.0);
        assert_approx_eq!(f32, root.position().y(), 80.0);
        assert_eq!(root.size(), Size::new(80.0, 40.0));
    }

    #[test]
    fn test_two_children_split_left_and_right() {
        let mut tree = NodeTree::new("root", NodeContent::plain_text("Central"));
        tree.add_child(tree.root(), "r", NodeContent::plain_text("Right"))
            .unwrap();
        tree.add_child(tree.root(), "l", NodeContent::plain_text("Left"))
            .unwrap();
        let engine = test_engine(&[
            ("Central", 80.0, 40.0),
            ("Right", 60.0, 40.0),
            ("Left", 60.0, 40.0),
        ]);

        engine.layout(&mut tree, Point::new(0.0, 0.0));

        let root = tree.node(tree.root());
        let right = tree.node(tree.node_by_id("r").unwrap());
        let left = tree.node(tree.node_by_id("l").unwrap());

        assert_approx_eq!(
            f32,
            right.position().x(),
            root.position().x() + root.size().width() + 100.0
        );
        assert_approx_eq!(
            f32,
            left.position().x(),
            root.position().x() - left.size().width() - 100.0
        );
        // Both vertically centered on the root's center.
        assert_approx_eq!(f32, right.bounds().center().y(), 0.0);
        assert_approx_eq!(f32, left.bounds().center().y(), 0.0);
    }

    #[test]
    fn test_root_split_counts() {
        let mut tree = NodeTree::new("root", NodeContent::plain_text("Central"));
        for index in 0..5 {
            let id = format!("c{index}");
            tree.add_child(tree.root(), id.as_str(), NodeContent::plain_text("child"))
                .unwrap();
        }
        let engine = test_engine(&[("Central", 80.0, 40.0), ("child", 60.0, 40.0)]);

        engine.layout(&mut tree, Point::new(500.0, 500.0));

        let root_x = tree.node(tree.root()).position().x();
        let (mut rightward, mut leftward) = (0, 0);
        for &child in tree.node(tree.root()).children() {
            if tree.node(child).position().x() > root_x {
                rightward += 1;
            } else {
                leftward += 1;
            }
        }
        assert_eq!(rightward, 3);
        assert_eq!(leftward, 2);
    }

    #[test]
    fn test_grandchildren_grow_in_parent_direction() {
        let mut tree = NodeTree::new("root", NodeContent::plain_text("Central"));
        let r = tree
            .add_child(tree.root(), "r", NodeContent::plain_text("Right"))
            .unwrap();
        let l = tree
            .add_child(tree.root(), "l", NodeContent::plain_text("Left"))
            .unwrap();
        tree.add_child(r, "rr", NodeContent::plain_text("RightChild"))
            .unwrap();
        tree.add_child(l, "ll", NodeContent::plain_text("LeftChild"))
            .unwrap();
        let engine = test_engine(&[
            ("Central", 80.0, 40.0),
            ("Right", 60.0, 40.0),
            ("Left", 60.0, 40.0),
            ("RightChild", 60.0, 40.0),
            ("LeftChild", 60.0, 40.0),
        ]);

        engine.layout(&mut tree, Point::new(0.0, 0.0));

        let right = tree.node(tree.node_by_id("r").unwrap());
        let right_child = tree.node(tree.node_by_id("rr").unwrap());
        assert_approx_eq!(
            f32,
            right_child.position().x(),
            right.position().x() + right.size().width() + 100.0
        );
        // The grandchild centers on its parent, not on the root.
        assert_approx_eq!(
            f32,
            right_child.bounds().center().y(),
            right.bounds().center().y()
        );

        let left = tree.node(tree.node_by_id("l").unwrap());
        let left_child = tree.node(tree.node_by_id("ll").unwrap());
        assert_approx_eq!(
            f32,
            left_child.position().x(),
            left.position().x() - left_child.size().width() - 100.0
        );
    }

    #[test]
    fn test_collapsed_children_keep_stale_positions() {
        let mut tree = NodeTree::new("root", NodeContent::plain_text("Central"));
        let r = tree
            .add_child(tree.root(), "r", NodeContent::plain_text("Right"))
            .unwrap();
        let rr = tree
            .add_child(r, "rr", NodeContent::plain_text("RightChild"))
            .unwrap();
        let engine = test_engine(&[
            ("Central", 80.0, 40.0),
            ("Right", 60.0, 40.0),
            ("RightChild", 60.0, 40.0),
        ]);

        engine.layout(&mut tree, Point::new(0.0, 0.0));
        let laid_out = tree.node(rr).position();

        tree.node_mut(r).set_expanded(false);
        engine.layout(&mut tree, Point::new(777.0, 777.0));

        // The collapsed child was not repositioned.
        assert_eq!(tree.node(rr).position(), laid_out);
    }

    #[test]
    fn test_side_flags_govern_sides_independently() {
        let mut tree = NodeTree::new("root", NodeContent::plain_text("Central"));
        tree.add_child(tree.root(), "r", NodeContent::plain_text("Right"))
            .unwrap();
        let l = tree
            .add_child(tree.root(), "l", NodeContent::plain_text("Left"))
            .unwrap();
        let engine = test_engine(&[
            ("Central", 80.0, 40.0),
            ("Right", 60.0, 40.0),
            ("Left", 60.0, 40.0),
        ]);

        engine.layout(&mut tree, Point::new(0.0, 0.0));
        let left_before = tree.node(l).position();

        tree.node_mut(tree.root()).set_expanded_left(false);
        engine.layout(&mut tree, Point::new(300.0, 0.0));

        // Left side kept stale coordinates, right side moved with the anchor.
        assert_eq!(tree.node(l).position(), left_before);
        let right = tree.node(tree.node_by_id("r").unwrap());
        assert!(right.position().x() > 300.0);
    }

    #[test]
    fn test_positions_only_reuses_existing_sizes() {
        let mut tree = NodeTree::new("root", NodeContent::plain_text("Central"));
        let r = tree
            .add_child(tree.root(), "r", NodeContent::plain_text("Right"))
            .unwrap();
        let engine = test_engine(&[("Central", 80.0, 40.0), ("Right", 60.0, 40.0)]);

        // Host wrote its own measured sizes.
        tree.node_mut(tree.root()).set_size(Size::new(200.0, 64.0));
        tree.node_mut(r).set_size(Size::new(90.0, 48.0));

        engine.layout_positions_only(&mut tree, Point::new(0.0, 0.0));

        assert_eq!(tree.node(tree.root()).size(), Size::new(200.0, 64.0));
        assert_eq!(tree.node(r).size(), Size::new(90.0, 48.0));
        // Positioning still ran against those sizes.
        assert_approx_eq!(f32, tree.node(tree.root()).position().x(), -100.0);
        assert_approx_eq!(f32, tree.node(r).position().x(), 100.0 + 100.0);
    }

    #[test]
    fn test_recalculate_sizes_does_not_move_nodes() {
        let mut tree = NodeTree::new("root", NodeContent::plain_text("Central"));
        let r = tree
            .add_child(tree.root(), "r", NodeContent::plain_text("Right"))
            .unwrap();
        let engine = test_engine(&[("Central", 80.0, 40.0), ("Right", 60.0, 40.0)]);

        engine.layout(&mut tree, Point::new(0.0, 0.0));
        let position_before = tree.node(r).position();

        tree.node_mut(r)
            .set_content(NodeContent::plain_text("Renamed to something long"));
        engine.recalculate_sizes(&mut tree);

        assert_eq!(tree.node(r).position(), position_before);
        // The fallback box applies to the renamed content.
        assert_eq!(tree.node(r).size(), Size::new(50.0, 20.0));
    }

    #[test]
    fn test_image_merge_and_floors() {
        let mut tree = NodeTree::new("root", NodeContent::plain_text("Central"));
        let beside = tree
            .add_child(
                tree.root(),
                "beside",
                NodeContent::plain_text("Beside").with_image(ImageAttachment::new(
                    64.0,
                    64.0,
                    ImagePlacement::Right,
                )),
            )
            .unwrap();
        let below = tree
            .add_child(
                tree.root(),
                "below",
                NodeContent::plain_text("Below").with_image(ImageAttachment::new(
                    64.0,
                    64.0,
                    ImagePlacement::Below,
                )),
            )
            .unwrap();
        let tiny = tree
            .add_child(tree.root(), "tiny", NodeContent::plain_text("Tiny"))
            .unwrap();

        let engine = LayoutEngine::new()
            .with_config(
                LayoutConfig::default()
                    .with_min_node_size(40.0, 28.0)
                    .with_icon_reserved_width(0.0),
            )
            .with_measurer(Box::new(FixedMeasurer::new(&[
                ("Central", 80.0, 40.0),
                ("Beside", 100.0, 30.0),
                ("Below", 100.0, 30.0),
                ("Tiny", 2.0, 2.0),
            ])));

        engine.layout(&mut tree, Point::new(0.0, 0.0));

        // Image beside: widths add, heights take the max.
        assert_eq!(tree.node(beside).size(), Size::new(164.0, 64.0));
        // Image below: heights add, widths take the max.
        assert_eq!(tree.node(below).size(), Size::new(100.0, 94.0));
        // Degenerate measurement floors at the configured minimum.
        assert_eq!(tree.node(tiny).size(), Size::new(40.0, 28.0));
    }

    #[test]
    fn test_icon_width_added_for_code_blocks() {
        let mut tree = NodeTree::new("root", NodeContent::plain_text("Central"));
        let code = tree
            .add_child(
                tree.root(),
                "code",
                NodeContent::code_block(Some("rust".to_string()), "fn main() {}"),
            )
            .unwrap();

        let engine = LayoutEngine::new()
            .with_config(
                LayoutConfig::default()
                    .with_min_node_size(1.0, 1.0)
                    .with_icon_reserved_width(18.0),
            )
            .with_measurer(Box::new(FixedMeasurer::new(&[
                ("Central", 80.0, 40.0),
                ("fn main() {}", 120.0, 22.0),
            ])));

        engine.layout(&mut tree, Point::new(0.0, 0.0));

        assert_eq!(tree.node(code).size(), Size::new(138.0, 22.0));
    }

    #[test]
    fn test_layout_is_idempotent() {
        let mut tree = NodeTree::new("root", NodeContent::plain_text("Central"));
        let r = tree
            .add_child(tree.root(), "r", NodeContent::plain_text("Right"))
            .unwrap();
        tree.add_child(tree.root(), "l", NodeContent::plain_text("Left"))
            .unwrap();
        tree.add_child(r, "rr", NodeContent::plain_text("RightChild"))
            .unwrap();
        let engine = test_engine(&[
            ("Central", 80.0, 40.0),
            ("Right", 60.0, 40.0),
            ("Left", 60.0, 40.0),
            ("RightChild", 60.0, 40.0),
        ]);

        engine.layout(&mut tree, Point::new(250.0, 125.0));
        let first: Vec<_> = tree
            .post_order(tree.root())
            .into_iter()
            .map(|node| tree.node(node).position())
            .collect();

        engine.layout(&mut tree, Point::new(250.0, 125.0));
        let second: Vec<_> = tree
            .post_order(tree.root())
            .into_iter()
            .map(|node| tree.node(node).position())
            .collect();

        assert_eq!(first, second);

        let root_bounds = tree.node(tree.root()).bounds();
        assert_approx_eq!(f32, root_bounds.center().x(), 250.0);
        assert_approx_eq!(f32, root_bounds.center().y(), 125.0);
    }

    #[test]
    fn test_subtree_height_matches_extent_rules() {
        let mut tree = NodeTree::new("root", NodeContent::plain_text("Central"));
        let r = tree
            .add_child(tree.root(), "r", NodeContent::plain_text("Right"))
            .unwrap();
        for index in 0..3 {
            let id = format!("rr{index}");
            tree.add_child(r, id.as_str(), NodeContent::plain_text("grand"))
                .unwrap();
        }
        let engine = test_engine(&[
            ("Central", 80.0, 40.0),
            ("Right", 60.0, 40.0),
            ("grand", 60.0, 40.0),
        ]);
        engine.recalculate_sizes(&mut tree);

        // Grandchildren: 40*3 + 30*2 = 180.
        assert_approx_eq!(f32, engine.subtree_height(&tree, r), 180.0);
        // The root query spans its tallest side.
        assert_approx_eq!(f32, engine.subtree_height(&tree, tree.root()), 180.0);

        tree.node_mut(r).set_expanded(false);
        assert_approx_eq!(f32, engine.subtree_height(&tree, r), 40.0);
        assert_approx_eq!(f32, engine.subtree_height(&tree, tree.root()), 40.0);
    }
}
