//! Dendrite - A layout engine for mind-map trees.
//!
//! Dendrite positions the nodes of an n-ary mind-map tree whose nodes carry
//! independently varying content (wrapping text, tables, code blocks,
//! images) and independently toggled expand/collapse state. Every visible
//! node receives non-overlapping, vertically centered coordinates growing
//! left and right of a root anchored at a fixed point on screen.
//!
//! The engine neither creates nor destroys nodes and draws nothing: it only
//! computes `position` and `size` fields on an existing tree. Drawing,
//! hit-testing, editing and persistence formats belong to the hosting
//! application.
//!
//! # Examples
//!
//! ```
//! use dendrite::{LayoutEngine, content::NodeContent, geometry::Point, tree::NodeTree};
//!
//! let mut tree = NodeTree::new("root", NodeContent::plain_text("Central topic"));
//! tree.add_child(tree.root(), "plan", NodeContent::plain_text("Plan"))
//!     .expect("fresh id");
//! tree.add_child(tree.root(), "notes", NodeContent::plain_text("Notes"))
//!     .expect("fresh id");
//!
//! let engine = LayoutEngine::new();
//! engine.layout(&mut tree, Point::new(400.0, 300.0));
//!
//! // The root's box is centered on the anchor.
//! let center = tree.node(tree.root()).bounds().center();
//! assert!((center.x() - 400.0).abs() < 0.01);
//! assert!((center.y() - 300.0).abs() < 0.01);
//! ```
//!
//! After an edit, call [`LayoutEngine::layout`] again with the same anchor;
//! the pass is a full recomputation and the root stays pinned. Hosts that
//! measure content themselves (for example DOM-measured rich text) write
//! sizes onto the nodes and use [`LayoutEngine::layout_positions_only`].

pub mod config;

mod layout;

pub use dendrite_core::{content, geometry, identifier, measure, tree};

pub use layout::{GrowthDirection, LayoutEngine, MeasurementPolicy};
