//! Layout engine for positioning mind-map nodes.
//!
//! This module assigns non-overlapping, vertically centered coordinates to
//! every visible node of a tree, growing left and right of the root. It
//! mutates only `position` and `size` on existing nodes, never structure.
//!
//! # Pipeline Position
//!
//! ```text
//! NodeTree (content + expand state)
//!     ↓ measure (ContentMeasurer)
//! NodeTree (sizes)
//!     ↓ layout (this module)
//! NodeTree (positions)
//!     ↓ host renderer
//! Canvas / DOM
//! ```
//!
//! # Submodules
//!
//! - [`distribute`] - Places sibling subtrees in vertical bands along a growth anchor
//! - [`engine`] - Orchestration and the public layout operations
//! - [`extent`] - Vertical space a node and its visible descendants occupy
//! - [`partition`] - The root-only left/right split of children
//!
//! # Re-exports
//!
//! - [`LayoutEngine`] - The public entry point
//! - [`MeasurementPolicy`] - Whether a pass remeasures or reuses sizes
//! - [`GrowthDirection`] - The horizontal side a subtree grows along

pub mod distribute;
pub mod engine;
pub mod extent;
pub mod partition;

pub use distribute::GrowthDirection;
pub use engine::{LayoutEngine, MeasurementPolicy};
