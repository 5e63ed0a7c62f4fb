//! Configuration for the Dendrite layout engine.
//!
//! [`LayoutConfig`] groups the spacing, sizing and text knobs the engine
//! reads during a pass. It implements [`serde::Deserialize`] so hosts can
//! load it from external sources, and defaults match a comfortable desktop
//! mind map.
//!
//! # Example
//!
//! ```
//! # use dendrite::config::LayoutConfig;
//! let config = LayoutConfig::default()
//!     .with_sibling_spacing(30.0)
//!     .with_horizontal_gap(100.0);
//! assert_eq!(config.sibling_spacing(), 30.0);
//! ```

use serde::Deserialize;

use dendrite_core::{geometry::Size, measure::TextStyle};

/// Spacing, sizing and text configuration for layout passes.
///
/// # Default Values
///
/// | Property | Default |
/// |----------|---------|
/// | Sibling spacing | `20.0` px |
/// | Horizontal gap | `60.0` px |
/// | Minimum node width | `40.0` px |
/// | Minimum node height | `28.0` px |
/// | Maximum node width | `320.0` px |
/// | Icon reserved width | `18.0` px |
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical space between adjacent sibling subtree bands.
    sibling_spacing: f32,

    /// Horizontal space between a parent's leading edge and its children.
    horizontal_gap: f32,

    /// Floor for measured node widths.
    min_node_width: f32,

    /// Floor for measured node heights.
    min_node_height: f32,

    /// Width at which wrapping text bodies break into extra lines.
    max_node_width: f32,

    /// Extra width reserved for the content-kind icon on tables and code.
    icon_reserved_width: f32,

    /// Text style handed to the content measurer.
    text: TextStyle,
}

impl LayoutConfig {
    /// Sets the vertical spacing between sibling subtree bands (builder style).
    pub fn with_sibling_spacing(mut self, spacing: f32) -> Self {
        self.sibling_spacing = spacing;
        self
    }

    /// Sets the horizontal gap between parent and children (builder style).
    pub fn with_horizontal_gap(mut self, gap: f32) -> Self {
        self.horizontal_gap = gap;
        self
    }

    /// Sets the minimum node box size (builder style).
    pub fn with_min_node_size(mut self, width: f32, height: f32) -> Self {
        self.min_node_width = width;
        self.min_node_height = height;
        self
    }

    /// Sets the wrap width for text bodies (builder style).
    pub fn with_max_node_width(mut self, width: f32) -> Self {
        self.max_node_width = width;
        self
    }

    /// Sets the width reserved for content-kind icons (builder style).
    pub fn with_icon_reserved_width(mut self, width: f32) -> Self {
        self.icon_reserved_width = width;
        self
    }

    /// Sets the text style handed to the measurer (builder style).
    pub fn with_text(mut self, text: TextStyle) -> Self {
        self.text = text;
        self
    }

    /// Returns the vertical spacing between sibling subtree bands.
    pub fn sibling_spacing(&self) -> f32 {
        self.sibling_spacing
    }

    /// Returns the horizontal gap between parent and children.
    pub fn horizontal_gap(&self) -> f32 {
        self.horizontal_gap
    }

    /// Returns the minimum node box size.
    pub fn min_node_size(&self) -> Size {
        Size::new(self.min_node_width, self.min_node_height)
    }

    /// Returns the wrap width for text bodies.
    pub fn max_node_width(&self) -> f32 {
        self.max_node_width
    }

    /// Returns the width reserved for content-kind icons.
    pub fn icon_reserved_width(&self) -> f32 {
        self.icon_reserved_width
    }

    /// Returns the text style handed to the measurer.
    pub fn text(&self) -> &TextStyle {
        &self.text
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sibling_spacing: 20.0,
            horizontal_gap: 60.0,
            min_node_width: 40.0,
            min_node_height: 28.0,
            max_node_width: 320.0,
            icon_reserved_width: 18.0,
            text: TextStyle::default(),
        }
    }
}
