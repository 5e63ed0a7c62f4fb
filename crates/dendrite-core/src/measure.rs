//! Content measurement for mind-map nodes.
//!
//! The layout engine never guesses how big rendered content is; it asks a
//! [`ContentMeasurer`]. The contract is synchronous and deterministic for
//! identical content and style within one layout pass - the engine calls it
//! once per node per layout and caches nothing itself.
//!
//! # Overview
//!
//! - [`TextStyle`] - Font and padding configuration for measurement
//! - [`MeasureConstraints`] - Optional wrap width for text bodies
//! - [`ContentMeasurer`] - The measurement contract consumed by the engine
//! - [`ShapedTextMeasurer`] - Accurate measurement via cosmic-text shaping
//! - [`CharMetricMeasurer`] - Deterministic glyph-advance approximation
//!
//! Text wraps at the constraint width and overflow grows height via extra
//! lines, never clipping. Tables and code blocks report a box independent of
//! the text-wrap policy. Image boxes are merged by the layout engine, not
//! here.

use std::sync::{Arc, Mutex, OnceLock};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::info;
use serde::Deserialize;

use crate::{
    content::{CodeBlock, ContentBody, Table},
    geometry::{Insets, Size},
};

/// Conversion factor from font points to pixels at standard DPI.
const PT_TO_PX: f32 = 1.33;

/// Line height as a multiple of the pixel font size.
const LINE_HEIGHT_FACTOR: f32 = 1.15;

/// Approximate glyph advance as a fraction of the pixel font size, used when
/// no shaped metrics are available.
const FALLBACK_ADVANCE_FACTOR: f32 = 0.55;

/// Font and padding configuration used when measuring node content.
///
/// # Default Values
///
/// | Property | Default |
/// |----------|---------|
/// | Font family | `"sans-serif"` |
/// | Font size | `13` points |
/// | Padding | `4.0` px on all sides |
///
/// # Examples
///
/// ```
/// # use dendrite_core::measure::TextStyle;
/// let style = TextStyle::new()
///     .with_font_family("Helvetica")
///     .with_font_size(15);
/// assert_eq!(style.font_family(), "Helvetica");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    font_family: String,
    font_size: u16,
    padding: f32,
}

impl TextStyle {
    /// Creates a new text style with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the font family (builder style).
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Sets the font size in points (builder style).
    pub fn with_font_size(mut self, size: u16) -> Self {
        self.font_size = size;
        self
    }

    /// Sets the uniform content padding in pixels (builder style).
    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    /// Returns the font family name.
    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Returns the font size in points.
    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    /// Returns the uniform padding in pixels.
    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Returns the font size converted to pixels.
    pub fn font_size_px(&self) -> f32 {
        f32::from(self.font_size) * PT_TO_PX
    }

    /// Returns the line height in pixels.
    pub fn line_height_px(&self) -> f32 {
        self.font_size_px() * LINE_HEIGHT_FACTOR
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 13,
            padding: 4.0,
        }
    }
}

/// Width constraint applied when measuring wrapping text.
///
/// Tables and code blocks ignore the constraint; only plain and rich text
/// wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeasureConstraints {
    max_width: Option<f32>,
}

impl MeasureConstraints {
    /// No wrap: text lays out on its natural lines.
    pub fn unbounded() -> Self {
        Self { max_width: None }
    }

    /// Wrap text at the given maximum width in pixels.
    pub fn wrapped(max_width: f32) -> Self {
        Self {
            max_width: Some(max_width),
        }
    }

    /// Returns the maximum width, if constrained.
    pub fn max_width(self) -> Option<f32> {
        self.max_width
    }
}

/// The measurement contract consumed by the layout engine.
///
/// Implementations must be deterministic for identical content and style
/// within one pass and side-effect-free from the engine's viewpoint.
/// Asynchronous content (remote images, webfonts) must report a placeholder
/// size immediately and trigger a later re-layout once resolved.
pub trait ContentMeasurer {
    /// Measures a run of (possibly multi-line) text.
    ///
    /// The returned box includes the style's padding. Wrapping applies when
    /// the constraints carry a maximum width; overflow grows height via
    /// extra lines, never clipping.
    fn measure_text(&self, text: &str, style: &TextStyle, constraints: MeasureConstraints)
    -> Size;

    /// Measures a table: column widths are the maximum cell width per
    /// column, row heights the maximum cell height per row.
    fn measure_table(&self, table: &Table, style: &TextStyle) -> Size {
        if table.rows().is_empty() {
            return Size::default();
        }
        let mut column_widths = vec![0.0f32; table.column_count()];
        let mut height = 0.0f32;
        for row in table.rows() {
            // An empty row still occupies one padded line.
            let mut row_height = style.line_height_px() + 2.0 * style.padding();
            for (column, cell) in row.iter().enumerate() {
                let cell_size = self.measure_text(cell, style, MeasureConstraints::unbounded());
                column_widths[column] = column_widths[column].max(cell_size.width());
                row_height = row_height.max(cell_size.height());
            }
            height += row_height;
        }
        Size::new(column_widths.iter().sum(), height)
    }

    /// Measures a code block in a monospace face on its natural lines.
    fn measure_code_block(&self, code: &CodeBlock, style: &TextStyle) -> Size {
        let mono = style.clone().with_font_family("monospace");
        self.measure_text(code.source(), &mono, MeasureConstraints::unbounded())
    }

    /// Measures a content body, dispatching on its kind.
    ///
    /// Rich text is measured as its plain projection; hosts that need exact
    /// styled metrics measure in their renderer and use the positions-only
    /// layout path instead.
    fn measure(&self, body: &ContentBody, style: &TextStyle, constraints: MeasureConstraints)
    -> Size {
        match body {
            ContentBody::PlainText(text) => self.measure_text(text, style, constraints),
            ContentBody::RichText(rich) => {
                self.measure_text(&rich.to_plain_text(), style, constraints)
            }
            ContentBody::Table(table) => self.measure_table(table, style),
            ContentBody::CodeBlock(code) => self.measure_code_block(code, style),
        }
    }
}

/// Shared `FontSystem` instance, reused across measurers to avoid expensive
/// recreation.
static FONT_SYSTEM: OnceLock<Arc<Mutex<FontSystem>>> = OnceLock::new();

/// Measures text with real font metrics and shaping via cosmic-text.
///
/// Handles ligatures, kerning and other advanced typography, so measured
/// widths match what a canvas or SVG renderer will produce with the same
/// fonts installed. Falls back to an advance-based estimate when shaping
/// yields no layout runs (for example in environments with no fonts).
pub struct ShapedTextMeasurer {
    font_system: Arc<Mutex<FontSystem>>,
}

impl ShapedTextMeasurer {
    /// Creates a measurer backed by the process-wide `FontSystem`.
    pub fn new() -> Self {
        let font_system = FONT_SYSTEM.get_or_init(|| {
            info!("Initializing FontSystem");
            Arc::new(Mutex::new(FontSystem::new()))
        });
        Self {
            font_system: Arc::clone(font_system),
        }
    }
}

impl Default for ShapedTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentMeasurer for ShapedTextMeasurer {
    fn measure_text(
        &self,
        text: &str,
        style: &TextStyle,
        constraints: MeasureConstraints,
    ) -> Size {
        if text.is_empty() {
            return Size::default();
        }

        // Lock the FontSystem for use
        let mut font_system = self.font_system.lock().expect("failed to lock FontSystem");

        let font_size_px = style.font_size_px();
        let metrics = Metrics::new(font_size_px, style.line_height_px());

        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let attrs = Attrs::new().family(family_for(style.font_family()));

        // Wrap width applies to the text itself; padding is added back on top.
        let wrap_width = constraints
            .max_width()
            .map(|width| (width - 2.0 * style.padding()).max(1.0));
        buffer.set_size(wrap_width, None);

        // Advanced shaping handles ligatures, kerning, etc.
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;

        let layout_runs: Vec<_> = buffer.layout_runs().collect();
        if !layout_runs.is_empty() {
            for last in layout_runs.iter().map(|run| run.glyphs.last()) {
                // Find rightmost glyph position
                if let Some(last) = last {
                    let run_width = last.x + last.w;
                    max_width = max_width.max(run_width);
                }
                total_height += metrics.line_height;
            }
        } else {
            // Estimate when no runs are available (no usable fonts)
            let longest_line = text.lines().map(str::len).max().unwrap_or(0);
            max_width = longest_line as f32 * (font_size_px * FALLBACK_ADVANCE_FACTOR);
            total_height = text.lines().count().max(1) as f32 * metrics.line_height;
        }

        Size::new(max_width, total_height).add_padding(Insets::uniform(style.padding()))
    }
}

/// Maps a configured family name onto a cosmic-text family, resolving the
/// CSS generic names to their font-system counterparts.
fn family_for(name: &str) -> Family<'_> {
    match name {
        "monospace" => Family::Monospace,
        "sans-serif" => Family::SansSerif,
        "serif" => Family::Serif,
        other => Family::Name(other),
    }
}

/// Deterministic advance-based measurer.
///
/// Every glyph is assumed to occupy the same fraction of the font size. The
/// result is stable across platforms and needs no font files, which makes it
/// the measurer of choice for tests and headless hosts; interactive hosts
/// should prefer [`ShapedTextMeasurer`] or their renderer's own metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharMetricMeasurer;

impl CharMetricMeasurer {
    /// Creates the measurer.
    pub fn new() -> Self {
        Self
    }
}

impl ContentMeasurer for CharMetricMeasurer {
    fn measure_text(
        &self,
        text: &str,
        style: &TextStyle,
        constraints: MeasureConstraints,
    ) -> Size {
        if text.is_empty() {
            return Size::default();
        }

        let advance = style.font_size_px() * FALLBACK_ADVANCE_FACTOR;
        let max_chars = constraints.max_width().map(|width| {
            let available = (width - 2.0 * style.padding()).max(advance);
            ((available / advance).floor() as usize).max(1)
        });

        let mut line_count = 0usize;
        let mut widest = 0usize;
        for line in text.lines() {
            match max_chars {
                Some(cap) => {
                    for visual_len in wrap_line(line, cap) {
                        widest = widest.max(visual_len);
                        line_count += 1;
                    }
                }
                None => {
                    widest = widest.max(line.chars().count());
                    line_count += 1;
                }
            }
        }
        // Text consisting only of newlines still shows one empty line.
        line_count = line_count.max(1);

        Size::new(
            widest as f32 * advance,
            line_count as f32 * style.line_height_px(),
        )
        .add_padding(Insets::uniform(style.padding()))
    }
}

/// Greedy word wrap of one input line into visual-line character counts.
///
/// Words longer than the cap are hard-split so the cap is never exceeded.
fn wrap_line(line: &str, max_chars: usize) -> Vec<usize> {
    let mut lines = Vec::new();
    let mut current = 0usize;
    for word in line.split_whitespace() {
        let mut word_len = word.chars().count();
        if word_len > max_chars {
            if current > 0 {
                lines.push(current);
                current = 0;
            }
            while word_len > max_chars {
                lines.push(max_chars);
                word_len -= max_chars;
            }
        }
        let needed = if current == 0 { word_len } else { word_len + 1 };
        if current + needed > max_chars {
            lines.push(current);
            current = word_len;
        } else {
            current += needed;
        }
    }
    if current > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}
