//! The node content model for mind maps.
//!
//! Every node carries one [`ContentBody`] - plain text, rich text, a table,
//! or a code block - optionally combined with an [`ImageAttachment`]. Content
//! describes *what* a node shows; how large the rendered result is comes from
//! the [`measure`](crate::measure) contract, and where it goes comes from the
//! layout engine.
//!
//! # Overview
//!
//! - [`NodeContent`] - A body plus an optional image attachment
//! - [`ContentBody`] - The textual/tabular/code payload of a node
//! - [`ImageAttachment`] - An image with intrinsic size and a placement side
//!
//! All content types serialize as plain records so trees can be exchanged
//! with external collaborators (persistence, clipboard, plugins).

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// The textual payload of a node.
///
/// Rich-text editing itself is out of scope; [`RichText`] only models the
/// already-edited span structure so it can be measured and persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentBody {
    /// A single run of plain text, wrapped at the configured node width.
    PlainText(String),
    /// Styled spans produced by an external rich-text editor.
    RichText(RichText),
    /// A rows-by-columns grid of plain-text cells.
    Table(Table),
    /// A fenced code block rendered in a monospace face without wrapping.
    CodeBlock(CodeBlock),
}

impl ContentBody {
    /// Returns true for bodies that reserve space for a content-kind icon.
    ///
    /// Tables and code blocks render with a leading glyph in the node chrome;
    /// plain and rich text do not.
    pub fn has_kind_icon(&self) -> bool {
        matches!(self, ContentBody::Table(_) | ContentBody::CodeBlock(_))
    }
}

impl Default for ContentBody {
    fn default() -> Self {
        ContentBody::PlainText(String::new())
    }
}

/// Styled text as a sequence of spans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    spans: Vec<RichTextSpan>,
}

impl RichText {
    /// Creates rich text from the given spans.
    pub fn new(spans: Vec<RichTextSpan>) -> Self {
        Self { spans }
    }

    /// Returns the spans of this rich text.
    pub fn spans(&self) -> &[RichTextSpan] {
        &self.spans
    }

    /// Concatenates all span texts into one plain string.
    ///
    /// Measurement treats rich text as its plain projection; hosts that need
    /// exact styled metrics measure in their renderer and use the
    /// positions-only layout path.
    pub fn to_plain_text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// One styled run within a [`RichText`] body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextSpan {
    /// The span's text content.
    pub text: String,
    /// Bold styling flag.
    #[serde(default)]
    pub bold: bool,
    /// Italic styling flag.
    #[serde(default)]
    pub italic: bool,
}

impl RichTextSpan {
    /// Creates an unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }
}

/// A grid of plain-text cells.
///
/// Rows may have differing lengths; the column count is the longest row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates a table from rows of cells.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Returns the rows of this table.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the number of columns (the longest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Returns the cell at the given row and column, if present.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}

/// A fenced code block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    language: Option<String>,
    source: String,
}

impl CodeBlock {
    /// Creates a code block with an optional language tag.
    pub fn new(language: Option<String>, source: impl Into<String>) -> Self {
        Self {
            language,
            source: source.into(),
        }
    }

    /// Returns the language tag, if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Returns the raw source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the source split into lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.source.lines()
    }
}

/// Which side of the content box an attached image occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImagePlacement {
    /// Image to the left of the content: widths add, heights take the max.
    Left,
    /// Image to the right of the content: widths add, heights take the max.
    Right,
    /// Image above the content: heights add, widths take the max.
    Above,
    /// Image below the content: heights add, widths take the max.
    Below,
}

/// An image attached to a node, with an intrinsic pixel size.
///
/// The image box is merged with the measured content box by the layout
/// engine, not by the measurer. Asynchronously loading images must report a
/// placeholder size immediately and trigger a later re-layout once the real
/// dimensions resolve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageAttachment {
    width: f32,
    height: f32,
    placement: ImagePlacement,
}

impl ImageAttachment {
    /// Creates an attachment with the given intrinsic size and placement.
    pub fn new(width: f32, height: f32, placement: ImagePlacement) -> Self {
        Self {
            width,
            height,
            placement,
        }
    }

    /// Returns the intrinsic size of the image.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns which side of the content this image occupies.
    pub fn placement(&self) -> ImagePlacement {
        self.placement
    }
}

/// The complete content of one node: a body plus an optional image.
///
/// # Examples
///
/// ```
/// # use dendrite_core::content::{ImageAttachment, ImagePlacement, NodeContent};
/// let plain = NodeContent::plain_text("Central topic");
/// assert!(plain.image().is_none());
///
/// let with_image = NodeContent::plain_text("Travel plans")
///     .with_image(ImageAttachment::new(64.0, 64.0, ImagePlacement::Left));
/// assert!(with_image.image().is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeContent {
    body: ContentBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<ImageAttachment>,
}

impl NodeContent {
    /// Creates content from an explicit body.
    pub fn new(body: ContentBody) -> Self {
        Self {
            body,
            image: None,
        }
    }

    /// Creates plain-text content.
    pub fn plain_text(text: impl Into<String>) -> Self {
        Self::new(ContentBody::PlainText(text.into()))
    }

    /// Creates rich-text content from spans.
    pub fn rich_text(spans: Vec<RichTextSpan>) -> Self {
        Self::new(ContentBody::RichText(RichText::new(spans)))
    }

    /// Creates table content from rows of cells.
    pub fn table(rows: Vec<Vec<String>>) -> Self {
        Self::new(ContentBody::Table(Table::new(rows)))
    }

    /// Creates code-block content.
    pub fn code_block(language: Option<String>, source: impl Into<String>) -> Self {
        Self::new(ContentBody::CodeBlock(CodeBlock::new(language, source)))
    }

    /// Attaches an image (builder style).
    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    /// Returns the body of this content.
    pub fn body(&self) -> &ContentBody {
        &self.body
    }

    /// Returns the attached image, if any.
    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }
}
