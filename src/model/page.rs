//! Per-page provider output.

use super::{GlyphRecord, LineSegment, RectShape, Span};

/// Everything the provider extracted from one page.
///
/// All geometry is in top-down coordinates except [`Span::y0`].
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    pub glyphs: Vec<GlyphRecord>,
    /// Spans in content-stream order
    pub spans: Vec<Span>,
    pub lines: Vec<LineSegment>,
    pub rects: Vec<RectShape>,
}

impl PageContent {
    /// Create an empty page.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            ..Default::default()
        }
    }

    /// Create an empty US Letter page (612 x 792 points).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Whether the page produced no text.
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.trim().is_empty())
    }

    /// Concatenated span text, one line per span.
    pub fn plain_text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
