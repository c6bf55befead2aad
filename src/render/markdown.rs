//! Markdown assembly from annotated spans.

use crate::model::Span;

use super::RenderOptions;

/// Render spans as Markdown paragraphs with default options.
///
/// Spans are taken in order. A vertical gap larger than 10 points between
/// consecutive spans starts a new paragraph; paragraphs are separated by a
/// blank line. No spans give an empty string.
pub fn render_spans_to_markdown(spans: &[Span]) -> String {
    render_spans_with_options(spans, &RenderOptions::default())
}

/// Render spans as Markdown paragraphs.
pub fn render_spans_with_options(spans: &[Span], options: &RenderOptions) -> String {
    MarkdownRenderer::new(options.clone()).render_paragraphs(spans)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render the spans of one page.
    ///
    /// Consecutive spans sharing a heading role become one ATX heading; the
    /// runs between them are rendered as paragraphs. Blocks are separated by
    /// a blank line.
    pub fn render_page(&self, spans: &[Span]) -> String {
        if !self.options.render_headings {
            return self.render_paragraphs(spans);
        }

        let mut blocks = Vec::new();
        let mut start = 0;
        while start < spans.len() {
            let level = self.heading_level(&spans[start]);
            let end = spans[start..]
                .iter()
                .position(|s| self.heading_level(s) != level)
                .map_or(spans.len(), |offset| start + offset);

            let block = match level {
                Some(level) => self.render_heading(&spans[start..end], level),
                None => self.render_paragraphs(&spans[start..end]),
            };
            if !block.is_empty() {
                blocks.push(block);
            }
            start = end;
        }

        blocks.join("\n\n")
    }

    /// Group spans into paragraphs by vertical gap and apply inline styles.
    pub fn render_paragraphs(&self, spans: &[Span]) -> String {
        let mut paragraphs = Vec::new();
        let mut buffer = String::new();
        let mut prev_y: Option<f32> = None;

        for span in spans {
            let y = span.vertical_ref();
            if let Some(prev) = prev_y {
                if (prev - y).abs() > self.options.paragraph_gap && !buffer.is_empty() {
                    paragraphs.push(std::mem::take(&mut buffer));
                }
            }
            buffer.push_str(&self.apply_inline_style(span));
            prev_y = Some(y);
        }

        if !buffer.is_empty() {
            paragraphs.push(buffer);
        }

        paragraphs.join("\n\n")
    }

    fn heading_level(&self, span: &Span) -> Option<u8> {
        span.role
            .and_then(|role| role.heading_level())
            .map(|level| level.min(self.options.max_heading_level))
    }

    fn render_heading(&self, spans: &[Span], level: u8) -> String {
        let mut text = String::new();
        let mut prev_y: Option<f32> = None;

        for span in spans {
            // Fragments of one line are concatenated, wrapped lines get a space.
            let new_line = prev_y.is_some_and(|prev| (prev - span.vertical_ref()).abs() > 1.0);
            if new_line && !text.ends_with(char::is_whitespace) {
                text.push(' ');
            }
            text.push_str(&span.text);
            prev_y = Some(span.vertical_ref());
        }

        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            return String::new();
        }

        format!("{} {}", "#".repeat(level as usize), text)
    }

    fn apply_inline_style(&self, span: &Span) -> String {
        let text = span.text.as_str();
        if text.trim().is_empty() {
            return text.to_string();
        }

        // Innermost first
        let mut result = text.to_string();
        if self.options.mark_strikethrough && span.is_struck() {
            result = format!("~~{}~~", result);
        }
        match (span.is_bold, span.is_italic) {
            (true, true) => format!("***{}***", result),
            (true, false) => format!("**{}**", result),
            (false, true) => format!("*{}*", result),
            (false, false) => result,
        }
    }
}
