//! Rendering of analyzed spans to Markdown and of results to JSON.

mod json;
mod markdown;
mod options;

pub use json::{to_json, JsonFormat};
pub use markdown::{render_spans_to_markdown, render_spans_with_options, MarkdownRenderer};
pub use options::{PageSelection, RenderOptions};
