//! Accuracy measurement for generated Markdown.
//!
//! Both documents are reduced to flat element lists with line patterns, then
//! compared per element kind by count. Positions and content are not matched.

mod elements;
mod score;

pub use elements::{extract_elements, AccuracyElement, ElementKind, MarkdownScanner};
pub use score::{score_elements, score_markdown, AccuracyReport, TypeScore};
