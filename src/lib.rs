//! # pdfsemantic
//!
//! Semantic structure inference for PDF documents.
//!
//! PDF pages are positioned glyphs and drawing operations; headings,
//! emphasis and strike-through exist only visually. This library recovers
//! them from font usage and geometry, reads the tagged structure tree when
//! the document has one, and renders the result as Markdown.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfsemantic::{analyze_file, RenderOptions};
//!
//! fn main() -> pdfsemantic::Result<()> {
//!     let doc = analyze_file("document.pdf")?;
//!
//!     println!("Body font size: {:?}", doc.classification.body_font_size());
//!     println!("{}", doc.to_markdown(&RenderOptions::default()));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Components
//!
//! - **Font classification**: clusters fonts by family/weight/style and
//!   assigns heading, body, emphasis and small roles by size ratio
//! - **Strike-through detection**: thin lines or rectangles across the middle
//!   of a text run
//! - **Tagged structure**: the document's own structure tree with role-map
//!   resolution
//! - **Markdown assembly**: paragraphs from vertical gaps, inline bold/italic
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod accuracy;
pub mod analysis;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod structure;

// Re-export commonly used types
pub use analysis::{ClassificationResult, StrikeOptions};
pub use error::{Error, Result};
pub use model::{
    BBox, FontCluster, FontMetrics, FontRole, FontStyle, FontUsage, FontWeight, GlyphRecord,
    LineSegment, PageContent, RectShape, Span, StructureElement,
};
pub use parser::{ErrorMode, LopdfBackend, PdfBackend, PipelineOptions};
pub use pipeline::{AnalyzedDocument, CrossCheck, Pipeline};
pub use render::{JsonFormat, PageSelection, RenderOptions};

use std::path::Path;

/// Analyze a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use pdfsemantic::analyze_file;
///
/// let doc = analyze_file("document.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn analyze_file<P: AsRef<Path>>(path: P) -> Result<AnalyzedDocument> {
    Pipeline::default().analyze_file(path)
}

/// Analyze a PDF held in memory with default options.
pub fn analyze_bytes(data: &[u8]) -> Result<AnalyzedDocument> {
    Pipeline::default().analyze_bytes(data)
}

/// Convert a PDF file to Markdown.
///
/// # Example
///
/// ```no_run
/// use pdfsemantic::convert_file;
///
/// let markdown = convert_file("document.pdf").unwrap();
/// std::fs::write("output.md", markdown).unwrap();
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(analyze_file(path)?.to_markdown(&RenderOptions::default()))
}

/// Convert a PDF held in memory to Markdown.
pub fn convert_bytes(data: &[u8]) -> Result<String> {
    Ok(analyze_bytes(data)?.to_markdown(&RenderOptions::default()))
}

/// Read the tagged structure tree of a PDF file.
///
/// Untagged documents give an empty list; only failures to open the file
/// are errors.
///
/// # Example
///
/// ```no_run
/// use pdfsemantic::structure_tree_file;
///
/// for elem in structure_tree_file("tagged.pdf").unwrap() {
///     println!("{}", elem.element_type);
/// }
/// ```
pub fn structure_tree_file<P: AsRef<Path>>(path: P) -> Result<Vec<StructureElement>> {
    let backend = LopdfBackend::load_file(path)?;
    Ok(structure::extract_structure_tree(&backend))
}
