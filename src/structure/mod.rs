//! Tagged PDF structure.
//!
//! A tagged document carries a logical structure tree (`StructTreeRoot` in
//! the catalog) describing headings, paragraphs, lists and so on, with
//! marked-content ids linking nodes to page content. Custom tag names are
//! resolved through the tree's `RoleMap`.
//!
//! The tree is used next to the font-based inference as a cross-check; see
//! [`crate::pipeline::AnalyzedDocument::cross_check`].

mod extractor;
mod summary;

pub use extractor::{extract_structure_tree, is_tagged, MAX_STRUCTURE_DEPTH};
pub use summary::{document_structure_summary, structure_summary};
