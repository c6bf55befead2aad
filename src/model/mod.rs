//! Data model shared by the provider, the analysis passes and rendering.
//!
//! Spans and graphics primitives come out of the provider per page; the
//! analysis passes annotate spans in place (role and strike-through flags are
//! only ever added, never overwritten) and the renderer consumes them.

mod font;
mod page;
mod span;
mod structure;

pub use font::{FontCluster, FontMetrics, FontRole, FontStyle, FontUsage, FontWeight, GlyphRecord};
pub use page::PageContent;
pub use span::{BBox, LineSegment, RectShape, Span};
pub use structure::{StructureElement, Walk};
