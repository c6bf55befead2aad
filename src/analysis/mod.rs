//! Visual-to-semantic inference over extracted page content.
//!
//! - [`metrics`]: per-font width statistics and name tokens
//! - [`classifier`]: font clustering and role inference
//! - [`strike`]: strike-through reconstruction from graphics

pub mod classifier;
pub mod metrics;
pub mod strike;

pub use classifier::{assign_roles, classify_fonts, ClassificationResult};
pub use metrics::{extract_font_metrics, font_style, font_weight, normalize_family, MONOSPACE_CV_THRESHOLD};
pub use strike::{annotate_strikethrough, is_struck_span, StrikeOptions};
