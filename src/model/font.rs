//! Font-level types: glyph records, derived metrics, usages and clusters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One positioned character as reported by the document provider.
///
/// Records are consumed by the metrics extractor and not retained.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRecord {
    /// Horizontal advance in text-space points (0 when unknown)
    pub width: f32,
    /// Effective font size in points
    pub size: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl GlyphRecord {
    /// Create a new glyph record.
    pub fn new(width: f32, size: f32, font_name: impl Into<String>) -> Self {
        Self {
            width,
            size,
            font_name: font_name.into(),
        }
    }
}

/// Font weight inferred from the font name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
    Light,
}

impl FontWeight {
    /// Lowercase name used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
            FontWeight::Light => "light",
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Font style inferred from the font name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    /// Lowercase name used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics derived from the glyphs drawn with one font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontMetrics {
    /// Family name with style suffixes stripped
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    /// Whether glyph advances are (nearly) uniform
    pub is_monospace: bool,
    /// Mean of the positive glyph widths
    pub mean_width: f32,
    /// Population variance of the positive glyph widths
    pub width_variance: f32,
    /// Nominal size (size of the first glyph record)
    pub size: f32,
}

/// A single observation of a font being used at a given size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontUsage {
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub size: f32,
}

impl FontUsage {
    /// Create a new usage instance. `family` is expected to be normalized.
    pub fn new(family: impl Into<String>, weight: FontWeight, style: FontStyle, size: f32) -> Self {
        Self {
            family: family.into(),
            weight,
            style,
            size,
        }
    }

    /// Build a usage from extracted metrics at an explicit size.
    pub fn from_metrics(metrics: &FontMetrics, size: f32) -> Self {
        Self::new(metrics.family.clone(), metrics.weight, metrics.style, size)
    }
}

/// Structural role assigned to a font cluster or span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontRole {
    H1,
    H2,
    H3,
    H4,
    Body,
    Emphasis,
    Small,
}

impl FontRole {
    /// Heading level (1-4) for heading roles.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            FontRole::H1 => Some(1),
            FontRole::H2 => Some(2),
            FontRole::H3 => Some(3),
            FontRole::H4 => Some(4),
            _ => None,
        }
    }

    /// Whether this role is one of the heading roles.
    pub fn is_heading(&self) -> bool {
        self.heading_level().is_some()
    }

    /// Lowercase role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FontRole::H1 => "h1",
            FontRole::H2 => "h2",
            FontRole::H3 => "h3",
            FontRole::H4 => "h4",
            FontRole::Body => "body",
            FontRole::Emphasis => "emphasis",
            FontRole::Small => "small",
        }
    }
}

impl fmt::Display for FontRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group of font usages sharing family, weight and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontCluster {
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    /// Representative size (median of observed sizes)
    pub size: f32,
    /// Number of usages in the cluster
    pub count: usize,
    /// 1 - normalized stddev of sizes, in [0, 1]
    pub confidence: f32,
    /// Inferred role, `None` until classification assigns one
    pub role: Option<FontRole>,
}

impl FontCluster {
    /// Whether the cluster is upright, regular-weight text.
    pub fn is_plain(&self) -> bool {
        self.weight == FontWeight::Normal && self.style == FontStyle::Normal
    }
}
