//! Text spans and the graphics primitives they are compared against.

use serde::{Deserialize, Serialize};

use super::FontRole;

/// Axis-aligned bounding box in top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub x1: f32,
    /// Distance from the top of the page to the top edge
    pub top: f32,
    /// Distance from the top of the page to the bottom edge
    pub bottom: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, x1: f32, top: f32, bottom: f32) -> Self {
        Self {
            x0,
            x1,
            top,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Length of the horizontal overlap with `[x0, x1]` (0 when disjoint).
    pub fn horizontal_overlap(&self, x0: f32, x1: f32) -> f32 {
        let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        (self.x1.min(hi) - self.x0.max(lo)).max(0.0)
    }
}

/// A run of text sharing one font context.
///
/// `top`/`bottom` are top-down and used for geometry tests; `y0` is the
/// bottom-up bottom edge used for vertical-gap logic. The two frames are
/// never mixed within one computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub x0: f32,
    pub x1: f32,
    pub top: f32,
    pub bottom: f32,
    pub y0: f32,
    /// Base font name
    pub font_name: String,
    /// Effective font size in points
    pub font_size: f32,
    pub is_bold: bool,
    pub is_italic: bool,
    /// Set by strike-through detection
    pub strikethrough: Option<bool>,
    /// Set by role assignment
    pub role: Option<FontRole>,
}

impl Span {
    /// Create a plain span with an empty font context.
    pub fn new(text: impl Into<String>, bbox: BBox, y0: f32) -> Self {
        Self {
            text: text.into(),
            x0: bbox.x0,
            x1: bbox.x1,
            top: bbox.top,
            bottom: bbox.bottom,
            y0,
            font_name: String::new(),
            font_size: 0.0,
            is_bold: false,
            is_italic: false,
            strikethrough: None,
            role: None,
        }
    }

    /// Set font name and size.
    pub fn with_font(mut self, font_name: impl Into<String>, font_size: f32) -> Self {
        self.font_name = font_name.into();
        self.font_size = font_size;
        self
    }

    /// Set bold/italic flags.
    pub fn with_style(mut self, is_bold: bool, is_italic: bool) -> Self {
        self.is_bold = is_bold;
        self.is_italic = is_italic;
        self
    }

    /// Top-down bounding box.
    pub fn bbox(&self) -> BBox {
        BBox::new(self.x0, self.x1, self.top, self.bottom)
    }

    /// Vertical reference coordinate (bottom-up) used for paragraph gaps.
    pub fn vertical_ref(&self) -> f32 {
        self.y0
    }

    pub fn is_struck(&self) -> bool {
        self.strikethrough == Some(true)
    }

    /// Record the strike-through flag unless one is already present.
    pub fn mark_strikethrough(&mut self, struck: bool) {
        if self.strikethrough.is_none() {
            self.strikethrough = Some(struck);
        }
    }

    /// Record the role unless one is already present.
    pub fn assign_role(&mut self, role: FontRole) {
        if self.role.is_none() {
            self.role = Some(role);
        }
    }
}

/// A straight line segment in top-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x0: f32,
    pub x1: f32,
    pub y0: f32,
    pub y1: f32,
}

impl LineSegment {
    pub fn new(x0: f32, x1: f32, y0: f32, y1: f32) -> Self {
        Self { x0, x1, y0, y1 }
    }

    /// Horizontal extent, independent of drawing direction.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }
}

/// A filled or stroked rectangle in top-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectShape {
    pub x0: f32,
    pub x1: f32,
    pub top: f32,
    pub bottom: f32,
}

impl RectShape {
    pub fn new(x0: f32, x1: f32, top: f32, bottom: f32) -> Self {
        Self {
            x0,
            x1,
            top,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).abs()
    }

    /// Vertical midpoint.
    pub fn mid_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_overlap() {
        let bbox = BBox::new(10.0, 50.0, 100.0, 110.0);
        assert_eq!(bbox.horizontal_overlap(0.0, 20.0), 10.0);
        assert_eq!(bbox.horizontal_overlap(30.0, 20.0), 10.0);
        assert_eq!(bbox.horizontal_overlap(60.0, 80.0), 0.0);
        assert_eq!(bbox.height(), 10.0);
    }

    #[test]
    fn test_annotations_are_append_only() {
        let mut span = Span::new("x", BBox::new(0.0, 1.0, 0.0, 1.0), 0.0);
        span.mark_strikethrough(true);
        span.mark_strikethrough(false);
        assert_eq!(span.strikethrough, Some(true));

        span.assign_role(FontRole::H2);
        span.assign_role(FontRole::Body);
        assert_eq!(span.role, Some(FontRole::H2));
    }
}
