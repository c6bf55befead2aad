//! Strike-through reconstruction from line and rectangle graphics.
//!
//! PDF has no strike-through text attribute. A strike mark is drawn as an
//! independent line or thin filled rectangle that happens to cross the
//! middle of a text run, so it is recovered geometrically here.

use crate::model::{BBox, LineSegment, RectShape, Span};

/// Thresholds for strike-through detection.
#[derive(Debug, Clone, PartialEq)]
pub struct StrikeOptions {
    /// Lower edge of the acceptance band, as a fraction of span height from the top
    pub band_low: f32,

    /// Upper edge of the acceptance band, as a fraction of span height from the top
    pub band_high: f32,

    /// Minimum horizontal coverage (fraction of the span width)
    pub min_cover: f32,

    /// Maximum rectangle height, as a fraction of span height
    pub max_rect_thickness: f32,

    /// Also accept marks that cover `min_cover` of their own width
    pub object_relative_cover: bool,
}

impl StrikeOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vertical acceptance band.
    pub fn with_band(mut self, low: f32, high: f32) -> Self {
        self.band_low = low.min(high);
        self.band_high = high.max(low);
        self
    }

    /// Set the minimum horizontal coverage.
    pub fn with_min_cover(mut self, min_cover: f32) -> Self {
        self.min_cover = min_cover.clamp(0.0, 1.0);
        self
    }

    /// Set the maximum rectangle thickness.
    pub fn with_max_rect_thickness(mut self, fraction: f32) -> Self {
        self.max_rect_thickness = fraction.max(0.0);
        self
    }

    /// Enable or disable object-relative coverage.
    pub fn with_object_relative_cover(mut self, enabled: bool) -> Self {
        self.object_relative_cover = enabled;
        self
    }
}

impl Default for StrikeOptions {
    fn default() -> Self {
        Self {
            band_low: 0.35,
            band_high: 0.65,
            min_cover: 0.6,
            max_rect_thickness: 0.08,
            object_relative_cover: false,
        }
    }
}

/// Whether any line or thin rectangle strikes through `span`.
///
/// Lines are tested before rectangles and the first accepted candidate wins.
/// Degenerate spans (zero height or width) are never struck. A mark normally
/// has to cover `min_cover` of the span's width; also accepting marks that
/// cover `min_cover` of their own width is opt-in through
/// [`StrikeOptions::with_object_relative_cover`].
pub fn is_struck_span(
    span: &BBox,
    lines: &[LineSegment],
    rects: &[RectShape],
    options: &StrikeOptions,
) -> bool {
    let height = span.height();
    if height <= 0.0 || span.width() <= 0.0 {
        return false;
    }

    let band_top = span.top + options.band_low * height;
    let band_bottom = span.top + options.band_high * height;
    let in_band = |y: f32| y >= band_top && y <= band_bottom;

    let line_hit = lines.iter().any(|line| {
        in_band(line.y0)
            && in_band(line.y1)
            && covers(span, line.x0, line.x1, line.width(), options)
    });
    if line_hit {
        return true;
    }

    let max_thickness = options.max_rect_thickness * height;
    rects.iter().any(|rect| {
        rect.height() <= max_thickness
            && in_band(rect.mid_y())
            && covers(span, rect.x0, rect.x1, rect.width(), options)
    })
}

/// Flag every span that does not carry a strike-through flag yet.
///
/// Returns the number of spans found struck.
pub fn annotate_strikethrough(
    spans: &mut [Span],
    lines: &[LineSegment],
    rects: &[RectShape],
    options: &StrikeOptions,
) -> usize {
    let mut struck = 0;
    for span in spans.iter_mut() {
        if span.strikethrough.is_some() {
            continue;
        }
        let hit = is_struck_span(&span.bbox(), lines, rects, options);
        if hit {
            struck += 1;
        }
        span.mark_strikethrough(hit);
    }
    if struck > 0 {
        log::debug!("Detected {} struck span(s)", struck);
    }
    struck
}

fn covers(span: &BBox, x0: f32, x1: f32, object_width: f32, options: &StrikeOptions) -> bool {
    let overlap = span.horizontal_overlap(x0, x1);
    if overlap <= 0.0 {
        return false;
    }
    if overlap >= options.min_cover * span.width() {
        return true;
    }
    options.object_relative_cover
        && object_width > 0.0
        && overlap >= options.min_cover * object_width
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> BBox {
        BBox::new(10.0, 50.0, 100.0, 110.0)
    }

    fn hline(x0: f32, x1: f32, y: f32) -> LineSegment {
        LineSegment::new(x0, x1, y, y)
    }

    #[test]
    fn test_line_through_middle() {
        let opts = StrikeOptions::default();
        assert!(is_struck_span(&span(), &[hline(9.0, 51.0, 105.0)], &[], &opts));
    }

    #[test]
    fn test_line_outside_band() {
        let opts = StrikeOptions::default();
        // Overline region
        assert!(!is_struck_span(&span(), &[hline(9.0, 51.0, 102.0)], &[], &opts));
        // Underline region
        assert!(!is_struck_span(&span(), &[hline(9.0, 51.0, 108.0)], &[], &opts));
    }

    #[test]
    fn test_partial_coverage_threshold() {
        let line = [hline(10.0, 30.0, 105.0)];
        assert!(!is_struck_span(&span(), &line, &[], &StrikeOptions::default()));
        assert!(is_struck_span(
            &span(),
            &line,
            &[],
            &StrikeOptions::default().with_min_cover(0.4)
        ));
    }

    #[test]
    fn test_object_relative_cover() {
        let line = [hline(10.0, 30.0, 105.0)];
        assert!(!StrikeOptions::default().object_relative_cover);
        assert!(!is_struck_span(&span(), &line, &[], &StrikeOptions::default()));

        let opts = StrikeOptions::default().with_object_relative_cover(true);
        assert!(is_struck_span(&span(), &line, &[], &opts));
        // A disjoint mark never counts.
        assert!(!is_struck_span(&span(), &[hline(60.0, 80.0, 105.0)], &[], &opts));
    }

    #[test]
    fn test_reversed_line_direction() {
        let opts = StrikeOptions::default();
        assert!(is_struck_span(&span(), &[hline(51.0, 9.0, 105.0)], &[], &opts));
    }

    #[test]
    fn test_slanted_line_rejected() {
        let opts = StrikeOptions::default();
        let line = LineSegment::new(9.0, 51.0, 104.0, 109.0);
        assert!(!is_struck_span(&span(), &[line], &[], &opts));
    }

    #[test]
    fn test_thin_rect() {
        let opts = StrikeOptions::default();
        let thin = RectShape::new(10.0, 50.0, 104.8, 105.4);
        assert!(is_struck_span(&span(), &[], &[thin], &opts));

        // Too thick to be a strike mark (highlight box)
        let thick = RectShape::new(10.0, 50.0, 103.0, 107.0);
        assert!(!is_struck_span(&span(), &[], &[thick], &opts));

        // Thin but sitting on the baseline
        let low = RectShape::new(10.0, 50.0, 109.0, 109.5);
        assert!(!is_struck_span(&span(), &[], &[low], &opts));
    }

    #[test]
    fn test_degenerate_inputs() {
        let opts = StrikeOptions::default();
        let flat = BBox::new(10.0, 50.0, 100.0, 100.0);
        assert!(!is_struck_span(&flat, &[hline(9.0, 51.0, 100.0)], &[], &opts));
        assert!(!is_struck_span(&span(), &[], &[], &opts));
    }

    #[test]
    fn test_annotate_sets_flags_once() {
        let mut spans = vec![
            Span::new("gone", span(), 0.0),
            Span::new("kept", BBox::new(10.0, 50.0, 200.0, 210.0), 0.0),
        ];
        let lines = [hline(9.0, 51.0, 105.0)];
        let count = annotate_strikethrough(&mut spans, &lines, &[], &StrikeOptions::default());
        assert_eq!(count, 1);
        assert_eq!(spans[0].strikethrough, Some(true));
        assert_eq!(spans[1].strikethrough, Some(false));

        // A second pass with no graphics does not overwrite.
        annotate_strikethrough(&mut spans, &[], &[], &StrikeOptions::default());
        assert_eq!(spans[0].strikethrough, Some(true));
    }

    #[test]
    fn test_options_builder() {
        let opts = StrikeOptions::new()
            .with_band(0.7, 0.3)
            .with_min_cover(1.5)
            .with_max_rect_thickness(0.1);
        assert_eq!(opts.band_low, 0.3);
        assert_eq!(opts.band_high, 0.7);
        assert_eq!(opts.min_cover, 1.0);
        assert_eq!(opts.max_rect_thickness, 0.1);
    }
}
