//! Per-font metrics derived from glyph records and the font name.

use crate::model::{FontMetrics, FontStyle, FontWeight, GlyphRecord};

/// Coefficient of variation below which a font is treated as monospace.
pub const MONOSPACE_CV_THRESHOLD: f32 = 0.05;

const BOLD_KEYWORDS: &[&str] = &["bold", "heavy", "black"];
const LIGHT_KEYWORDS: &[&str] = &["light", "thin"];
const ITALIC_KEYWORDS: &[&str] = &["italic", "oblique"];

// Longest first so "-BoldItalic" is not left as "-Bold".
const FAMILY_SUFFIXES: &[&str] = &[
    "-BoldItalic",
    "-BoldOblique",
    ",BoldItalic",
    "-Regular",
    "-Italic",
    "-Oblique",
    ",Italic",
    "-Bold",
    "-Light",
    ",Bold",
    "-Roman",
    "-Thin",
];

/// Compute metrics for the glyphs drawn with `font_name`.
///
/// Never fails: with no positive widths the width statistics are zero and
/// the font is not considered monospace.
pub fn extract_font_metrics(glyphs: &[GlyphRecord], font_name: &str) -> FontMetrics {
    let widths: Vec<f32> = glyphs
        .iter()
        .map(|g| g.width)
        .filter(|w| *w > 0.0)
        .collect();

    let (mean_width, width_variance, is_monospace) = if widths.is_empty() {
        (0.0, 0.0, false)
    } else {
        let n = widths.len() as f32;
        let mean = widths.iter().sum::<f32>() / n;
        let variance = widths.iter().map(|w| (w - mean).powi(2)).sum::<f32>() / n;
        let cv = if mean > 0.0 {
            variance.sqrt() / mean
        } else {
            1.0
        };
        (mean, variance, cv < MONOSPACE_CV_THRESHOLD)
    };

    FontMetrics {
        family: normalize_family(font_name),
        weight: font_weight(font_name),
        style: font_style(font_name),
        is_monospace,
        mean_width,
        width_variance,
        size: glyphs.first().map(|g| g.size).unwrap_or(0.0),
    }
}

/// Weight token from a font name.
pub fn font_weight(font_name: &str) -> FontWeight {
    let lower = font_name.to_lowercase();
    if BOLD_KEYWORDS.iter().any(|k| lower.contains(k)) {
        FontWeight::Bold
    } else if LIGHT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        FontWeight::Light
    } else {
        FontWeight::Normal
    }
}

/// Style token from a font name.
pub fn font_style(font_name: &str) -> FontStyle {
    let lower = font_name.to_lowercase();
    if ITALIC_KEYWORDS.iter().any(|k| lower.contains(k)) {
        FontStyle::Italic
    } else {
        FontStyle::Normal
    }
}

/// Family name with subset tag and style suffixes removed.
///
/// `"ABCDEF+Helvetica-Bold"` becomes `"Helvetica"`.
pub fn normalize_family(font_name: &str) -> String {
    let mut name = strip_subset_tag(font_name.trim());

    for suffix in FAMILY_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped;
            break;
        }
    }

    name.to_string()
}

/// Embedded subsets carry a six uppercase-letter tag followed by '+'.
fn strip_subset_tag(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => {
            rest
        }
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyphs(widths: &[f32]) -> Vec<GlyphRecord> {
        widths
            .iter()
            .map(|w| GlyphRecord::new(*w, 10.0, "Courier"))
            .collect()
    }

    #[test]
    fn test_empty_input_is_zeroed() {
        let metrics = extract_font_metrics(&[], "Helvetica");
        assert_eq!(metrics.mean_width, 0.0);
        assert_eq!(metrics.width_variance, 0.0);
        assert_eq!(metrics.size, 0.0);
        assert!(!metrics.is_monospace);
    }

    #[test]
    fn test_zero_widths_keep_first_size() {
        let metrics = extract_font_metrics(&glyphs(&[0.0, 0.0]), "Helvetica");
        assert!(!metrics.is_monospace);
        assert_eq!(metrics.mean_width, 0.0);
        assert_eq!(metrics.size, 10.0);
    }

    #[test]
    fn test_uniform_widths_are_monospace() {
        for width in [0.5, 6.0, 600.0] {
            let metrics = extract_font_metrics(&glyphs(&[width; 8]), "Courier");
            assert!(metrics.is_monospace, "width {width}");
            assert_eq!(metrics.width_variance, 0.0);
        }
    }

    #[test]
    fn test_varied_widths_are_proportional() {
        let metrics = extract_font_metrics(&glyphs(&[2.0, 6.0, 4.0, 8.0]), "Helvetica");
        assert!(!metrics.is_monospace);
        assert!((metrics.mean_width - 5.0).abs() < 1e-6);
        assert!((metrics.width_variance - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_widths_are_ignored_in_statistics() {
        let metrics = extract_font_metrics(&glyphs(&[0.0, 6.0, 6.0]), "Courier");
        assert!(metrics.is_monospace);
        assert_eq!(metrics.mean_width, 6.0);
    }

    #[test]
    fn test_weight_and_style_tokens() {
        assert_eq!(font_weight("Arial-BoldMT"), FontWeight::Bold);
        assert_eq!(font_weight("Roboto-Black"), FontWeight::Bold);
        assert_eq!(font_weight("Lato-Thin"), FontWeight::Light);
        assert_eq!(font_weight("Times-Roman"), FontWeight::Normal);
        assert_eq!(font_style("Helvetica-Oblique"), FontStyle::Italic);
        assert_eq!(font_style("TIMES,ITALIC"), FontStyle::Italic);
        assert_eq!(font_style("Helvetica"), FontStyle::Normal);
    }

    #[test]
    fn test_normalize_family() {
        assert_eq!(normalize_family("Helvetica-Bold"), "Helvetica");
        assert_eq!(normalize_family("Helvetica-BoldOblique"), "Helvetica");
        assert_eq!(normalize_family("Arial,BoldItalic"), "Arial");
        assert_eq!(normalize_family("ABCDEF+Calibri-Italic"), "Calibri");
        assert_eq!(normalize_family("Abc+Font"), "Abc+Font");
        assert_eq!(normalize_family("Courier"), "Courier");
    }
}
