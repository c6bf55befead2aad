//! Rendering options and configuration.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Options for rendering analyzed content.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Vertical gap (points) above which a new paragraph starts
    pub paragraph_gap: f32,

    /// Wrap struck spans in `~~`
    pub mark_strikethrough: bool,

    /// Turn heading-role spans into ATX headings
    pub render_headings: bool,

    /// Maximum heading level (1-6)
    pub max_heading_level: u8,

    /// Page selection
    pub page_selection: PageSelection,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the paragraph gap threshold.
    pub fn with_paragraph_gap(mut self, gap: f32) -> Self {
        self.paragraph_gap = gap.max(0.0);
        self
    }

    /// Enable or disable strike-through markers.
    pub fn with_strikethrough(mut self, mark: bool) -> Self {
        self.mark_strikethrough = mark;
        self
    }

    /// Enable or disable heading rendering.
    pub fn with_headings(mut self, render: bool) -> Self {
        self.render_headings = render;
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.page_selection = selection;
        self
    }

    /// Set specific page range.
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.page_selection = PageSelection::Range(range);
        self
    }

    /// Set specific pages.
    pub fn with_page_list(mut self, pages: Vec<u32>) -> Self {
        self.page_selection = PageSelection::Pages(pages);
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            paragraph_gap: 10.0,
            mark_strikethrough: true,
            render_headings: true,
            max_heading_level: 4,
            page_selection: PageSelection::All,
        }
    }
}

/// Page selection for analysis and rendering.
#[derive(Debug, Clone, Default)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
    /// Sorted, non-overlapping ranges (1-indexed), as produced by [`PageSelection::parse`]
    Ranges(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
            PageSelection::Ranges(ranges) => {
                let idx = ranges.partition_point(|r| *r.end() < page);
                ranges.get(idx).is_some_and(|r| r.contains(&page))
            }
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        let invalid = || Error::InvalidPageRange(s.to_string());

        // Simple range (e.g., "1-10")
        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start: u32 = start.trim().parse().map_err(|_| invalid())?;
                let end: u32 = end.trim().parse().map_err(|_| invalid())?;
                if start > end {
                    return Err(invalid());
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        // Comma-separated list with possible ranges, kept as ranges so
        // "1-4294967295" costs the same as "1-2".
        let mut ranges = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            let (start, end) = match part.split_once('-') {
                Some((start, end)) => (
                    start.trim().parse::<u32>().map_err(|_| invalid())?,
                    end.trim().parse::<u32>().map_err(|_| invalid())?,
                ),
                None => {
                    let p: u32 = part.parse().map_err(|_| invalid())?;
                    (p, p)
                }
            };
            if start > end {
                return Err(invalid());
            }
            ranges.push(start..=end);
        }

        Ok(PageSelection::Ranges(merge_ranges(ranges)))
    }
}

/// Sort ranges and merge overlapping or adjacent ones.
fn merge_ranges(mut ranges: Vec<RangeInclusive<u32>>) -> Vec<RangeInclusive<u32>> {
    ranges.sort_by_key(|r| *r.start());

    let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(last) = merged.last_mut() {
            if *range.start() <= last.end().saturating_add(1) {
                if range.end() > last.end() {
                    *last = *last.start()..=*range.end();
                }
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_paragraph_gap(14.0)
            .with_max_heading(9)
            .with_strikethrough(false)
            .with_headings(false);

        assert_eq!(options.paragraph_gap, 14.0);
        assert_eq!(options.max_heading_level, 6);
        assert!(!options.mark_strikethrough);
        assert!(!options.render_headings);
    }

    #[test]
    fn test_render_options_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.paragraph_gap, 10.0);
        assert!(options.mark_strikethrough);
        assert!(options.render_headings);
        assert_eq!(options.max_heading_level, 4);
    }

    #[test]
    fn test_page_selection_includes() {
        let all = PageSelection::All;
        assert!(all.includes(1));
        assert!(all.includes(100));

        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(5));
        assert!(range.includes(10));
        assert!(!range.includes(11));

        let pages = PageSelection::Pages(vec![1, 3, 5, 7]);
        assert!(pages.includes(1));
        assert!(!pages.includes(2));
        assert!(pages.includes(3));
    }

    #[test]
    fn test_page_selection_parse() {
        let all = PageSelection::parse("all").unwrap();
        assert!(matches!(all, PageSelection::All));

        let range = PageSelection::parse("1-10").unwrap();
        assert!(matches!(range, PageSelection::Range(_)));

        let mixed = PageSelection::parse("10,5-7,1,3,6").unwrap();
        if let PageSelection::Ranges(ranges) = &mixed {
            assert_eq!(ranges, &vec![1..=1, 3..=3, 5..=7, 10..=10]);
        } else {
            panic!("Expected Ranges variant");
        }
        let included: Vec<u32> = (0..=12).filter(|p| mixed.includes(*p)).collect();
        assert_eq!(included, vec![1, 3, 5, 6, 7, 10]);
    }

    #[test]
    fn test_page_selection_parse_huge_list() {
        let selection = PageSelection::parse("1,1-4294967295").unwrap();
        if let PageSelection::Ranges(ranges) = &selection {
            assert_eq!(ranges, &vec![1..=u32::MAX]);
        } else {
            panic!("Expected Ranges variant");
        }
        assert!(selection.includes(1));
        assert!(selection.includes(u32::MAX));
        assert!(!selection.includes(0));

        let sparse = PageSelection::parse("4000000000, 7-9, 8-20, 21").unwrap();
        if let PageSelection::Ranges(ranges) = &sparse {
            assert_eq!(ranges, &vec![7..=21, 4_000_000_000..=4_000_000_000]);
        } else {
            panic!("Expected Ranges variant");
        }
        assert!(sparse.includes(21));
        assert!(!sparse.includes(22));
        assert!(sparse.includes(4_000_000_000));
    }

    #[test]
    fn test_page_selection_parse_errors() {
        assert!(matches!(
            PageSelection::parse("abc"),
            Err(Error::InvalidPageRange(_))
        ));
        assert!(matches!(
            PageSelection::parse("9-2"),
            Err(Error::InvalidPageRange(_))
        ));
        assert!(matches!(
            PageSelection::parse("1,9-2"),
            Err(Error::InvalidPageRange(_))
        ));
        assert!(matches!(
            PageSelection::parse("1,,3"),
            Err(Error::InvalidPageRange(_))
        ));
    }
}
