//! Document pipeline.
//!
//! Pages are extracted independently (in parallel when enabled). Font
//! classification is the one cross-page step and runs on the collected usages
//! afterwards; roles and strike-through flags are then added per page.

use std::collections::HashMap;
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::{annotate_strikethrough, assign_roles, classify_fonts, extract_font_metrics, ClassificationResult};
use crate::error::Result;
use crate::model::{FontUsage, GlyphRecord, PageContent, StructureElement};
use crate::parser::{extract_page_content, ErrorMode, LopdfBackend, PdfBackend, PipelineOptions};
use crate::render::{MarkdownRenderer, RenderOptions};
use crate::structure::{extract_structure_tree, is_tagged};

/// Runs extraction and analysis over a document.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline with the given options.
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Open a PDF file and analyze it.
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<AnalyzedDocument> {
        let backend = LopdfBackend::load_file(path)?;
        self.analyze(&backend)
    }

    /// Analyze a PDF held in memory.
    pub fn analyze_bytes(&self, data: &[u8]) -> Result<AnalyzedDocument> {
        let backend = LopdfBackend::load_bytes(data)?;
        self.analyze(&backend)
    }

    /// Analyze a document through any backend.
    pub fn analyze<B: PdfBackend + Sync + ?Sized>(&self, backend: &B) -> Result<AnalyzedDocument> {
        let page_numbers: Vec<u32> = backend
            .pages()
            .into_keys()
            .filter(|n| self.options.pages.includes(*n))
            .collect();

        let extracted: Vec<(u32, Result<PageContent>)> = if self.options.parallel {
            page_numbers
                .par_iter()
                .map(|&n| (n, extract_page_content(backend, n)))
                .collect()
        } else {
            page_numbers
                .iter()
                .map(|&n| (n, extract_page_content(backend, n)))
                .collect()
        };

        let mut pages = Vec::with_capacity(extracted.len());
        for (number, result) in extracted {
            match result {
                Ok(page) => pages.push(page),
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Skipping page {}: {}", number, e);
                }
            }
        }

        let classification = classify_fonts(collect_font_usages(&pages));

        let strike = &self.options.strike;
        let annotate = |page: &mut PageContent| {
            assign_roles(&mut page.spans, &classification);
            annotate_strikethrough(&mut page.spans, &page.lines, &page.rects, strike);
        };
        if self.options.parallel {
            pages.par_iter_mut().for_each(annotate);
        } else {
            pages.iter_mut().for_each(annotate);
        }

        let (tagged, structure) = if self.options.extract_structure {
            (is_tagged(backend), extract_structure_tree(backend))
        } else {
            (false, Vec::new())
        };

        log::debug!(
            "Analyzed {} page(s), {} font cluster(s), tagged: {}",
            pages.len(),
            classification.clusters.len(),
            tagged
        );

        Ok(AnalyzedDocument {
            pages,
            classification,
            structure,
            tagged,
        })
    }
}

/// Font usages keyed by (page, font name), one instance per glyph.
///
/// Metrics are derived once per font name per page, and keys come out in
/// page order then first-use order so cluster ties resolve deterministically.
pub fn collect_font_usages(pages: &[PageContent]) -> Vec<((u32, String), Vec<FontUsage>)> {
    let mut usages = Vec::new();

    for page in pages {
        let mut order: Vec<&str> = Vec::new();
        let mut by_font: HashMap<&str, Vec<GlyphRecord>> = HashMap::new();
        for glyph in &page.glyphs {
            by_font
                .entry(glyph.font_name.as_str())
                .or_insert_with(|| {
                    order.push(glyph.font_name.as_str());
                    Vec::new()
                })
                .push(glyph.clone());
        }

        for font_name in order {
            let Some(glyphs) = by_font.get(font_name) else {
                continue;
            };
            let metrics = extract_font_metrics(glyphs, font_name);
            let instances = glyphs
                .iter()
                .map(|g| FontUsage::from_metrics(&metrics, g.size))
                .collect();
            usages.push(((page.number, font_name.to_string()), instances));
        }
    }

    usages
}

/// Result of running the pipeline over a document.
#[derive(Debug, Clone, Default)]
pub struct AnalyzedDocument {
    /// Analyzed pages in page order
    pub pages: Vec<PageContent>,
    pub classification: ClassificationResult,
    /// Tagged structure tree (empty for untagged documents)
    pub structure: Vec<StructureElement>,
    pub tagged: bool,
}

impl AnalyzedDocument {
    /// Render selected pages to Markdown.
    pub fn to_markdown(&self, options: &RenderOptions) -> String {
        let renderer = MarkdownRenderer::new(options.clone());
        self.pages
            .iter()
            .filter(|page| options.page_selection.includes(page.number))
            .map(|page| renderer.render_page(&page.spans))
            .filter(|block| !block.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of headings inferred from fonts (runs of same-level heading spans).
    pub fn inferred_heading_count(&self) -> usize {
        self.pages
            .iter()
            .map(|page| {
                let levels: Vec<Option<u8>> = page
                    .spans
                    .iter()
                    .map(|s| s.role.and_then(|r| r.heading_level()))
                    .collect();
                levels
                    .iter()
                    .enumerate()
                    .filter(|(i, level)| level.is_some() && (*i == 0 || levels[i - 1] != **level))
                    .count()
            })
            .sum()
    }

    /// Compare inferred headings with the headings in the structure tree.
    pub fn cross_check(&self) -> CrossCheck {
        let tagged_headings = self
            .structure
            .iter()
            .flat_map(StructureElement::walk)
            .filter(|elem| elem.heading_level().is_some())
            .count();

        let check = CrossCheck {
            tagged: self.tagged,
            tagged_headings,
            inferred_headings: self.inferred_heading_count(),
        };

        if check.tagged && !check.agrees() {
            log::warn!(
                "Heading count mismatch: {} tagged, {} inferred from fonts",
                check.tagged_headings,
                check.inferred_headings
            );
        } else {
            log::debug!(
                "Heading cross-check: {} tagged, {} inferred",
                check.tagged_headings,
                check.inferred_headings
            );
        }

        check
    }
}

/// Heading counts from the structure tree and from font inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrossCheck {
    pub tagged: bool,
    pub tagged_headings: usize,
    pub inferred_headings: usize,
}

impl CrossCheck {
    /// Untagged documents always agree.
    pub fn agrees(&self) -> bool {
        !self.tagged || self.tagged_headings == self.inferred_headings
    }
}
