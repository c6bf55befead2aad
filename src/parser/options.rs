//! Pipeline options and configuration.

use crate::analysis::StrikeOptions;
use crate::render::PageSelection;

/// Options for analyzing PDF documents.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to use parallel processing
    pub parallel: bool,

    /// Page selection (which pages to analyze)
    pub pages: PageSelection,

    /// Strike-through detection thresholds
    pub strike: StrikeOptions,

    /// Whether to read the tagged structure tree
    pub extract_structure: bool,
}

impl PipelineOptions {
    /// Create new pipeline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages that fail to load).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set strike-through detection thresholds.
    pub fn with_strike(mut self, strike: StrikeOptions) -> Self {
        self.strike = strike;
        self
    }

    /// Enable or disable structure tree extraction.
    pub fn with_structure(mut self, extract: bool) -> Self {
        self.extract_structure = extract;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            parallel: true,
            pages: PageSelection::All,
            strike: StrikeOptions::default(),
            extract_structure: true,
        }
    }
}

/// Error handling mode during analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip invalid pages and continue
    Lenient,
}
