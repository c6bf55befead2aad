//! Content-stream interpretation.
//!
//! Walks the operations of one page and produces positioned spans, glyph
//! records, straight line segments and rectangles in top-down coordinates.

use std::collections::HashMap;

use super::backend::{get_number_from_value, BackendFontInfo, ContentOp, PageId, PdfBackend, PdfValue};
use crate::analysis::metrics::{font_style, font_weight};
use crate::error::{Error, Result};
use crate::model::{BBox, FontStyle, FontWeight, GlyphRecord, LineSegment, PageContent, RectShape, Span};

/// Advance (in 1/1000 em) assumed for glyphs whose width is unknown.
const FALLBACK_GLYPH_WIDTH: f32 = 500.0;

/// TJ adjustments beyond this (in 1/1000 em) are treated as word spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Ascender/descender fractions used to build a span box from its baseline.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;

/// Extract the content of one page (1-indexed).
pub fn extract_page_content<B: PdfBackend + ?Sized>(backend: &B, page_number: u32) -> Result<PageContent> {
    let pages = backend.pages();
    let page_id = *pages
        .get(&page_number)
        .ok_or(Error::PageOutOfRange(page_number, pages.len() as u32))?;

    let (width, height) = backend.page_size(page_id);
    let fonts = backend.page_fonts(page_id)?;
    let data = backend.page_content(page_id)?;
    let ops = backend.decode_content(&data)?;

    let mut interpreter = ContentInterpreter::new(backend, page_id, fonts, PageContent::new(page_number, width, height));
    interpreter.run(&ops);
    let page = interpreter.finish();

    log::debug!(
        "Page {}: {} spans, {} glyphs, {} lines, {} rects",
        page_number,
        page.spans.len(),
        page.glyphs.len(),
        page.lines.len(),
        page.rects.len()
    );

    Ok(page)
}

/// 2D affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(operands: &[PdfValue]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let n: Vec<f32> = operands
            .iter()
            .take(6)
            .map(|o| get_number_from_value(o).unwrap_or(0.0))
            .collect();
        Some(Matrix {
            a: n[0],
            b: n[1],
            c: n[2],
            d: n[3],
            e: n[4],
            f: n[5],
        })
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    /// `self × other`
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

#[derive(Debug, Clone)]
struct TextState {
    tm: Matrix,
    tlm: Matrix,
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
    h_scale: f32,
    in_text: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            font: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            in_text: false,
        }
    }
}

impl TextState {
    /// Restore the parameters saved by `q`; the text matrices stay current.
    fn restore_params(&mut self, saved: TextState) {
        self.font = saved.font;
        self.font_size = saved.font_size;
        self.leading = saved.leading;
        self.char_spacing = saved.char_spacing;
        self.word_spacing = saved.word_spacing;
        self.h_scale = saved.h_scale;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translation(tx, ty).multiply(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn advance(&mut self, tx: f32) {
        self.tm = Matrix::translation(tx, 0.0).multiply(&self.tm);
    }
}

/// Path under construction, in device (bottom-up) coordinates.
#[derive(Debug, Default)]
struct PathBuilder {
    current: Option<(f32, f32)>,
    start: Option<(f32, f32)>,
    segments: Vec<((f32, f32), (f32, f32))>,
    rects: Vec<(f32, f32, f32, f32)>,
}

impl PathBuilder {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Stateful interpreter for one page's operations.
pub struct ContentInterpreter<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
    page_id: PageId,
    fonts: HashMap<Vec<u8>, BackendFontInfo>,
    ctm: Matrix,
    /// Saved CTM and text parameters, pushed by `q`
    stack: Vec<(Matrix, TextState)>,
    text: TextState,
    path: PathBuilder,
    page: PageContent,
}

impl<'a, B: PdfBackend + ?Sized> ContentInterpreter<'a, B> {
    /// Create an interpreter writing into `page`.
    pub fn new(backend: &'a B, page_id: PageId, fonts: Vec<BackendFontInfo>, page: PageContent) -> Self {
        Self {
            backend,
            page_id,
            fonts: fonts.into_iter().map(|f| (f.name.clone(), f)).collect(),
            ctm: Matrix::IDENTITY,
            stack: Vec::new(),
            text: TextState::default(),
            path: PathBuilder::default(),
            page,
        }
    }

    /// Interpret a sequence of operations.
    pub fn run(&mut self, ops: &[ContentOp]) {
        for op in ops {
            self.apply(op);
        }
    }

    /// Return the collected page content.
    pub fn finish(self) -> PageContent {
        self.page
    }

    fn apply(&mut self, op: &ContentOp) {
        let operands = op.operands.as_slice();
        let num = |i: usize| operands.get(i).and_then(get_number_from_value);

        match op.operator.as_str() {
            // Graphics state
            "q" => self.stack.push((self.ctm, self.text.clone())),
            "Q" => {
                if let Some((ctm, text)) = self.stack.pop() {
                    self.ctm = ctm;
                    self.text.restore_params(text);
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ctm = m.multiply(&self.ctm);
                }
            }

            // Text objects and state
            "BT" => {
                self.text.in_text = true;
                self.text.tm = Matrix::IDENTITY;
                self.text.tlm = Matrix::IDENTITY;
            }
            "ET" => self.text.in_text = false,
            "Tf" => {
                if let Some(PdfValue::Name(name)) = operands.first() {
                    self.select_font(name);
                }
                if let Some(size) = num(1) {
                    self.text.font_size = size;
                }
            }
            "TL" => self.text.leading = num(0).unwrap_or(0.0),
            "Tc" => self.text.char_spacing = num(0).unwrap_or(0.0),
            "Tw" => self.text.word_spacing = num(0).unwrap_or(0.0),
            "Tz" => self.text.h_scale = num(0).unwrap_or(100.0) / 100.0,
            "Td" => self.text.move_line(num(0).unwrap_or(0.0), num(1).unwrap_or(0.0)),
            "TD" => {
                let ty = num(1).unwrap_or(0.0);
                self.text.leading = -ty;
                self.text.move_line(num(0).unwrap_or(0.0), ty);
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.text.tm = m;
                    self.text.tlm = m;
                }
            }
            "T*" => self.text.next_line(),

            // Text showing
            "Tj" => {
                if let Some(s) = operands.first() {
                    self.show(std::slice::from_ref(s));
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = operands.first() {
                    self.show(items);
                }
            }
            "'" => {
                self.text.next_line();
                if let Some(s) = operands.first() {
                    self.show(std::slice::from_ref(s));
                }
            }
            "\"" => {
                self.text.word_spacing = num(0).unwrap_or(0.0);
                self.text.char_spacing = num(1).unwrap_or(0.0);
                self.text.next_line();
                if let Some(s) = operands.get(2) {
                    self.show(std::slice::from_ref(s));
                }
            }

            // Path construction
            "m" => {
                if let (Some(x), Some(y)) = (num(0), num(1)) {
                    let p = self.ctm.apply(x, y);
                    self.path.current = Some(p);
                    self.path.start = Some(p);
                }
            }
            "l" => {
                if let (Some(x), Some(y)) = (num(0), num(1)) {
                    let p = self.ctm.apply(x, y);
                    if let Some(from) = self.path.current {
                        self.path.segments.push((from, p));
                    }
                    self.path.current = Some(p);
                }
            }
            "h" => {
                if let (Some(from), Some(to)) = (self.path.current, self.path.start) {
                    if from != to {
                        self.path.segments.push((from, to));
                    }
                    self.path.current = Some(to);
                }
            }
            "re" => {
                if let (Some(x), Some(y), Some(w), Some(h)) = (num(0), num(1), num(2), num(3)) {
                    let corners = [
                        self.ctm.apply(x, y),
                        self.ctm.apply(x + w, y),
                        self.ctm.apply(x, y + h),
                        self.ctm.apply(x + w, y + h),
                    ];
                    let min_x = corners.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
                    let max_x = corners.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
                    let min_y = corners.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
                    let max_y = corners.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
                    self.path.rects.push((min_x, min_y, max_x, max_y));
                    self.path.current = Some(corners[0]);
                    self.path.start = Some(corners[0]);
                }
            }

            // Path painting
            "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => self.paint_path(),
            "n" => self.path.clear(),

            _ => {}
        }
    }

    fn select_font(&mut self, name: &[u8]) {
        if !self.fonts.contains_key(name) {
            log::debug!(
                "Font resource {} not found on page {}",
                String::from_utf8_lossy(name),
                self.page.number
            );
            let fallback = BackendFontInfo::named(name.to_vec(), String::from_utf8_lossy(name).to_string());
            self.fonts.insert(name.to_vec(), fallback);
        }
        self.text.font = name.to_vec();
    }

    fn show(&mut self, items: &[PdfValue]) {
        if !self.text.in_text {
            return;
        }
        let Some(font) = self.fonts.get(&self.text.font) else {
            return;
        };

        let start = self.text.tm.multiply(&self.ctm);
        let size = self.text.font_size * start.vertical_scale();
        let (x_start, baseline) = start.apply(0.0, 0.0);

        let font_size = self.text.font_size;
        let h_scale = self.text.h_scale;
        let mut text = String::new();
        let mut glyphs = Vec::new();

        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    text.push_str(&self.backend.decode_text(self.page_id, &font.name, bytes));
                    for code in font.char_codes(bytes) {
                        let width = font.glyph_width(code);
                        let advance_width = if width > 0.0 { width } else { FALLBACK_GLYPH_WIDTH };
                        let mut tx = advance_width / 1000.0 * font_size + self.text.char_spacing;
                        if code == 32 && !font.two_byte {
                            tx += self.text.word_spacing;
                        }
                        self.text.advance(tx * h_scale);
                        glyphs.push(GlyphRecord::new(width / 1000.0 * size, size, font.base_font.clone()));
                    }
                }
                PdfValue::Integer(_) | PdfValue::Real(_) => {
                    let adjustment = get_number_from_value(item).unwrap_or(0.0);
                    self.text.advance(-adjustment / 1000.0 * font_size * h_scale);
                    if -adjustment > TJ_SPACE_THRESHOLD && needs_space(&text) {
                        text.push(' ');
                    }
                }
                _ => {}
            }
        }

        if text.trim().is_empty() {
            return;
        }

        let (x_end, _) = self.text.tm.multiply(&self.ctm).apply(0.0, 0.0);
        let (x0, x1) = if x_start <= x_end { (x_start, x_end) } else { (x_end, x_start) };
        let page_height = self.page.height;
        let bbox = BBox::new(
            x0,
            x1,
            page_height - (baseline + ASCENT * size),
            page_height - (baseline - DESCENT * size),
        );

        let span = Span::new(text, bbox, baseline - DESCENT * size)
            .with_font(font.base_font.clone(), size)
            .with_style(
                font_weight(&font.base_font) == FontWeight::Bold,
                font_style(&font.base_font) == FontStyle::Italic,
            );

        self.page.spans.push(span);
        self.page.glyphs.extend(glyphs);
    }

    fn paint_path(&mut self) {
        let page_height = self.page.height;
        for ((x0, y0), (x1, y1)) in self.path.segments.drain(..) {
            self.page
                .lines
                .push(LineSegment::new(x0, x1, page_height - y0, page_height - y1));
        }
        for (min_x, min_y, max_x, max_y) in self.path.rects.drain(..) {
            self.page
                .rects
                .push(RectShape::new(min_x, max_x, page_height - max_y, page_height - min_y));
        }
        self.path.clear();
    }
}

fn needs_space(text: &str) -> bool {
    match text.chars().last() {
        None => false,
        Some(c) => !c.is_whitespace() && c != '\u{00A0}' && !is_spaceless_script_char(c),
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // CJK Unified Ideographs Extension B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
