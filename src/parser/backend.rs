//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from the inference logic.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Object identifier: (object number, generation number).
pub type ObjectId = (u32, u16);

/// Page identifier.
pub type PageId = ObjectId;

/// A dictionary of [`PdfValue`]s keyed by raw name bytes.
pub type PdfDict = BTreeMap<Vec<u8>, PdfValue>;

/// Font information returned by the backend.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
    /// First character code covered by `widths`.
    pub first_char: u32,
    /// Glyph widths in 1/1000 text-space units.
    pub widths: Vec<f32>,
    /// Width used for codes outside `widths` (0 when unknown).
    pub missing_width: f32,
    /// Composite (Type0) fonts use two-byte codes.
    pub two_byte: bool,
}

impl BackendFontInfo {
    /// Font info with no width table.
    pub fn named(name: impl Into<Vec<u8>>, base_font: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_font: base_font.into(),
            first_char: 0,
            widths: Vec::new(),
            missing_width: 0.0,
            two_byte: false,
        }
    }

    /// Width of a character code in 1/1000 units, 0 when unknown.
    pub fn glyph_width(&self, code: u32) -> f32 {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.missing_width)
    }

    /// Split a string operand into character codes.
    pub fn char_codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| match c {
                    [hi, lo] => (u32::from(*hi) << 8) | u32::from(*lo),
                    [b] => u32::from(*b),
                    _ => 0,
                })
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        }
    }
}

/// A PDF object value, detached from the concrete PDF library.
///
/// Indirect references are kept as [`PdfValue::Ref`] and resolved on demand
/// through [`PdfBackend::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(PdfDict),
    Ref(ObjectId),
    Other,
}

impl PdfValue {
    pub fn as_dict(&self) -> Option<&PdfDict> {
        match self {
            PdfValue::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&[u8]> {
        match self {
            PdfValue::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PdfValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PdfValue::Null)
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, font info, content stream
/// decoding, text decoding and object access, without exposing any
/// concrete PDF library types.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return page width and height in points.
    fn page_size(&self, page: PageId) -> (f32, f32);

    /// Return font info for a given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Return the document catalog dictionary.
    fn catalog(&self) -> Result<PdfDict>;

    /// Load an indirect object.
    fn resolve(&self, id: ObjectId) -> Result<PdfValue>;

    /// Follow a reference, or return a direct value unchanged.
    fn deref(&self, value: &PdfValue) -> Result<PdfValue> {
        match value {
            PdfValue::Ref(id) => self.resolve(*id),
            other => Ok(other.clone()),
        }
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // Try UTF-16BE first (BOM marker)
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        return decode_utf16be(&bytes[2..]);
    }

    // Try UTF-8
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Fallback: Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Decode a PDF text string (Alt, ActualText, ...).
///
/// UTF-16BE with a byte-order mark is honoured; everything else is read as
/// UTF-8 with invalid bytes dropped.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        return decode_utf16be(&bytes[2..]);
    }
    utf8_ignoring_invalid(bytes)
}

fn decode_utf16be(bytes: &[u8]) -> String {
    let utf16: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    char::decode_utf16(utf16)
        .filter_map(|r| r.ok())
        .collect()
}

fn utf8_ignoring_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                // valid_up_to guarantees this prefix is UTF-8.
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(len) => bytes = &rest[len..],
                    None => return out,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// LopdfBackend - concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

use lopdf::{Document as LopdfDocument, Object};

/// Default page size (US Letter) when MediaBox is absent or malformed.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Self::from_document(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        if !data.starts_with(b"%PDF-") {
            return Err(Error::UnknownFormat);
        }
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Self::from_document(doc)
    }

    /// Load from a reader.
    pub fn load_reader<R: std::io::Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    /// Wrap an already-loaded document.
    pub fn from_document(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn font_info(&self, name: &[u8], font_dict: &lopdf::Dictionary) -> BackendFontInfo {
        let base_font = font_dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let mut info = BackendFontInfo::named(name.to_vec(), base_font);

        let subtype = font_dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name_str().ok());
        if subtype == Some("Type0") {
            info.two_byte = true;
            // Composite widths live in the descendant font; DW defaults to 1000.
            info.missing_width = 1000.0;
            return info;
        }

        info.first_char = font_dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .map(|v| v.max(0) as u32)
            .unwrap_or(0);

        if let Ok(widths) = font_dict.get(b"Widths") {
            let widths = match widths {
                Object::Reference(r) => self.doc.get_object(*r).ok(),
                other => Some(other),
            };
            if let Some(Ok(arr)) = widths.map(|w| w.as_array()) {
                info.widths = arr.iter().map(|o| object_number(o).unwrap_or(0.0)).collect();
            }
        }

        if let Ok(descriptor) = font_dict.get(b"FontDescriptor") {
            let descriptor = match descriptor {
                Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
                Object::Dictionary(d) => Some(d),
                _ => None,
            };
            if let Some(mw) = descriptor
                .and_then(|d| d.get(b"MissingWidth").ok())
                .and_then(object_number)
            {
                info.missing_width = mw;
            }
        }

        info
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_size(&self, page_id: PageId) -> (f32, f32) {
        let media_box = self
            .doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|d| d.get(b"MediaBox").ok())
            .and_then(|o| o.as_array().ok());

        match media_box {
            Some(arr) if arr.len() >= 4 => {
                let coords: Vec<f32> = arr.iter().map(|o| object_number(o).unwrap_or(0.0)).collect();
                let width = (coords[2] - coords[0]).abs();
                let height = (coords[3] - coords[1]).abs();
                if width > 0.0 && height > 0.0 {
                    (width, height)
                } else {
                    DEFAULT_PAGE_SIZE
                }
            }
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(lopdf_fonts
            .iter()
            .map(|(name, font_dict)| self.font_info(name, font_dict))
            .collect())
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(c) => c,
            // A page without content is blank, not broken.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => s
                    .decompressed_content()
                    .or_else(|_| Ok(s.content.clone())),
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(lopdf_fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = lopdf_fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn catalog(&self) -> Result<PdfDict> {
        let catalog = self
            .doc
            .catalog()
            .map_err(|e| Error::MissingObject(format!("Catalog: {}", e)))?;
        Ok(convert_dictionary(catalog))
    }

    fn resolve(&self, id: ObjectId) -> Result<PdfValue> {
        self.doc
            .get_object(id)
            .map(convert_object)
            .map_err(|e| Error::MissingObject(format!("{} {} R: {}", id.0, id.1, e)))
    }
}

impl LopdfBackend {
    fn concat_streams(&self, arr: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in arr {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    if let Ok(data) = s.decompressed_content() {
                        content.extend_from_slice(&data);
                        content.push(b' ');
                    }
                }
            }
        }
        content
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Null => PdfValue::Null,
        Object::Boolean(b) => PdfValue::Bool(*b),
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        Object::Dictionary(d) => PdfValue::Dict(convert_dictionary(d)),
        Object::Stream(s) => PdfValue::Dict(convert_dictionary(&s.dict)),
        Object::Reference(id) => PdfValue::Ref(*id),
    }
}

fn convert_dictionary(dict: &lopdf::Dictionary) -> PdfDict {
    dict.iter()
        .map(|(k, v)| (k.clone(), convert_object(v)))
        .collect()
}

fn object_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_string_drops_invalid_utf8() {
        assert_eq!(decode_text_string(b"Chart \xFF\xFEof sales"), "Chart of sales");
        assert_eq!(decode_text_string(b"caf\xC3\xA9"), "café");
        // Truncated multi-byte sequence at the end
        assert_eq!(decode_text_string(b"abc\xE2\x82"), "abc");
    }

    #[test]
    fn test_decode_text_string_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_string(&bytes), "Hi");
    }

    #[test]
    fn test_glyph_width_lookup() {
        let mut font = BackendFontInfo::named(b"F1".to_vec(), "Helvetica");
        font.first_char = 32;
        font.widths = vec![278.0, 278.0, 355.0];
        font.missing_width = 250.0;
        assert_eq!(font.glyph_width(32), 278.0);
        assert_eq!(font.glyph_width(34), 355.0);
        assert_eq!(font.glyph_width(35), 250.0);
        assert_eq!(font.glyph_width(10), 250.0);
    }

    #[test]
    fn test_char_codes() {
        let mut font = BackendFontInfo::named(b"F1".to_vec(), "Helvetica");
        assert_eq!(font.char_codes(b"AB"), vec![65, 66]);
        font.two_byte = true;
        assert_eq!(font.char_codes(&[0x00, 0x41, 0x01]), vec![0x41, 0x01]);
    }

    #[test]
    fn test_get_number_from_value() {
        assert_eq!(get_number_from_value(&PdfValue::Integer(42)), Some(42.0));
        assert_eq!(get_number_from_value(&PdfValue::Real(2.5)), Some(2.5));
        assert_eq!(get_number_from_value(&PdfValue::Other), None);
    }
}
