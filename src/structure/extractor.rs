//! Structure tree extraction.
//!
//! Reads `StructTreeRoot` from the catalog and walks it into
//! [`StructureElement`] values. Malformed nodes are dropped with a debug log;
//! nothing in here returns an error to the caller.

use std::collections::{BTreeMap, HashMap};

use crate::model::StructureElement;
use crate::parser::{decode_text_string, ObjectId, PdfBackend, PdfDict, PdfValue};

/// Nesting depth beyond which structure nodes are dropped.
///
/// Reference cycles in broken files would otherwise recurse forever.
pub const MAX_STRUCTURE_DEPTH: usize = 64;

/// The `K` entry of a structure node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ChildEntry {
    /// Content owned directly by the node
    MarkedContent(i64),
    /// A child structure element or a content reference dictionary
    Node(PdfDict),
    List(Vec<ChildEntry>),
}

/// Whether the document carries a structure tree.
///
/// Any failure to read the catalog counts as untagged.
pub fn is_tagged<B: PdfBackend + ?Sized>(backend: &B) -> bool {
    match backend.catalog() {
        Ok(catalog) => catalog
            .get(b"StructTreeRoot".as_slice())
            .is_some_and(|root| !root.is_null()),
        Err(e) => {
            log::debug!("Catalog not readable, treating document as untagged: {}", e);
            false
        }
    }
}

/// Extract the structure tree, or an empty list for untagged documents.
///
/// The tree is rebuilt on every call.
pub fn extract_structure_tree<B: PdfBackend + ?Sized>(backend: &B) -> Vec<StructureElement> {
    if !is_tagged(backend) {
        return Vec::new();
    }

    let Some(root) = struct_tree_root(backend) else {
        return Vec::new();
    };

    let extractor = Extractor::new(backend, &root);
    let mut elements = Vec::new();
    if let Some(entry) = root.get(b"K".as_slice()).and_then(|k| extractor.child_entry(k, 0)) {
        extractor.collect_roots(entry, &mut elements);
    }

    log::debug!(
        "Extracted {} root structure element(s), {} role mapping(s)",
        elements.len(),
        extractor.role_map.len()
    );

    elements
}

fn struct_tree_root<B: PdfBackend + ?Sized>(backend: &B) -> Option<PdfDict> {
    let catalog = backend.catalog().ok()?;
    let value = catalog.get(b"StructTreeRoot".as_slice())?;
    match backend.deref(value) {
        Ok(PdfValue::Dict(dict)) => Some(dict),
        Ok(_) => {
            log::debug!("StructTreeRoot is not a dictionary");
            None
        }
        Err(e) => {
            log::debug!("Failed to resolve StructTreeRoot: {}", e);
            None
        }
    }
}

struct Extractor<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
    role_map: HashMap<Vec<u8>, String>,
    page_numbers: HashMap<ObjectId, u32>,
}

impl<'a, B: PdfBackend + ?Sized> Extractor<'a, B> {
    fn new(backend: &'a B, root: &PdfDict) -> Self {
        let role_map = root
            .get(b"RoleMap".as_slice())
            .and_then(|value| backend.deref(value).ok())
            .and_then(|value| match value {
                PdfValue::Dict(dict) => Some(dict),
                _ => None,
            })
            .map(|dict| {
                dict.into_iter()
                    .filter_map(|(custom, standard)| {
                        let standard = String::from_utf8_lossy(standard.as_name()?).to_string();
                        Some((custom, standard))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let page_numbers = backend
            .pages()
            .into_iter()
            .map(|(number, id)| (id, number))
            .collect();

        Self {
            backend,
            role_map,
            page_numbers,
        }
    }

    /// Turn a `K` value into a [`ChildEntry`], following references.
    ///
    /// `nesting` counts arrays within one `K` entry, not structure levels.
    fn child_entry(&self, value: &PdfValue, nesting: usize) -> Option<ChildEntry> {
        if nesting > MAX_STRUCTURE_DEPTH {
            log::debug!("K arrays nested deeper than {} levels, truncating", MAX_STRUCTURE_DEPTH);
            return None;
        }

        let value = match self.backend.deref(value) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("Dropping unresolvable structure child: {}", e);
                return None;
            }
        };

        match value {
            PdfValue::Integer(mcid) => Some(ChildEntry::MarkedContent(mcid)),
            PdfValue::Dict(dict) => Some(ChildEntry::Node(dict)),
            PdfValue::Array(items) => Some(ChildEntry::List(
                items
                    .iter()
                    .filter_map(|item| self.child_entry(item, nesting + 1))
                    .collect(),
            )),
            _ => None,
        }
    }

    fn collect_roots(&self, entry: ChildEntry, out: &mut Vec<StructureElement>) {
        match entry {
            ChildEntry::Node(dict) => {
                if let Some(elem) = self.parse_node(&dict, 0) {
                    out.push(elem);
                }
            }
            ChildEntry::List(items) => {
                for item in items {
                    self.collect_roots(item, out);
                }
            }
            ChildEntry::MarkedContent(_) => {}
        }
    }

    /// Parse one structure element. Returns `None` when it has no `S`.
    ///
    /// Callers keep `depth` within [`MAX_STRUCTURE_DEPTH`].
    fn parse_node(&self, dict: &PdfDict, depth: usize) -> Option<StructureElement> {
        let raw_type = dict.get(b"S".as_slice())?.as_name()?;
        let element_type = self
            .role_map
            .get(raw_type)
            .cloned()
            .unwrap_or_else(|| String::from_utf8_lossy(raw_type).to_string());

        let mut elem = StructureElement::new(element_type);
        elem.mcid = dict.get(b"MCID".as_slice()).and_then(PdfValue::as_integer);
        elem.alt_text = self.text_entry(dict, b"Alt");
        elem.actual_text = self.text_entry(dict, b"ActualText");
        elem.page = self.page_of(dict);
        elem.attributes = dict
            .get(b"A".as_slice())
            .and_then(|value| self.attributes(value));

        let mut children = Vec::new();
        if let Some(entry) = dict
            .get(b"K".as_slice())
            .and_then(|k| self.child_entry(k, 0))
        {
            self.collect_children(entry, depth, &mut elem.mcid, &mut children);
        }

        Some(elem.with_children(children))
    }

    fn collect_children(
        &self,
        entry: ChildEntry,
        depth: usize,
        mcid: &mut Option<i64>,
        out: &mut Vec<StructureElement>,
    ) {
        match entry {
            ChildEntry::MarkedContent(id) => *mcid = Some(id),
            ChildEntry::Node(dict) => {
                if is_content_reference(&dict) {
                    if let Some(id) = dict.get(b"MCID".as_slice()).and_then(PdfValue::as_integer) {
                        *mcid = Some(id);
                    }
                } else if is_object_reference(&dict) {
                    // Annotations and XObjects carry no text of their own.
                } else if depth + 1 > MAX_STRUCTURE_DEPTH {
                    log::debug!(
                        "Dropping structure child beyond depth {}",
                        MAX_STRUCTURE_DEPTH
                    );
                } else {
                    match self.parse_node(&dict, depth + 1) {
                        Some(child) => out.push(child),
                        None => log::debug!("Dropping structure child without a type"),
                    }
                }
            }
            ChildEntry::List(items) => {
                for item in items {
                    self.collect_children(item, depth, mcid, out);
                }
            }
        }
    }

    fn text_entry(&self, dict: &PdfDict, key: &[u8]) -> Option<String> {
        match self.backend.deref(dict.get(key)?).ok()? {
            PdfValue::Str(bytes) => Some(decode_text_string(&bytes)),
            _ => None,
        }
    }

    fn page_of(&self, dict: &PdfDict) -> Option<u32> {
        match dict.get(b"Pg".as_slice())? {
            PdfValue::Ref(id) => self.page_numbers.get(id).copied(),
            _ => None,
        }
    }

    /// `A` may be one attribute dictionary or an array of them (with
    /// optional revision numbers in between); all keys are merged.
    fn attributes(&self, value: &PdfValue) -> Option<BTreeMap<String, serde_json::Value>> {
        let mut merged = BTreeMap::new();
        match self.backend.deref(value).ok()? {
            PdfValue::Dict(dict) => self.merge_attributes(&dict, &mut merged),
            PdfValue::Array(items) => {
                for item in &items {
                    if let Ok(PdfValue::Dict(dict)) = self.backend.deref(item) {
                        self.merge_attributes(&dict, &mut merged);
                    }
                }
            }
            _ => {}
        }

        if merged.is_empty() {
            None
        } else {
            Some(merged)
        }
    }

    fn merge_attributes(&self, dict: &PdfDict, merged: &mut BTreeMap<String, serde_json::Value>) {
        for (key, value) in dict {
            merged.insert(String::from_utf8_lossy(key).to_string(), pdf_value_to_json(value));
        }
    }
}

fn is_content_reference(dict: &PdfDict) -> bool {
    match dict.get(b"Type".as_slice()).and_then(PdfValue::as_name) {
        Some(name) => name == b"MCR",
        None => !dict.contains_key(b"S".as_slice()) && dict.contains_key(b"MCID".as_slice()),
    }
}

fn is_object_reference(dict: &PdfDict) -> bool {
    dict.get(b"Type".as_slice()).and_then(PdfValue::as_name) == Some(b"OBJR".as_slice())
}

/// Convert a PDF value to JSON for attribute maps.
pub(crate) fn pdf_value_to_json(value: &PdfValue) -> serde_json::Value {
    use serde_json::Value;

    match value {
        PdfValue::Null | PdfValue::Other => Value::Null,
        PdfValue::Bool(b) => Value::Bool(*b),
        PdfValue::Integer(i) => Value::from(*i),
        PdfValue::Real(r) => serde_json::Number::from_f64(f64::from(*r))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        PdfValue::Name(name) => Value::String(String::from_utf8_lossy(name).to_string()),
        PdfValue::Str(bytes) => Value::String(decode_text_string(bytes)),
        PdfValue::Array(items) => Value::Array(items.iter().map(pdf_value_to_json).collect()),
        PdfValue::Dict(dict) => Value::Object(
            dict.iter()
                .map(|(k, v)| (String::from_utf8_lossy(k).to_string(), pdf_value_to_json(v)))
                .collect(),
        ),
        PdfValue::Ref((num, generation)) => Value::String(format!("{} {} R", num, generation)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_reference_detection() {
        let mut mcr = PdfDict::new();
        mcr.insert(b"Type".to_vec(), PdfValue::Name(b"MCR".to_vec()));
        mcr.insert(b"MCID".to_vec(), PdfValue::Integer(3));
        assert!(is_content_reference(&mcr));

        let mut bare = PdfDict::new();
        bare.insert(b"MCID".to_vec(), PdfValue::Integer(3));
        assert!(is_content_reference(&bare));

        let mut elem = PdfDict::new();
        elem.insert(b"S".to_vec(), PdfValue::Name(b"P".to_vec()));
        elem.insert(b"MCID".to_vec(), PdfValue::Integer(3));
        assert!(!is_content_reference(&elem));
    }

    #[test]
    fn test_object_reference_detection() {
        let mut objr = PdfDict::new();
        objr.insert(b"Type".to_vec(), PdfValue::Name(b"OBJR".to_vec()));
        assert!(is_object_reference(&objr));
        assert!(!is_object_reference(&PdfDict::new()));
    }

    #[test]
    fn test_pdf_value_to_json() {
        let mut dict = PdfDict::new();
        dict.insert(b"O".to_vec(), PdfValue::Name(b"Layout".to_vec()));
        dict.insert(b"BBox".to_vec(), PdfValue::Array(vec![PdfValue::Integer(0), PdfValue::Real(1.5)]));
        dict.insert(b"Ref".to_vec(), PdfValue::Ref((7, 0)));

        assert_eq!(
            pdf_value_to_json(&PdfValue::Dict(dict)),
            json!({"O": "Layout", "BBox": [0, 1.5], "Ref": "7 0 R"})
        );
        assert_eq!(pdf_value_to_json(&PdfValue::Real(f32::NAN)), json!(null));
        assert_eq!(pdf_value_to_json(&PdfValue::Str(b"caf\xc3\xa9".to_vec())), json!("café"));
    }
}
