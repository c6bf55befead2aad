//! Logical structure elements recovered from a tagged document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A node of the document's tagged structure tree.
///
/// `element_type` is the type after role-map resolution. `children` is
/// `None` rather than an empty list when the node has no child elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureElement {
    pub element_type: String,

    /// Marked-content id linking the node to page content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcid: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, serde_json::Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<StructureElement>>,

    /// 1-based page number the element is attached to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl StructureElement {
    /// Create a childless element of the given type.
    pub fn new(element_type: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            mcid: None,
            alt_text: None,
            actual_text: None,
            attributes: None,
            children: None,
            page: None,
        }
    }

    /// Attach children, keeping `None` for an empty list.
    pub fn with_children(mut self, children: Vec<StructureElement>) -> Self {
        self.children = if children.is_empty() {
            None
        } else {
            Some(children)
        };
        self
    }

    /// Child elements (empty slice when there are none).
    pub fn children(&self) -> &[StructureElement] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Heading level for `H1`..`H6` element types.
    pub fn heading_level(&self) -> Option<u8> {
        let digits = self.element_type.strip_prefix('H')?;
        match digits.parse::<u8>() {
            Ok(level @ 1..=6) => Some(level),
            _ => None,
        }
    }

    /// Depth-first, pre-order iterator over this element and its descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Pre-order traversal returned by [`StructureElement::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a StructureElement>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a StructureElement;

    fn next(&mut self) -> Option<Self::Item> {
        let elem = self.stack.pop()?;
        self.stack.extend(elem.children().iter().rev());
        Some(elem)
    }
}
