//! Per-type counts over a structure tree.

use std::collections::BTreeMap;

use super::extract_structure_tree;
use crate::model::StructureElement;
use crate::parser::PdfBackend;

/// Count elements by resolved type, depth first.
pub fn structure_summary(elements: &[StructureElement]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for elem in elements.iter().flat_map(StructureElement::walk) {
        *counts.entry(elem.element_type.clone()).or_insert(0) += 1;
    }
    counts
}

/// Extract the document's structure tree and summarize it.
///
/// Untagged documents yield an empty map.
pub fn document_structure_summary<B: PdfBackend + ?Sized>(backend: &B) -> BTreeMap<String, usize> {
    structure_summary(&extract_structure_tree(backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_nested_types() {
        let tree = vec![
            StructureElement::new("Document").with_children(vec![
                StructureElement::new("H1"),
                StructureElement::new("P"),
                StructureElement::new("Sect").with_children(vec![
                    StructureElement::new("P"),
                    StructureElement::new("P"),
                ]),
            ]),
            StructureElement::new("P"),
        ];

        let summary = structure_summary(&tree);
        assert_eq!(summary.get("P"), Some(&4));
        assert_eq!(summary.get("Document"), Some(&1));
        assert_eq!(summary.get("H1"), Some(&1));
        assert_eq!(summary.get("Sect"), Some(&1));
        assert_eq!(summary.values().sum::<usize>(), 7);
    }

    #[test]
    fn test_empty_summary() {
        assert!(structure_summary(&[]).is_empty());
    }
}
