//! Integration tests for Markdown accuracy scoring.

use pdfsemantic::accuracy::{extract_elements, score_markdown, ElementKind};

const REFERENCE: &str = "\
# Annual Report

Revenue grew **strongly** this year.
It continued into the *second* half.

## Outlook

- Expand sales
- Hire engineers
  - Backend
  - Frontend

> Forward-looking statements apply.

| Region | Growth |
|--------|--------|
| EU     | 12%    |

```text
# not a heading
```

---
";

#[test]
fn test_reference_element_counts() {
    let elements = extract_elements(REFERENCE).unwrap();
    let count = |kind: ElementKind| elements.iter().filter(|e| e.kind == kind).count();

    assert_eq!(count(ElementKind::Header), 2);
    assert_eq!(count(ElementKind::Paragraph), 1);
    assert_eq!(count(ElementKind::Bold), 1);
    assert_eq!(count(ElementKind::Italic), 1);
    assert_eq!(count(ElementKind::ListItem), 4);
    assert_eq!(count(ElementKind::Blockquote), 1);
    assert_eq!(count(ElementKind::TableRow), 2);
    assert_eq!(count(ElementKind::CodeBlock), 1);
    assert_eq!(count(ElementKind::HorizontalRule), 1);
}

#[test]
fn test_identical_documents_score_perfectly() {
    let report = score_markdown(REFERENCE, REFERENCE).unwrap();
    assert_eq!(report.accuracy(), 100.0);
    assert!(report.per_type.values().all(|s| s.f1 == 1.0));
}

#[test]
fn test_plain_text_output_loses_structure() {
    let flattened = "Annual Report\n\nRevenue grew strongly this year.\n\nOutlook";
    let report = score_markdown(REFERENCE, flattened).unwrap();

    let header = report.get(ElementKind::Header).unwrap();
    assert_eq!(header.recall, 0.0);

    let paragraph = report.get(ElementKind::Paragraph).unwrap();
    assert_eq!(paragraph.true_positives, 1);
    assert_eq!(paragraph.false_positives, 2);

    assert!(report.accuracy() < 50.0);
}

#[test]
fn test_report_serializes_kind_names() {
    let report = score_markdown("# A", "# A\n\n~~gone~~ text").unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["per_type"]["header"]["f1"], serde_json::json!(1.0));
    assert_eq!(json["per_type"]["paragraph"]["false_positives"], serde_json::json!(1));
}
