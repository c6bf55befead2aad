//! End-to-end tests over small PDFs built in memory.

use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use pdfsemantic::error::Error;
use pdfsemantic::{
    analyze_bytes, convert_bytes, convert_file, FontRole, PageSelection, Pipeline, PipelineOptions,
    RenderOptions,
};

/// One line of text: font resource, size, baseline x/y, text.
struct TextLine {
    font: &'static str,
    size: i64,
    x: i64,
    y: i64,
    text: &'static str,
}

fn line(font: &'static str, size: i64, y: i64, text: &'static str) -> TextLine {
    TextLine { font, size, x: 72, y, text }
}

fn text_ops(lines: &[TextLine]) -> Vec<Operation> {
    let mut ops = Vec::new();
    for l in lines {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![l.font.into(), l.size.into()]));
        ops.push(Operation::new("Td", vec![l.x.into(), l.y.into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(l.text)]));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

fn strike_ops(x0: i64, x1: i64, y: f32) -> Vec<Operation> {
    vec![
        Operation::new("m", vec![x0.into(), Object::Real(y)]),
        Operation::new("l", vec![x1.into(), Object::Real(y)]),
        Operation::new("S", vec![]),
    ]
}

/// Build a PDF with Helvetica as `/F1` and Helvetica-Bold as `/F2`.
fn build_pdf(pages: Vec<Vec<Operation>>, tagged: Option<Object>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let stream = Stream::new(dictionary! {}, content.encode().unwrap());
        let content_id = doc.add_object(stream);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if let Some(root) = tagged {
        let root_id: ObjectId = doc.add_object(root);
        catalog.set("StructTreeRoot", root_id);
    }
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn sample_page() -> Vec<Operation> {
    let mut ops = text_ops(&[
        line("F2", 24, 700, "Title"),
        line("F1", 12, 650, "Hello world"),
        line("F1", 12, 600, "Second"),
    ]);
    // Mid-height of the 12pt line at baseline 650.
    ops.extend(strike_ops(70, 140, 653.5));
    ops
}

// ==================== Conversion ====================

#[test]
fn test_heading_and_strikethrough() {
    let pdf = build_pdf(vec![sample_page()], None);
    let markdown = convert_bytes(&pdf).unwrap();

    assert_eq!(markdown, "# Title\n\n~~Hello world~~\n\nSecond");
}

#[test]
fn test_font_classification() {
    let pdf = build_pdf(vec![sample_page()], None);
    let doc = analyze_bytes(&pdf).unwrap();

    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.classification.body_font_size(), Some(12.0));
    assert_eq!(doc.classification.clusters.len(), 2);

    let spans = &doc.pages[0].spans;
    assert_eq!(spans.len(), 3);
    assert_eq!(spans[0].role, Some(FontRole::H1));
    assert!(spans[0].is_bold);
    assert_eq!(spans[1].role, Some(FontRole::Body));
    assert!(spans[1].is_struck());
    assert!(!spans[2].is_struck());
}

#[test]
fn test_strikethrough_can_be_disabled() {
    let pdf = build_pdf(vec![sample_page()], None);
    let doc = analyze_bytes(&pdf).unwrap();
    let markdown = doc.to_markdown(&RenderOptions::new().with_strikethrough(false));

    assert!(markdown.contains("Hello world"));
    assert!(!markdown.contains("~~"));
}

#[test]
fn test_sequential_matches_parallel() {
    let pdf = build_pdf(vec![sample_page(), sample_page(), sample_page()], None);

    let parallel = Pipeline::new(PipelineOptions::new()).analyze_bytes(&pdf).unwrap();
    let sequential = Pipeline::new(PipelineOptions::new().sequential())
        .analyze_bytes(&pdf)
        .unwrap();

    let options = RenderOptions::default();
    assert_eq!(parallel.to_markdown(&options), sequential.to_markdown(&options));
    assert_eq!(parallel.classification, sequential.classification);
    assert_eq!(parallel.page_count(), 3);
}

#[test]
fn test_page_selection() {
    let second = text_ops(&[line("F1", 12, 700, "Only on page two")]);
    let pdf = build_pdf(vec![sample_page(), second], None);

    let options = PipelineOptions::new().with_pages(PageSelection::Pages(vec![2]));
    let doc = Pipeline::new(options).analyze_bytes(&pdf).unwrap();
    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.pages[0].number, 2);
    assert_eq!(doc.to_markdown(&RenderOptions::default()), "Only on page two");

    let full = analyze_bytes(&pdf).unwrap();
    let markdown = full.to_markdown(&RenderOptions::new().with_page_range(2..=2));
    assert_eq!(markdown, "Only on page two");
}

#[test]
fn test_empty_page_renders_nothing() {
    let pdf = build_pdf(vec![Vec::new()], None);
    let doc = analyze_bytes(&pdf).unwrap();

    assert!(doc.classification.is_empty());
    assert_eq!(doc.to_markdown(&RenderOptions::default()), "");
}

#[test]
fn test_font_set_inside_saved_state_does_not_leak() {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![72.into(), 700.into()]),
        Operation::new("Tj", vec![Object::string_literal("Body one")]),
        Operation::new("ET", vec![]),
        Operation::new("q", vec![]),
    ];
    ops.extend(text_ops(&[line("F2", 24, 650, "Title")]));
    ops.extend([
        Operation::new("Q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("Td", vec![72.into(), 600.into()]),
        Operation::new("Tj", vec![Object::string_literal("Body two")]),
        Operation::new("ET", vec![]),
    ]);
    let pdf = build_pdf(vec![ops], None);
    let doc = analyze_bytes(&pdf).unwrap();

    let spans = &doc.pages[0].spans;
    assert_eq!(spans.len(), 3);
    assert_eq!(spans[2].font_name, "Helvetica");
    assert_eq!(spans[2].font_size, 12.0);
    assert_eq!(spans[2].role, Some(FontRole::Body));
    assert_eq!(
        doc.to_markdown(&RenderOptions::default()),
        "Body one\n\n# Title\n\nBody two"
    );
}

// ==================== Tagged Documents ====================

#[test]
fn test_tagged_cross_check() {
    let tree = Object::Dictionary(dictionary! {
        "Type" => "StructTreeRoot",
        "K" => dictionary! {
            "S" => "Document",
            "K" => vec![
                Object::Dictionary(dictionary! { "S" => "H1", "K" => 0 }),
                Object::Dictionary(dictionary! { "S" => "P", "K" => 1 }),
                Object::Dictionary(dictionary! { "S" => "P", "K" => 2 }),
            ],
        },
    });
    let pdf = build_pdf(vec![sample_page()], Some(tree));
    let doc = analyze_bytes(&pdf).unwrap();

    assert!(doc.tagged);
    assert_eq!(doc.structure.len(), 1);
    assert_eq!(doc.structure[0].children().len(), 3);

    let check = doc.cross_check();
    assert_eq!(check.tagged_headings, 1);
    assert_eq!(check.inferred_headings, 1);
    assert!(check.agrees());
}

#[test]
fn test_structure_skipped_when_disabled() {
    let tree = Object::Dictionary(dictionary! {
        "Type" => "StructTreeRoot",
        "K" => dictionary! { "S" => "P" },
    });
    let pdf = build_pdf(vec![sample_page()], Some(tree));

    let options = PipelineOptions::new().with_structure(false);
    let doc = Pipeline::new(options).analyze_bytes(&pdf).unwrap();
    assert!(!doc.tagged);
    assert!(doc.structure.is_empty());
}

// ==================== Files and Errors ====================

#[test]
fn test_convert_file() {
    let pdf = build_pdf(vec![sample_page()], None);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&pdf).unwrap();
    file.flush().unwrap();

    let markdown = convert_file(file.path()).unwrap();
    assert!(markdown.starts_with("# Title"));
}

#[test]
fn test_not_a_pdf() {
    let result = analyze_bytes(b"PK\x03\x04 definitely a zip");
    assert!(matches!(result, Err(Error::UnknownFormat)));
}
