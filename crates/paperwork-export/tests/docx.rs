mod common;

use docx_rs::{BreakType, DocumentChild, TableCellContent, TableChild, TableRowChild};

use paperwork_core::inject::{ImageSize, insert_image};
use paperwork_core::model::{Block, Document, PAGE_BREAK};
use paperwork_core::placeholder::PlaceholderMap;
use paperwork_core::substitute::{Strategy, substitute};
use paperwork_export::docx::write_docx;
use paperwork_export::error::ExportError;
use paperwork_export::reader::{load_template, parse_template};

fn placeholders() -> PlaceholderMap {
    let mut map = PlaceholderMap::new();
    map.insert_raw("<<Client Name>>", "Acme W.L.L.").unwrap();
    map.insert_raw("<<Reference Number>>", "BKR07-2024-CR42").unwrap();
    map.insert_raw("<<Consultancy Fee>>", "250.00").unwrap();
    map
}

fn text_of(doc: &Document) -> String {
    doc.text()
}

#[test]
fn parse_maps_paragraphs_runs_and_tables() {
    let template = parse_template(&common::pack(common::template_docx())).unwrap();
    let doc = &template.document;

    let paragraphs: Vec<_> = doc.paragraphs().collect();
    assert_eq!(paragraphs[0].text(), "Dear <<Client Name>>,");
    assert_eq!(paragraphs[1].runs.len(), 2);
    assert_eq!(paragraphs[1].runs[0].text, "Reference: <<Refer");
    assert_eq!(paragraphs[1].runs[1].text, "ence Number>>");

    let table = doc.tables().next().unwrap();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].cells.len(), 2);
    assert_eq!(table.rows[0].cells[1].paragraphs[0].text(), "<<Signature Image>>");
}

#[test]
fn run_local_round_trip_keeps_split_token() {
    let template = parse_template(&common::pack(common::template_docx())).unwrap();
    let mut doc = template.document;
    substitute(&mut doc, &placeholders(), Strategy::RunLocal);

    let bytes = write_docx(template.shell, &doc).unwrap();
    let reread = parse_template(&bytes).unwrap().document;

    let text = text_of(&reread);
    assert!(text.contains("Dear Acme W.L.L.,"));
    assert!(text.contains("Reference: <<Reference Number>>"));
    assert!(text.contains("Fee: 250.00"));
}

#[test]
fn paragraph_joined_round_trip_replaces_split_token() {
    let template = parse_template(&common::pack(common::template_docx())).unwrap();
    let mut doc = template.document;
    substitute(&mut doc, &placeholders(), Strategy::ParagraphJoined);

    let bytes = write_docx(template.shell, &doc).unwrap();
    let reread = parse_template(&bytes).unwrap().document;

    let text = text_of(&reread);
    assert!(text.contains("Reference: BKR07-2024-CR42"));
    assert!(!text.contains("<<Refer"));
    let reference = reread.paragraphs().nth(1).unwrap();
    assert_eq!(reference.runs[0].text, "Reference: BKR07-2024-CR42");
}

#[test]
fn inserted_image_is_packed_as_media() {
    let template = parse_template(&common::pack(common::template_docx())).unwrap();
    let mut doc = template.document;
    insert_image(
        &mut doc,
        "<<Signature Image>>",
        &common::png_bytes(),
        ImageSize::signature(),
    )
    .unwrap();

    let bytes = write_docx(docx_rs::Docx::new(), &doc).unwrap();

    assert!(bytes.windows(6).any(|w| w == b"media/"));
    let reread = parse_template(&bytes).unwrap().document;
    assert!(!text_of(&reread).contains("<<Signature Image>>"));
}

#[test]
fn tabs_and_breaks_survive_round_trip() {
    let doc = Document {
        blocks: vec![Block::Paragraph(
            paperwork_core::model::Paragraph::new()
                .add_run(paperwork_core::model::Run::new("Item\t250.00\nTotal\u{c}Annex")),
        )],
    };

    let bytes = write_docx(docx_rs::Docx::new(), &doc).unwrap();
    let reread = parse_template(&bytes).unwrap().document;

    assert_eq!(
        reread.paragraphs().next().unwrap().text(),
        "Item\t250.00\nTotal\u{c}Annex"
    );
}

#[test]
fn untouched_template_content_survives_substitution() {
    let template = parse_template(&common::pack(common::rich_template_docx())).unwrap();
    let mut doc = template.document;
    substitute(&mut doc, &placeholders(), Strategy::RunLocal);

    let bytes = write_docx(template.shell, &doc).unwrap();
    let reread = parse_template(&bytes).unwrap();

    let body = &reread.shell.document.children;
    let first = body
        .iter()
        .find_map(|c| match c {
            DocumentChild::Paragraph(p) => Some(p),
            _ => None,
        })
        .unwrap();
    assert!(first.property.indent.is_some());

    let json = serde_json::to_string(&reread.shell.document).unwrap();
    assert!(json.contains("FF0000"));
    assert!(json.contains("yellow"));

    let paragraphs: Vec<_> = reread.document.paragraphs().collect();
    assert_eq!(paragraphs[0].text(), "Dear Acme W.L.L.,Urgent");
    assert_eq!(paragraphs[1].text(), PAGE_BREAK.to_string());

    let table = reread.document.tables().next().unwrap();
    let texts: Vec<String> = table.rows[0].cells[0]
        .paragraphs
        .iter()
        .map(|p| p.text())
        .collect();
    assert_eq!(texts, vec!["Outer", "Inner Acme W.L.L."]);

    let nested_kept = body.iter().any(|c| match c {
        DocumentChild::Table(t) => t.rows.iter().any(|TableChild::TableRow(row)| {
            row.cells.iter().any(|TableRowChild::TableCell(cell)| {
                cell.children
                    .iter()
                    .any(|content| matches!(content, TableCellContent::Table(_)))
            })
        }),
        _ => false,
    });
    assert!(nested_kept);
}

#[test]
fn page_break_is_read_distinct_from_line_break() {
    let docx = docx_rs::Docx::new().add_paragraph(
        docx_rs::Paragraph::new().add_run(
            docx_rs::Run::new()
                .add_text("a")
                .add_break(BreakType::TextWrapping)
                .add_text("b")
                .add_break(BreakType::Page)
                .add_text("c"),
        ),
    );

    let doc = parse_template(&common::pack(docx)).unwrap().document;

    assert_eq!(doc.paragraphs().next().unwrap().text(), "a\nb\u{c}c");
}

#[test]
fn missing_template_is_reported_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_template(&dir.path().join("nope.docx")).err().unwrap();
    assert!(matches!(err, ExportError::TemplateNotFound(_)));
}

#[test]
fn non_docx_template_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.docx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    let err = load_template(&path).err().unwrap();
    assert!(matches!(err, ExportError::TemplateParse(_)));
}
