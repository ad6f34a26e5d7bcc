#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use docx_rs::{BreakType, Docx, Paragraph, Run, RunFonts, Table, TableCell, TableRow};

pub fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

/// A small engagement-letter template: a tight token in one run, a token
/// split across two runs, and a signature cell.
pub fn template_docx() -> Docx {
    Docx::new()
        .add_paragraph(
            Paragraph::new().add_run(
                Run::new()
                    .add_text("Dear <<Client Name>>,")
                    .fonts(RunFonts::new().ascii("Arial"))
                    .size(28),
            ),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text("Reference: <<Refer"))
                .add_run(Run::new().add_text("ence Number>>").bold()),
        )
        .add_table(Table::new(vec![TableRow::new(vec![
            TableCell::new().add_paragraph(text_paragraph("Fee: <<Consultancy Fee>>")),
            TableCell::new().add_paragraph(text_paragraph("<<Signature Image>>")),
        ])]))
}

/// Content a template carries that placeholder filling must not disturb: an
/// indented paragraph with a coloured, highlighted run, a page break and a
/// table nested in a cell.
pub fn rich_template_docx() -> Docx {
    Docx::new()
        .add_paragraph(
            Paragraph::new()
                .indent(Some(720), None, None, None)
                .add_run(Run::new().add_text("Dear <<Client Name>>,"))
                .add_run(Run::new().add_text("Urgent").color("FF0000").highlight("yellow")),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)))
        .add_table(Table::new(vec![TableRow::new(vec![
            TableCell::new()
                .add_paragraph(text_paragraph("Outer"))
                .add_table(Table::new(vec![TableRow::new(vec![
                    TableCell::new().add_paragraph(text_paragraph("Inner <<Client Name>>")),
                ])])),
        ])]))
}

pub fn pack(docx: Docx) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    buf.into_inner()
}

pub fn write_template(dir: &Path) -> PathBuf {
    let path = dir.join("letter.docx");
    std::fs::write(&path, pack(template_docx())).unwrap();
    path
}

pub fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(8, 4)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Write a shell script that stands in for the office suite. It is run as
/// `sh <script> --headless --convert-to pdf --outdir <dir> <source>`.
pub fn fake_converter(dir: &Path, body: &str) -> paperwork_export::pdf::PdfConverter {
    let script = dir.join("convert.sh");
    std::fs::write(&script, body).unwrap();
    paperwork_export::pdf::PdfConverter {
        program: "sh".to_string(),
        extra_args: vec![script.display().to_string()],
        timeout_secs: 30,
    }
}

pub const WRITES_PDF: &str = r#"out="$5"; src="$6"; name=$(basename "$src" .docx); printf '%%PDF-1.4' > "$out/$name.pdf""#;
