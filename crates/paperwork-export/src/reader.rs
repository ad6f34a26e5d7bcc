use std::path::Path;

use docx_rs::{
    Break, BreakType, DocumentChild, Docx, ParagraphChild, RunChild, TableCellContent, TableChild,
    TableRowChild,
};
use tracing::{debug, info};

use paperwork_core::model::{
    Alignment, COLUMN_BREAK, Cell, Document, LINE_BREAK, PAGE_BREAK, Paragraph, ParagraphStyle,
    Row, Run, Table,
};

use crate::error::ExportError;
use crate::styles::{StyleSheet, run_format, string_val};

/// A template loaded for one generation: the editable model plus the parsed
/// package it came from (styles, section settings, headers and footers),
/// which the writer reuses as the output shell.
pub struct Template {
    pub shell: Docx,
    pub document: Document,
}

/// Load a `.docx` template from disk. The file is only read.
pub fn load_template(path: &Path) -> Result<Template, ExportError> {
    if !path.is_file() {
        return Err(ExportError::TemplateNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    let template = parse_template(&bytes)?;
    info!(
        path = %path.display(),
        blocks = template.document.blocks.len(),
        "template loaded"
    );
    Ok(template)
}

pub fn parse_template(bytes: &[u8]) -> Result<Template, ExportError> {
    let shell = docx_rs::read_docx(bytes)?;
    let styles = StyleSheet::from_docx(&shell);

    let mut document = Document::new();
    for child in &shell.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                document = document.add_paragraph(read_paragraph(p, &styles));
            }
            DocumentChild::Table(t) => {
                document = document.add_table(read_table(t, &styles));
            }
            _ => debug!("body element kept as is"),
        }
    }

    Ok(Template { shell, document })
}

fn read_table(table: &docx_rs::Table, styles: &StyleSheet) -> Table {
    let mut rows = Vec::new();
    for child in &table.rows {
        let TableChild::TableRow(row) = child;
        let mut cells = Vec::new();
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            let paragraphs = cell_paragraphs(&cell.children)
                .into_iter()
                .map(|p| read_paragraph(p, styles))
                .collect();
            cells.push(Cell::new(paragraphs));
        }
        rows.push(Row::new(cells));
    }

    let mut out = Table::new(rows);
    out.grid = table.grid.clone();
    out
}

/// Paragraphs of a cell in document order, descending into nested tables.
pub(crate) fn cell_paragraphs(children: &[TableCellContent]) -> Vec<&docx_rs::Paragraph> {
    let mut out = Vec::new();
    for content in children {
        match content {
            TableCellContent::Paragraph(p) => out.push(p),
            TableCellContent::Table(table) => {
                for TableChild::TableRow(row) in &table.rows {
                    for TableRowChild::TableCell(cell) in &row.cells {
                        out.extend(cell_paragraphs(&cell.children));
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Runs of a paragraph in document order, including runs inside hyperlinks.
pub(crate) fn source_runs(children: &[ParagraphChild]) -> Vec<&docx_rs::Run> {
    let mut out = Vec::new();
    for child in children {
        match child {
            ParagraphChild::Run(run) => out.push(&**run),
            ParagraphChild::Hyperlink(link) => out.extend(source_runs(&link.children)),
            _ => {}
        }
    }
    out
}

/// Style id and alignment declared directly on a paragraph.
pub(crate) fn paragraph_format(
    paragraph: &docx_rs::Paragraph,
) -> (Option<String>, Option<Alignment>) {
    let property = serde_json::to_value(&paragraph.property).unwrap_or_default();
    let style_id = property.get("style").and_then(string_val);
    let alignment = property
        .get("alignment")
        .and_then(string_val)
        .and_then(|a| parse_alignment(&a));
    (style_id, alignment)
}

fn read_paragraph(paragraph: &docx_rs::Paragraph, styles: &StyleSheet) -> Paragraph {
    let (style_id, alignment) = paragraph_format(paragraph);
    let style = ParagraphStyle {
        font: styles.resolve(style_id.as_deref()),
        id: style_id,
    };

    let mut out = Paragraph::new().style(style);
    out.alignment = alignment;
    out.runs = source_runs(&paragraph.children)
        .into_iter()
        .map(read_run)
        .collect();
    out
}

/// Text and character formatting of one run. Drawings, fields and other
/// non-text children are not part of the model; the writer keeps them.
pub(crate) fn read_run(run: &docx_rs::Run) -> Run {
    let mut text = String::new();
    for child in &run.children {
        match child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(b) if *b == Break::new(BreakType::Page) => text.push(PAGE_BREAK),
            RunChild::Break(b) if *b == Break::new(BreakType::Column) => text.push(COLUMN_BREAK),
            RunChild::Break(_) => text.push(LINE_BREAK),
            _ => {}
        }
    }

    let format = serde_json::to_value(&run.run_property)
        .map(|v| run_format(&v))
        .unwrap_or_default();

    Run::new(text).with_format(format)
}

fn parse_alignment(value: &str) -> Option<Alignment> {
    match value {
        "left" | "start" => Some(Alignment::Left),
        "center" => Some(Alignment::Center),
        "right" | "end" => Some(Alignment::Right),
        "both" | "justified" | "distribute" => Some(Alignment::Justify),
        _ => None,
    }
}
