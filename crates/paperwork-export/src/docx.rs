use std::io::Cursor;

use docx_rs::{
    AlignmentType, BreakType, DocumentChild, Docx, ParagraphChild, Pic, RunChild, RunFonts,
    RunProperty, TableCellContent, TableChild, TableRowChild,
};
use tracing::debug;

use paperwork_core::model::{
    Alignment, Block, COLUMN_BREAK, Cell, Document, LINE_BREAK, PAGE_BREAK, Paragraph, Run,
    RunFormat, Table,
};

use crate::error::ExportError;
use crate::reader::{cell_paragraphs, paragraph_format, read_run, source_runs};

/// Serialize `document` into a DOCX package.
///
/// `shell` supplies everything outside the body (styles, numbering, section
/// settings, headers and footers). When the shell's body has the same shape
/// as `document`, which holds for a template and the model read from it,
/// the body is patched in place: paragraph properties, run properties the
/// model does not track, drawings, fields, hyperlinks and nested tables are
/// kept, and only runs whose text or tracked format changed are rewritten.
/// Otherwise the body is rebuilt from the model. Pass `Docx::new()` to write
/// a standalone document.
pub fn write_docx(shell: Docx, document: &Document) -> Result<Vec<u8>, ExportError> {
    let mut docx = shell;

    if same_shape(&docx.document.children, document) {
        patch_body(&mut docx.document.children, &document.blocks);
    } else {
        debug!(blocks = document.blocks.len(), "rebuilding document body");
        docx.document.children.clear();
        for block in &document.blocks {
            docx = match block {
                Block::Paragraph(p) => docx.add_paragraph(build_paragraph(p)),
                Block::Table(t) => docx.add_table(build_table(t)),
            };
        }
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    Ok(buf.into_inner())
}

fn same_shape(children: &[DocumentChild], document: &Document) -> bool {
    let mut blocks = document.blocks.iter();
    for child in children {
        let matches = match child {
            DocumentChild::Paragraph(_) => matches!(blocks.next(), Some(Block::Paragraph(_))),
            DocumentChild::Table(_) => matches!(blocks.next(), Some(Block::Table(_))),
            _ => true,
        };
        if !matches {
            return false;
        }
    }
    blocks.next().is_none()
}

fn patch_body(children: &mut [DocumentChild], blocks: &[Block]) {
    let mut blocks = blocks.iter();
    for child in children {
        match child {
            DocumentChild::Paragraph(p) => {
                if let Some(Block::Paragraph(model)) = blocks.next() {
                    patch_paragraph(p, model);
                }
            }
            DocumentChild::Table(t) => {
                if let Some(Block::Table(model)) = blocks.next() {
                    patch_table(t, model);
                }
            }
            _ => {}
        }
    }
}

fn patch_table(table: &mut docx_rs::Table, model: &Table) {
    let shape_matches = table.rows.len() == model.rows.len()
        && table
            .rows
            .iter()
            .zip(&model.rows)
            .all(|(TableChild::TableRow(row), m)| row.cells.len() == m.cells.len());
    if !shape_matches {
        *table = build_table(model);
        return;
    }

    if !model.grid.is_empty() && table.grid != model.grid {
        table.grid = model.grid.clone();
    }
    for (TableChild::TableRow(row), model_row) in table.rows.iter_mut().zip(&model.rows) {
        for (TableRowChild::TableCell(cell), model_cell) in row.cells.iter_mut().zip(&model_row.cells)
        {
            patch_cell(cell, model_cell);
        }
    }
}

fn patch_cell(cell: &mut docx_rs::TableCell, model: &Cell) {
    if cell_paragraphs(&cell.children).len() != model.paragraphs.len() {
        cell.children = model
            .paragraphs
            .iter()
            .map(|p| TableCellContent::Paragraph(build_paragraph(p)))
            .collect();
        return;
    }
    patch_cell_content(&mut cell.children, &mut model.paragraphs.iter());
}

fn patch_cell_content<'a>(
    children: &mut [TableCellContent],
    paragraphs: &mut impl Iterator<Item = &'a Paragraph>,
) {
    for content in children {
        match content {
            TableCellContent::Paragraph(p) => {
                if let Some(model) = paragraphs.next() {
                    patch_paragraph(p, model);
                }
            }
            TableCellContent::Table(table) => {
                for TableChild::TableRow(row) in &mut table.rows {
                    for TableRowChild::TableCell(cell) in &mut row.cells {
                        patch_cell_content(&mut cell.children, paragraphs);
                    }
                }
            }
            _ => {}
        }
    }
}

fn patch_paragraph(paragraph: &mut docx_rs::Paragraph, model: &Paragraph) {
    let (style_id, alignment) = paragraph_format(paragraph);
    if let Some(id) = &model.style.id
        && style_id.as_ref() != Some(id)
    {
        *paragraph = std::mem::take(paragraph).style(id);
    }
    if let Some(a) = model.alignment
        && alignment != Some(a)
    {
        *paragraph = std::mem::take(paragraph).align(alignment_type(a));
    }

    if source_runs(&paragraph.children).len() == model.runs.len() {
        patch_runs(&mut paragraph.children, &mut model.runs.iter());
    } else {
        // The model restructured the paragraph (e.g. an injected image):
        // keep its properties, replace its content.
        paragraph.children = model
            .runs
            .iter()
            .map(|r| ParagraphChild::Run(Box::new(build_run(r))))
            .collect();
    }
}

fn patch_runs<'a>(children: &mut [ParagraphChild], runs: &mut impl Iterator<Item = &'a Run>) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                if let Some(model) = runs.next() {
                    patch_run(run, model);
                }
            }
            ParagraphChild::Hyperlink(link) => patch_runs(&mut link.children, runs),
            _ => {}
        }
    }
}

fn patch_run(run: &mut docx_rs::Run, model: &Run) {
    let original = read_run(run);
    if original == *model {
        return;
    }

    run.run_property = restyle(
        std::mem::take(&mut run.run_property),
        &original.format,
        &model.format,
    );
    if original.text != model.text || model.image.is_some() {
        let content = add_content(docx_rs::Run::new(), model).children;
        run.children = splice_content(std::mem::take(&mut run.children), content);
    }
}

/// Apply the differences between `before` and `after` to `property`,
/// leaving every setting the model does not track (colour, highlight,
/// spacing and so on) as it was.
fn restyle(mut property: RunProperty, before: &RunFormat, after: &RunFormat) -> RunProperty {
    if after.font_name != before.font_name {
        match &after.font_name {
            Some(name) => property = property.fonts(run_fonts(name)),
            None => property.fonts = None,
        }
    }
    if after.font_size != before.font_size {
        match after.font_size {
            Some(size) => property = property.size(size),
            None => {
                property.sz = None;
                property.sz_cs = None;
            }
        }
    }
    if after.bold != before.bold {
        property = if after.bold {
            property.bold()
        } else {
            property.disable_bold()
        };
    }
    if after.italic != before.italic {
        property = if after.italic {
            property.italic()
        } else {
            property.disable_italic()
        };
    }
    if after.underline != before.underline {
        if after.underline {
            property = property.underline("single");
        } else {
            property.underline = None;
        }
    }
    property
}

fn is_text_content(child: &RunChild) -> bool {
    matches!(
        child,
        RunChild::Text(_) | RunChild::Tab(_) | RunChild::Break(_)
    )
}

/// Put `content` where the run's text used to start, keeping every other
/// child in its place.
fn splice_content(children: Vec<RunChild>, content: Vec<RunChild>) -> Vec<RunChild> {
    let mut out = Vec::with_capacity(children.len() + content.len());
    let mut content = Some(content);
    for child in children {
        if is_text_content(&child) {
            if let Some(new) = content.take() {
                out.extend(new);
            }
        } else {
            out.push(child);
        }
    }
    if let Some(new) = content {
        out.extend(new);
    }
    out
}

fn build_table(table: &Table) -> docx_rs::Table {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let cells = row
                .cells
                .iter()
                .map(|cell| {
                    cell.paragraphs
                        .iter()
                        .fold(docx_rs::TableCell::new(), |c, p| {
                            c.add_paragraph(build_paragraph(p))
                        })
                })
                .collect();
            docx_rs::TableRow::new(cells)
        })
        .collect();

    let out = docx_rs::Table::new(rows);
    if table.grid.is_empty() {
        out
    } else {
        out.set_grid(table.grid.clone())
    }
}

fn build_paragraph(paragraph: &Paragraph) -> docx_rs::Paragraph {
    let mut para = docx_rs::Paragraph::new();
    if let Some(id) = &paragraph.style.id {
        para = para.style(id);
    }
    if let Some(alignment) = paragraph.alignment {
        para = para.align(alignment_type(alignment));
    }
    for run in &paragraph.runs {
        para = para.add_run(build_run(run));
    }
    para
}

fn build_run(run: &Run) -> docx_rs::Run {
    add_content(apply_format(docx_rs::Run::new(), &run.format), run)
}

/// Append the run's image and text, turning tabs and breaks in the model
/// text back into run children.
fn add_content(mut out: docx_rs::Run, run: &Run) -> docx_rs::Run {
    if let Some(image) = &run.image {
        let pic = Pic::new_with_dimensions(image.data.clone(), image.pixel_width, image.pixel_height)
            .size(image.width_emu, image.height_emu);
        out = out.add_image(pic);
    }

    let mut segment = String::new();
    for c in run.text.chars() {
        if !matches!(c, '\t' | LINE_BREAK | PAGE_BREAK | COLUMN_BREAK) {
            segment.push(c);
            continue;
        }
        if !segment.is_empty() {
            out = out.add_text(std::mem::take(&mut segment));
        }
        out = match c {
            '\t' => out.add_tab(),
            PAGE_BREAK => out.add_break(BreakType::Page),
            COLUMN_BREAK => out.add_break(BreakType::Column),
            _ => out.add_break(BreakType::TextWrapping),
        };
    }
    if !segment.is_empty() {
        out = out.add_text(segment);
    }

    out
}

fn run_fonts(name: &str) -> RunFonts {
    RunFonts::new()
        .ascii(name)
        .hi_ansi(name)
        .east_asia(name)
        .cs(name)
}

fn apply_format(mut run: docx_rs::Run, format: &RunFormat) -> docx_rs::Run {
    if let Some(name) = &format.font_name {
        run = run.fonts(run_fonts(name));
    }
    if let Some(size) = format.font_size {
        run = run.size(size);
    }
    if format.bold {
        run = run.bold();
    }
    if format.italic {
        run = run.italic();
    }
    if format.underline {
        run = run.underline("single");
    }
    run
}

fn alignment_type(alignment: Alignment) -> AlignmentType {
    match alignment {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Right => AlignmentType::Right,
        Alignment::Justify => AlignmentType::Both,
    }
}
