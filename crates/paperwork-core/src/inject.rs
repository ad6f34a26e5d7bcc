//! Replace a placeholder paragraph with an embedded image.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{Block, Document, InlineImage, Paragraph, Run};

pub const EMU_PER_INCH: f64 = 914_400.0;

/// Physical display size of an embedded image, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width_emu: u32,
    pub height_emu: u32,
}

impl ImageSize {
    pub fn from_inches(width: f64, height: f64) -> Self {
        Self {
            width_emu: (width * EMU_PER_INCH).round() as u32,
            height_emu: (height * EMU_PER_INCH).round() as u32,
        }
    }

    /// 1.5in × 0.75in, the size used for signature blocks.
    pub fn signature() -> Self {
        Self::from_inches(1.5, 0.75)
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::signature()
    }
}

/// Where a paragraph lives inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphPath {
    Body {
        block: usize,
    },
    Cell {
        block: usize,
        row: usize,
        cell: usize,
        paragraph: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderLocation {
    Found(ParagraphPath),
    NotFound,
}

/// Locate the first paragraph whose visible text contains `key`.
///
/// Table cells are searched before body paragraphs: tables in document
/// order, rows top to bottom, cells left to right.
pub fn find_placeholder(document: &Document, key: &str) -> PlaceholderLocation {
    for (block_idx, block) in document.blocks.iter().enumerate() {
        let Block::Table(table) = block else { continue };
        for (row_idx, row) in table.rows.iter().enumerate() {
            for (cell_idx, cell) in row.cells.iter().enumerate() {
                for (para_idx, paragraph) in cell.paragraphs.iter().enumerate() {
                    if paragraph.text().contains(key) {
                        return PlaceholderLocation::Found(ParagraphPath::Cell {
                            block: block_idx,
                            row: row_idx,
                            cell: cell_idx,
                            paragraph: para_idx,
                        });
                    }
                }
            }
        }
    }

    for (block_idx, block) in document.blocks.iter().enumerate() {
        if let Block::Paragraph(paragraph) = block
            && paragraph.text().contains(key)
        {
            return PlaceholderLocation::Found(ParagraphPath::Body { block: block_idx });
        }
    }

    PlaceholderLocation::NotFound
}

pub fn paragraph_at_mut(document: &mut Document, path: ParagraphPath) -> Option<&mut Paragraph> {
    match path {
        ParagraphPath::Body { block } => match document.blocks.get_mut(block)? {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        },
        ParagraphPath::Cell {
            block,
            row,
            cell,
            paragraph,
        } => match document.blocks.get_mut(block)? {
            Block::Table(t) => t
                .rows
                .get_mut(row)?
                .cells
                .get_mut(cell)?
                .paragraphs
                .get_mut(paragraph),
            Block::Paragraph(_) => None,
        },
    }
}

/// Decode `bytes` far enough to know they are a usable PNG or JPEG and read
/// their pixel dimensions.
pub fn decode_image(bytes: &[u8], size: ImageSize) -> Result<InlineImage, CoreError> {
    let format = ::image::guess_format(bytes)
        .map_err(|e| CoreError::ImageInsertion(format!("unrecognised image data: {e}")))?;
    if !matches!(format, ::image::ImageFormat::Png | ::image::ImageFormat::Jpeg) {
        return Err(CoreError::ImageInsertion(format!(
            "unsupported image format {format:?}, expected PNG or JPEG"
        )));
    }
    let decoded = ::image::load_from_memory_with_format(bytes, format)
        .map_err(|e| CoreError::ImageInsertion(e.to_string()))?;

    Ok(InlineImage {
        data: bytes.to_vec(),
        pixel_width: decoded.width(),
        pixel_height: decoded.height(),
        width_emu: size.width_emu,
        height_emu: size.height_emu,
    })
}

/// Replace the first paragraph containing `key` with a single image run.
///
/// Only the first occurrence is replaced. On error the document is left
/// untouched.
pub fn insert_image<'a>(
    document: &'a mut Document,
    key: &str,
    image_bytes: &[u8],
    size: ImageSize,
) -> Result<&'a mut Document, CoreError> {
    let PlaceholderLocation::Found(path) = find_placeholder(document, key) else {
        return Err(CoreError::PlaceholderNotFound(key.to_string()));
    };
    debug!(key, ?path, "image placeholder located");

    let image = decode_image(image_bytes, size)?;
    let (w, h) = (image.pixel_width, image.pixel_height);

    let paragraph = paragraph_at_mut(document, path)
        .ok_or_else(|| CoreError::PlaceholderNotFound(key.to_string()))?;
    paragraph.runs = vec![Run::image(image)];

    info!(key, pixel_width = w, pixel_height = h, "image inserted");
    Ok(document)
}
