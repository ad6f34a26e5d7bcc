//! End-to-end document generation.
//!
//! load template → substitute → inject image → save DOCX → convert to PDF.
//! Each run starts from a fresh copy of the template. There is no rollback:
//! if conversion fails the DOCX stays on disk and the failure is carried in
//! [`PdfOutcome::Failed`].

use std::path::PathBuf;

use jiff::civil::Date;
use tracing::{info, warn};

use paperwork_core::inject::{ImageSize, insert_image};
use paperwork_core::placeholder::PlaceholderMap;
use paperwork_core::substitute::{Strategy, SubstitutionReport, substitute_with_report};

use crate::docx::write_docx;
use crate::error::ExportError;
use crate::pdf::PdfConverter;
use crate::reader::load_template;

/// Image to place at a placeholder, e.g. an uploaded signature.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub placeholder: String,
    pub bytes: Vec<u8>,
    pub size: ImageSize,
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub template_path: PathBuf,
    /// Document title used in the output file name, e.g. `"Service Agreement"`.
    pub title: String,
    pub client_name: String,
    pub date: Date,
    pub placeholders: PlaceholderMap,
    pub strategy: Strategy,
    pub image: Option<ImageRequest>,
    pub out_dir: PathBuf,
    /// `None` skips PDF conversion.
    pub converter: Option<PdfConverter>,
}

#[derive(Debug)]
pub enum PdfOutcome {
    Skipped,
    Converted(PathBuf),
    Failed(ExportError),
}

#[derive(Debug)]
pub struct GenerationReport {
    pub document_path: PathBuf,
    pub pdf: PdfOutcome,
    pub substitution: SubstitutionReport,
}

/// `"<title> - <client> <DD Mon YYYY>.docx"`, with characters that are not
/// allowed in file names replaced by `_`.
pub fn output_file_name(title: &str, client_name: &str, date: Date) -> String {
    let stem = format!(
        "{} - {} {}",
        title.trim(),
        client_name.trim(),
        date.strftime("%d %b %Y")
    );
    format!("{}.docx", sanitize_file_name(&stem))
}

pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

pub fn generate(request: &GenerationRequest) -> Result<GenerationReport, ExportError> {
    let mut template = load_template(&request.template_path)?;

    let substitution = substitute_with_report(
        &mut template.document,
        &request.placeholders,
        request.strategy,
    );
    info!(
        strategy = ?request.strategy,
        changed = substitution.paragraphs_changed,
        "placeholders substituted"
    );

    if let Some(image) = &request.image {
        insert_image(
            &mut template.document,
            &image.placeholder,
            &image.bytes,
            image.size,
        )?;
    }

    let bytes = write_docx(template.shell, &template.document)?;

    std::fs::create_dir_all(&request.out_dir)?;
    let document_path = request.out_dir.join(output_file_name(
        &request.title,
        &request.client_name,
        request.date,
    ));
    std::fs::write(&document_path, &bytes)?;
    info!(path = %document_path.display(), bytes = bytes.len(), "document saved");

    let pdf = match &request.converter {
        None => PdfOutcome::Skipped,
        Some(converter) => match converter.convert(&document_path, &request.out_dir) {
            Ok(path) => PdfOutcome::Converted(path),
            Err(e) => {
                warn!(error = %e, docx = %document_path.display(), "PDF conversion failed, DOCX kept");
                PdfOutcome::Failed(e)
            }
        },
    };

    Ok(GenerationReport {
        document_path,
        pdf,
        substitution,
    })
}
