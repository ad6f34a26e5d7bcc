use thiserror::Error;

use paperwork_core::error::CoreError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("template parse error: {0}")]
    TemplateParse(String),

    #[error("DOCX generation failed: {0}")]
    Docx(String),

    #[error("PDF conversion failed: {0}")]
    Conversion(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<docx_rs::ReaderError> for ExportError {
    fn from(e: docx_rs::ReaderError) -> Self {
        ExportError::TemplateParse(e.to_string())
    }
}
