//! paperwork-export
//!
//! DOCX templates in, DOCX + PDF documents out.

pub mod docx;
pub mod error;
pub mod pdf;
pub mod pipeline;
pub mod reader;
pub mod styles;
