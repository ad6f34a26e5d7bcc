//! paperwork-core
//!
//! Document model, placeholder substitution, image injection and the
//! serial and reference allocator. This crate has no docx dependency and
//! never touches a file format.

pub mod error;
pub mod fields;
pub mod inject;
pub mod model;
pub mod placeholder;
pub mod reference;
pub mod serial;
pub mod substitute;
