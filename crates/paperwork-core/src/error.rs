use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serial storage unavailable at {path}: {reason}")]
    StorageUnavailable { path: String, reason: String },

    #[error("business references need a serial counter")]
    NoSerialCounter,

    #[error("placeholder '{0}' not found in the document")]
    PlaceholderNotFound(String),

    #[error("error inserting image: {0}")]
    ImageInsertion(String),

    #[error("invalid placeholder token: {0}")]
    InvalidPlaceholder(String),

    #[error("invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

impl CoreError {
    pub(crate) fn storage(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        CoreError::StorageUnavailable {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
