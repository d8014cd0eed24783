//! Form definitions backing the upload and review routes.

use thiserror::Error;
use validator::ValidationErrors;

pub mod review;
pub mod upload;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("no file was uploaded")]
    MissingFile,

    #[error("failed to read uploaded file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid field path")]
    InvalidFieldPath,
}
