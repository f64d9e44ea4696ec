//! Error types for the letter-export library

use crate::constants::{MESSAGE_FAILED, MESSAGE_NOT_READY};
use thiserror::Error;

/// Result type alias using ExportError
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while laying out, capturing or exporting a letter
#[derive(Debug, Error)]
pub enum ExportError {
    /// Error from the underlying lopdf library
    #[error("PDF operation failed: {0}")]
    PdfError(#[from] lopdf::Error),

    /// Error from the image library
    #[error("Image operation failed: {0}")]
    ImageError(#[from] image::ImageError),

    /// Filesystem error while delivering a document
    #[error("I/O failed: {0}")]
    IoError(#[from] std::io::Error),

    /// The page is not mounted yet, nothing to capture
    #[error("Page content is not mounted")]
    SourceNotReady,

    /// Another export is capturing or assembling
    #[error("An export is already in progress")]
    Busy,

    /// Rasterization of the isolated page failed
    #[error("Capture failed: {0}")]
    CaptureError(String),

    /// Embedding or delivering the document failed
    #[error("Assembly failed: {0}")]
    AssemblyError(String),

    /// Invalid dimensions
    #[error("Invalid dimensions: {0}")]
    DimensionError(String),

    /// Font loading or text measurement error
    #[error("Text rendering failed: {0}")]
    TextError(String),
}

impl ExportError {
    /// Message suitable for showing to the user.
    ///
    /// Capture and assembly failures share one message; the user does not
    /// need to tell them apart.
    pub fn user_message(&self) -> &'static str {
        match self {
            ExportError::SourceNotReady => MESSAGE_NOT_READY,
            _ => MESSAGE_FAILED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(ExportError::SourceNotReady.user_message(), MESSAGE_NOT_READY);
        assert_eq!(
            ExportError::CaptureError("boom".into()).user_message(),
            ExportError::AssemblyError("bang".into()).user_message()
        );
    }
}
