//! Error types for the ledgerlens-core library.

use thiserror::Error;

/// Main error type for the extraction core.
#[derive(Error, Debug)]
pub enum LensError {
    /// PDF access error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// External model (chat/vision) error.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Every tier ran and none produced a usable transaction set.
    #[error("extraction failed: no tier produced at least {0} transactions")]
    ExtractionFailed(usize),

    /// The caller cancelled the extraction mid-flight.
    #[error("extraction cancelled")]
    ExtractionCancelled,

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF access.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The container is structurally corrupt or cannot be parsed.
    #[error("unreadable PDF: {0}")]
    Unreadable(String),

    /// The PDF is encrypted with a non-empty key.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page index requested.
    #[error("invalid page index: {0}")]
    InvalidPage(usize),

    /// Page rasterization failed.
    #[error("failed to render page: {0}")]
    Render(String),
}

/// Errors surfaced by the external chat/vision model clients.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The call exceeded its deadline. Retryable.
    #[error("model call timed out after {0}s")]
    Timeout(u64),

    /// The enclosing extraction was cancelled while the call was in flight.
    #[error("model call cancelled")]
    Cancelled,

    /// The provider returned an error.
    #[error("model API error: {0}")]
    Api(String),

    /// The model was instructed to return JSON and did not.
    #[error("model returned unparseable JSON: {0}")]
    Json(String),
}

impl ModelError {
    /// Whether the orchestrator may retry the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelError::Timeout(_))
    }
}

/// Result type for the extraction core.
pub type Result<T> = std::result::Result<T, LensError>;
