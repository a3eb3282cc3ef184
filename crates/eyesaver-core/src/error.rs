//! Error types for the eyesaver-core library.

use thiserror::Error;

/// Main error type for the eyesaver library.
#[derive(Error, Debug)]
pub enum EyesaverError {
    /// PDF loading, compositing or saving error.
    #[error("PDF error: {0}")]
    Document(#[from] DocumentError),

    /// Malformed color literal.
    #[error("color error: {0}")]
    Color(#[from] ColorFormatError),

    /// Image encoding error (previews).
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The input is not a well-formed PDF.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// The requested preview bitmap would exceed the pixel limit.
    #[error("preview of {width}x{height} pixels is too large")]
    PreviewTooLarge { width: u64, height: u64 },

    /// The page tree or a page object could not be updated.
    #[error("malformed page structure: {0}")]
    Structure(String),

    /// Failed to serialize the modified document.
    #[error("failed to save PDF: {0}")]
    Save(String),
}

/// Errors raised while parsing a `#RRGGBB` color literal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorFormatError {
    /// Wrong number of hex digits after stripping `#`.
    #[error("expected 6 hex digits in {input:?}, found {digits}")]
    Length { input: String, digits: usize },

    /// A character outside `0-9a-fA-F`.
    #[error("invalid hex digit in {input:?}")]
    Digit { input: String },
}

impl From<lopdf::Error> for DocumentError {
    fn from(err: lopdf::Error) -> Self {
        DocumentError::Structure(err.to_string())
    }
}

/// Result type for the eyesaver library.
pub type Result<T> = std::result::Result<T, EyesaverError>;
