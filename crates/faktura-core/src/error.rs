//! Error types for the faktura-core library.

use thiserror::Error;

/// Main error type for the faktura library.
#[derive(Error, Debug)]
pub enum FakturaError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to invoice field extraction.
///
/// A field that simply isn't present is not an error; these cover input the
/// extractor refuses to look at.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Both the document text and the file name are blank.
    #[error("nothing to extract from: document text and file name are both empty")]
    EmptyInput,

    /// Document text exceeds the configured size cap.
    #[error("document text is {len} bytes, limit is {limit}")]
    TextTooLong { len: usize, limit: usize },
}

/// Result type for the faktura library.
pub type Result<T> = std::result::Result<T, FakturaError>;
