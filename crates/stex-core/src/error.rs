//! Error types for the stex-core library.

use thiserror::Error;

/// Main error type for the stex library.
#[derive(Error, Debug)]
pub enum StexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Model response failed parsing or schema validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Inference error from the inference layer.
    #[error("inference error: {0}")]
    Inference(#[from] stex_inference::InferenceError),

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

    /// The PDF carries no text layer to extract.
    #[error("no extractable text found; the PDF appears to be a scanned document")]
    NoText,
}

/// Errors raised while validating a model response.
///
/// Parse failures and schema violations are kept distinct from transport
/// errors so a garbled model answer is never mistaken for a network outage.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The response content was not valid JSON.
    #[error("failed to parse model response as JSON: {0}")]
    Parse(String),

    /// A required field is absent.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A field is present but violates the schema contract.
    #[error("validation failed for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ValidationError {
    /// Build an [`Invalid`](ValidationError::Invalid) error for `field`.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for the stex library.
pub type Result<T> = std::result::Result<T, StexError>;
