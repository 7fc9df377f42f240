//! PDF processing module.

mod extractor;

pub use extractor::{PdfContent, PdfExtractor};

use crate::error::PdfError;

/// Classification of a PDF by its extractable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfKind {
    /// Contains an extractable text layer.
    Text,
    /// Contains image objects but no usable text (scanned document).
    Scanned,
    /// No usable text and no images.
    Empty,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Classify the PDF by its extractable content.
    fn analyze(&self) -> PdfKind;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;
}
