//! PDF text extraction using lopdf and pdf-extract.

use lopdf::{Document, Object};
use tracing::debug;

use super::{PdfKind, PdfProcessor, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
///
/// lopdf handles document structure (pages, encryption, image objects);
/// the text layer itself comes out through pdf-extract, which needs the
/// raw bytes again, so both are kept around.
#[derive(Debug)]
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    min_text_length: usize,
}

/// Extracted content from a PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Classification of the document.
    pub kind: PdfKind,
    /// Extracted text (if any).
    pub text: String,
    /// Number of pages.
    pub pages: u32,
}

impl PdfExtractor {
    /// Create a new PDF extractor with default settings.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            min_text_length: 50,
        }
    }

    /// Set the text-length threshold below which a document counts as
    /// having no text layer.
    pub fn with_min_text_length(mut self, length: usize) -> Self {
        self.min_text_length = length;
        self
    }

    /// Load a PDF directly from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    /// Extract text, page count, and classification in one pass.
    pub fn extract_all(&self) -> Result<PdfContent> {
        let pages = self.page_count();
        if pages == 0 {
            return Err(PdfError::NoPages);
        }

        let text = self.extract_text()?;
        let kind = self.classify(&text);

        debug!(
            "PDF analysis: {} pages, {} chars text -> {:?}",
            pages,
            text.trim().len(),
            kind
        );

        Ok(PdfContent { kind, text, pages })
    }

    /// Extract the statement text, rejecting documents without a text layer.
    pub fn statement_text(&self) -> Result<String> {
        let content = self.extract_all()?;
        match content.kind {
            PdfKind::Text => Ok(content.text),
            PdfKind::Scanned | PdfKind::Empty => Err(PdfError::NoText),
        }
    }

    fn classify(&self, text: &str) -> PdfKind {
        if text.trim().len() >= self.min_text_length {
            PdfKind::Text
        } else if self.has_image_objects() {
            PdfKind::Scanned
        } else {
            PdfKind::Empty
        }
    }

    /// Whether the document contains any image XObjects.
    ///
    /// Detection only; the images are never decoded. A document with
    /// images but no text layer is almost certainly a scan.
    fn has_image_objects(&self) -> bool {
        let Some(doc) = self.document.as_ref() else {
            return false;
        };

        doc.objects.values().any(|object| {
            let Object::Stream(stream) = object else {
                return false;
            };
            stream
                .dict
                .get(b"Subtype")
                .and_then(|subtype| subtype.as_name())
                .is_ok_and(|name| name == b"Image")
        })
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn analyze(&self) -> PdfKind {
        let text = self.extract_text().unwrap_or_default();
        self.classify(&text)
    }

    fn extract_text(&self) -> Result<String> {
        let text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        Ok(text)
    }
}
