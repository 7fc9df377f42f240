//! Core library for bank-statement extraction.
//!
//! This crate provides:
//! - PDF text extraction (lopdf + pdf-extract)
//! - The prompt contract and response-schema descriptor for structured
//!   extraction
//! - Response validation into immutable statement models
//! - An extraction pipeline generic over chat backends

pub mod error;
pub mod models;
pub mod pdf;
pub mod statement;

pub use error::{PdfError, Result, StexError, ValidationError};
pub use models::config::{InferenceConfig, PdfConfig, StexConfig};
pub use models::statement::{
    AccountHolder, BankStatement, Currency, Transaction, TransactionType,
};
pub use pdf::{PdfContent, PdfExtractor, PdfKind, PdfProcessor};
pub use statement::{
    EXPORT_FILE_NAME, ExtractionOutcome, StatementExtractor, build_messages, response_format,
    validate_content,
};

/// Re-export inference types.
pub use stex_inference::{
    ChatBackend, ChatMessage, ChatRequest, InferenceError, OllamaBackend,
};
