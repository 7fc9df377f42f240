//! Statement extraction pipeline.
//!
//! The pieces mirror the pipeline order: `prompt` builds the instruction
//! payload, `schema` describes the response contract attached to the
//! request, `validate` checks what came back, and `extractor` ties them
//! all to a chat backend.

mod extractor;
mod prompt;
mod schema;
mod validate;

pub use extractor::{EXPORT_FILE_NAME, ExtractionOutcome, StatementExtractor};
pub use prompt::{SYSTEM_PROMPT, build_messages};
pub use schema::response_format;
pub use validate::validate_content;

use crate::error::ValidationError;

/// Result type for response validation.
pub type Result<T> = std::result::Result<T, ValidationError>;
