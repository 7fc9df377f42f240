//! The extraction pipeline: prompt, inference, validated statement.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use stex_inference::{ChatBackend, ChatRequest};

use super::{prompt, schema, validate};
use crate::error::{Result, StexError};
use crate::models::statement::BankStatement;

/// File name for the exported result artifact.
pub const EXPORT_FILE_NAME: &str = "transactions.json";

/// Drives one extraction: builds the prompt and schema constraint, submits
/// them to the backend, and validates what comes back.
pub struct StatementExtractor<B: ChatBackend> {
    backend: B,
    model: String,
}

impl<B: ChatBackend> StatementExtractor<B> {
    /// Create an extractor submitting to `model` on the given backend.
    pub fn new(backend: B, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Extract a validated statement from document text.
    ///
    /// Idempotent: the same text can be resubmitted by calling again,
    /// modulo the model's own non-determinism.
    pub async fn extract(&self, document_text: &str) -> Result<BankStatement> {
        debug!(
            "Submitting {} chars of statement text to '{}'",
            document_text.len(),
            self.model
        );

        let request = ChatRequest::new(self.model.clone(), prompt::build_messages(document_text))
            .with_format(schema::response_format());

        let content = self.backend.chat(&request).await?;
        let statement = validate::validate_content(&content)?;

        info!(
            "Extracted {} transactions for {}",
            statement.transactions.len(),
            statement.account_holder.name
        );
        Ok(statement)
    }

    /// Run an extraction and fold any failure into an exportable outcome.
    pub async fn extract_outcome(&self, document_text: &str) -> ExtractionOutcome {
        match self.extract(document_text).await {
            Ok(statement) => ExtractionOutcome::Statement(statement),
            Err(err) => {
                warn!("Extraction failed: {err}");
                ExtractionOutcome::Failed(export_message(&err))
            }
        }
    }
}

/// User-facing failure string for the export artifact.
///
/// The umbrella error's prefix is dropped so the artifact carries the
/// class-specific diagnostic on its own.
fn export_message(err: &StexError) -> String {
    match err {
        StexError::Inference(e) => e.to_string(),
        StexError::Validation(e) => e.to_string(),
        other => other.to_string(),
    }
}

/// Outcome of one extraction, shaped for presentation and export.
///
/// A statement with zero transactions is a successful outcome; only
/// transport, protocol, parse, and schema failures land in `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// Extraction succeeded.
    Statement(BankStatement),
    /// Extraction failed with a user-legible message.
    Failed(String),
}

impl ExtractionOutcome {
    /// Whether this outcome carries a statement.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Statement(_))
    }

    /// The export-artifact shape: `{"data": {...}}` or `{"error": "..."}`.
    pub fn to_export_json(&self) -> Value {
        match self {
            Self::Statement(statement) => json!({ "data": { "transactions": statement } }),
            Self::Failed(message) => json!({ "error": message }),
        }
    }

    /// Serialize the export artifact as indented JSON.
    pub fn to_export_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_export_json()).unwrap_or_else(|_| "{}".to_string())
    }
}
