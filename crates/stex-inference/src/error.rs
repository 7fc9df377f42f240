//! Error types for the inference layer.

use thiserror::Error;

/// Errors that can occur while talking to the inference service.
///
/// Backends classify every failure into one of these variants so callers
/// can react per class (retry after a timeout, fix connectivity, report a
/// service defect) without inspecting transport details.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out connecting to Ollama")]
    Timeout,

    /// The service could not be reached at all.
    #[error("failed to connect to Ollama server: {0}")]
    Connection(String),

    /// The service answered, but not with the expected chat shape.
    #[error("unexpected response format from model: {0}")]
    MalformedResponse(String),

    /// Anything else: HTTP error statuses, undecodable bodies, client
    /// construction failures.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}
