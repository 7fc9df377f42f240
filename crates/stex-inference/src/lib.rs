//! Chat inference abstraction layer for stex.
//!
//! This crate provides a unified interface for chat-style structured
//! extraction backends:
//! - `OllamaBackend` posting to a local Ollama server's `/api/chat` endpoint
//! - `MockBackend` replaying scripted responses in tests (behind the
//!   `test-utils` feature)

mod backend;
mod error;
mod message;

pub use backend::ChatBackend;
pub use backend::ollama::{DEFAULT_PORT, OllamaBackend};
pub use error::InferenceError;
pub use message::{ChatMessage, ChatRequest, Role};

#[cfg(any(test, feature = "test-utils"))]
pub use backend::mock::MockBackend;

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
