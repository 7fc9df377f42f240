//! Chat backend implementations.

pub mod ollama;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use async_trait::async_trait;

use crate::{ChatRequest, Result};

/// Trait for chat-style inference backends.
///
/// This trait abstracts over whatever serves the model, allowing the same
/// extraction pipeline to run against a live Ollama server in production
/// and scripted responses in tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Submit a chat request and return the assistant message content.
    ///
    /// Implementations classify failures into the
    /// [`InferenceError`](crate::InferenceError) taxonomy rather than
    /// surfacing transport detail to callers.
    async fn chat(&self, request: &ChatRequest) -> Result<String>;
}

#[async_trait]
impl<B: ChatBackend + ?Sized> ChatBackend for &B {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        (**self).chat(request).await
    }
}
