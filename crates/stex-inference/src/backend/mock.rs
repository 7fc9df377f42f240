//! Scripted chat backend for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::InferenceError;
use crate::message::ChatRequest;
use crate::{ChatBackend, Result};

/// Backend that replays a queue of scripted responses.
///
/// Each [`chat`](ChatBackend::chat) call pops the next scripted entry and
/// records the request, so tests can drive the pipeline offline and assert
/// on exactly what was submitted.
#[derive(Default)]
pub struct MockBackend {
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response with the given content.
    pub fn push_content(&self, content: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(content.into()));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: InferenceError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Requests seen so far, in submission order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(InferenceError::Unexpected(
                    "no scripted response queued".to_string(),
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ChatMessage;

    #[tokio::test]
    async fn replays_responses_in_order() {
        let backend = MockBackend::new();
        backend.push_content("first");
        backend.push_content("second");

        let request = ChatRequest::new("phi4", vec![ChatMessage::user("hi")]);
        assert_eq!(backend.chat(&request).await.unwrap(), "first");
        assert_eq!(backend.chat(&request).await.unwrap(), "second");
        assert_eq!(backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn empty_queue_is_an_error() {
        let backend = MockBackend::new();
        let request = ChatRequest::new("phi4", vec![]);
        let err = backend.chat(&request).await.unwrap_err();
        assert!(matches!(err, InferenceError::Unexpected(_)));
    }
}
