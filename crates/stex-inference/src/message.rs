//! Request and message types shared by all chat backends.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn in a chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A complete chat submission.
///
/// Transport concerns (endpoint, streaming flags) belong to the backend;
/// this type only carries what the conversation itself needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Model name as known to the serving side, e.g. `phi4`.
    pub model: String,
    /// Conversation turns, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Optional JSON schema the response content must conform to.
    pub format: Option<Value>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            format: None,
        }
    }

    /// Constrain the response content to the given JSON schema.
    pub fn with_format(mut self, schema: Value) -> Self {
        self.format = Some(schema);
        self
    }
}
