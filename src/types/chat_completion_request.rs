use serde::{Deserialize, Serialize};

use crate::types::{ChatMessage, Model};

/// Parameters for a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest {
    /// The model that will complete the conversation.
    pub model: Model,

    /// The conversation so far, system preamble first.
    pub messages: Vec<ChatMessage>,

    /// Whether to incrementally stream the response using server-sent events.
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Create a new non-streaming request.
    pub fn new(model: Model, messages: Vec<ChatMessage>) -> Self {
        Self {
            model,
            messages,
            stream: false,
        }
    }

    /// Create a new streaming request.
    pub fn new_streaming(model: Model, messages: Vec<ChatMessage>) -> Self {
        Self {
            stream: true,
            ..Self::new(model, messages)
        }
    }
}
