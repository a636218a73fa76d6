//! Messages API request and response types

use serde::{Deserialize, Serialize};

/// Default text model
pub const DEFAULT_TEXT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Message role
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant message
    Assistant,
}

/// Content block types that can appear in messages
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content
    Text {
        /// The text content
        text: String,
    },
    /// Any block kind this client does not use
    #[serde(other)]
    Unsupported,
}

/// A message in the conversation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content blocks in the message
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a user message with text content
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Create an assistant message with text content
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }
}

/// Request to create a message
#[derive(Clone, Debug, Serialize)]
pub struct MessagesRequest {
    /// Model to use
    pub model: String,
    /// Conversation history, ending with the user turn to answer
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// System prompt (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl MessagesRequest {
    /// Create a basic request with sensible defaults
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            model: DEFAULT_TEXT_MODEL.to_string(),
            messages,
            max_tokens: 512,
            system: None,
        }
    }

    /// Builder: Set model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder: Set max tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Builder: Set system prompt
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Default)]
pub struct Usage {
    /// Number of input tokens
    pub input_tokens: u32,
    /// Number of output tokens
    pub output_tokens: u32,
}

/// Response from creating a message
#[derive(Clone, Debug, Deserialize)]
pub struct MessagesResponse {
    /// Unique identifier for this message
    pub id: String,
    /// Content blocks in the response
    pub content: Vec<ContentBlock>,
    /// Model that generated the response
    pub model: String,
    /// Token usage
    #[serde(default)]
    pub usage: Usage,
}

impl MessagesResponse {
    /// Concatenated text of all text blocks, trimmed
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Unsupported => None,
            })
            .collect::<Vec<_>>()
            .join("")
            .trim()
            .to_string()
    }
}
