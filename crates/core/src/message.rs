//! Chat request and message domain types.
//!
//! These are the value objects that flow through a chat turn:
//! client body → validation → context assembly → adapter → provider.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default completion budget when the caller does not set `max_tokens`.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// A single conversation turn as sent by the client.
///
/// `role` is kept as the caller's string: adapters decide how to map it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: MessageContent::Text(content.into()),
        }
    }
}

/// Message content: plain text, or a list of provider content blocks.
///
/// Blocks are opaque and forwarded unchanged; only adapters that require
/// plain text look inside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<serde_json::Value>),
}

impl MessageContent {
    /// Flatten to plain text, concatenating the `text` field of each block.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// The canonical chat request accepted by the chat endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation turns, forwarded in order. An empty list is forwarded as-is.
    pub messages: Vec<Message>,

    /// Model identifier; also drives provider selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Caller-supplied system prompt. When set, no context is fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Provider-specific tool schemas, passed through unmodified.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<serde_json::Value>,

    #[serde(
        default,
        rename = "sessionId",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl ChatRequest {
    /// Build a request with defaults for everything but the messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: None,
            system: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            tools: Vec::new(),
            session_id: None,
            focus: None,
            tone: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Reject bodies that can never produce a valid provider call.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_tokens == 0 {
            return Err(ValidationError::InvalidField {
                field: "max_tokens".into(),
                reason: "must be a positive integer".into(),
            });
        }
        if let Some(t) = self.temperature {
            if !t.is_finite() || t < 0.0 {
                return Err(ValidationError::InvalidField {
                    field: "temperature".into(),
                    reason: "must be a non-negative number".into(),
                });
            }
        }
        Ok(())
    }

    /// The explicit system override, ignoring empty strings.
    pub fn system_override(&self) -> Option<&str> {
        self.system.as_deref().filter(|s| !s.is_empty())
    }
}
