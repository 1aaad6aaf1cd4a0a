//! Message domain types.
//!
//! A conversation is an ordered `Vec<Message>`; order is semantically
//! load-bearing, since it is replayed verbatim to the completion API.
//! Askbase does not persist history — callers supply it with each request
//! and receive the updated sequence back.

use serde::{Deserialize, Serialize};

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Retrieval context and instructions
    System,
    /// The end user
    User,
    /// The LLM's response
    Assistant,
}

/// A single message (turn) in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,
}

impl Message {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Take the most recent `max_turns` messages from a caller-supplied history,
/// preserving oldest-first order. Older turns are silently dropped.
pub fn window_history(history: &[Message], max_turns: usize) -> &[Message] {
    let start = history.len().saturating_sub(max_turns);
    &history[start..]
}
