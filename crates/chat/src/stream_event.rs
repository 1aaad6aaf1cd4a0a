//! Chat-level streaming events.
//!
//! `ChatStreamEvent` wraps gateway-level stream chunks into the events the
//! HTTP gateway forwards to clients over SSE.

use serde::{Deserialize, Serialize};

/// Events emitted by the orchestrator during streaming execution.
///
/// A successful stream is any number of `Content { done: false }` events
/// followed by exactly one terminal `Content { content: "", done: true }`.
/// A failed stream ends with exactly one `Error`; nothing follows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatStreamEvent {
    /// Partial answer text from the LLM.
    Content { content: String, done: bool },

    /// An error occurred — the stream is over.
    Error { message: String },
}

impl ChatStreamEvent {
    /// One incremental content chunk.
    pub fn chunk(content: impl Into<String>) -> Self {
        Self::Content {
            content: content.into(),
            done: false,
        }
    }

    /// The terminal event of a successful stream.
    pub fn done() -> Self {
        Self::Content {
            content: String::new(),
            done: true,
        }
    }

    /// SSE event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Content { .. } => "content",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_serialization() {
        let event = ChatStreamEvent::chunk("Hello");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"content""#));
        assert!(json.contains(r#""content":"Hello""#));
        assert!(json.contains(r#""done":false"#));
    }

    #[test]
    fn done_serialization() {
        let event = ChatStreamEvent::done();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""content":"""#));
        assert!(json.contains(r#""done":true"#));
    }

    #[test]
    fn error_serialization() {
        let event = ChatStreamEvent::Error {
            message: "boom".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains("boom"));
    }

    #[test]
    fn event_type_names() {
        assert_eq!(ChatStreamEvent::chunk("x").event_type(), "content");
        assert_eq!(ChatStreamEvent::done().event_type(), "content");
        assert_eq!(
            ChatStreamEvent::Error {
                message: "x".into()
            }
            .event_type(),
            "error"
        );
    }

    #[test]
    fn event_deserialization() {
        let json = r#"{"type":"content","content":"hi","done":false}"#;
        let event: ChatStreamEvent = serde_json::from_str(json).unwrap();
        match event {
            ChatStreamEvent::Content { content, done } => {
                assert_eq!(content, "hi");
                assert!(!done);
            }
            other => panic!("Wrong variant: {other:?}"),
        }
    }
}
