//! Conversation orchestration for Askbase.
//!
//! This crate is the core of the system: given a query, optional knowledge
//! base, and prior turns, it assembles the message sequence, decides
//! retrieval participation, invokes the completion gateway, and produces
//! either a complete answer or a live sequence of stream events.

pub mod context;
pub mod service;
pub mod stream_event;

pub use context::format_context;
pub use service::{ChatCompletion, ChatOptions, ChatService};
pub use stream_event::ChatStreamEvent;

#[cfg(test)]
pub(crate) mod test_support;
