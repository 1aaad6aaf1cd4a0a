//! # Askbase Core
//!
//! Domain types, traits, and error definitions for the Askbase RAG chat
//! backend. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators — the LLM completion API and the vector
//! knowledge store — are defined as traits here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod retrieval;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, RetrievalError};
pub use message::{Message, Role};
pub use provider::{CompletionGateway, CompletionRequest, CompletionResponse, StreamChunk, Usage};
pub use retrieval::{CollectionInfo, KnowledgeStore, Snippet};
