//! KnowledgeStore trait — the abstraction over the vector index.
//!
//! A knowledge store holds named collections of indexed texts and answers
//! similarity-search queries with ranked snippets. The chat orchestrator
//! consumes only `search`; the ingestion surface (`create_collection`,
//! `add_texts`) is exposed over HTTP by the gateway.

use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A retrieved passage of text plus its relevance score and metadata.
///
/// Score semantics (distance vs. similarity) belong to the store that
/// produced it. Ordering from the store is preserved downstream and never
/// re-sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    /// The passage text
    pub content: String,

    /// Source metadata (filename, document id, ...)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Relevance score from the store
    pub score: f32,
}

impl Snippet {
    /// Create a snippet with no metadata.
    pub fn new(content: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            metadata: serde_json::Map::new(),
            score,
        }
    }
}

/// Summary of one collection, as reported by `collection_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub document_count: usize,
}

/// The knowledge-base collaborator surface.
///
/// Shared across concurrent requests; implementations own their concurrency
/// discipline (read-mostly, writer-serialized).
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Create a new named collection.
    ///
    /// Returns `false` if a collection with that name already exists.
    async fn create_collection(&self, name: &str) -> std::result::Result<bool, RetrievalError>;

    /// Embed and index texts into a collection.
    ///
    /// `metadatas` is zipped with `texts`; missing entries default to empty.
    /// Returns `false` if the collection does not exist.
    async fn add_texts(
        &self,
        name: &str,
        texts: Vec<String>,
        metadatas: Vec<serde_json::Map<String, serde_json::Value>>,
    ) -> std::result::Result<bool, RetrievalError>;

    /// Similarity search over a collection.
    ///
    /// A missing collection is not an error — it returns an empty result,
    /// which callers treat identically to "no relevant context found".
    async fn search(
        &self,
        name: &str,
        query: &str,
        k: usize,
    ) -> std::result::Result<Vec<Snippet>, RetrievalError>;

    /// Names of all collections, unordered.
    async fn list_collections(&self) -> std::result::Result<Vec<String>, RetrievalError>;

    /// Delete a collection and everything indexed in it.
    ///
    /// Returns `false` if the collection does not exist.
    async fn delete_collection(&self, name: &str) -> std::result::Result<bool, RetrievalError>;

    /// Summary of a collection, or `None` if it does not exist.
    async fn collection_info(
        &self,
        name: &str,
    ) -> std::result::Result<Option<CollectionInfo>, RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_serialization_skips_empty_metadata() {
        let snippet = Snippet::new("a passage", 0.87);
        let json = serde_json::to_string(&snippet).unwrap();
        assert!(json.contains("a passage"));
        assert!(!json.contains("metadata"));
    }

    #[test]
    fn collection_info_serialization() {
        let info = CollectionInfo {
            name: "policies".into(),
            document_count: 3,
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains(r#""name":"policies""#));
        assert!(json.contains(r#""document_count":3"#));
    }

    #[test]
    fn snippet_metadata_roundtrip() {
        let mut snippet = Snippet::new("text", 0.5);
        snippet
            .metadata
            .insert("source".into(), serde_json::json!("handbook.txt"));
        let json = serde_json::to_string(&snippet).unwrap();
        let back: Snippet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metadata["source"], "handbook.txt");
    }
}
