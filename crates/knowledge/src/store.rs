//! In-process vector knowledge store.
//!
//! Named collections of embedded texts held behind a `tokio::sync::RwLock`
//! (read-mostly, writer-serialized). Indexing and search both embed through
//! the injected completion gateway.

use crate::vector::cosine_similarity;
use askbase_core::error::RetrievalError;
use askbase_core::provider::CompletionGateway;
use askbase_core::retrieval::{CollectionInfo, KnowledgeStore, Snippet};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// One indexed text with its embedding.
struct IndexedEntry {
    content: String,
    metadata: serde_json::Map<String, serde_json::Value>,
    embedding: Vec<f32>,
}

/// A knowledge store backed by in-process cosine-similarity search.
///
/// Embeddings come from the injected gateway; the store itself is a plain
/// linear scan, which is the right trade-off for collections that fit in
/// memory.
pub struct VectorKnowledgeStore {
    gateway: Arc<dyn CompletionGateway>,
    embedding_model: String,
    collections: RwLock<HashMap<String, Vec<IndexedEntry>>>,
}

impl VectorKnowledgeStore {
    /// Create a new store embedding through `gateway` with `embedding_model`.
    pub fn new(gateway: Arc<dyn CompletionGateway>, embedding_model: impl Into<String>) -> Self {
        Self {
            gateway,
            embedding_model: embedding_model.into(),
            collections: RwLock::new(HashMap::new()),
        }
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        self.gateway
            .embed(&self.embedding_model, inputs)
            .await
            .map_err(|e| RetrievalError::EmbeddingFailed(e.to_string()))
    }
}

#[async_trait]
impl KnowledgeStore for VectorKnowledgeStore {
    async fn create_collection(&self, name: &str) -> std::result::Result<bool, RetrievalError> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Ok(false);
        }
        collections.insert(name.to_string(), Vec::new());
        info!(collection = %name, "Created knowledge collection");
        Ok(true)
    }

    async fn add_texts(
        &self,
        name: &str,
        texts: Vec<String>,
        metadatas: Vec<serde_json::Map<String, serde_json::Value>>,
    ) -> std::result::Result<bool, RetrievalError> {
        if !self.collections.read().await.contains_key(name) {
            return Ok(false);
        }
        if texts.is_empty() {
            return Ok(true);
        }

        // Embed outside the write lock so searches proceed in the meantime
        let embeddings = self.embed(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(RetrievalError::Store(format!(
                "Embedding count mismatch: {} texts, {} vectors",
                texts.len(),
                embeddings.len()
            )));
        }

        let mut metadatas = metadatas.into_iter();
        let entries: Vec<IndexedEntry> = texts
            .into_iter()
            .zip(embeddings)
            .map(|(content, embedding)| IndexedEntry {
                content,
                metadata: metadatas.next().unwrap_or_default(),
                embedding,
            })
            .collect();

        let mut collections = self.collections.write().await;
        let Some(collection) = collections.get_mut(name) else {
            // Collection dropped while we were embedding
            return Ok(false);
        };

        debug!(collection = %name, added = entries.len(), "Indexed texts");
        collection.extend(entries);
        Ok(true)
    }

    async fn search(
        &self,
        name: &str,
        query: &str,
        k: usize,
    ) -> std::result::Result<Vec<Snippet>, RetrievalError> {
        // Missing collection is "no context", not an error
        if !self.collections.read().await.contains_key(name) {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embed(std::slice::from_ref(&query.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::EmbeddingFailed("Empty embedding response".into()))?;

        let collections = self.collections.read().await;
        let Some(collection) = collections.get(name) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(f32, Snippet)> = collection
            .iter()
            .map(|entry| {
                let sim = cosine_similarity(&entry.embedding, &query_embedding);
                (
                    sim,
                    Snippet {
                        content: entry.content.clone(),
                        metadata: entry.metadata.clone(),
                        score: sim,
                    },
                )
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        debug!(collection = %name, results = scored.len(), "Similarity search");
        Ok(scored.into_iter().map(|(_, s)| s).collect())
    }

    async fn list_collections(&self) -> std::result::Result<Vec<String>, RetrievalError> {
        Ok(self.collections.read().await.keys().cloned().collect())
    }

    async fn delete_collection(&self, name: &str) -> std::result::Result<bool, RetrievalError> {
        let removed = self.collections.write().await.remove(name).is_some();
        if removed {
            info!(collection = %name, "Deleted knowledge collection");
        }
        Ok(removed)
    }

    async fn collection_info(
        &self,
        name: &str,
    ) -> std::result::Result<Option<CollectionInfo>, RetrievalError> {
        Ok(self
            .collections
            .read()
            .await
            .get(name)
            .map(|entries| CollectionInfo {
                name: name.to_string(),
                document_count: entries.len(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askbase_core::error::ProviderError;
    use askbase_core::message::Message;
    use askbase_core::provider::{CompletionRequest, CompletionResponse};

    /// A gateway whose embeddings map known words onto fixed axes, so
    /// similarity ranking is deterministic.
    struct AxisEmbedGateway;

    fn axis_for(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut v = vec![0.0f32; 3];
        if lower.contains("refund") {
            v[0] = 1.0;
        }
        if lower.contains("shipping") {
            v[1] = 1.0;
        }
        if lower.contains("warranty") {
            v[2] = 1.0;
        }
        if v.iter().all(|x| *x == 0.0) {
            v[0] = 0.1;
            v[1] = 0.1;
            v[2] = 0.1;
        }
        v
    }

    #[async_trait]
    impl CompletionGateway for AxisEmbedGateway {
        fn name(&self) -> &str {
            "axis-embed"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, ProviderError> {
            Ok(CompletionResponse {
                message: Message::assistant("unused"),
                usage: None,
                model: "mock".into(),
            })
        }

        async fn embed(
            &self,
            _model: &str,
            inputs: &[String],
        ) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
            Ok(inputs.iter().map(|t| axis_for(t)).collect())
        }
    }

    fn store() -> VectorKnowledgeStore {
        VectorKnowledgeStore::new(Arc::new(AxisEmbedGateway), "mock-embed")
    }

    #[tokio::test]
    async fn create_collection_once() {
        let store = store();
        assert!(store.create_collection("policies").await.unwrap());
        assert!(!store.create_collection("policies").await.unwrap());
        assert_eq!(
            store.list_collections().await.unwrap(),
            vec!["policies".to_string()]
        );
    }

    #[tokio::test]
    async fn delete_collection_removes_it() {
        let store = store();
        store.create_collection("kb").await.unwrap();
        assert!(store.delete_collection("kb").await.unwrap());
        assert!(store.list_collections().await.unwrap().is_empty());
        // Second delete is a no-op
        assert!(!store.delete_collection("kb").await.unwrap());
    }

    #[tokio::test]
    async fn collection_info_counts_documents() {
        let store = store();
        store.create_collection("kb").await.unwrap();
        store
            .add_texts(
                "kb",
                vec!["refund doc".into(), "shipping doc".into()],
                vec![],
            )
            .await
            .unwrap();

        let info = store.collection_info("kb").await.unwrap().unwrap();
        assert_eq!(info.name, "kb");
        assert_eq!(info.document_count, 2);

        assert!(store.collection_info("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_texts_to_missing_collection_returns_false() {
        let store = store();
        let added = store
            .add_texts("nope", vec!["text".into()], vec![])
            .await
            .unwrap();
        assert!(!added);
    }

    #[tokio::test]
    async fn search_missing_collection_returns_empty() {
        let store = store();
        let results = store.search("nope", "refund", 4).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn search_ranks_by_similarity() {
        let store = store();
        store.create_collection("policies").await.unwrap();
        store
            .add_texts(
                "policies",
                vec![
                    "Our shipping takes 3-5 days".into(),
                    "Refunds are issued within 14 days".into(),
                    "Warranty covers manufacturing defects".into(),
                ],
                vec![],
            )
            .await
            .unwrap();

        let results = store.search("policies", "refund policy", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].content.contains("Refunds"));
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn search_respects_k() {
        let store = store();
        store.create_collection("kb").await.unwrap();
        store
            .add_texts(
                "kb",
                (0..10).map(|i| format!("refund doc {i}")).collect(),
                vec![],
            )
            .await
            .unwrap();

        let results = store.search("kb", "refund", 4).await.unwrap();
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn metadata_zipped_with_texts() {
        let store = store();
        store.create_collection("kb").await.unwrap();

        let mut meta = serde_json::Map::new();
        meta.insert("source".into(), serde_json::json!("faq.md"));

        store
            .add_texts(
                "kb",
                vec!["refund info".into(), "shipping info".into()],
                vec![meta], // only the first text has metadata
            )
            .await
            .unwrap();

        let results = store.search("kb", "refund", 1).await.unwrap();
        assert_eq!(results[0].metadata["source"], "faq.md");
    }

    #[tokio::test]
    async fn empty_collection_search_is_empty() {
        let store = store();
        store.create_collection("empty").await.unwrap();
        let results = store.search("empty", "anything", 4).await.unwrap();
        assert!(results.is_empty());
    }
}
