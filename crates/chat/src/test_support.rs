//! Shared mocks for chat orchestrator tests.

use askbase_core::error::{ProviderError, RetrievalError};
use askbase_core::message::Message;
use askbase_core::provider::{
    CompletionGateway, CompletionRequest, CompletionResponse, StreamChunk, Usage,
};
use askbase_core::retrieval::{CollectionInfo, KnowledgeStore, Snippet};
use async_trait::async_trait;
use std::sync::Mutex;

/// A gateway that replays a scripted response, recording every request.
pub struct ScriptedGateway {
    reply: String,
    chunks: Mutex<Option<Vec<Result<StreamChunk, ProviderError>>>>,
    fail_with: Option<ProviderError>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    /// Succeeds with `reply`; streaming yields one chunk per word.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            chunks: Mutex::new(None),
            fail_with: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Streaming yields exactly the given chunk sequence.
    pub fn with_chunks(chunks: Vec<Result<StreamChunk, ProviderError>>) -> Self {
        Self {
            reply: String::new(),
            chunks: Mutex::new(Some(chunks)),
            fail_with: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Both `complete` and `stream` fail immediately with `err`.
    pub fn failing(err: ProviderError) -> Self {
        Self {
            reply: String::new(),
            chunks: Mutex::new(None),
            fail_with: Some(err),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The messages of the most recently recorded request.
    pub fn last_messages(&self) -> Vec<Message> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.messages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(CompletionResponse {
            message: Message::assistant(&self.reply),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }

    async fn stream(
        &self,
        request: CompletionRequest,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<StreamChunk, ProviderError>>, ProviderError>
    {
        self.requests.lock().unwrap().push(request);
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }

        let scripted = self.chunks.lock().unwrap().take().unwrap_or_else(|| {
            let mut chunks: Vec<Result<StreamChunk, ProviderError>> = self
                .reply
                .split_whitespace()
                .map(|w| {
                    Ok(StreamChunk {
                        content: Some(format!("{w} ")),
                        done: false,
                        usage: None,
                    })
                })
                .collect();
            chunks.push(Ok(StreamChunk {
                content: None,
                done: true,
                usage: None,
            }));
            chunks
        });

        let (tx, rx) = tokio::sync::mpsc::channel(scripted.len().max(1));
        for chunk in scripted {
            let _ = tx.try_send(chunk);
        }
        Ok(rx)
    }
}

/// A knowledge store that returns preset snippets (or fails).
pub struct StubStore {
    snippets: Vec<Snippet>,
    fail: bool,
    pub queries: Mutex<Vec<(String, String, usize)>>,
}

impl StubStore {
    pub fn with_snippets(snippets: Vec<Snippet>) -> Self {
        Self {
            snippets,
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_snippets(vec![])
    }

    pub fn failing() -> Self {
        Self {
            snippets: vec![],
            fail: true,
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl KnowledgeStore for StubStore {
    async fn create_collection(&self, _name: &str) -> Result<bool, RetrievalError> {
        Ok(true)
    }

    async fn add_texts(
        &self,
        _name: &str,
        _texts: Vec<String>,
        _metadatas: Vec<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<bool, RetrievalError> {
        Ok(true)
    }

    async fn search(
        &self,
        name: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<Snippet>, RetrievalError> {
        self.queries
            .lock()
            .unwrap()
            .push((name.to_string(), query.to_string(), k));
        if self.fail {
            return Err(RetrievalError::Store("index unavailable".into()));
        }
        Ok(self.snippets.clone())
    }

    async fn list_collections(&self) -> Result<Vec<String>, RetrievalError> {
        Ok(vec![])
    }

    async fn delete_collection(&self, _name: &str) -> Result<bool, RetrievalError> {
        Ok(false)
    }

    async fn collection_info(
        &self,
        _name: &str,
    ) -> Result<Option<CollectionInfo>, RetrievalError> {
        Ok(None)
    }
}
