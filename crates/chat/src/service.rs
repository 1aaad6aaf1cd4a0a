//! The conversation orchestrator.
//!
//! Assembles the message sequence (retrieval context, windowed history,
//! current query), invokes the completion gateway, and produces either a
//! complete answer or a live sequence of stream events.
//!
//! # Failure containment
//!
//! Nothing escapes the orchestrator boundary unstructured. Retrieval
//! failures degrade to "no context" (chat availability wins over grounding);
//! gateway failures are terminal for the current call and surface as an
//! error result or a single terminating `Error` event. A streaming
//! invocation always ends with exactly one terminal event.

use crate::context::format_context;
use crate::stream_event::ChatStreamEvent;
use askbase_core::error::Error;
use askbase_core::message::{Message, window_history};
use askbase_core::provider::{CompletionGateway, CompletionRequest, Usage};
use askbase_core::retrieval::KnowledgeStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Orchestration settings, injected from configuration.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// How many of the most recent history turns are replayed per request
    pub history_max_turns: usize,
    /// Completion temperature
    pub temperature: f32,
    /// Maximum tokens per completion
    pub max_tokens: u32,
    /// How many snippets are retrieved per query
    pub retrieval_k: usize,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            history_max_turns: 10,
            temperature: 0.7,
            max_tokens: 2000,
            retrieval_k: 4,
        }
    }
}

/// The result of a non-streaming chat call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// The assistant's answer text
    pub response: String,

    /// The assembled message sequence plus the new assistant message —
    /// callers persist this themselves and replay it on the next request
    pub history: Vec<Message>,

    /// Token usage, copied from the gateway response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// The conversation orchestrator.
///
/// Owns no cross-request state; every call is independent. The knowledge
/// store is shared across concurrent requests, but its concurrency
/// discipline is its own responsibility.
pub struct ChatService {
    gateway: Arc<dyn CompletionGateway>,
    knowledge: Arc<dyn KnowledgeStore>,
    model: String,
    options: ChatOptions,
}

impl ChatService {
    /// Create a new orchestrator.
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        knowledge: Arc<dyn KnowledgeStore>,
        model: impl Into<String>,
        options: ChatOptions,
    ) -> Self {
        Self {
            gateway,
            knowledge,
            model: model.into(),
            options,
        }
    }

    /// Process a chat request and return the complete answer.
    ///
    /// Gateway failures propagate verbatim — the gateway owns any retry
    /// policy; this call treats them as terminal.
    pub async fn complete_once(
        &self,
        query: &str,
        history: &[Message],
        knowledge_base: Option<&str>,
    ) -> Result<ChatCompletion, Error> {
        info!(
            knowledge_base = knowledge_base.unwrap_or("-"),
            history_len = history.len(),
            "Chat request"
        );

        let messages = assemble_messages(
            self.knowledge.as_ref(),
            &self.options,
            query,
            history,
            knowledge_base,
        )
        .await;

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: messages.clone(),
            temperature: self.options.temperature,
            max_tokens: Some(self.options.max_tokens),
            stream: false,
        };

        let response = self.gateway.complete(request).await?;

        let mut history = messages;
        history.push(response.message.clone());

        Ok(ChatCompletion {
            response: response.message.content,
            history,
            usage: response.usage,
        })
    }

    /// Process a chat request as a live stream of events.
    ///
    /// The returned receiver yields `Content { done: false }` for each
    /// incremental chunk, then exactly one terminal event: either
    /// `Content { content: "", done: true }` on success or `Error` on
    /// failure. Dropping the receiver cancels the upstream gateway call.
    pub fn stream_chat(
        &self,
        query: &str,
        history: &[Message],
        knowledge_base: Option<&str>,
    ) -> mpsc::Receiver<ChatStreamEvent> {
        let (tx, rx) = mpsc::channel::<ChatStreamEvent>(128);

        let gateway = self.gateway.clone();
        let knowledge = self.knowledge.clone();
        let model = self.model.clone();
        let options = self.options.clone();
        let query = query.to_string();
        let history = history.to_vec();
        let knowledge_base = knowledge_base.map(str::to_string);

        tokio::spawn(async move {
            info!(
                knowledge_base = knowledge_base.as_deref().unwrap_or("-"),
                history_len = history.len(),
                "Stream chat request"
            );

            let messages = assemble_messages(
                knowledge.as_ref(),
                &options,
                &query,
                &history,
                knowledge_base.as_deref(),
            )
            .await;

            let request = CompletionRequest {
                model,
                messages,
                temperature: options.temperature,
                max_tokens: Some(options.max_tokens),
                stream: true,
            };

            let mut chunks = match gateway.stream(request).await {
                Ok(chunks) => chunks,
                Err(e) => {
                    let _ = tx
                        .send(ChatStreamEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                    return;
                }
            };

            while let Some(chunk) = chunks.recv().await {
                match chunk {
                    Err(e) => {
                        // Terminal: no Content events may follow
                        let _ = tx
                            .send(ChatStreamEvent::Error {
                                message: e.to_string(),
                            })
                            .await;
                        return;
                    }
                    Ok(chunk) => {
                        // Chunks without extractable text are skipped
                        if let Some(content) = chunk.content.filter(|c| !c.is_empty())
                            && tx.send(ChatStreamEvent::chunk(content)).await.is_err()
                        {
                            // Client disconnected; dropping `chunks`
                            // cancels the gateway call
                            return;
                        }
                    }
                }
            }

            let _ = tx.send(ChatStreamEvent::done()).await;
        });

        rx
    }
}

/// Assemble the message sequence sent to the completion gateway.
///
/// Invariant: at most one leading system message (the retrieval context),
/// then the windowed history oldest-first, then exactly one trailing user
/// message holding the query.
async fn assemble_messages(
    knowledge: &dyn KnowledgeStore,
    options: &ChatOptions,
    query: &str,
    history: &[Message],
    knowledge_base: Option<&str>,
) -> Vec<Message> {
    let mut messages = Vec::new();

    if let Some(kb) = knowledge_base {
        match knowledge.search(kb, query, options.retrieval_k).await {
            Ok(snippets) if !snippets.is_empty() => {
                debug!(
                    knowledge_base = kb,
                    snippets = snippets.len(),
                    "Retrieved context"
                );
                messages.push(Message::system(format_context(&snippets)));
            }
            Ok(_) => {
                debug!(knowledge_base = kb, "No snippets retrieved, continuing without context");
            }
            Err(e) => {
                // Degrade rather than abort: chat availability wins
                warn!(knowledge_base = kb, error = %e, "Retrieval failed, continuing without context");
            }
        }
    }

    messages.extend_from_slice(window_history(history, options.history_max_turns));
    messages.push(Message::user(query));
    messages
}

// ── Tests ─────────────────────────────────────────────────────────────────
