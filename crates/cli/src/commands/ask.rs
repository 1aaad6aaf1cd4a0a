//! `askbase ask` — Ask a single question from the command line.

use askbase_chat::{ChatOptions, ChatService, ChatStreamEvent};
use askbase_config::AppConfig;
use askbase_core::retrieval::KnowledgeStore;
use askbase_knowledge::VectorKnowledgeStore;
use askbase_providers::OpenAiCompatGateway;
use std::io::Write;
use std::sync::Arc;

pub async fn run(
    query: &str,
    knowledge_base: Option<&str>,
    stream: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early, give a clear error
    let Some(api_key) = config.api_key.clone() else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set the environment variable:");
        eprintln!("    export ASKBASE_API_KEY='sk-...'");
        eprintln!();
        eprintln!("  Or add api_key to askbase.toml");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    };

    let gateway = Arc::new(OpenAiCompatGateway::new(
        "openai",
        &config.base_url,
        api_key,
    )?);
    let knowledge: Arc<dyn KnowledgeStore> = Arc::new(VectorKnowledgeStore::new(
        gateway.clone(),
        &config.embedding_model,
    ));

    let service = ChatService::new(
        gateway,
        knowledge,
        &config.model,
        ChatOptions {
            history_max_turns: config.chat.history_max_turns,
            temperature: config.chat.temperature,
            max_tokens: config.chat.max_tokens,
            retrieval_k: config.chat.retrieval_k,
        },
    );

    if stream {
        let mut rx = service.stream_chat(query, &[], knowledge_base);
        while let Some(event) = rx.recv().await {
            match event {
                ChatStreamEvent::Content { content, done } => {
                    print!("{content}");
                    std::io::stdout().flush()?;
                    if done {
                        println!();
                    }
                }
                ChatStreamEvent::Error { message } => {
                    eprintln!();
                    return Err(message.into());
                }
            }
        }
    } else {
        eprint!("  Thinking...");
        let result = service.complete_once(query, &[], knowledge_base).await?;
        eprint!("\r              \r");
        println!("{}", result.response);
    }

    Ok(())
}
