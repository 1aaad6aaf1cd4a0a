//! Retrieval context formatting.
//!
//! Turns ranked snippets into the single system-level instruction block
//! that grounds the completion. Pure text transform with no failure modes.

use askbase_core::retrieval::Snippet;

/// Instruction preamble placed before the numbered reference material.
const PREAMBLE: &str = "You are a helpful assistant. Answer the user's question \
based on the reference material below. If the material does not contain the \
answer, say so.\n\nReference material:";

/// Format retrieved snippets into a system prompt.
///
/// Deterministic: the preamble, then each snippet's content numbered in
/// input order starting at 1, each followed by a blank line, with the
/// result trimmed. Callers must not invoke this with an empty slice — the
/// no-snippets branch skips the system message entirely.
pub fn format_context(snippets: &[Snippet]) -> String {
    debug_assert!(!snippets.is_empty(), "caller owns the empty-snippets branch");

    let mut out = String::from(PREAMBLE);
    out.push_str("\n\n");
    for (i, snippet) in snippets.iter().enumerate() {
        out.push_str(&format!("{}. {}\n\n", i + 1, snippet.content));
    }
    out.trim().to_string()
}
