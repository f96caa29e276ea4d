//! Prompt assembly for context-constrained answers.

use ragdrop_core::{ChatMessage, ScoredChunk};

/// What the engine answers when nothing relevant was retrieved.
pub const NO_ANSWER: &str = "I don't know.";

/// Build the system prompt.
pub fn build_system_prompt() -> String {
    r#"You are a helpful assistant that answers questions about the documents in the database.

Guidelines:
- Use only the provided context to answer the question
- Do not make up information that is not present in the context
- If the context does not contain the answer, say "I don't know""#
        .to_string()
}

/// Build the user turn: the question followed by the retrieved chunk text.
pub fn build_user_prompt(question: &str, context: &[ScoredChunk]) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("Question: {}\n\n", question.trim()));
    prompt.push_str("Context:\n");
    prompt.push_str("─────────────────────────────────────\n");

    for (i, item) in context.iter().enumerate() {
        let meta = &item.chunk.metadata;
        prompt.push_str(&format!(
            "\n[{}] From: {} (page {})\n",
            i + 1,
            meta.source,
            meta.page
        ));
        prompt.push_str(&item.chunk.text);
        prompt.push('\n');
    }

    prompt.push_str("\n─────────────────────────────────────\n\n");
    prompt.push_str("Answer using only the context above. If it is not enough, say \"I don't know\".");

    prompt
}

/// The full two-turn prompt sent to the generation provider.
pub fn build_messages(question: &str, context: &[ScoredChunk]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(build_system_prompt()),
        ChatMessage::user(build_user_prompt(question, context)),
    ]
}

/// Keep the first `max_chars` characters of `text`, appending `...` when
/// anything was cut.
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
