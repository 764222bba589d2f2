//! Prompts for LLM-backed summarization.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth**: changing how the narrator's script is
//!    written requires editing exactly one place.
//!
//! 2. **Testability**: unit tests can import and inspect prompts directly
//!    without calling a real model, making prompt regressions easy to catch.
//!
//! Callers can override the system prompt via
//! [`crate::providers::LlmModelOptions::system_prompt`]; the constant here is
//! used only when no override is provided.

use crate::providers::SummaryParams;

/// Default system prompt for producing a spoken summary.
pub const DEFAULT_SUMMARY_PROMPT: &str = r#"You are an expert editor who writes short audio summaries of documents. The summary you write will be read aloud by a text-to-speech voice.

Follow these rules precisely:

1. CONTENT
   - Keep the main points, key facts and conclusions of the document
   - Use only information present in the document; never invent facts
   - Preserve names, numbers and dates exactly

2. STYLE
   - Write fluent, plain prose in complete sentences
   - Write in the same language as the document
   - Prefer short sentences that are easy to follow by ear

3. OUTPUT FORMAT
   - Output ONLY the summary text
   - Do NOT use Markdown: no headings, bullet points, bold or tables
   - Do NOT add commentary, titles or phrases such as "Here is a summary"
   - Respect the word limits given in the request"#;

/// Build the user message carrying the document and the length bounds.
pub fn summary_request(text: &str, params: &SummaryParams) -> String {
    let bounds = if params.min_length > 0 {
        format!(
            "between {} and {} words",
            params.min_length, params.max_length
        )
    } else {
        format!("at most {} words", params.max_length)
    };
    format!(
        "Summarize the following document in {bounds}.\n\n\"\"\"\n{}\n\"\"\"",
        text.trim()
    )
}
