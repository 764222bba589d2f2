//! Remote capabilities behind the summarizer and the speech synthesizer.
//!
//! The pipeline never talks HTTP itself. It sees two traits:
//!
//! * [`SummaryModel`]: bounded input text in, shorter text out.
//! * [`SpeechProvider`]: one request worth of text in, encoded audio out.
//!
//! Concrete backends live in the submodules. Tests substitute in-process
//! fakes, which is why both traits are object-safe and held as
//! `Arc<dyn …>` by [`crate::convert::Pipeline`].

pub mod google_auth;
pub mod google_tts;
pub mod huggingface;
pub mod llm;

pub use google_tts::{GoogleTtsOptions, GoogleTtsProvider};
pub use huggingface::{HuggingFaceModel, HuggingFaceOptions};
pub use llm::{LlmModel, LlmModelOptions};

use crate::config::VoiceConfig;
use crate::error::{SummarizationError, SynthesisError};
use async_trait::async_trait;

/// Length bounds forwarded to the model, in words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryParams {
    pub max_length: usize,
    pub min_length: usize,
}

/// An abstractive summarization model.
///
/// Implementations receive text that already fits the model's input window.
/// The returned text is not required to respect `max_length`; the
/// summarizer stage clamps it.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    /// Model identifier used in logs and errors.
    fn name(&self) -> &str;

    async fn summarize(
        &self,
        text: &str,
        params: &SummaryParams,
    ) -> Result<String, SummarizationError>;
}

/// A text-to-speech service.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Provider identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Largest request the provider accepts, in UTF-8 bytes of input text.
    fn max_request_bytes(&self) -> usize;

    /// Synthesize one request. `text` is never empty and never longer than
    /// [`max_request_bytes`](Self::max_request_bytes).
    async fn synthesize(&self, text: &str, voice: &VoiceConfig) -> Result<Vec<u8>, SynthesisError>;
}

/// First 300 characters of an error body, for error messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const LIMIT: usize = 300;
    let trimmed = body.trim();
    if trimmed.chars().count() <= LIMIT {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(LIMIT).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_limits_length() {
        assert_eq!(truncate_body("  short  "), "short");
        let long = "x".repeat(500);
        let cut = truncate_body(&long);
        assert_eq!(cut.chars().count(), 301);
        assert!(cut.ends_with('…'));
    }
}
