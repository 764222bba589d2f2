//! Summarizer backed by any chat model that `edgequake-llm` can reach.
//!
//! ## Provider resolution
//!
//! The provider is resolved on the first call and then kept for the life of
//! the model value in a [`tokio::sync::OnceCell`]. Resolution goes from most
//! specific to least specific:
//!
//! 1. **Pre-built provider** ([`LlmModel::with_provider`]): used as-is.
//! 2. **Named provider + model** (`provider_name`, `model`): built with
//!    [`ProviderFactory::create_llm_provider`], which reads the matching API
//!    key (`OPENAI_API_KEY`, …) from the environment.
//! 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
//! 4. **OpenAI** when `OPENAI_API_KEY` is set.
//! 5. **Full auto-detection** via [`ProviderFactory::from_env`].
//!
//! A resolution failure is a [`SummarizationError::ModelUnavailable`]; it is
//! not cached, so the next call tries again.

use crate::error::SummarizationError;
use crate::prompts::{summary_request, DEFAULT_SUMMARY_PROMPT};
use crate::providers::{SummaryModel, SummaryParams};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::debug;

/// Model used with a named provider when none is given.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4.1-nano";

/// Settings for [`LlmModel`].
#[derive(Debug, Clone)]
pub struct LlmModelOptions {
    /// Provider name understood by `edgequake-llm` (`openai`, `anthropic`, …).
    pub provider_name: Option<String>,
    /// Model id. Default: [`DEFAULT_LLM_MODEL`] when a provider is named.
    pub model: Option<String>,
    /// Sampling temperature. Default: 0.2.
    pub temperature: f32,
    /// Completion token cap. Default: 1024.
    pub max_tokens: usize,
    /// Replaces [`DEFAULT_SUMMARY_PROMPT`].
    pub system_prompt: Option<String>,
}

impl Default for LlmModelOptions {
    fn default() -> Self {
        Self {
            provider_name: None,
            model: None,
            temperature: 0.2,
            max_tokens: 1024,
            system_prompt: None,
        }
    }
}

/// A chat model prompted to write a spoken summary.
pub struct LlmModel {
    options: LlmModelOptions,
    label: String,
    provider: OnceCell<Arc<dyn LLMProvider>>,
}

impl LlmModel {
    /// Resolve the provider lazily on first use.
    pub fn new(options: LlmModelOptions) -> Self {
        let label = match (&options.provider_name, &options.model) {
            (Some(p), Some(m)) => format!("{p}/{m}"),
            (Some(p), None) => format!("{p}/{DEFAULT_LLM_MODEL}"),
            (None, Some(m)) => m.clone(),
            (None, None) => "llm-auto".to_string(),
        };
        Self {
            options,
            label,
            provider: OnceCell::new(),
        }
    }

    /// Use a provider the caller already built.
    pub fn with_provider(provider: Arc<dyn LLMProvider>, options: LlmModelOptions) -> Self {
        let model = Self::new(options);
        // A fresh cell is empty, so this cannot fail.
        let _ = model.provider.set(provider);
        model
    }

    async fn provider(&self) -> Result<&Arc<dyn LLMProvider>, SummarizationError> {
        self.provider
            .get_or_try_init(|| async { resolve_provider(&self.options, &self.label) })
            .await
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.options.temperature),
            max_tokens: Some(self.options.max_tokens),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for LlmModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmModel")
            .field("label", &self.label)
            .field("options", &self.options)
            .field("resolved", &self.provider.initialized())
            .finish()
    }
}

#[async_trait]
impl SummaryModel for LlmModel {
    fn name(&self) -> &str {
        &self.label
    }

    async fn summarize(
        &self,
        text: &str,
        params: &SummaryParams,
    ) -> Result<String, SummarizationError> {
        let provider = self.provider().await?;
        let start = Instant::now();

        let system_prompt = self
            .options
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SUMMARY_PROMPT);
        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(summary_request(text, params)),
        ];
        let options = self.build_options();

        let response = provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| SummarizationError::ModelUnavailable {
                model: self.label.clone(),
                detail: format!("{e}"),
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens, {:?}",
            self.label,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );
        Ok(response.content)
    }
}

/// The `(provider, model)` pair to build directly, if one is known: the
/// options first, then `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, then
/// OpenAI when `OPENAI_API_KEY` is set. `None` leaves it to auto-detection.
fn explicit_target<F>(options: &LlmModelOptions, env: F) -> Option<(String, String)>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| env(name).filter(|v| !v.trim().is_empty());
    let model = || {
        options
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string())
    };

    options
        .provider_name
        .clone()
        .map(|name| (name, model()))
        .or_else(|| var("EDGEQUAKE_LLM_PROVIDER").zip(var("EDGEQUAKE_MODEL")))
        .or_else(|| var("OPENAI_API_KEY").map(|_| ("openai".to_string(), model())))
}

fn resolve_provider(
    options: &LlmModelOptions,
    label: &str,
) -> Result<Arc<dyn LLMProvider>, SummarizationError> {
    if let Some((provider, model)) = explicit_target(options, |name| std::env::var(name).ok()) {
        debug!("Building LLM provider {}/{}", provider, model);
        return ProviderFactory::create_llm_provider(&provider, &model).map_err(|e| {
            SummarizationError::ModelUnavailable {
                model: format!("{provider}/{model}"),
                detail: e.to_string(),
            }
        });
    }

    ProviderFactory::from_env()
        .map(|(llm, _embedding)| llm)
        .map_err(|e| SummarizationError::ModelUnavailable {
            model: label.to_string(),
            detail: format!(
                "no LLM provider configured: {e}\n\
                Set OPENAI_API_KEY or ANTHROPIC_API_KEY, or pass --provider."
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_reflects_configuration() {
        assert_eq!(LlmModel::new(LlmModelOptions::default()).name(), "llm-auto");
        let named = LlmModel::new(LlmModelOptions {
            provider_name: Some("openai".into()),
            ..Default::default()
        });
        assert_eq!(named.name(), "openai/gpt-4.1-nano");
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn named_provider_wins_over_environment() {
        let options = LlmModelOptions {
            provider_name: Some("anthropic".into()),
            ..Default::default()
        };
        let target = explicit_target(&options, env(&[("OPENAI_API_KEY", "sk-test")]));
        assert_eq!(
            target,
            Some(("anthropic".to_string(), DEFAULT_LLM_MODEL.to_string()))
        );
    }

    #[test]
    fn environment_pair_then_openai_key() {
        let options = LlmModelOptions::default();
        let pair = env(&[
            ("EDGEQUAKE_LLM_PROVIDER", "gemini"),
            ("EDGEQUAKE_MODEL", "gemini-2.0-flash"),
            ("OPENAI_API_KEY", "sk-test"),
        ]);
        assert_eq!(
            explicit_target(&options, pair),
            Some(("gemini".to_string(), "gemini-2.0-flash".to_string()))
        );

        let key_only = env(&[("EDGEQUAKE_LLM_PROVIDER", "gemini"), ("OPENAI_API_KEY", "sk-test")]);
        assert_eq!(
            explicit_target(&options, key_only),
            Some(("openai".to_string(), DEFAULT_LLM_MODEL.to_string()))
        );
    }

    #[test]
    fn blank_environment_defers_to_auto_detection() {
        let options = LlmModelOptions::default();
        assert_eq!(explicit_target(&options, env(&[("OPENAI_API_KEY", "  ")])), None);
    }

    #[test]
    fn build_options_defaults() {
        let model = LlmModel::new(LlmModelOptions::default());
        let opts = model.build_options();
        assert_eq!(opts.temperature, Some(0.2));
        assert_eq!(opts.max_tokens, Some(1024));
    }
}
