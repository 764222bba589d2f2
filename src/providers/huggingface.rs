//! Hugging Face Inference API summarizer.
//!
//! Sends the text to a hosted summarization pipeline (BART by default) and
//! reads back `[{"summary_text": "…"}]`. The model may be cold: the
//! `x-wait-for-model` header asks the router to hold the request while it
//! loads instead of answering 503 straight away. A 503 that still comes back
//! is reported as [`SummarizationError::ModelUnavailable`].

use crate::error::{Doc2PodcastError, SummarizationError};
use crate::providers::{truncate_body, SummaryModel, SummaryParams};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// The summarization model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "facebook/bart-large-cnn";
/// Serverless inference router; the model id is appended as a path.
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";
/// Access token for the inference API.
pub const ENV_HF_TOKEN: &str = "HF_TOKEN";
/// Model id override.
pub const ENV_MODEL: &str = "DOC2PODCAST_MODEL";

/// Connection settings for [`HuggingFaceModel`].
#[derive(Clone)]
pub struct HuggingFaceOptions {
    /// Base URL without the model id. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,
    /// Model id, e.g. `facebook/bart-large-cnn`.
    pub model: String,
    /// Bearer token. Anonymous requests are heavily rate limited.
    pub token: Option<String>,
    /// HTTP timeout in seconds. Default: 120.
    pub timeout_secs: u64,
}

impl Default for HuggingFaceOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            token: None,
            timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for HuggingFaceOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceOptions")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl HuggingFaceOptions {
    /// Defaults, with `HF_TOKEN` and `DOC2PODCAST_MODEL` applied when set.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let mut options = Self::default();
        if let Some(token) = non_empty(ENV_HF_TOKEN) {
            options.token = Some(token.trim().to_string());
        }
        if let Some(model) = non_empty(ENV_MODEL) {
            options.model = model.trim().to_string();
        }
        options
    }
}

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    estimated_time: Option<f64>,
}

/// Summarizer backed by the Hugging Face Inference API.
#[derive(Debug)]
pub struct HuggingFaceModel {
    client: reqwest::Client,
    endpoint: String,
    options: HuggingFaceOptions,
}

impl HuggingFaceModel {
    pub fn new(options: HuggingFaceOptions) -> Result<Self, Doc2PodcastError> {
        if options.model.trim().is_empty() {
            return Err(Doc2PodcastError::InvalidConfig(
                "Hugging Face model id must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| Doc2PodcastError::Internal(format!("HTTP client: {e}")))?;
        let endpoint = format!(
            "{}/{}",
            options.base_url.trim_end_matches('/'),
            options.model.trim_matches('/')
        );
        Ok(Self {
            client,
            endpoint,
            options,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn unavailable(&self, detail: impl Into<String>) -> SummarizationError {
        SummarizationError::ModelUnavailable {
            model: self.options.model.clone(),
            detail: detail.into(),
        }
    }

    fn map_status(&self, status: reqwest::StatusCode, body: &str) -> SummarizationError {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .map(|b| b.error.clone())
            .unwrap_or_else(|| truncate_body(body));

        match status.as_u16() {
            401 | 403 => self.unavailable(format!(
                "access denied (HTTP {status}): {message}\nSet {ENV_HF_TOKEN} to a valid token."
            )),
            404 => self.unavailable(format!("model not found on the inference API: {message}")),
            408 | 504 => SummarizationError::Timeout {
                secs: self.options.timeout_secs,
            },
            503 => {
                let eta = parsed
                    .and_then(|b| b.estimated_time)
                    .map(|t| format!(" (estimated load time {t:.0}s)"))
                    .unwrap_or_default();
                self.unavailable(format!("model is loading{eta}: {message}"))
            }
            _ => self.unavailable(format!("HTTP {status}: {message}")),
        }
    }
}

#[async_trait]
impl SummaryModel for HuggingFaceModel {
    fn name(&self) -> &str {
        &self.options.model
    }

    async fn summarize(
        &self,
        text: &str,
        params: &SummaryParams,
    ) -> Result<String, SummarizationError> {
        let body = json!({
            "inputs": text,
            "parameters": {
                "max_length": params.max_length,
                "min_length": params.min_length,
                "do_sample": false,
            },
        });

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("x-wait-for-model", "true")
            .json(&body);
        if let Some(ref token) = self.options.token {
            request = request.bearer_auth(token);
        }

        debug!(
            "POST {} ({} chars, max_length {}, min_length {})",
            self.endpoint,
            text.len(),
            params.max_length,
            params.min_length
        );

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SummarizationError::Timeout {
                    secs: self.options.timeout_secs,
                }
            } else {
                self.unavailable(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SummarizationError::Timeout {
                    secs: self.options.timeout_secs,
                }
            } else {
                self.unavailable(format!("reading response failed: {e}"))
            }
        })?;

        if !status.is_success() {
            return Err(self.map_status(status, &body));
        }

        let items: Vec<SummaryItem> =
            serde_json::from_str(&body).map_err(|e| SummarizationError::InvalidResponse {
                model: self.options.model.clone(),
                detail: format!("{e}: {}", truncate_body(&body)),
            })?;

        items
            .into_iter()
            .next()
            .map(|item| item.summary_text)
            .ok_or_else(|| SummarizationError::InvalidResponse {
                model: self.options.model.clone(),
                detail: "empty result list".into(),
            })
    }
}
