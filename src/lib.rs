//! # doc2podcast
//!
//! Turn a document into a narrated audio summary.
//!
//! ## Why this crate?
//!
//! Reading a 30-page report takes an hour; listening to a two-minute summary
//! of it on the way to work takes two. This crate extracts the text of a
//! plain-text, PDF or Word document, condenses it with an abstractive
//! summarization model, and reads the summary aloud through a cloud
//! text-to-speech voice.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document
//!  │
//!  ├─ 1. Input      read a local file or download a URL
//!  ├─ 2. Extract    TXT / PDF (pdfium, spawn_blocking) / DOCX (docx-rs) → text
//!  ├─ 3. Summarize  BART on Hugging Face, or any LLM via edgequake-llm
//!  ├─ 4. Speak      Google Cloud TTS, chunked at sentence boundaries
//!  └─ 5. Output     one joined audio file + summary + per-stage stats
//! ```
//!
//! Stages run strictly in order and the first failure stops the conversion
//! with a [`ConversionError`] naming the stage.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2podcast::{
//!     convert_to_file, GoogleTtsOptions, GoogleTtsProvider, HuggingFaceModel,
//!     HuggingFaceOptions, Pipeline, PodcastConfig, TtsCredentials,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials from GOOGLE_CREDENTIALS_JSON / GOOGLE_TTS_API_KEY / …
//!     let credentials = TtsCredentials::from_env()?;
//!     let speech = GoogleTtsProvider::new(credentials, GoogleTtsOptions::default())?;
//!     let model = HuggingFaceModel::new(HuggingFaceOptions::from_env())?;
//!
//!     let pipeline = Pipeline::new(Arc::new(model), Arc::new(speech), PodcastConfig::default());
//!     let output = convert_to_file("report.pdf", "summary_podcast.mp3", &pipeline).await?;
//!     println!("{}", output.summary);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `doc2podcast` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! doc2podcast = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod credentials;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod providers;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    AudioEncoding, LongInputPolicy, PodcastConfig, PodcastConfigBuilder, SummaryConfig,
    VoiceConfig, VoiceGender,
};
pub use convert::{
    convert_bytes, convert_input, convert_sync, convert_to_file, extract_input, Pipeline,
};
pub use credentials::TtsCredentials;
pub use document::{DocumentFormat, RawDocument};
pub use error::{
    ConversionError, Doc2PodcastError, ExtractionError, PipelineStage, SummarizationError,
    SynthesisError,
};
pub use output::{AudioArtifact, ConversionOutput, ConversionStats, ExtractedText, SummaryText};
pub use progress::{
    ConversionProgressCallback, ConversionState, NoopProgressCallback, ProgressCallback,
};
pub use providers::{
    GoogleTtsOptions, GoogleTtsProvider, HuggingFaceModel, HuggingFaceOptions, LlmModel,
    LlmModelOptions, SpeechProvider, SummaryModel, SummaryParams,
};
