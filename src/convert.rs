//! The pipeline orchestrator and the library entry points.
//!
//! [`Pipeline::convert`] runs one document through
//! `Received → Extracted → Summarized → Synthesized → Delivered`, stopping at
//! the first failing stage. There is no retry and no partial result: either
//! the caller gets a [`ConversionOutput`] with the audio, or a
//! [`ConversionError`] naming the stage.
//!
//! The free functions wrap it for the common cases: resolve a path or URL
//! first ([`convert_input`]), write the audio to disk ([`convert_to_file`]),
//! run without an async runtime ([`convert_sync`]), or stop after extraction
//! ([`extract_input`]).

use crate::config::PodcastConfig;
use crate::document::RawDocument;
use crate::error::{ConversionError, Doc2PodcastError, PipelineStage};
use crate::output::{ConversionOutput, ConversionStats, ExtractedText};
use crate::pipeline::{extract, input, speech, summarize};
use crate::progress::ConversionState;
use crate::providers::{SpeechProvider, SummaryModel};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// A configured summarizer + speech provider pair.
///
/// Holds no per-request state; one `Pipeline` can serve any number of
/// conversions, sequentially or concurrently.
#[derive(Clone)]
pub struct Pipeline {
    summarizer: Arc<dyn SummaryModel>,
    speech: Arc<dyn SpeechProvider>,
    config: PodcastConfig,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("summarizer", &self.summarizer.name())
            .field("speech", &self.speech.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Pipeline {
    pub fn new(
        summarizer: Arc<dyn SummaryModel>,
        speech: Arc<dyn SpeechProvider>,
        config: PodcastConfig,
    ) -> Self {
        Self {
            summarizer,
            speech,
            config,
        }
    }

    pub fn config(&self) -> &PodcastConfig {
        &self.config
    }

    /// Convert one document into a narrated summary.
    ///
    /// # Errors
    /// A [`ConversionError`] tagged with the stage that failed. Later stages
    /// never run after a failure, so an extraction error means no model or
    /// TTS call was made.
    pub async fn convert(&self, document: RawDocument) -> Result<ConversionOutput, ConversionError> {
        let total_start = Instant::now();
        let source_name = document.name().to_string();
        info!(
            "Starting conversion: {} ({}, {} bytes)",
            source_name,
            document.format(),
            document.len()
        );
        self.enter(ConversionState::Received);

        // ── Step 1: Extract ──────────────────────────────────────────────
        self.stage_start(PipelineStage::Extraction);
        let step = Instant::now();
        let extracted = extract::extract(&document)
            .await
            .map_err(|e| self.fail(e.into()))?;
        let extract_duration_ms = step.elapsed().as_millis() as u64;
        drop(document);
        self.enter(ConversionState::Extracted);

        // ── Step 2: Summarize ────────────────────────────────────────────
        self.stage_start(PipelineStage::Summarization);
        let step = Instant::now();
        let summary = summarize::summarize(self.summarizer.as_ref(), &extracted, &self.config.summary)
            .await
            .map_err(|e| self.fail(e.into()))?;
        let summarize_duration_ms = step.elapsed().as_millis() as u64;
        self.enter(ConversionState::Summarized);

        // ── Step 3: Synthesize ───────────────────────────────────────────
        self.stage_start(PipelineStage::Synthesis);
        let step = Instant::now();
        let audio = speech::synthesize(
            self.speech.as_ref(),
            &summary,
            &self.config.voice,
            self.config.progress_callback.as_ref(),
        )
        .await
        .map_err(|e| self.fail(e.into()))?;
        let synthesize_duration_ms = step.elapsed().as_millis() as u64;
        self.enter(ConversionState::Synthesized);

        // ── Step 4: Assemble ─────────────────────────────────────────────
        let stats = ConversionStats {
            extracted_chars: extracted.char_count(),
            extracted_words: extracted.word_count(),
            summary_words: summary.word_count(),
            summary_model_calls: summary.model_calls,
            source_truncated: summary.source_truncated,
            synthesis_chunks: audio.chunks,
            audio_bytes: audio.len(),
            extract_duration_ms,
            summarize_duration_ms,
            synthesize_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            "Conversion complete: {} words → {} words → {} bytes of {}, {}ms total",
            stats.extracted_words,
            stats.summary_words,
            stats.audio_bytes,
            audio.mime_type(),
            stats.total_duration_ms
        );
        self.enter(ConversionState::Delivered);

        Ok(ConversionOutput {
            source_name,
            summary,
            audio,
            stats,
        })
    }

    fn enter(&self, state: ConversionState) {
        debug!("Conversion state: {}", state);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_state(state);
        }
    }

    fn stage_start(&self, stage: PipelineStage) {
        info!("Stage started: {}", stage);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage_start(stage);
        }
    }

    fn fail(&self, err: ConversionError) -> ConversionError {
        let stage = err.stage();
        error!("Conversion failed at {}: {}", stage, err);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_failed(stage, &err.to_string());
        }
        err
    }
}

/// Resolve a file path or HTTP(S) URL, then convert it.
pub async fn convert_input(
    input_str: impl AsRef<str>,
    pipeline: &Pipeline,
) -> Result<ConversionOutput, Doc2PodcastError> {
    let document =
        input::resolve_input(input_str.as_ref(), pipeline.config().download_timeout_secs).await?;
    Ok(pipeline.convert(document).await?)
}

/// Convert in-memory bytes; the format is inferred from `name`.
pub async fn convert_bytes(
    name: impl Into<String>,
    bytes: Vec<u8>,
    pipeline: &Pipeline,
) -> Result<ConversionOutput, Doc2PodcastError> {
    let document = RawDocument::from_named_bytes(name, bytes);
    Ok(pipeline.convert(document).await?)
}

/// Convert and write the audio directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files. The
/// returned output still carries the audio bytes.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    pipeline: &Pipeline,
) -> Result<ConversionOutput, Doc2PodcastError> {
    let output = convert_input(input_str, pipeline).await?;
    write_atomic(output_path.as_ref(), output.audio.bytes()).await?;
    Ok(output)
}

/// Write `bytes` to `path` via a sibling temp file and a rename.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Doc2PodcastError> {
    let write_err = |e| Doc2PodcastError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Synchronous wrapper around [`convert_input`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    pipeline: &Pipeline,
) -> Result<ConversionOutput, Doc2PodcastError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Doc2PodcastError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert_input(input_str, pipeline))
}

/// Resolve and extract a document without summarizing it.
///
/// Does not require a model or TTS credentials.
pub async fn extract_input(
    input_str: impl AsRef<str>,
    download_timeout_secs: u64,
) -> Result<ExtractedText, Doc2PodcastError> {
    let document = input::resolve_input(input_str.as_ref(), download_timeout_secs).await?;
    Ok(extract::extract(&document).await?)
}
