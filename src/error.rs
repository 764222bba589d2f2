//! Error types for the doc2podcast library.
//!
//! The pipeline has three stages and each one owns an error enum:
//!
//! * [`ExtractionError`]: the document could not be turned into text.
//! * [`SummarizationError`]: the model could not produce a summary.
//! * [`SynthesisError`]: the TTS provider could not produce audio.
//!
//! [`ConversionError`] wraps exactly one of them and knows which
//! [`PipelineStage`] failed, so a caller can print "synthesis failed:
//! authentication rejected" without matching on every variant.
//!
//! Everything that happens *around* the pipeline (resolving a path or URL,
//! loading credentials, validating the config, writing the audio file) is a
//! [`Doc2PodcastError`].

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The pipeline stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Extraction,
    Summarization,
    Synthesis,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Extraction => "extraction",
            PipelineStage::Summarization => "summarization",
            PipelineStage::Synthesis => "synthesis",
        };
        f.write_str(name)
    }
}

// ── Extraction ───────────────────────────────────────────────────────────

/// Failures while turning a [`crate::RawDocument`] into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The declared format is not one of TXT, PDF or Word.
    #[error("Unsupported document format '{format}'\nSupported formats: .txt, .pdf, .doc, .docx")]
    UnsupportedFormat { format: String },

    /// The bytes do not look like the declared format.
    #[error("'{name}' is declared as {declared} but its content is {detail}")]
    FormatMismatch {
        name: String,
        declared: &'static str,
        detail: String,
    },

    /// Plain text was not valid UTF-8.
    #[error("'{name}' is not valid UTF-8 text: {detail}")]
    InvalidEncoding { name: String, detail: String },

    /// The PDF needs a password.
    #[error("PDF '{name}' is encrypted and requires a password")]
    PasswordRequired { name: String },

    /// The document structure could not be parsed.
    #[error("'{name}' is corrupt: {detail}")]
    CorruptDocument { name: String, detail: String },

    /// The pdfium shared library could not be bound.
    #[error(
        "Failed to bind to the pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfEngineUnavailable(String),

    /// Extraction succeeded but produced no readable text.
    #[error("'{name}' contains no extractable text")]
    EmptyDocument { name: String },

    /// A blocking extraction task died.
    #[error("Extraction task failed: {0}")]
    Internal(String),
}

// ── Summarization ────────────────────────────────────────────────────────

/// Failures while producing a summary.
#[derive(Debug, Error)]
pub enum SummarizationError {
    /// The model could not be loaded or reached.
    #[error("Summarization model '{model}' is unavailable: {detail}")]
    ModelUnavailable { model: String, detail: String },

    /// A model call exceeded the configured time budget.
    #[error("Summarization timed out after {secs}s\nIncrease --summary-timeout.")]
    Timeout { secs: u64 },

    /// The source exceeds the input window and truncation is disabled.
    #[error(
        "Source text has {chars} characters but the model window is {window}\n\
Enable truncation or use --chunked."
    )]
    InputTooLong { chars: usize, window: usize },

    /// The model answered with nothing.
    #[error("Summarization model '{model}' returned an empty summary")]
    EmptySummary { model: String },

    /// The model host returned a body we could not understand.
    #[error("Unexpected response from summarization model '{model}': {detail}")]
    InvalidResponse { model: String, detail: String },
}

// ── Synthesis ────────────────────────────────────────────────────────────

/// Failures while producing audio.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Credentials are missing, invalid or lack permission.
    #[error("Authentication with TTS provider '{provider}' failed: {detail}")]
    Authentication { provider: String, detail: String },

    /// Rate or usage limits were hit.
    #[error("Quota exceeded for TTS provider '{provider}': {detail}")]
    QuotaExceeded { provider: String, detail: String },

    /// Transient connectivity failure.
    #[error("Network error talking to TTS provider '{provider}': {detail}")]
    Network { provider: String, detail: String },

    /// Any other rejection by the provider (invalid voice, bad request, 5xx).
    #[error("TTS provider '{provider}' returned HTTP {status}: {detail}")]
    Provider {
        provider: String,
        status: u16,
        detail: String,
    },

    /// The provider answered 2xx with an unreadable body.
    #[error("Unexpected response from TTS provider '{provider}': {detail}")]
    InvalidResponse { provider: String, detail: String },

    /// Per-chunk audio cannot be joined into one stream.
    #[error("Cannot concatenate audio chunks: {0}")]
    AudioMismatch(String),

    /// Nothing to say.
    #[error("Cannot synthesize empty text")]
    EmptyInput,
}

// ── Pipeline ─────────────────────────────────────────────────────────────

/// A pipeline failure tagged with the stage that produced it.
///
/// The orchestrator halts at the first failure; there is never partial audio
/// attached to this error.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("summarization failed: {0}")]
    Summarization(#[from] SummarizationError),

    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
}

impl ConversionError {
    /// The stage that failed.
    pub fn stage(&self) -> PipelineStage {
        match self {
            ConversionError::Extraction(_) => PipelineStage::Extraction,
            ConversionError::Summarization(_) => PipelineStage::Summarization,
            ConversionError::Synthesis(_) => PipelineStage::Synthesis,
        }
    }
}

// ── Everything around the pipeline ───────────────────────────────────────

/// Fatal errors outside the three pipeline stages.
#[derive(Debug, Error)]
pub enum Doc2PodcastError {
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is neither a file path nor an HTTP(S) URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// TTS credentials could not be loaded.
    #[error("TTS credentials error: {0}")]
    Credentials(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not create or write the output audio file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The pipeline itself failed.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ExtractionError> for Doc2PodcastError {
    fn from(e: ExtractionError) -> Self {
        Doc2PodcastError::Conversion(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_reports_stage() {
        let e: ConversionError = ExtractionError::EmptyDocument {
            name: "scan.pdf".into(),
        }
        .into();
        assert_eq!(e.stage(), PipelineStage::Extraction);
        assert!(e.to_string().starts_with("extraction failed"));
        assert!(e.to_string().contains("scan.pdf"));

        let e: ConversionError = SynthesisError::Authentication {
            provider: "google".into(),
            detail: "invalid key".into(),
        }
        .into();
        assert_eq!(e.stage(), PipelineStage::Synthesis);
        assert!(e.to_string().contains("invalid key"));
    }

    #[test]
    fn timeout_display() {
        let e = SummarizationError::Timeout { secs: 30 };
        assert!(e.to_string().contains("30s"));
    }

    #[test]
    fn unsupported_format_lists_supported() {
        let e = ExtractionError::UnsupportedFormat {
            format: "epub".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("epub"), "got: {msg}");
        assert!(msg.contains(".docx"), "got: {msg}");
    }

    #[test]
    fn crate_error_is_transparent_over_conversion() {
        let e: Doc2PodcastError = ConversionError::from(SummarizationError::EmptySummary {
            model: "bart".into(),
        })
        .into();
        assert!(e.to_string().starts_with("summarization failed"));
    }

    #[test]
    fn stage_display_is_lowercase() {
        assert_eq!(PipelineStage::Summarization.to_string(), "summarization");
    }
}
