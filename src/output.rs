//! Values produced by the pipeline stages.
//!
//! Each stage creates a new immutable value that the next stage consumes:
//! [`ExtractedText`] → [`SummaryText`] → [`AudioArtifact`]. The orchestrator
//! bundles the last two (plus timings) into a [`ConversionOutput`].

use crate::config::AudioEncoding;
use serde::Serialize;
use std::fmt;

/// Plain text pulled out of a document. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Wrap already-validated text. Returns `None` for blank input.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }

    /// The first `max_chars` characters, followed by `...` when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.0.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The condensed text that will be narrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryText {
    text: String,
    /// The source was cut to fit the model's input window.
    pub source_truncated: bool,
    /// Number of model calls that produced this summary (0 = pass-through).
    pub model_calls: usize,
}

impl SummaryText {
    pub fn new(text: impl Into<String>, source_truncated: bool, model_calls: usize) -> Self {
        Self {
            text: text.into(),
            source_truncated,
            model_calls,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl fmt::Display for SummaryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Encoded audio ready for playback or download.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AudioArtifact {
    #[serde(skip)]
    bytes: Vec<u8>,
    pub encoding: AudioEncoding,
    /// Number of provider requests whose audio was joined.
    pub chunks: usize,
}

impl AudioArtifact {
    pub fn new(bytes: Vec<u8>, encoding: AudioEncoding, chunks: usize) -> Self {
        Self {
            bytes,
            encoding,
            chunks,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_type(&self) -> &'static str {
        self.encoding.mime_type()
    }

    pub fn extension(&self) -> &'static str {
        self.encoding.extension()
    }

    /// Suggested download name, `summary_podcast.mp3` for MP3 output.
    pub fn file_name(&self) -> String {
        format!("summary_podcast.{}", self.extension())
    }
}

impl fmt::Debug for AudioArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioArtifact")
            .field("encoding", &self.encoding)
            .field("bytes", &self.bytes.len())
            .field("chunks", &self.chunks)
            .finish()
    }
}

/// Timings and counters for one conversion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    pub extracted_chars: usize,
    pub extracted_words: usize,
    pub summary_words: usize,
    pub summary_model_calls: usize,
    pub source_truncated: bool,
    pub synthesis_chunks: usize,
    pub audio_bytes: usize,
    pub extract_duration_ms: u64,
    pub summarize_duration_ms: u64,
    pub synthesize_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    pub source_name: String,
    pub summary: SummaryText,
    pub audio: AudioArtifact,
    pub stats: ConversionStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracted_text_rejects_blank() {
        assert!(ExtractedText::new("  \n\t").is_none());
        assert!(ExtractedText::new("x").is_some());
    }

    #[test]
    fn preview_marks_truncation() {
        let t = ExtractedText::new("abcdef").unwrap();
        assert_eq!(t.preview(3), "abc...");
        assert_eq!(t.preview(6), "abcdef");
        assert_eq!(t.preview(100), "abcdef");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let t = ExtractedText::new("héllo wörld").unwrap();
        assert_eq!(t.preview(2), "hé...");
    }

    #[test]
    fn artifact_file_name_follows_encoding() {
        let a = AudioArtifact::new(vec![1, 2, 3], AudioEncoding::Mp3, 1);
        assert_eq!(a.file_name(), "summary_podcast.mp3");
        assert_eq!(a.mime_type(), "audio/mpeg");
        let a = AudioArtifact::new(vec![1], AudioEncoding::Linear16, 1);
        assert_eq!(a.file_name(), "summary_podcast.wav");
    }

    #[test]
    fn artifact_json_omits_bytes() {
        let a = AudioArtifact::new(vec![0; 1024], AudioEncoding::Mp3, 2);
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("\"chunks\":2"));
        assert!(!json.contains("bytes"));
    }
}
