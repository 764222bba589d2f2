//! Configuration types for document-to-podcast conversion.
//!
//! All conversion behaviour is controlled through [`PodcastConfig`], built
//! via its [`PodcastConfigBuilder`]. The summarizer and the voice each get a
//! sub-struct ([`SummaryConfig`], [`VoiceConfig`]) so the stages only see the
//! knobs that concern them.
//!
//! Credentials are deliberately *not* part of this struct: they are loaded
//! once into [`crate::credentials::TtsCredentials`] and handed to the speech
//! provider's constructor.

use crate::error::Doc2PodcastError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for one conversion.
///
/// # Example
/// ```rust
/// use doc2podcast::{AudioEncoding, PodcastConfig};
///
/// let config = PodcastConfig::builder()
///     .max_length(120)
///     .min_length(30)
///     .encoding(AudioEncoding::Mp3)
///     .speaking_rate(1.1)
///     .build()
///     .unwrap();
/// assert_eq!(config.summary.max_length, 120);
/// ```
#[derive(Clone)]
pub struct PodcastConfig {
    pub summary: SummaryConfig,
    pub voice: VoiceConfig,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional stage-progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PodcastConfig {
    fn default() -> Self {
        Self {
            summary: SummaryConfig::default(),
            voice: VoiceConfig::default(),
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PodcastConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PodcastConfig")
            .field("summary", &self.summary)
            .field("voice", &self.voice)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl PodcastConfig {
    /// Create a new builder for `PodcastConfig`.
    pub fn builder() -> PodcastConfigBuilder {
        PodcastConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PodcastConfig`].
#[derive(Debug)]
pub struct PodcastConfigBuilder {
    config: PodcastConfig,
}

impl PodcastConfigBuilder {
    pub fn summary(mut self, summary: SummaryConfig) -> Self {
        self.config.summary = summary;
        self
    }

    pub fn voice(mut self, voice: VoiceConfig) -> Self {
        self.config.voice = voice;
        self
    }

    pub fn max_length(mut self, words: usize) -> Self {
        self.config.summary.max_length = words;
        self
    }

    pub fn min_length(mut self, words: usize) -> Self {
        self.config.summary.min_length = words;
        self
    }

    pub fn truncation(mut self, v: bool) -> Self {
        self.config.summary.truncation = v;
        self
    }

    pub fn max_input_chars(mut self, n: usize) -> Self {
        self.config.summary.max_input_chars = n;
        self
    }

    pub fn long_input(mut self, policy: LongInputPolicy) -> Self {
        self.config.summary.long_input = policy;
        self
    }

    pub fn summary_timeout_secs(mut self, secs: u64) -> Self {
        self.config.summary.timeout_secs = secs.max(1);
        self
    }

    pub fn language_code(mut self, code: impl Into<String>) -> Self {
        self.config.voice.language_code = code.into();
        self
    }

    pub fn voice_name(mut self, name: impl Into<String>) -> Self {
        self.config.voice.voice_name = Some(name.into());
        self
    }

    pub fn gender(mut self, gender: VoiceGender) -> Self {
        self.config.voice.gender = gender;
        self
    }

    pub fn encoding(mut self, encoding: AudioEncoding) -> Self {
        self.config.voice.encoding = encoding;
        self
    }

    pub fn speaking_rate(mut self, rate: f32) -> Self {
        self.config.voice.speaking_rate = rate;
        self
    }

    pub fn pitch(mut self, semitones: f32) -> Self {
        self.config.voice.pitch = semitones;
        self
    }

    pub fn sample_rate_hertz(mut self, hz: u32) -> Self {
        self.config.voice.sample_rate_hertz = Some(hz);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PodcastConfig, Doc2PodcastError> {
        self.config.summary.validate()?;
        self.config.voice.validate()?;
        Ok(self.config)
    }
}

// ── Summarizer ───────────────────────────────────────────────────────────

/// What to do with source text longer than the model input window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LongInputPolicy {
    /// Keep the leading window, drop the rest (subject to `truncation`).
    #[default]
    Truncate,
    /// Summarize window-sized chunks, join them, and repeat until the joined
    /// text fits one window; a final call produces the summary.
    Chunked,
}

/// Length bounds and input-window handling for the summarizer.
///
/// Lengths are counted in whitespace-separated words. They are forwarded to
/// the model as its own length bounds and enforced on the way back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Upper bound on summary length in words. Default: 150.
    pub max_length: usize,
    /// Lower bound requested from the model, in words. Default: 40.
    ///
    /// Sources at or below this length are passed through unchanged.
    pub min_length: usize,
    /// Truncate source text that exceeds the input window. Default: true.
    pub truncation: bool,
    /// Model input window in characters. Default: 4096 (about 1024 BART tokens).
    pub max_input_chars: usize,
    /// Behaviour for over-long sources. Default: [`LongInputPolicy::Truncate`].
    pub long_input: LongInputPolicy,
    /// Time budget per model call in seconds. Default: 120.
    pub timeout_secs: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_length: 150,
            min_length: 40,
            truncation: true,
            max_input_chars: 4096,
            long_input: LongInputPolicy::default(),
            timeout_secs: 120,
        }
    }
}

impl SummaryConfig {
    pub fn validate(&self) -> Result<(), Doc2PodcastError> {
        if self.max_length == 0 {
            return Err(Doc2PodcastError::InvalidConfig(
                "max_length must be ≥ 1".into(),
            ));
        }
        if self.min_length > self.max_length {
            return Err(Doc2PodcastError::InvalidConfig(format!(
                "min_length ({}) must not exceed max_length ({})",
                self.min_length, self.max_length
            )));
        }
        if self.max_input_chars < 64 {
            return Err(Doc2PodcastError::InvalidConfig(format!(
                "max_input_chars must be ≥ 64, got {}",
                self.max_input_chars
            )));
        }
        Ok(())
    }
}

// ── Voice ────────────────────────────────────────────────────────────────

/// Requested voice gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VoiceGender {
    #[default]
    Female,
    Male,
    Neutral,
    Unspecified,
}

impl VoiceGender {
    /// Google `SsmlVoiceGender` name.
    pub fn as_ssml(&self) -> &'static str {
        match self {
            VoiceGender::Female => "FEMALE",
            VoiceGender::Male => "MALE",
            VoiceGender::Neutral => "NEUTRAL",
            VoiceGender::Unspecified => "SSML_VOICE_GENDER_UNSPECIFIED",
        }
    }
}

/// Audio container/codec of the synthesized speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    /// 16-bit signed little-endian PCM in a WAV container.
    Linear16,
    OggOpus,
    /// 8-bit G.711 μ-law in a WAV container.
    Mulaw,
    /// 8-bit G.711 A-law in a WAV container.
    Alaw,
}

impl AudioEncoding {
    /// Google `AudioEncoding` name.
    pub fn as_api_name(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "MP3",
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::OggOpus => "OGG_OPUS",
            AudioEncoding::Mulaw => "MULAW",
            AudioEncoding::Alaw => "ALAW",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "audio/mpeg",
            AudioEncoding::OggOpus => "audio/ogg",
            AudioEncoding::Linear16 | AudioEncoding::Mulaw | AudioEncoding::Alaw => "audio/wav",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioEncoding::Mp3 => "mp3",
            AudioEncoding::OggOpus => "ogg",
            AudioEncoding::Linear16 | AudioEncoding::Mulaw | AudioEncoding::Alaw => "wav",
        }
    }

    /// Whether the provider wraps this encoding in a RIFF/WAVE header.
    pub fn is_wav(&self) -> bool {
        matches!(
            self,
            AudioEncoding::Linear16 | AudioEncoding::Mulaw | AudioEncoding::Alaw
        )
    }
}

/// Voice parameters. All fields have defaults matching a US-English female
/// MP3 narration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// BCP-47 language code. Default: `en-US`.
    pub language_code: String,
    /// Exact voice name (e.g. `en-US-Neural2-F`). Default: provider's choice.
    pub voice_name: Option<String>,
    /// Default: [`VoiceGender::Female`].
    pub gender: VoiceGender,
    /// Default: [`AudioEncoding::Mp3`].
    pub encoding: AudioEncoding,
    /// Speaking rate, 0.25–4.0. Default: 1.0.
    pub speaking_rate: f32,
    /// Pitch in semitones, −20.0–20.0. Default: 0.0.
    pub pitch: f32,
    /// Output sample rate. Default: provider's native rate for the voice.
    pub sample_rate_hertz: Option<u32>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            voice_name: None,
            gender: VoiceGender::default(),
            encoding: AudioEncoding::default(),
            speaking_rate: 1.0,
            pitch: 0.0,
            sample_rate_hertz: None,
        }
    }
}

impl VoiceConfig {
    pub fn validate(&self) -> Result<(), Doc2PodcastError> {
        if self.language_code.trim().is_empty() {
            return Err(Doc2PodcastError::InvalidConfig(
                "language_code must not be empty".into(),
            ));
        }
        if !(0.25..=4.0).contains(&self.speaking_rate) {
            return Err(Doc2PodcastError::InvalidConfig(format!(
                "speaking_rate must be 0.25–4.0, got {}",
                self.speaking_rate
            )));
        }
        if !(-20.0..=20.0).contains(&self.pitch) {
            return Err(Doc2PodcastError::InvalidConfig(format!(
                "pitch must be −20.0–20.0, got {}",
                self.pitch
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let c = PodcastConfig::builder().build().unwrap();
        assert_eq!(c.summary.max_length, 150);
        assert_eq!(c.summary.min_length, 40);
        assert!(c.summary.truncation);
        assert_eq!(c.voice.language_code, "en-US");
        assert_eq!(c.voice.gender, VoiceGender::Female);
        assert_eq!(c.voice.encoding, AudioEncoding::Mp3);
        assert_eq!(c.download_timeout_secs, 120);
    }

    #[test]
    fn min_above_max_is_rejected() {
        let err = PodcastConfig::builder()
            .max_length(20)
            .min_length(30)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("min_length"));
    }

    #[test]
    fn speaking_rate_out_of_range_is_rejected() {
        assert!(PodcastConfig::builder().speaking_rate(5.0).build().is_err());
        assert!(PodcastConfig::builder().speaking_rate(0.25).build().is_ok());
    }

    #[test]
    fn pitch_out_of_range_is_rejected() {
        assert!(PodcastConfig::builder().pitch(-21.0).build().is_err());
    }

    #[test]
    fn tiny_window_is_rejected() {
        assert!(PodcastConfig::builder().max_input_chars(10).build().is_err());
    }

    #[test]
    fn encoding_names() {
        assert_eq!(AudioEncoding::OggOpus.as_api_name(), "OGG_OPUS");
        assert_eq!(AudioEncoding::Mulaw.extension(), "wav");
        assert!(AudioEncoding::Alaw.is_wav());
        assert!(!AudioEncoding::Mp3.is_wav());
    }

    #[test]
    fn debug_hides_callback() {
        let c = PodcastConfig::builder()
            .progress_callback(std::sync::Arc::new(crate::progress::NoopProgressCallback))
            .build()
            .unwrap();
        assert!(format!("{c:?}").contains("<dyn ConversionProgressCallback>"));
    }
}
