//! Speech stage: `SummaryText` → `AudioArtifact`.
//!
//! The summary is flattened to plain prose, split into request-sized chunks
//! and sent to the [`SpeechProvider`] one chunk at a time, in order. The
//! per-chunk audio is joined by [`audio::concat`].
//!
//! ## Chunking
//!
//! [`chunk_text`] packs whole sentences (Unicode sentence boundaries) into
//! chunks of at most `max_bytes` UTF-8 bytes. A sentence that is too long on
//! its own is split at word boundaries, and a single over-long "word" at
//! character boundaries. Chunks are contiguous slices of the input, so
//! concatenating them gives the input back byte for byte.

use crate::config::VoiceConfig;
use crate::error::SynthesisError;
use crate::output::{AudioArtifact, SummaryText};
use crate::pipeline::audio;
use crate::pipeline::clean::prepare_for_speech;
use crate::progress::ProgressCallback;
use crate::providers::SpeechProvider;
use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

/// Synthesize a summary into a single audio artifact.
pub async fn synthesize(
    provider: &dyn SpeechProvider,
    summary: &SummaryText,
    voice: &VoiceConfig,
    progress: Option<&ProgressCallback>,
) -> Result<AudioArtifact, SynthesisError> {
    let text = prepare_for_speech(summary.as_str());
    if text.is_empty() {
        return Err(SynthesisError::EmptyInput);
    }

    let chunks: Vec<&str> = chunk_text(&text, provider.max_request_bytes())
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    let total = chunks.len();
    info!(
        "Synthesizing {} bytes of text in {} request(s) via '{}'",
        text.len(),
        total,
        provider.name()
    );

    let mut parts = Vec::with_capacity(total);
    for (i, chunk) in chunks.iter().enumerate() {
        let audio = provider.synthesize(chunk, voice).await?;
        if audio.is_empty() {
            return Err(SynthesisError::InvalidResponse {
                provider: provider.name().to_string(),
                detail: format!("empty audio for chunk {}/{}", i + 1, total),
            });
        }
        debug!("Chunk {}/{}: {} bytes of audio", i + 1, total, audio.len());
        parts.push(audio);
        if let Some(cb) = progress {
            cb.on_chunk_synthesized(i + 1, total);
        }
    }

    let bytes = audio::concat(voice.encoding, parts)?;
    Ok(AudioArtifact::new(bytes, voice.encoding, total))
}

/// Split `text` into contiguous chunks of at most `max_bytes` bytes.
pub fn chunk_text(text: &str, max_bytes: usize) -> Vec<&str> {
    let max_bytes = max_bytes.max(4);
    if text.len() <= max_bytes {
        return if text.is_empty() { Vec::new() } else { vec![text] };
    }

    let mut atoms: Vec<&str> = Vec::new();
    for sentence in text.split_sentence_bounds() {
        if sentence.len() <= max_bytes {
            atoms.push(sentence);
            continue;
        }
        for word in sentence.split_word_bounds() {
            if word.len() <= max_bytes {
                atoms.push(word);
            } else {
                atoms.extend(split_at_chars(word, max_bytes));
            }
        }
    }

    // Atoms tile the input, so chunks are byte ranges over it.
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut end = 0;
    for atom in atoms {
        if end > start && end - start + atom.len() > max_bytes {
            chunks.push(&text[start..end]);
            start = end;
        }
        end += atom.len();
    }
    if end > start {
        chunks.push(&text[start..end]);
    }
    chunks
}

fn split_at_chars(s: &str, max_bytes: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, ch) in s.char_indices() {
        if idx + ch.len_utf8() - start > max_bytes {
            pieces.push(&s[start..idx]);
            start = idx;
        }
    }
    if start < s.len() {
        pieces.push(&s[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("Hello there.", 100), vec!["Hello there."]);
        assert!(chunk_text("", 100).is_empty());
    }

    #[test]
    fn splits_at_sentence_boundaries() {
        let text = "First sentence here. Second one follows. Third closes it.";
        let chunks = chunk_text(text, 42);
        assert_eq!(
            chunks,
            vec!["First sentence here. Second one follows. ", "Third closes it."]
        );
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn long_sentence_falls_back_to_words() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let chunks = chunk_text(text, 12);
        assert!(chunks.iter().all(|c| c.len() <= 12), "{chunks:?}");
        assert_eq!(chunks.concat(), text);
        // no word is cut in half
        for chunk in &chunks {
            for word in chunk.split_whitespace() {
                assert!(text.split_whitespace().any(|w| w == word), "{word}");
            }
        }
    }

    #[test]
    fn giant_word_falls_back_to_chars() {
        let text = "ééééééééé";
        let chunks = chunk_text(text, 4);
        assert!(chunks.iter().all(|c| c.len() <= 4), "{chunks:?}");
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn chunks_reproduce_input_exactly() {
        let text = "Revenue grew 12% in 2024. Costs fell! Did margins improve? \
Yes: they rose to 18%, the best result in a decade.";
        for max in [8, 16, 30, 64, 5000] {
            let chunks = chunk_text(text, max);
            assert_eq!(chunks.concat(), text, "max {max}");
            assert!(chunks.iter().all(|c| c.len() <= max.max(4)), "max {max}");
        }
    }
}
