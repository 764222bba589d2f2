//! Summarization stage: `ExtractedText` → `SummaryText`.
//!
//! The model itself is an opaque [`SummaryModel`]. This stage owns the
//! parts that must hold whatever the model does:
//!
//! * sources already shorter than `min_length` words skip the model
//! * over-long sources are truncated to the input window (or refused, or
//!   summarized in chunks, depending on [`SummaryConfig`])
//! * every model call runs under `timeout_secs`
//! * the result never exceeds `max_length` words
//!
//! ## Chunked mode
//!
//! [`LongInputPolicy::Chunked`] splits the source into window-sized pieces,
//! summarizes each, and joins the partial summaries with a space. If the
//! joined text still does not fit one window the same map step runs again
//! on it (at most [`MAX_REDUCE_PASSES`] times). One final call then
//! summarizes the joined text.

use crate::config::{LongInputPolicy, SummaryConfig};
use crate::error::SummarizationError;
use crate::output::{ExtractedText, SummaryText};
use crate::pipeline::clean::collapse_whitespace;
use crate::providers::{SummaryModel, SummaryParams};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on chunked map passes before falling back to truncation.
pub const MAX_REDUCE_PASSES: usize = 8;

/// Summarize extracted text with `model` under `config`.
pub async fn summarize(
    model: &dyn SummaryModel,
    text: &ExtractedText,
    config: &SummaryConfig,
) -> Result<SummaryText, SummarizationError> {
    let source = collapse_whitespace(text.as_str());
    let source_words = source.split_whitespace().count();

    // A pass-through summary must still fit max_length, even for an
    // unvalidated config with min_length above it.
    let pass_through_limit = config.min_length.min(config.max_length);
    if source_words <= pass_through_limit {
        info!(
            "Source has {} words (≤ {}); passing through without a model call",
            source_words, pass_through_limit
        );
        return Ok(SummaryText::new(source, false, 0));
    }

    let params = SummaryParams {
        max_length: config.max_length,
        min_length: config.min_length,
    };
    let source_chars = source.chars().count();
    let mut calls = 0usize;
    let mut truncated = false;

    let model_input: String = if source_chars <= config.max_input_chars {
        source
    } else {
        match config.long_input {
            LongInputPolicy::Chunked => {
                let (joined, was_truncated) =
                    reduce_to_window(model, source, &params, config, &mut calls).await?;
                truncated = was_truncated;
                joined
            }
            LongInputPolicy::Truncate if config.truncation => {
                let cut = truncate_to_window(&source, config.max_input_chars);
                info!(
                    "Source truncated from {} to {} chars to fit the model input window",
                    source_chars,
                    cut.chars().count()
                );
                truncated = true;
                cut.to_string()
            }
            LongInputPolicy::Truncate => {
                return Err(SummarizationError::InputTooLong {
                    chars: source_chars,
                    window: config.max_input_chars,
                });
            }
        }
    };

    let raw = call_model(model, &model_input, &params, config.timeout_secs).await?;
    calls += 1;

    let summary = raw.trim();
    if summary.is_empty() {
        return Err(SummarizationError::EmptySummary {
            model: model.name().to_string(),
        });
    }

    let (summary, clamped) = clamp_words(summary, config.max_length);
    if clamped {
        warn!(
            "Model '{}' exceeded max_length {}; summary clamped",
            model.name(),
            config.max_length
        );
    }

    let result = SummaryText::new(summary, truncated, calls);
    info!(
        "Summary: {} words from {} source words ({} model call(s))",
        result.word_count(),
        source_words,
        calls
    );
    Ok(result)
}

/// One model call under the configured time budget.
async fn call_model(
    model: &dyn SummaryModel,
    text: &str,
    params: &SummaryParams,
    timeout_secs: u64,
) -> Result<String, SummarizationError> {
    debug!("Calling '{}' with {} chars", model.name(), text.len());
    match tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        model.summarize(text, params),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(SummarizationError::Timeout { secs: timeout_secs }),
    }
}

/// Map passes until the text fits one window. Returns the joined partial
/// summaries and whether a final truncation was still needed.
async fn reduce_to_window(
    model: &dyn SummaryModel,
    mut text: String,
    params: &SummaryParams,
    config: &SummaryConfig,
    calls: &mut usize,
) -> Result<(String, bool), SummarizationError> {
    let window = config.max_input_chars;
    let mut pass = 0;

    while text.chars().count() > window && pass < MAX_REDUCE_PASSES {
        pass += 1;
        let pieces = split_windows(&text, window);
        info!(
            "Chunked summarization pass {}: {} chunk(s) of ≤ {} chars",
            pass,
            pieces.len(),
            window
        );

        let mut partials = Vec::with_capacity(pieces.len());
        for piece in pieces {
            let partial = call_model(model, piece, params, config.timeout_secs).await?;
            *calls += 1;
            let partial = collapse_whitespace(&partial);
            if !partial.is_empty() {
                partials.push(partial);
            }
        }
        if partials.is_empty() {
            return Err(SummarizationError::EmptySummary {
                model: model.name().to_string(),
            });
        }
        text = partials.join(" ");
    }

    if text.chars().count() > window {
        warn!(
            "Chunked summarization did not converge after {} passes; truncating",
            MAX_REDUCE_PASSES
        );
        let cut = truncate_to_window(&text, window).to_string();
        return Ok((cut, true));
    }
    Ok((text, false))
}

/// The leading `max_chars` characters, backed off to the last whitespace so
/// no word is split. A single word longer than the window is cut hard.
pub fn truncate_to_window(text: &str, max_chars: usize) -> &str {
    let cut = match text.char_indices().nth(max_chars) {
        Some((idx, _)) => idx,
        None => return text,
    };
    let head = &text[..cut];
    let next_is_space = text[cut..].starts_with(char::is_whitespace);
    if next_is_space {
        return head.trim_end();
    }
    match head.rfind(char::is_whitespace) {
        Some(i) if i > 0 => head[..i].trim_end(),
        _ => head,
    }
}

/// Split text into consecutive pieces of at most `window` characters.
pub fn split_windows(text: &str, window: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text.trim();
    while !rest.is_empty() {
        let piece = truncate_to_window(rest, window);
        if piece.is_empty() {
            break;
        }
        pieces.push(piece);
        rest = rest[piece.len()..].trim_start();
    }
    pieces
}

/// Limit text to `max_words` words, preferring to end on a sentence
/// boundary. Returns the text and whether it was shortened.
pub fn clamp_words(text: &str, max_words: usize) -> (String, bool) {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return (text.to_string(), false);
    }

    let budget = &words[..max_words];
    let last_sentence_end = budget.iter().rposition(|w| ends_sentence(w));
    let kept = match last_sentence_end {
        Some(i) => &budget[..=i],
        None => budget,
    };
    (kept.join(" "), true)
}

fn ends_sentence(word: &str) -> bool {
    let trimmed = word.trim_end_matches(['"', '\'', ')', '»', '”', '’']);
    trimmed.ends_with(['.', '!', '?', '…'])
}
