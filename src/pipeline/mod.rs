//! Pipeline stages for document-to-podcast conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap backends (another summarizer, another TTS vendor) without touching
//! the other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ summarize ──▶ speech ──▶ audio
//! (path/URL) (pdf/word)  (model)      (TTS)      (concat)
//! ```
//!
//! 1. [`input`]    : read a local file or download a URL into a `RawDocument`
//! 2. [`extract`]  : sniff the content and dispatch to [`pdf`] / [`word`] /
//!    plain-text decoding, then normalise with [`clean`]
//! 3. [`summarize`]: window handling, model call(s) under a timeout, length
//!    clamping
//! 4. [`speech`]   : flatten to prose, chunk to the provider's request limit,
//!    synthesize in order
//! 5. [`audio`]    : join per-chunk audio into one valid file

pub mod audio;
pub mod clean;
pub mod extract;
pub mod input;
pub mod pdf;
pub mod speech;
pub mod summarize;
pub mod word;
