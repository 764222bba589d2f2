//! Progress-callback trait for per-stage conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::PodcastConfigBuilder::progress_callback`] to follow a
//! conversion as it moves through `Received → Extracted → Summarized →
//! Synthesized → Delivered`.
//!
//! # Example
//!
//! ```rust
//! use doc2podcast::{ConversionProgressCallback, ConversionState, PodcastConfig};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Recorder {
//!     states: Mutex<Vec<ConversionState>>,
//! }
//!
//! impl ConversionProgressCallback for Recorder {
//!     fn on_state(&self, state: ConversionState) {
//!         self.states.lock().unwrap().push(state);
//!     }
//! }
//!
//! let config = PodcastConfig::builder()
//!     .progress_callback(Arc::new(Recorder::default()))
//!     .build()
//!     .unwrap();
//! ```

use crate::error::PipelineStage;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Position of a conversion in the linear state machine.
///
/// `Failed` is not a variant here: failures are reported through
/// [`ConversionProgressCallback::on_failed`] together with the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConversionState {
    Received,
    Extracted,
    Summarized,
    Synthesized,
    Delivered,
}

impl ConversionState {
    /// The stage that runs when leaving this state, if any.
    pub fn next_stage(&self) -> Option<PipelineStage> {
        match self {
            ConversionState::Received => Some(PipelineStage::Extraction),
            ConversionState::Extracted => Some(PipelineStage::Summarization),
            ConversionState::Summarized => Some(PipelineStage::Synthesis),
            ConversionState::Synthesized | ConversionState::Delivered => None,
        }
    }
}

impl fmt::Display for ConversionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConversionState::Received => "received",
            ConversionState::Extracted => "extracted",
            ConversionState::Summarized => "summarized",
            ConversionState::Synthesized => "synthesized",
            ConversionState::Delivered => "delivered",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline as a conversion advances.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called on entering each state, starting with `Received`.
    fn on_state(&self, state: ConversionState) {
        let _ = state;
    }

    /// Called just before a stage starts work.
    fn on_stage_start(&self, stage: PipelineStage) {
        let _ = stage;
    }

    /// Called after each synthesized chunk.
    ///
    /// # Arguments
    /// * `index`: 1-indexed chunk number
    /// * `total`: number of chunks for this summary
    fn on_chunk_synthesized(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called once when a stage fails. No further events follow.
    fn on_failed(&self, stage: PipelineStage, error: &str) {
        let _ = (stage, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PodcastConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
