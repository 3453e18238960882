//! Eye-State Classifier Capability
//!
//! Wraps an opaque image classifier behind a stable contract:
//! - `EyeClassifier` trait: frame in, ranked predictions out
//! - `SampleAdapter`: reduces raw predictions to one
//!   `ClassificationSample` per tick (or none)
//! - `ScriptedClassifier`: deterministic fake for tests and demos

pub mod adapter;
pub mod scripted;

pub use adapter::{LabelMap, SampleAdapter};
pub use scripted::ScriptedClassifier;

use std::future::Future;
use std::time::Instant;

use camera_feed::VideoFrame;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classifier error types
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Model not ready")]
    NotReady,

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Eye state label after adapter mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EyeLabel {
    EyesOpen,
    EyesClosed,
}

/// Raw prediction as reported by the external classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Classifier-specific class name
    pub label: String,
    /// Class probability in [0, 1]
    pub probability: f32,
}

/// One classification sample, produced once per sampling tick and
/// consumed immediately. Never retained across ticks.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationSample {
    pub label: EyeLabel,
    pub confidence: f32,
    pub captured_at: Instant,
}

/// The opaque classifier capability.
///
/// Implementations report ranked predictions; only index 0 is consumed
/// downstream. An empty result means "no sample this tick".
pub trait EyeClassifier: Send + Sync {
    fn classify(
        &self,
        frame: &VideoFrame,
    ) -> impl Future<Output = Result<Vec<Prediction>, ClassifierError>> + Send;
}
