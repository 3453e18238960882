//! Prediction-to-sample adapter

use std::time::Instant;

use camera_feed::VideoFrame;
use tracing::{debug, warn};

use crate::{ClassificationSample, ClassifierError, EyeClassifier, EyeLabel, Prediction};

/// Label names the adapter recognizes. Classifiers name their classes
/// freely; the adapter maps them onto `EyeLabel`.
#[derive(Debug, Clone)]
pub struct LabelMap {
    pub eyes_open: String,
    pub eyes_closed: String,
}

impl Default for LabelMap {
    fn default() -> Self {
        Self {
            eyes_open: "eyes_open".to_string(),
            eyes_closed: "eyes_closed".to_string(),
        }
    }
}

/// Reduces raw classifier output to at most one sample per tick.
///
/// Only the top-ranked prediction is consumed; an empty result or an
/// unrecognized label yields no sample.
pub struct SampleAdapter<C: EyeClassifier> {
    inner: C,
    labels: LabelMap,
}

impl<C: EyeClassifier> SampleAdapter<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            labels: LabelMap::default(),
        }
    }

    pub fn with_labels(inner: C, labels: LabelMap) -> Self {
        Self { inner, labels }
    }

    /// Run the classifier on a frame and reduce to one sample.
    pub async fn sample(
        &self,
        frame: &VideoFrame,
    ) -> Result<Option<ClassificationSample>, ClassifierError> {
        let predictions = self.inner.classify(frame).await?;
        Ok(self.reduce(&predictions))
    }

    fn reduce(&self, predictions: &[Prediction]) -> Option<ClassificationSample> {
        let top = match predictions.first() {
            Some(p) => p,
            None => {
                debug!("classifier returned no predictions, skipping tick");
                return None;
            }
        };

        let label = if top.label == self.labels.eyes_closed {
            EyeLabel::EyesClosed
        } else if top.label == self.labels.eyes_open {
            EyeLabel::EyesOpen
        } else {
            warn!(label = %top.label, "unrecognized classifier label, skipping tick");
            return None;
        };

        Some(ClassificationSample {
            label,
            confidence: top.probability.clamp(0.0, 1.0),
            captured_at: Instant::now(),
        })
    }
}
