//! Deterministic classifier fake

use std::sync::Mutex;

use camera_feed::VideoFrame;

use crate::{ClassifierError, EyeClassifier, Prediction};

/// Classifier that replays a fixed script of prediction sets, cycling
/// when the script runs out. Deterministic stand-in for the real model.
pub struct ScriptedClassifier {
    script: Vec<Vec<Prediction>>,
    cursor: Mutex<usize>,
}

impl ScriptedClassifier {
    /// Replay the given prediction sets in order, then cycle.
    pub fn replay(script: Vec<Vec<Prediction>>) -> Self {
        Self {
            script,
            cursor: Mutex::new(0),
        }
    }

    /// Always report a single prediction with the given label and
    /// probability.
    pub fn always(label: &str, probability: f32) -> Self {
        Self::replay(vec![vec![Prediction {
            label: label.to_string(),
            probability,
        }]])
    }
}

impl EyeClassifier for ScriptedClassifier {
    async fn classify(&self, _frame: &VideoFrame) -> Result<Vec<Prediction>, ClassifierError> {
        if self.script.is_empty() {
            return Err(ClassifierError::NotReady);
        }
        let mut cursor = self
            .cursor
            .lock()
            .map_err(|e| ClassifierError::Inference(format!("script lock poisoned: {e}")))?;
        let predictions = self.script[*cursor % self.script.len()].clone();
        *cursor += 1;
        Ok(predictions)
    }
}
