//! Transition tracking over banded states

use classifier::ClassificationSample;
use tracing::debug;

use crate::state::{evaluate, DriverState};

/// Result of feeding one tick's sample into the tracker
#[derive(Debug, Clone, Copy)]
pub struct StateChange {
    pub previous: DriverState,
    pub current: DriverState,
    /// Confidence of the sample that produced this state, if any
    pub confidence: Option<f32>,
}

impl StateChange {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }

    /// True exactly when this tick transitioned into `Asleep`. The
    /// session forwards each such transition as one alert evaluation.
    pub fn entered_asleep(&self) -> bool {
        self.changed() && self.current == DriverState::Asleep
    }
}

/// Holds the one current driver state and reports transitions.
///
/// Starts `Unknown`; stays put on ticks without a sample.
#[derive(Debug, Default)]
pub struct StateTracker {
    current: DriverState,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> DriverState {
        self.current
    }

    /// Feed one tick's sample (or lack of one).
    pub fn observe(&mut self, sample: Option<&ClassificationSample>) -> StateChange {
        let previous = self.current;
        let (current, confidence) = match sample {
            Some(s) => (evaluate(s), Some(s.confidence)),
            // Classifier unavailable this tick: hold the current state
            None => (previous, None),
        };
        self.current = current;
        if previous != current {
            debug!(?previous, ?current, "driver state changed");
        }
        StateChange {
            previous,
            current,
            confidence,
        }
    }

    /// Force the state to `Unknown` after a runtime fault, reporting
    /// the change like a regular tick would.
    pub fn degrade(&mut self) -> StateChange {
        let previous = self.current;
        self.current = DriverState::Unknown;
        StateChange {
            previous,
            current: DriverState::Unknown,
            confidence: None,
        }
    }

    /// Reset to the initial state (session stop).
    pub fn reset(&mut self) {
        self.current = DriverState::Unknown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classifier::EyeLabel;
    use std::time::Instant;

    fn closed(confidence: f32) -> ClassificationSample {
        ClassificationSample {
            label: EyeLabel::EyesClosed,
            confidence,
            captured_at: Instant::now(),
        }
    }

    fn open(confidence: f32) -> ClassificationSample {
        ClassificationSample {
            label: EyeLabel::EyesOpen,
            confidence,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn starts_unknown() {
        let tracker = StateTracker::new();
        assert_eq!(tracker.current(), DriverState::Unknown);
    }

    #[test]
    fn entered_asleep_fires_once_per_transition() {
        let mut tracker = StateTracker::new();

        let first = tracker.observe(Some(&closed(0.8)));
        assert!(first.entered_asleep());

        // Staying asleep is not a new transition
        let second = tracker.observe(Some(&closed(0.9)));
        assert!(!second.entered_asleep());
        assert_eq!(second.current, DriverState::Asleep);

        // Wake up, then fall asleep again: fires again
        tracker.observe(Some(&open(0.9)));
        let third = tracker.observe(Some(&closed(0.85)));
        assert!(third.entered_asleep());
    }

    #[test]
    fn missing_sample_holds_state() {
        let mut tracker = StateTracker::new();
        tracker.observe(Some(&open(0.9)));

        let change = tracker.observe(None);
        assert!(!change.changed());
        assert_eq!(change.current, DriverState::Awake);
        assert_eq!(change.confidence, None);
    }

    #[test]
    fn missing_sample_before_first_classification_stays_unknown() {
        let mut tracker = StateTracker::new();
        let change = tracker.observe(None);
        assert_eq!(change.current, DriverState::Unknown);
        assert!(!change.changed());
    }

    #[test]
    fn degrade_reports_transition_to_unknown() {
        let mut tracker = StateTracker::new();
        tracker.observe(Some(&open(0.9)));

        let change = tracker.degrade();
        assert!(change.changed());
        assert_eq!(change.current, DriverState::Unknown);

        // Recovery on the next good sample
        let next = tracker.observe(Some(&closed(0.8)));
        assert!(next.entered_asleep());
    }

    #[test]
    fn reset_returns_to_unknown() {
        let mut tracker = StateTracker::new();
        tracker.observe(Some(&closed(0.8)));
        tracker.reset();
        assert_eq!(tracker.current(), DriverState::Unknown);
    }
}
