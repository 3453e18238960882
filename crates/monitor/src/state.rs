//! Driver states and confidence banding

use classifier::{ClassificationSample, EyeLabel};
use serde::{Deserialize, Serialize};

/// Confidence above which closed eyes mean the driver is asleep
pub const ASLEEP_CONFIDENCE: f32 = 0.7;

/// Confidence above which closed eyes mean the driver is sleepy
pub const SLEEPY_CONFIDENCE: f32 = 0.4;

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriverState {
    Awake,
    Sleepy,
    Asleep,
    #[default]
    Unknown,
}

/// Band a single sample into a driver state.
///
/// Thresholds are strict: a closed-eyes sample at exactly 0.7 is
/// `Sleepy`, at exactly 0.4 is `Awake`.
pub fn evaluate(sample: &ClassificationSample) -> DriverState {
    match sample.label {
        EyeLabel::EyesClosed if sample.confidence > ASLEEP_CONFIDENCE => DriverState::Asleep,
        EyeLabel::EyesClosed if sample.confidence > SLEEPY_CONFIDENCE => DriverState::Sleepy,
        _ => DriverState::Awake,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Instant;

    fn sample(label: EyeLabel, confidence: f32) -> ClassificationSample {
        ClassificationSample {
            label,
            confidence,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn banding_boundaries_are_strict() {
        assert_eq!(
            evaluate(&sample(EyeLabel::EyesClosed, 0.7)),
            DriverState::Sleepy
        );
        assert_eq!(
            evaluate(&sample(EyeLabel::EyesClosed, 0.4)),
            DriverState::Awake
        );
    }

    #[test]
    fn open_eyes_are_awake_at_any_confidence() {
        assert_eq!(
            evaluate(&sample(EyeLabel::EyesOpen, 0.99)),
            DriverState::Awake
        );
        assert_eq!(
            evaluate(&sample(EyeLabel::EyesOpen, 0.01)),
            DriverState::Awake
        );
    }

    proptest! {
        #[test]
        fn closed_above_asleep_threshold_is_asleep(c in 0.701f32..=1.0) {
            prop_assert_eq!(
                evaluate(&sample(EyeLabel::EyesClosed, c)),
                DriverState::Asleep
            );
        }

        #[test]
        fn closed_in_middle_band_is_sleepy(c in 0.401f32..=0.7) {
            prop_assert_eq!(
                evaluate(&sample(EyeLabel::EyesClosed, c)),
                DriverState::Sleepy
            );
        }

        #[test]
        fn closed_below_sleepy_threshold_is_awake(c in 0.0f32..=0.4) {
            prop_assert_eq!(
                evaluate(&sample(EyeLabel::EyesClosed, c)),
                DriverState::Awake
            );
        }

        #[test]
        fn open_is_always_awake(c in 0.0f32..=1.0) {
            prop_assert_eq!(
                evaluate(&sample(EyeLabel::EyesOpen, c)),
                DriverState::Awake
            );
        }
    }
}
