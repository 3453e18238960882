//! Delivery attempt records

use chrono::{DateTime, Utc};
use monitor::DriverState;
use serde::{Deserialize, Serialize};

/// Which delivery path carried the attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    /// HTTP form-relay submission
    Primary,
    /// Mail-client compose handoff
    Fallback,
}

/// What became of the attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Sent,
    Failed,
}

/// One delivery attempt. Transient; feeds the session sent-counter and
/// the event sink, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertAttempt {
    /// Triggering driver state (always `Asleep`)
    pub state: DriverState,
    /// Classifier confidence behind the trigger
    pub confidence: f32,
    pub attempted_at: DateTime<Utc>,
    pub channel: Channel,
    pub outcome: Outcome,
}

impl AlertAttempt {
    pub fn new(confidence: f32, channel: Channel, outcome: Outcome) -> Self {
        Self {
            state: DriverState::Asleep,
            confidence,
            attempted_at: Utc::now(),
            channel,
            outcome,
        }
    }
}
