//! Events exposed to the presentation layer

use alerting::AlertAttempt;
use monitor::DriverState;
use uuid::Uuid;

/// Lifecycle and monitoring events, fanned out over a broadcast
/// channel. The core never renders; consumers do.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Started {
        session_id: Uuid,
    },
    Stopped {
        session_id: Uuid,
    },
    StateChanged {
        previous: DriverState,
        current: DriverState,
        confidence: Option<f32>,
    },
    AlertAttempted(AlertAttempt),
    /// Informational status text (backgrounding, configuration
    /// problems, camera trouble). Never fatal.
    Notice(String),
}
