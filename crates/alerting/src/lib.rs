//! Alert Dispatch
//!
//! Converts "driver asleep" events into at most one outbound
//! notification per cooldown window:
//! - atomic throttle-slot reservation (claimed before the async send)
//! - primary channel: HTTP form-relay submission
//! - fallback channel: mail-client compose handoff, fire-and-forget
//! - session-scoped sent-counter, test sends, reachability probe

pub mod attempt;
pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod payload;
pub mod throttle;

pub use attempt::{AlertAttempt, Channel, Outcome};
pub use channel::{FallbackChannel, HttpRelayChannel, LoggingMailClient, PrimaryChannel};
pub use config::AlertConfig;
pub use dispatcher::AlertDispatcher;
pub use payload::{AlertKind, AlertPayload, MailtoMessage};
pub use throttle::{DispatchThrottle, DEFAULT_COOLDOWN};

use thiserror::Error;

/// Dispatch error types
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Required operator fields are missing. User-correctable; no
    /// delivery attempt is recorded.
    #[error("Alert recipient not configured")]
    NotConfigured,

    #[error("Primary channel rejected submission (HTTP {0})")]
    Rejected(u16),

    #[error("Primary channel transport failure: {0}")]
    Transport(String),
}
