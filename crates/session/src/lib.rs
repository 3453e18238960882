//! Monitoring Session
//!
//! Owns the start/stop lifecycle and the sampling cadence that turns
//! frames into driver states and asleep transitions into alert
//! evaluations. Data flows capture → classify → band → dispatch;
//! control flows the other way: the session starts and stops the
//! cadence and releases the camera on every exit path.

pub mod controller;
pub mod events;

pub use controller::{SessionConfig, SessionController};
pub use events::SessionEvent;

use std::future::Future;

use alerting::{AlertAttempt, AlertConfig, DispatchError};
use camera_feed::CameraError;
use config_store::StoreError;
use thiserror::Error;

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Config store error: {0}")]
    Store(#[from] StoreError),

    #[error("Session is not active")]
    NotActive,

    #[error("No frame captured yet")]
    NoFrame,

    #[error("Internal state lock poisoned")]
    Poisoned,
}

/// Where asleep transitions go. One call per transition into `Asleep`;
/// the sink itself decides whether anything is actually sent.
pub trait AlertSink: Send + Sync + 'static {
    fn on_asleep(
        &self,
        confidence: f32,
        config: AlertConfig,
    ) -> impl Future<Output = Result<Option<AlertAttempt>, DispatchError>> + Send;
}
