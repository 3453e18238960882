//! Camera Feed Capability
//!
//! Frame acquisition for the drowsiness monitor:
//! - Camera constraints (resolution, facing mode)
//! - `FrameSource` trait owned exclusively by the session between
//!   start and stop
//! - Synthetic frame source for tests and headless demo runs

pub mod frame;
pub mod synthetic;

pub use frame::VideoFrame;
pub use synthetic::SyntheticCamera;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Camera access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid frame data: {0}")]
    Format(String),

    #[error("Camera disconnected")]
    Disconnected,

    #[error("Camera not open")]
    NotOpen,
}

/// Which way the camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacingMode {
    /// Operator-facing (selfie) camera
    User,
    /// World-facing camera
    Environment,
}

/// Capture constraints requested when opening the camera
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConstraints {
    /// Requested capture width
    pub width: u32,
    /// Requested capture height
    pub height: u32,
    /// Requested facing mode
    pub facing: FacingMode,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            facing: FacingMode::User,
        }
    }
}

/// A live frame source.
///
/// The session controller holds the source exclusively between `start()`
/// and `stop()` and must call `release()` on every exit path.
pub trait FrameSource: Send {
    /// Acquire the device with the given constraints.
    fn open(&mut self, constraints: &CameraConstraints) -> Result<(), CameraError>;

    /// Grab the next frame. Fails if the source is not open or the
    /// device went away.
    fn grab(&mut self) -> Result<VideoFrame, CameraError>;

    /// Release the device. Idempotent.
    fn release(&mut self);

    /// Whether the device is currently held.
    fn is_open(&self) -> bool;
}
