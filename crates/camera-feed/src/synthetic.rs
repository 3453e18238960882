//! Synthetic frame source for tests and headless runs

use std::time::Instant;

use tracing::{debug, info};

use crate::frame::VideoFrame;
use crate::{CameraConstraints, CameraError, FrameSource};

/// Frame source that generates flat gray frames.
///
/// Stands in for a real webcam; can be told to simulate a device
/// disconnect after a fixed number of grabs.
pub struct SyntheticCamera {
    constraints: CameraConstraints,
    opened_at: Option<Instant>,
    sequence: u32,
    /// Grab fails with `Disconnected` once the sequence passes this
    fail_after: Option<u32>,
    /// Whether open() should be refused (permission denied simulation)
    deny_access: bool,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self {
            constraints: CameraConstraints::default(),
            opened_at: None,
            sequence: 0,
            fail_after: None,
            deny_access: false,
        }
    }

    /// Simulate the device going away after `n` successful grabs.
    pub fn fail_after(mut self, n: u32) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Simulate the operator refusing camera access.
    pub fn deny_access(mut self) -> Self {
        self.deny_access = true;
        self
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for SyntheticCamera {
    fn open(&mut self, constraints: &CameraConstraints) -> Result<(), CameraError> {
        if self.deny_access {
            return Err(CameraError::AccessDenied(
                "synthetic camera configured to deny".to_string(),
            ));
        }
        self.constraints = constraints.clone();
        self.opened_at = Some(Instant::now());
        self.sequence = 0;
        info!(
            width = constraints.width,
            height = constraints.height,
            "synthetic camera opened"
        );
        Ok(())
    }

    fn grab(&mut self) -> Result<VideoFrame, CameraError> {
        let opened_at = self.opened_at.ok_or(CameraError::NotOpen)?;

        if let Some(limit) = self.fail_after {
            if self.sequence >= limit {
                return Err(CameraError::Disconnected);
            }
        }

        let w = self.constraints.width;
        let h = self.constraints.height;
        // Luma varies with the sequence number so frames are distinguishable
        let luma = (self.sequence % 256) as u8;
        let data = vec![luma; (w as usize) * (h as usize) * 3];

        let frame = VideoFrame::new(
            data,
            w,
            h,
            opened_at.elapsed().as_millis() as u64,
            self.sequence,
        )?;
        self.sequence += 1;
        debug!(sequence = frame.sequence, "synthetic frame grabbed");
        Ok(frame)
    }

    fn release(&mut self) {
        if self.opened_at.take().is_some() {
            info!("synthetic camera released");
        }
    }

    fn is_open(&self) -> bool {
        self.opened_at.is_some()
    }
}
