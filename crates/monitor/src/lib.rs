//! Driver State Monitor
//!
//! Maps noisy per-frame classifier output onto a small set of driver
//! states via confidence banding, and tracks transitions between them.
//! Banding is memoryless: a single frame decides the state. Temporal
//! smoothing is intentionally absent.

pub mod state;
pub mod tracker;

pub use state::{evaluate, DriverState, ASLEEP_CONFIDENCE, SLEEPY_CONFIDENCE};
pub use tracker::{StateChange, StateTracker};
