//! Dispatch rate gate
//!
//! The gate is a slot reservation, not a check-then-update: the caller
//! claims the slot synchronously before issuing the async send, so two
//! overlapping ticks can never both pass the gate. The slot is never
//! rolled back on send outcome, only on a failed gate-side precondition.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

/// Minimum spacing between two real dispatch attempts
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(10);

/// Proof that the slot was claimed. Hand it back via `roll_back` if a
/// precondition fails before the send starts.
#[derive(Debug)]
pub struct Reservation {
    prior: Option<Instant>,
}

/// Single-writer rate-limit clock
pub struct DispatchThrottle {
    cooldown: Duration,
    last_attempt_at: Mutex<Option<Instant>>,
}

impl DispatchThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_attempt_at: Mutex::new(None),
        }
    }

    /// Claim the dispatch slot if the cooldown has elapsed since the
    /// last *attempted* send. Claiming stamps the clock immediately.
    pub fn try_reserve(&self) -> Option<Reservation> {
        let mut last = self
            .last_attempt_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(at) = *last {
            let elapsed = at.elapsed();
            if elapsed < self.cooldown {
                debug!(
                    remaining_ms = (self.cooldown - elapsed).as_millis() as u64,
                    "throttle slot unavailable"
                );
                return None;
            }
        }

        let prior = last.replace(Instant::now());
        Some(Reservation { prior })
    }

    /// Undo a reservation after a gate-side precondition failure, so a
    /// corrected retry is not starved by the failed claim.
    pub fn roll_back(&self, reservation: Reservation) {
        let mut last = self
            .last_attempt_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = reservation.prior;
    }

    /// Shift the stamped clock into the past, so expiry paths can be
    /// exercised without real waiting.
    #[cfg(test)]
    pub(crate) fn backdate(&self, by: Duration) {
        let mut last = self
            .last_attempt_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(at) = last.as_mut() {
            *at -= by;
        }
    }
}

impl Default for DispatchThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
