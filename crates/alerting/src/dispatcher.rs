//! The alert dispatcher

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::attempt::{AlertAttempt, Channel, Outcome};
use crate::channel::{FallbackChannel, PrimaryChannel};
use crate::config::AlertConfig;
use crate::payload::{AlertKind, AlertPayload, MailtoMessage};
use crate::throttle::DispatchThrottle;
use crate::DispatchError;

/// Owns the notification-sending protocol: rate limiting, channel
/// precedence, and sent-count accounting.
///
/// At most one real dispatch begins per cooldown window. The throttle
/// slot is claimed synchronously before any network I/O, so overlapping
/// asleep events from adjacent ticks cannot race past the gate.
pub struct AlertDispatcher<P, F> {
    primary: P,
    fallback: F,
    throttle: DispatchThrottle,
    sent_count: AtomicU32,
}

impl<P: PrimaryChannel, F: FallbackChannel> AlertDispatcher<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self {
            primary,
            fallback,
            throttle: DispatchThrottle::default(),
            sent_count: AtomicU32::new(0),
        }
    }

    pub fn with_cooldown(primary: P, fallback: F, cooldown: Duration) -> Self {
        Self {
            primary,
            fallback,
            throttle: DispatchThrottle::new(cooldown),
            sent_count: AtomicU32::new(0),
        }
    }

    /// Handle one asleep event.
    ///
    /// Returns `Ok(None)` when the cooldown gate suppresses the event
    /// (intentional backpressure, not an error), `Ok(Some(attempt))`
    /// for a delivery, and `Err(NotConfigured)` when the operator has
    /// not entered the required fields.
    pub async fn dispatch(
        &self,
        confidence: f32,
        config: &AlertConfig,
    ) -> Result<Option<AlertAttempt>, DispatchError> {
        let reservation = match self.throttle.try_reserve() {
            Some(r) => r,
            None => {
                debug!("asleep event suppressed by cooldown gate");
                return Ok(None);
            }
        };

        if let Err(e) = config.validate() {
            // Release the claimed slot so a corrected dispatch is not
            // starved by this precondition failure.
            self.throttle.roll_back(reservation);
            return Err(e);
        }

        Ok(Some(
            self.deliver(confidence, AlertKind::Drowsiness, config).await,
        ))
    }

    /// Manual test send. Reuses the full delivery pipeline but never
    /// touches the throttle clock: a real asleep event right after a
    /// test is still judged against the pre-test timestamps.
    pub async fn send_test(&self, config: &AlertConfig) -> Result<AlertAttempt, DispatchError> {
        config.validate()?;
        Ok(self.deliver(1.0, AlertKind::Test, config).await)
    }

    /// Probe primary-channel reachability. No counter or throttle
    /// side effects.
    pub async fn probe_primary(&self) -> Result<(), DispatchError> {
        self.primary.probe().await
    }

    /// Notifications sent this session (either channel).
    pub fn sent_count(&self) -> u32 {
        self.sent_count.load(Ordering::Relaxed)
    }

    /// Run the two-channel delivery protocol. Infallible once the
    /// configuration precondition holds: a primary failure degrades to
    /// the fallback handoff, which has no observable failure path.
    async fn deliver(&self, confidence: f32, kind: AlertKind, config: &AlertConfig) -> AlertAttempt {
        let payload = AlertPayload::new(config, confidence, kind);

        match self.primary.submit(&config.email_address, &payload).await {
            Ok(()) => {
                let attempt = AlertAttempt::new(confidence, Channel::Primary, Outcome::Sent);
                self.sent_count.fetch_add(1, Ordering::Relaxed);
                info!(
                    recipient = %config.email_address,
                    confidence_pct = payload.confidence_pct,
                    "alert delivered via form relay"
                );
                attempt
            }
            Err(e) => {
                let failed = AlertAttempt::new(confidence, Channel::Primary, Outcome::Failed);
                warn!(
                    error = %e,
                    attempted_at = %failed.attempted_at,
                    "primary delivery failed, handing off to mail client"
                );

                let message = MailtoMessage::from_payload(&config.email_address, &payload);
                self.fallback.open_compose(&message);
                // Invoking the handoff is the send: the fallback offers
                // no delivery confirmation.
                self.sent_count.fetch_add(1, Ordering::Relaxed);
                AlertAttempt::new(confidence, Channel::Fallback, Outcome::Sent)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicU32;
    use std::sync::Mutex;

    struct FakePrimary {
        /// Scripted submit outcomes, oldest first; empty means succeed
        outcomes: Mutex<VecDeque<Result<(), DispatchError>>>,
        submits: AtomicU32,
        probes: AtomicU32,
    }

    impl FakePrimary {
        fn succeeding() -> Self {
            Self {
                outcomes: Mutex::new(VecDeque::new()),
                submits: AtomicU32::new(0),
                probes: AtomicU32::new(0),
            }
        }

        fn scripted(outcomes: Vec<Result<(), DispatchError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                submits: AtomicU32::new(0),
                probes: AtomicU32::new(0),
            }
        }

        fn submit_count(&self) -> u32 {
            self.submits.load(Ordering::Relaxed)
        }
    }

    impl PrimaryChannel for &FakePrimary {
        async fn submit(
            &self,
            _recipient: &str,
            _payload: &AlertPayload,
        ) -> Result<(), DispatchError> {
            self.submits.fetch_add(1, Ordering::Relaxed);
            self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }

        async fn probe(&self) -> Result<(), DispatchError> {
            self.probes.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingFallback {
        opened: Mutex<Vec<MailtoMessage>>,
    }

    impl RecordingFallback {
        fn open_count(&self) -> usize {
            self.opened.lock().unwrap().len()
        }
    }

    impl FallbackChannel for &RecordingFallback {
        fn open_compose(&self, message: &MailtoMessage) {
            self.opened.lock().unwrap().push(message.clone());
        }
    }

    fn config() -> AlertConfig {
        AlertConfig::new("dispatch@fleet.example", "Dana").with_vehicle("Truck 7")
    }

    #[tokio::test]
    async fn primary_success_records_one_attempt() {
        let primary = FakePrimary::succeeding();
        let fallback = RecordingFallback::default();
        let dispatcher = AlertDispatcher::new(&primary, &fallback);

        let attempt = dispatcher.dispatch(0.8, &config()).await.unwrap().unwrap();
        assert_eq!(attempt.channel, Channel::Primary);
        assert_eq!(attempt.outcome, Outcome::Sent);
        assert_eq!(dispatcher.sent_count(), 1);
        assert_eq!(fallback.open_count(), 0);
    }

    #[tokio::test]
    async fn primary_failure_falls_back_and_counts_once() {
        let primary = FakePrimary::scripted(vec![Err(DispatchError::Rejected(500))]);
        let fallback = RecordingFallback::default();
        let dispatcher = AlertDispatcher::new(&primary, &fallback);

        let attempt = dispatcher.dispatch(0.9, &config()).await.unwrap().unwrap();
        assert_eq!(attempt.channel, Channel::Fallback);
        assert_eq!(attempt.outcome, Outcome::Sent);
        // Exactly one increment for the whole pipeline, not two
        assert_eq!(dispatcher.sent_count(), 1);
        assert_eq!(fallback.open_count(), 1);
        assert_eq!(primary.submit_count(), 1);
    }

    #[tokio::test]
    async fn transport_fault_also_falls_back() {
        let primary = FakePrimary::scripted(vec![Err(DispatchError::Transport(
            "connection refused".to_string(),
        ))]);
        let fallback = RecordingFallback::default();
        let dispatcher = AlertDispatcher::new(&primary, &fallback);

        let attempt = dispatcher.dispatch(0.75, &config()).await.unwrap().unwrap();
        assert_eq!(attempt.channel, Channel::Fallback);
        assert_eq!(fallback.open_count(), 1);
    }

    #[tokio::test]
    async fn second_event_inside_cooldown_is_suppressed() {
        let primary = FakePrimary::succeeding();
        let fallback = RecordingFallback::default();
        let dispatcher = AlertDispatcher::new(&primary, &fallback);

        assert!(dispatcher.dispatch(0.8, &config()).await.unwrap().is_some());
        assert!(dispatcher.dispatch(0.9, &config()).await.unwrap().is_none());
        assert_eq!(dispatcher.sent_count(), 1);
        assert_eq!(primary.submit_count(), 1);
    }

    #[tokio::test]
    async fn gate_reopens_after_cooldown() {
        let primary = FakePrimary::succeeding();
        let fallback = RecordingFallback::default();
        let dispatcher =
            AlertDispatcher::with_cooldown(&primary, &fallback, Duration::from_secs(10));

        assert!(dispatcher.dispatch(0.8, &config()).await.unwrap().is_some());
        assert!(dispatcher.dispatch(0.9, &config()).await.unwrap().is_none());

        dispatcher.throttle.backdate(Duration::from_secs(11));
        assert!(dispatcher.dispatch(0.8, &config()).await.unwrap().is_some());
        assert_eq!(dispatcher.sent_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_events_yield_one_attempt() {
        let primary = FakePrimary::succeeding();
        let fallback = RecordingFallback::default();
        let dispatcher = AlertDispatcher::new(&primary, &fallback);
        let cfg = config();

        let (a, b) = tokio::join!(dispatcher.dispatch(0.8, &cfg), dispatcher.dispatch(0.9, &cfg));
        let attempts = a.unwrap().into_iter().chain(b.unwrap()).count();
        assert_eq!(attempts, 1);
        assert_eq!(dispatcher.sent_count(), 1);
    }

    #[tokio::test]
    async fn missing_configuration_is_a_precondition_failure() {
        let primary = FakePrimary::succeeding();
        let fallback = RecordingFallback::default();
        let dispatcher = AlertDispatcher::new(&primary, &fallback);

        let result = dispatcher.dispatch(0.8, &AlertConfig::default()).await;
        assert!(matches!(result, Err(DispatchError::NotConfigured)));
        assert_eq!(dispatcher.sent_count(), 0);
        assert_eq!(primary.submit_count(), 0);

        // The failed precondition released the throttle slot: a
        // configured dispatch right after goes through
        let attempt = dispatcher.dispatch(0.8, &config()).await.unwrap();
        assert!(attempt.is_some());
    }

    #[tokio::test]
    async fn test_send_bypasses_gate_and_leaves_clock_untouched() {
        let primary = FakePrimary::succeeding();
        let fallback = RecordingFallback::default();
        let dispatcher = AlertDispatcher::new(&primary, &fallback);
        let cfg = config();

        // Real dispatch stamps the clock
        assert!(dispatcher.dispatch(0.8, &cfg).await.unwrap().is_some());

        // Test send goes through despite the cooldown
        let test_attempt = dispatcher.send_test(&cfg).await.unwrap();
        assert_eq!(test_attempt.outcome, Outcome::Sent);
        assert_eq!(dispatcher.sent_count(), 2);

        // The test did not reset the clock: a real event is still gated
        // by the pre-test dispatch
        assert!(dispatcher.dispatch(0.9, &cfg).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_requires_configuration() {
        let primary = FakePrimary::succeeding();
        let fallback = RecordingFallback::default();
        let dispatcher = AlertDispatcher::new(&primary, &fallback);

        let result = dispatcher.send_test(&AlertConfig::default()).await;
        assert!(matches!(result, Err(DispatchError::NotConfigured)));
    }

    #[tokio::test]
    async fn probe_has_no_side_effects() {
        let primary = FakePrimary::succeeding();
        let fallback = RecordingFallback::default();
        let dispatcher = AlertDispatcher::new(&primary, &fallback);

        dispatcher.probe_primary().await.unwrap();
        assert_eq!(dispatcher.sent_count(), 0);
        assert_eq!(primary.probes.load(Ordering::Relaxed), 1);

        // Probe did not claim the throttle slot
        assert!(dispatcher.dispatch(0.8, &config()).await.unwrap().is_some());
    }
}
