//! Session controller implementation

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use alerting::config::CONFIG_KEY;
use alerting::{AlertConfig, DispatchError};
use camera_feed::{CameraConstraints, FrameSource, VideoFrame};
use classifier::{EyeClassifier, SampleAdapter};
use config_store::ConfigStore;
use monitor::{DriverState, StateTracker};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::events::SessionEvent;
use crate::{AlertSink, SessionError};

/// Session tuning
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sampling cadence driving each classify-band-dispatch cycle
    pub cadence: Duration,
    /// Camera constraints requested on start
    pub constraints: CameraConstraints,
    /// Event channel capacity
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cadence: Duration::from_millis(1000),
            constraints: CameraConstraints::default(),
            event_capacity: 64,
        }
    }
}

/// Idle/Active session state machine.
///
/// Exactly one cadence task exists while Active. `start()` while Active
/// and `stop()` while Idle are no-ops. In-flight dispatches are never
/// cancelled by `stop()`; they complete or fail on their own.
pub struct SessionController<S, C, A>
where
    S: FrameSource + 'static,
    C: EyeClassifier + 'static,
    A: AlertSink,
{
    config: SessionConfig,
    camera: Arc<Mutex<S>>,
    adapter: Arc<SampleAdapter<C>>,
    sink: Arc<A>,
    store: Box<dyn ConfigStore>,
    tracker: Arc<Mutex<StateTracker>>,
    last_frame: Arc<Mutex<Option<VideoFrame>>>,
    events: broadcast::Sender<SessionEvent>,
    /// Loaded once per session start; explicit saves take effect on the
    /// next start
    alert_config: Arc<AlertConfig>,
    session_id: Option<Uuid>,
    started_at: Option<Instant>,
    task: Option<JoinHandle<()>>,
}

impl<S, C, A> SessionController<S, C, A>
where
    S: FrameSource + 'static,
    C: EyeClassifier + 'static,
    A: AlertSink,
{
    pub fn new(
        camera: S,
        adapter: SampleAdapter<C>,
        sink: A,
        store: Box<dyn ConfigStore>,
        config: SessionConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            config,
            camera: Arc::new(Mutex::new(camera)),
            adapter: Arc::new(adapter),
            sink: Arc::new(sink),
            store,
            tracker: Arc::new(Mutex::new(StateTracker::new())),
            last_frame: Arc::new(Mutex::new(None)),
            events,
            alert_config: Arc::new(AlertConfig::default()),
            session_id: None,
            started_at: None,
            task: None,
        }
    }

    /// Subscribe to session events. Subscribe before `start()` to
    /// observe the `Started` event.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Current driver state as the UI should show it.
    pub fn current_state(&self) -> DriverState {
        self.tracker
            .lock()
            .map(|t| t.current())
            .unwrap_or(DriverState::Unknown)
    }

    /// Whether the camera device is currently held.
    pub fn camera_is_open(&self) -> bool {
        self.camera.lock().map(|c| c.is_open()).unwrap_or(false)
    }

    /// Time since `start()`, while Active.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|at| at.elapsed())
    }

    /// Elapsed time as an `MM:SS` readout, recomputed on demand.
    pub fn elapsed_readout(&self) -> String {
        let secs = self.elapsed().map(|d| d.as_secs()).unwrap_or(0);
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Persist operator-entered alert configuration. Takes effect at
    /// the next session start.
    pub fn save_config(&self, config: &AlertConfig) -> Result<(), SessionError> {
        config_store::save(self.store.as_ref(), CONFIG_KEY, config)?;
        info!("alert configuration saved");
        Ok(())
    }

    /// Acquire the camera and begin the sampling cadence.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.task.is_some() {
            debug!("start ignored: session already active");
            return Ok(());
        }

        let alert_config: AlertConfig =
            config_store::load(self.store.as_ref(), CONFIG_KEY)?.unwrap_or_default();
        self.alert_config = Arc::new(alert_config);

        {
            let mut camera = self.camera.lock().map_err(|_| SessionError::Poisoned)?;
            if let Err(e) = camera.open(&self.config.constraints) {
                warn!(error = %e, "camera unavailable, session stays idle");
                let _ = self
                    .events
                    .send(SessionEvent::Notice(format!("Camera unavailable: {e}")));
                return Err(e.into());
            }
        }

        let session_id = Uuid::new_v4();
        self.session_id = Some(session_id);
        self.started_at = Some(Instant::now());

        let camera = Arc::clone(&self.camera);
        let adapter = Arc::clone(&self.adapter);
        let sink = Arc::clone(&self.sink);
        let tracker = Arc::clone(&self.tracker);
        let last_frame = Arc::clone(&self.last_frame);
        let events = self.events.clone();
        let alert_config = Arc::clone(&self.alert_config);
        let cadence = self.config.cadence;

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                Self::run_cycle(
                    &camera,
                    &adapter,
                    &sink,
                    &tracker,
                    &last_frame,
                    &events,
                    &alert_config,
                )
                .await;
            }
        }));

        info!(%session_id, cadence_ms = cadence.as_millis() as u64, "session started");
        let _ = self.events.send(SessionEvent::Started { session_id });
        Ok(())
    }

    /// Cancel the cadence and release the camera. Safe on every path;
    /// no-op while Idle.
    pub fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            debug!("stop ignored: session idle");
            return;
        };
        task.abort();

        // Camera must be released on every exit path
        match self.camera.lock() {
            Ok(mut camera) => camera.release(),
            Err(poisoned) => poisoned.into_inner().release(),
        }

        if let Ok(mut tracker) = self.tracker.lock() {
            tracker.reset();
        }
        self.started_at = None;

        if let Some(session_id) = self.session_id.take() {
            info!(%session_id, "session stopped");
            let _ = self.events.send(SessionEvent::Stopped { session_id });
        }
    }

    /// One-shot analysis outside the cadence (operator-triggered).
    /// Reuses the exact tick pipeline, including alert evaluation.
    pub async fn analyze_now(&self) -> Result<DriverState, SessionError> {
        if self.task.is_none() {
            return Err(SessionError::NotActive);
        }
        Self::run_cycle(
            &self.camera,
            &self.adapter,
            &self.sink,
            &self.tracker,
            &self.last_frame,
            &self.events,
            &self.alert_config,
        )
        .await;
        Ok(self.current_state())
    }

    /// Clone of the most recent frame, for operator-triggered snapshot
    /// capture. Encoding and saving are the caller's concern.
    pub fn capture_frame(&self) -> Result<VideoFrame, SessionError> {
        if self.task.is_none() {
            return Err(SessionError::NotActive);
        }
        self.last_frame
            .lock()
            .map_err(|_| SessionError::Poisoned)?
            .clone()
            .ok_or(SessionError::NoFrame)
    }

    /// Host visibility signal. Updates status text only; the cadence
    /// keeps running while backgrounded (background throttling by the
    /// host is a known limitation).
    pub fn set_backgrounded(&self, hidden: bool) {
        if self.task.is_none() {
            return;
        }
        let text = if hidden {
            "Monitoring continues in background"
        } else {
            "Monitoring active"
        };
        let _ = self.events.send(SessionEvent::Notice(text.to_string()));
    }

    /// One sampling tick: grab → classify → band → maybe dispatch.
    /// Faults are contained here: they degrade the visible state to
    /// `Unknown` and the loop carries on.
    async fn run_cycle(
        camera: &Arc<Mutex<S>>,
        adapter: &Arc<SampleAdapter<C>>,
        sink: &Arc<A>,
        tracker: &Arc<Mutex<StateTracker>>,
        last_frame: &Arc<Mutex<Option<VideoFrame>>>,
        events: &broadcast::Sender<SessionEvent>,
        alert_config: &Arc<AlertConfig>,
    ) {
        let grabbed = {
            let mut camera = match camera.lock() {
                Ok(c) => c,
                Err(poisoned) => poisoned.into_inner(),
            };
            camera.grab()
        };

        let frame = match grabbed {
            Ok(frame) => {
                if let Ok(mut slot) = last_frame.lock() {
                    *slot = Some(frame.clone());
                }
                frame
            }
            Err(e) => {
                error!(error = %e, "frame grab failed");
                Self::degrade(tracker, events);
                return;
            }
        };

        let sample = match adapter.sample(&frame).await {
            Ok(sample) => sample,
            Err(e) => {
                error!(error = %e, "classification failed");
                Self::degrade(tracker, events);
                return;
            }
        };

        let change = {
            let mut tracker = match tracker.lock() {
                Ok(t) => t,
                Err(poisoned) => poisoned.into_inner(),
            };
            tracker.observe(sample.as_ref())
        };

        if change.changed() {
            let _ = events.send(SessionEvent::StateChanged {
                previous: change.previous,
                current: change.current,
                confidence: change.confidence,
            });
        }

        if change.entered_asleep() {
            let confidence = change.confidence.unwrap_or(0.0);
            let sink = Arc::clone(sink);
            let events = events.clone();
            let config = (**alert_config).clone();
            // Dispatch runs independently of the cadence; a stop() will
            // not cancel it
            tokio::spawn(async move {
                match sink.on_asleep(confidence, config).await {
                    Ok(Some(attempt)) => {
                        let _ = events.send(SessionEvent::AlertAttempted(attempt));
                    }
                    Ok(None) => debug!("asleep event absorbed by dispatcher cooldown"),
                    Err(DispatchError::NotConfigured) => {
                        let _ = events.send(SessionEvent::Notice(
                            "Alert email not configured; no notification sent".to_string(),
                        ));
                    }
                    Err(e) => warn!(error = %e, "alert dispatch failed"),
                }
            });
        }
    }

    fn degrade(tracker: &Arc<Mutex<StateTracker>>, events: &broadcast::Sender<SessionEvent>) {
        let change = {
            let mut tracker = match tracker.lock() {
                Ok(t) => t,
                Err(poisoned) => poisoned.into_inner(),
            };
            tracker.degrade()
        };
        if change.changed() {
            let _ = events.send(SessionEvent::StateChanged {
                previous: change.previous,
                current: change.current,
                confidence: None,
            });
        }
    }
}

impl<S, C, A> Drop for SessionController<S, C, A>
where
    S: FrameSource + 'static,
    C: EyeClassifier + 'static,
    A: AlertSink,
{
    fn drop(&mut self) {
        self.stop();
    }
}
