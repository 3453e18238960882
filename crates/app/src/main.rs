//! Drowsiness Monitor - Headless Entry Point
//!
//! Wires a synthetic camera and a scripted classifier into the full
//! session pipeline: sampling cadence, state banding, and rate-limited
//! dual-channel alert dispatch.

mod settings;

use std::sync::Arc;
use std::time::Duration;

use alerting::{
    AlertAttempt, AlertConfig, AlertDispatcher, DispatchError, HttpRelayChannel,
    LoggingMailClient,
};
use camera_feed::{CameraConstraints, FacingMode, SyntheticCamera};
use classifier::{Prediction, SampleAdapter, ScriptedClassifier};
use config_store::FileStore;
use session::{AlertSink, SessionConfig, SessionController, SessionEvent};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use settings::Settings;

fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Bridges asleep transitions from the session into the dispatcher.
struct DispatcherSink {
    dispatcher: Arc<AlertDispatcher<HttpRelayChannel, LoggingMailClient>>,
}

impl AlertSink for DispatcherSink {
    async fn on_asleep(
        &self,
        confidence: f32,
        config: AlertConfig,
    ) -> Result<Option<AlertAttempt>, DispatchError> {
        self.dispatcher.dispatch(confidence, &config).await
    }
}

/// Prediction script for the demo run: awake for a while, a drowsy
/// patch, then a confidently sleeping stretch.
fn demo_script() -> ScriptedClassifier {
    let open = |p: f32| {
        vec![Prediction {
            label: "eyes_open".to_string(),
            probability: p,
        }]
    };
    let closed = |p: f32| {
        vec![Prediction {
            label: "eyes_closed".to_string(),
            probability: p,
        }]
    };

    let mut script = Vec::new();
    script.extend(std::iter::repeat_with(|| open(0.93)).take(5));
    script.extend(std::iter::repeat_with(|| closed(0.55)).take(2));
    script.extend(std::iter::repeat_with(|| closed(0.88)).take(4));
    script.extend(std::iter::repeat_with(|| open(0.90)).take(4));
    ScriptedClassifier::replay(script)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));
    let settings = Settings::load()?;

    let dispatcher = Arc::new(AlertDispatcher::new(
        HttpRelayChannel::new(&settings.relay_endpoint)?,
        LoggingMailClient,
    ));

    match dispatcher.probe_primary().await {
        Ok(()) => info!("primary delivery channel reachable"),
        Err(e) => warn!(error = %e, "primary delivery channel unreachable, fallback will carry sends"),
    }

    let session_config = SessionConfig {
        cadence: Duration::from_millis(settings.cadence_ms),
        constraints: CameraConstraints {
            width: settings.camera.width,
            height: settings.camera.height,
            facing: FacingMode::User,
        },
        ..Default::default()
    };

    let mut controller = SessionController::new(
        SyntheticCamera::new(),
        SampleAdapter::new(demo_script()),
        DispatcherSink {
            dispatcher: Arc::clone(&dispatcher),
        },
        Box::new(FileStore::new(&settings.store_path)),
        session_config,
    );

    if !settings.alert.email.is_empty() {
        let mut alert_config =
            AlertConfig::new(&settings.alert.email, &settings.alert.driver);
        if !settings.alert.vehicle.is_empty() {
            alert_config = alert_config.with_vehicle(&settings.alert.vehicle);
        }
        controller.save_config(&alert_config)?;
    }

    let mut events = controller.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::Started { session_id } => info!(%session_id, "session started"),
                SessionEvent::Stopped { session_id } => info!(%session_id, "session stopped"),
                SessionEvent::StateChanged {
                    previous,
                    current,
                    confidence,
                } => info!(?previous, ?current, ?confidence, "driver state changed"),
                SessionEvent::AlertAttempted(attempt) => info!(
                    channel = ?attempt.channel,
                    outcome = ?attempt.outcome,
                    confidence = attempt.confidence,
                    "alert attempted"
                ),
                SessionEvent::Notice(text) => info!(notice = %text, "status"),
            }
        }
    });

    controller.start()?;

    if settings.run_seconds > 0 {
        tokio::time::sleep(Duration::from_secs(settings.run_seconds)).await;
    } else {
        tokio::signal::ctrl_c().await?;
    }

    info!(
        elapsed = %controller.elapsed_readout(),
        alerts_sent = dispatcher.sent_count(),
        "shutting down"
    );
    controller.stop();
    printer.abort();

    Ok(())
}
