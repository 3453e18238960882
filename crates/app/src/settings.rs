//! Runtime settings
//!
//! Layered: built-in defaults, optional `drowsy-guard.toml`, then
//! `GUARD_*` environment overrides (e.g. `GUARD_CADENCE_MS=500`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Form-relay endpoint for the primary delivery channel
    pub relay_endpoint: String,
    /// Sampling cadence in milliseconds
    pub cadence_ms: u64,
    /// Path of the JSON config store
    pub store_path: String,
    /// Camera constraints
    pub camera: CameraSettings,
    /// Operator alert configuration, saved to the store on launch when
    /// the email is set
    pub alert: AlertSettings,
    /// Demo run length in seconds (0 = run until interrupted)
    pub run_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraSettings {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertSettings {
    pub email: String,
    pub driver: String,
    pub vehicle: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("relay_endpoint", "https://formrelay.example/api/submit")?
            .set_default("cadence_ms", 1000i64)?
            .set_default("store_path", "drowsy-guard-store.json")?
            .set_default("camera.width", 640i64)?
            .set_default("camera.height", 480i64)?
            .set_default("alert.email", "")?
            .set_default("alert.driver", "")?
            .set_default("alert.vehicle", "")?
            .set_default("run_seconds", 15i64)?
            .add_source(File::with_name("drowsy-guard").required(false))
            .add_source(Environment::with_prefix("GUARD").separator("__"))
            .build()?
            .try_deserialize()
    }
}
