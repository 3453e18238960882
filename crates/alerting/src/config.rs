//! Operator-entered alert configuration

use serde::{Deserialize, Serialize};

use crate::DispatchError;

/// Store key under which the session persists this configuration
pub const CONFIG_KEY: &str = "alert_config";

/// Who to notify and on whose behalf. Entered by the operator, saved
/// explicitly, loaded once at session start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Notification recipient. Required before any dispatch.
    pub email_address: String,
    /// Name of the monitored driver. Required before any dispatch.
    pub driver_name: String,
    /// Free-form vehicle description. Optional.
    pub vehicle_description: Option<String>,
}

impl AlertConfig {
    pub fn new(email_address: &str, driver_name: &str) -> Self {
        Self {
            email_address: email_address.to_string(),
            driver_name: driver_name.to_string(),
            vehicle_description: None,
        }
    }

    pub fn with_vehicle(mut self, vehicle: &str) -> Self {
        self.vehicle_description = Some(vehicle.to_string());
        self
    }

    /// Dispatch precondition: both required fields present.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.email_address.trim().is_empty() || self.driver_name.trim().is_empty() {
            return Err(DispatchError::NotConfigured);
        }
        Ok(())
    }
}
