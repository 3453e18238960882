//! Notification payload assembly
//!
//! Both channels carry the same facts: who was driving, which vehicle,
//! how confident the classifier was, and when. The primary channel
//! submits them as form fields; the fallback channel folds them into a
//! pre-filled mail-client compose URI.

use chrono::{DateTime, Utc};

use crate::config::AlertConfig;

/// What kind of send this is. Test sends reuse the full pipeline but
/// are labeled so the recipient can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Drowsiness,
    Test,
}

/// Structured facts behind one notification
#[derive(Debug, Clone)]
pub struct AlertPayload {
    pub driver_name: String,
    pub vehicle: String,
    pub confidence_pct: u8,
    pub detected_at: DateTime<Utc>,
    pub kind: AlertKind,
}

impl AlertPayload {
    pub fn new(config: &AlertConfig, confidence: f32, kind: AlertKind) -> Self {
        Self {
            driver_name: config.driver_name.clone(),
            vehicle: config
                .vehicle_description
                .clone()
                .unwrap_or_else(|| "unspecified vehicle".to_string()),
            confidence_pct: (confidence.clamp(0.0, 1.0) * 100.0).round() as u8,
            detected_at: Utc::now(),
            kind,
        }
    }

    pub fn subject(&self) -> String {
        match self.kind {
            AlertKind::Drowsiness => format!("DROWSINESS ALERT: {}", self.driver_name),
            AlertKind::Test => format!("Drowsiness monitor test alert: {}", self.driver_name),
        }
    }

    /// Human-readable body shared by both channels
    pub fn message(&self) -> String {
        let lead = match self.kind {
            AlertKind::Drowsiness => "The drowsiness monitor detected a sleeping driver.",
            AlertKind::Test => "This is a test notification from the drowsiness monitor.",
        };
        format!(
            "{lead}\n\nDriver: {}\nVehicle: {}\nClassifier confidence: {}%\nDetected at: {}",
            self.driver_name,
            self.vehicle,
            self.confidence_pct,
            self.detected_at.format("%Y-%m-%d %H:%M:%S UTC"),
        )
    }

    /// Form-encoded fields for the relay submission
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("_subject", self.subject()),
            ("name", self.driver_name.clone()),
            ("vehicle", self.vehicle.clone()),
            ("confidence", format!("{}%", self.confidence_pct)),
            ("detected_at", self.detected_at.to_rfc3339()),
            ("message", self.message()),
        ]
    }
}

/// Pre-filled compose request for the mail-client handoff
#[derive(Debug, Clone)]
pub struct MailtoMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl MailtoMessage {
    pub fn from_payload(recipient: &str, payload: &AlertPayload) -> Self {
        Self {
            recipient: recipient.to_string(),
            subject: payload.subject(),
            body: payload.message(),
        }
    }

    /// Build the `mailto:` URI the host mail client understands.
    pub fn to_uri(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            encode_component(&self.recipient),
            encode_component(&self.subject),
            encode_component(&self.body),
        )
    }
}

/// RFC 3986 percent-encoding, unreserved characters kept as-is.
fn encode_component(input: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                out.push('%');
                out.push(HEX[(byte >> 4) as usize] as char);
                out.push(HEX[(byte & 0x0f) as usize] as char);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AlertConfig {
        AlertConfig::new("dispatch@fleet.example", "Dana").with_vehicle("Truck 7")
    }

    #[test]
    fn confidence_is_rendered_as_percent() {
        let payload = AlertPayload::new(&config(), 0.87, AlertKind::Drowsiness);
        assert_eq!(payload.confidence_pct, 87);

        let fields = payload.form_fields();
        let confidence = fields.iter().find(|(k, _)| *k == "confidence").unwrap();
        assert_eq!(confidence.1, "87%");
    }

    #[test]
    fn form_fields_carry_all_facts() {
        let payload = AlertPayload::new(&config(), 0.92, AlertKind::Drowsiness);
        let fields = payload.form_fields();

        let get = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(get("name"), "Dana");
        assert_eq!(get("vehicle"), "Truck 7");
        assert!(get("_subject").contains("DROWSINESS ALERT"));
        assert!(get("message").contains("92%"));
    }

    #[test]
    fn missing_vehicle_gets_placeholder() {
        let config = AlertConfig::new("dispatch@fleet.example", "Dana");
        let payload = AlertPayload::new(&config, 0.8, AlertKind::Drowsiness);
        assert_eq!(payload.vehicle, "unspecified vehicle");
    }

    #[test]
    fn test_kind_is_labeled() {
        let payload = AlertPayload::new(&config(), 1.0, AlertKind::Test);
        assert!(payload.subject().contains("test"));
        assert!(payload.message().contains("test notification"));
    }

    #[test]
    fn mailto_uri_is_percent_encoded() {
        let payload = AlertPayload::new(&config(), 0.8, AlertKind::Drowsiness);
        let message = MailtoMessage::from_payload("dispatch@fleet.example", &payload);
        let uri = message.to_uri();

        assert!(uri.starts_with("mailto:dispatch%40fleet.example?subject="));
        // Spaces and newlines never appear raw
        assert!(!uri.contains(' '));
        assert!(!uri.contains('\n'));
        assert!(uri.contains("DROWSINESS%20ALERT%3A%20Dana"));
    }

    #[test]
    fn encode_component_covers_reserved_bytes() {
        assert_eq!(encode_component("a b"), "a%20b");
        assert_eq!(encode_component("x@y.z"), "x%40y.z");
        assert_eq!(encode_component("100%"), "100%25");
        assert_eq!(encode_component("safe-chars_~."), "safe-chars_~.");
    }
}
