//! Delivery channel capabilities

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info};

use crate::payload::{AlertPayload, MailtoMessage};
use crate::DispatchError;

/// Primary delivery path: an HTTP form relay. Observable success or
/// failure; failure hands the send to the fallback channel.
pub trait PrimaryChannel: Send + Sync {
    /// Submit the payload on behalf of `recipient`.
    fn submit(
        &self,
        recipient: &str,
        payload: &AlertPayload,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;

    /// Reachability check. Touches neither the throttle clock nor the
    /// sent-counter.
    fn probe(&self) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

/// Fallback delivery path: a client-initiated mail compose action.
/// Fire-and-forget; non-delivery cannot be observed.
pub trait FallbackChannel: Send + Sync {
    fn open_compose(&self, message: &MailtoMessage);
}

/// Form-relay channel over HTTP POST. Any non-2xx response or transport
/// fault counts as failure.
pub struct HttpRelayChannel {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayChannel {
    pub fn new(endpoint: &str) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl PrimaryChannel for HttpRelayChannel {
    async fn submit(&self, recipient: &str, payload: &AlertPayload) -> Result<(), DispatchError> {
        let mut fields = payload.form_fields();
        fields.push(("email", recipient.to_string()));

        debug!(endpoint = %self.endpoint, "submitting alert to form relay");
        let response = self
            .client
            .post(&self.endpoint)
            .form(&fields)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Rejected(status.as_u16()));
        }
        Ok(())
    }

    async fn probe(&self) -> Result<(), DispatchError> {
        let response = self
            .client
            .head(&self.endpoint)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

/// Mail-client handoff that surfaces the compose URI through the log.
/// The hosting environment is expected to hand the URI to the OS mail
/// client; this implementation is the seam for that.
pub struct LoggingMailClient;

impl FallbackChannel for LoggingMailClient {
    fn open_compose(&self, message: &MailtoMessage) {
        info!(
            recipient = %message.recipient,
            uri = %message.to_uri(),
            "mail-client compose handoff"
        );
    }
}
