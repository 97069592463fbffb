//! CRM webhook forwarding.
//!
//! Delivery is fire-and-forget: [`CrmWebhook::dispatch`] spawns the POST on
//! its own task and the caller never waits for it. Failures are logged and
//! counted, never surfaced to the person who submitted the intake.

use crate::config::WebhookConfig;
use crate::models::WebhookPayload;
use crate::services::metrics;
use reqwest::Client;
use service_core::observability::TracedClientExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::Instrument;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Failed to create webhook HTTP client: {0}")]
    Client(String),

    #[error("Webhook request failed: {0}")]
    Network(String),

    #[error("Webhook returned status {0}")]
    Status(u16),
}

impl WebhookError {
    fn outcome(&self) -> &'static str {
        match self {
            WebhookError::Client(_) => "client_error",
            WebhookError::Network(_) => "network_error",
            WebhookError::Status(_) => "http_error",
        }
    }
}

pub struct CrmWebhook {
    client: Client,
    url: String,
}

impl CrmWebhook {
    /// Build the webhook client, or `None` when no URL is configured.
    pub fn from_config(config: &WebhookConfig) -> Result<Option<Self>, WebhookError> {
        let Some(url) = config.url.clone() else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WebhookError::Client(e.to_string()))?;

        Ok(Some(Self { client, url }))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the payload and wait for the CRM to acknowledge it.
    pub async fn deliver(
        &self,
        payload: &WebhookPayload,
        request_id: Option<&str>,
    ) -> Result<(), WebhookError> {
        let response = self
            .client
            .traced_post(&self.url)
            .request_id(request_id)
            .json(payload)
            .send()
            .await
            .map_err(|e| WebhookError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::Status(status.as_u16()));
        }

        Ok(())
    }

    /// Deliver on a detached task. The returned handle may be dropped.
    pub fn dispatch(
        self: &Arc<Self>,
        payload: WebhookPayload,
        request_id: Option<String>,
    ) -> JoinHandle<()> {
        let webhook = Arc::clone(self);
        let span = tracing::info_span!(
            "crm_webhook",
            request_id = request_id.as_deref().unwrap_or("-")
        );

        tokio::spawn(
            async move {
                match webhook.deliver(&payload, request_id.as_deref()).await {
                    Ok(()) => {
                        metrics::record_webhook_delivery("delivered");
                        tracing::info!("Lead forwarded to CRM webhook");
                    }
                    Err(e) => {
                        metrics::record_webhook_delivery(e.outcome());
                        tracing::warn!(error = %e, "CRM webhook delivery failed, ignoring");
                    }
                }
            }
            .instrument(span),
        )
    }
}
