use anyhow::Context;
use async_trait::async_trait;

use super::{BookingCancellation, BookingConfirmation, Notifier};
use crate::models::Service;

/// Posts notification events to an external automation endpoint.
pub struct WebhookNotifier {
    base_url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> anyhow::Result<()> {
        let url = format!("{}{}", self.base_url, path);

        self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to POST {url}"))?
            .error_for_status()
            .context("notification endpoint returned error")?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn booking_confirmed(&self, event: &BookingConfirmation) -> anyhow::Result<()> {
        self.post("/webhook/reserve", &serde_json::to_value(event)?)
            .await
    }

    async fn booking_cancelled(&self, event: &BookingCancellation) -> anyhow::Result<()> {
        self.post("/webhook/cancel", &serde_json::to_value(event)?)
            .await
    }

    async fn services_updated(&self, user_id: &str, services: &[Service]) -> anyhow::Result<()> {
        let body = serde_json::json!({
            "user_id": user_id,
            "services": services,
        });
        self.post("/webhook/config", &body).await
    }
}
