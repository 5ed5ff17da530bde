pub mod webhook;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::Service;

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub user_id: String,
    pub client_name: String,
    pub phone: String,
    pub service_name: String,
    pub scheduled_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingCancellation {
    pub user_id: String,
    pub booking_id: String,
}

/// Outbound messaging collaborator. Dispatches are fire-and-forget: callers
/// spawn them, never await the result for correctness, and only log failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_confirmed(&self, event: &BookingConfirmation) -> anyhow::Result<()>;
    async fn booking_cancelled(&self, event: &BookingCancellation) -> anyhow::Result<()>;
    async fn services_updated(&self, user_id: &str, services: &[Service]) -> anyhow::Result<()>;
}

/// Default sink when no webhook is configured: notifications become log lines.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_confirmed(&self, event: &BookingConfirmation) -> anyhow::Result<()> {
        tracing::info!(
            user_id = %event.user_id,
            client = %event.client_name,
            phone = %event.phone,
            service = %event.service_name,
            scheduled_at = %event.scheduled_at,
            "booking confirmed"
        );
        Ok(())
    }

    async fn booking_cancelled(&self, event: &BookingCancellation) -> anyhow::Result<()> {
        tracing::info!(
            user_id = %event.user_id,
            booking_id = %event.booking_id,
            "booking cancelled"
        );
        Ok(())
    }

    async fn services_updated(&self, user_id: &str, services: &[Service]) -> anyhow::Result<()> {
        tracing::info!(user_id = %user_id, count = services.len(), "service catalogue updated");
        Ok(())
    }
}
