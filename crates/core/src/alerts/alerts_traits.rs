use async_trait::async_trait;

use super::alerts_model::{Alert, NewAlert};
use crate::errors::Result;

#[async_trait]
pub trait AlertRepositoryTrait: Send + Sync {
    async fn create(&self, alert: NewAlert) -> Result<Alert>;

    /// Queued alerts, oldest first.
    fn list_undelivered(&self) -> Result<Vec<Alert>>;

    async fn mark_delivered(&self, alert_id: &str) -> Result<()>;

    fn list_recent(&self, limit: i64) -> Result<Vec<Alert>>;
}

/// Outbound channel for alerts (e-mail, log, ...).
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, alert: &Alert) -> Result<()>;
}
