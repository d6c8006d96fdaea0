use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use napomni_models::notification::{DispatchId, NotificationId};
use napomni_models::reminder::ReminderId;

// `trigger_at` is final. Dispatchers never resolve the recurrence again.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPayload {
    pub reminder_id: ReminderId,
    pub notification_id: NotificationId,
    pub title: String,
    pub body: String,
    pub trigger_at: DateTime<Utc>,
    pub sound: Option<String>,
    pub channel_hint: String,
    pub vibration: Vec<u64>,
    pub timeout: Option<Duration>,
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync + 'static {
    async fn schedule(&self, payload: NotificationPayload) -> anyhow::Result<DispatchId>;

    async fn cancel(&self, dispatch_id: &DispatchId) -> anyhow::Result<()>;

    async fn cancel_all_for_reminder(&self, reminder_id: &ReminderId) -> anyhow::Result<()>;
}
