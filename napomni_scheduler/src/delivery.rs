use async_trait::async_trait;

use crate::dispatcher::NotificationPayload;

#[async_trait]
pub trait NotificationDeliveryChannel: Send + Sync + 'static {
    async fn deliver(&self, payload: &NotificationPayload) -> anyhow::Result<()>;
}
