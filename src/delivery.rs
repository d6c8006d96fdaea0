use async_trait::async_trait;
use napomni_models::notification::NotificationId;
use napomni_scheduler::NotificationPayload;
use napomni_scheduler::delivery::NotificationDeliveryChannel;
use tokio::sync::mpsc;

pub struct LogDeliveryChannel {
    fired: mpsc::Sender<NotificationId>,
}

impl LogDeliveryChannel {
    pub fn new(fired: mpsc::Sender<NotificationId>) -> Self {
        Self { fired }
    }
}

#[async_trait]
impl NotificationDeliveryChannel for LogDeliveryChannel {
    async fn deliver(&self, payload: &NotificationPayload) -> anyhow::Result<()> {
        log::info!(
            "[DELIVER] {}: {} [reminder_id = {}, sound = {}, channel = {}]",
            payload.title,
            payload.body,
            payload.reminder_id,
            payload.sound.as_deref().unwrap_or("silent"),
            payload.channel_hint
        );

        self.fired.send(payload.notification_id.clone()).await?;
        Ok(())
    }
}
