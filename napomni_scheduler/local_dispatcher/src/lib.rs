use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use napomni_models::notification::DispatchId;
use napomni_models::reminder::ReminderId;
use napomni_scheduler::delivery::NotificationDeliveryChannel;
use napomni_scheduler::{NotificationDispatcher, NotificationPayload};
use tokio::{
    sync::{RwLock, watch},
    task::{self, JoinHandle},
};
use tokio_util::sync::CancellationToken;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

struct ScheduledDispatchHandle {
    reminder_id: ReminderId,
    task: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

struct CleanupTask(watch::Sender<()>);

type DispatchTaskStore = RwLock<HashMap<DispatchId, ScheduledDispatchHandle>>;

pub struct LocalNotificationDispatcher {
    tasks: Arc<DispatchTaskStore>,
    delivery_channel: Arc<dyn NotificationDeliveryChannel>,
    cleanup_task: CleanupTask,
}

impl LocalNotificationDispatcher {
    pub fn new(delivery_channel: Arc<dyn NotificationDeliveryChannel>) -> Self {
        let tasks = Arc::new(RwLock::new(HashMap::new()));
        let cleanup_task = Self::spawn_cleanup_task(Arc::clone(&tasks));

        Self {
            tasks,
            delivery_channel,
            cleanup_task,
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.tasks
            .read()
            .await
            .values()
            .filter(|handle| !handle.task.is_finished())
            .count()
    }
}

impl Drop for LocalNotificationDispatcher {
    fn drop(&mut self) {
        let _ = self.cleanup_task.0.send(());
    }
}

impl LocalNotificationDispatcher {
    fn create_dispatch_task(&self, payload: NotificationPayload) -> ScheduledDispatchHandle {
        let reminder_id = payload.reminder_id.clone();
        let cancellation_token = CancellationToken::new();
        let delay = delay_until(payload.trigger_at, Utc::now());

        let token = cancellation_token.clone();
        let delivery_channel = Arc::clone(&self.delivery_channel);
        let task = task::spawn(async move {
            log::info!(
                "[SCHEDULE] Sleeping for {:?} delay. [notification_id = {}, reminder_id = {}]",
                delay,
                payload.notification_id,
                payload.reminder_id
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    log::info!(
                        "[FIRE] Delivering notification. [notification_id = {}, reminder_id = {}]",
                        payload.notification_id,
                        payload.reminder_id
                    );
                    if let Err(err) = delivery_channel.deliver(&payload).await {
                        log::warn!(
                            "Delivery failed. [notification_id = {}, error = {:?}]",
                            payload.notification_id,
                            err
                        );
                    }
                }
                _ = token.cancelled() => {
                    log::info!(
                        "[CANCEL] Dispatch cancelled. [notification_id = {}, reminder_id = {}]",
                        payload.notification_id,
                        payload.reminder_id
                    );
                }
            }
        });

        ScheduledDispatchHandle {
            reminder_id,
            task,
            cancellation_token,
        }
    }

    fn spawn_cleanup_task(tasks: Arc<DispatchTaskStore>) -> CleanupTask {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(());
        task::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(CLEANUP_INTERVAL) => {
                        Self::clean_finished_tasks(&tasks).await;
                    }
                    _ = shutdown_rx.changed() => {
                        log::info!("Cleanup task shutting down");
                        break;
                    }
                };
            }
        });

        CleanupTask(shutdown_tx)
    }

    async fn clean_finished_tasks(tasks: &DispatchTaskStore) {
        let mut tasks = tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, handle| !handle.task.is_finished());
        let after = tasks.len();

        if before != after {
            log::info!("Cleaned up {} finished dispatch tasks", before - after);
        }
    }
}

#[async_trait]
impl NotificationDispatcher for LocalNotificationDispatcher {
    async fn schedule(&self, payload: NotificationPayload) -> anyhow::Result<DispatchId> {
        let dispatch_id = uuid::Uuid::new_v4().to_string();
        let handle = self.create_dispatch_task(payload);

        self.tasks.write().await.insert(dispatch_id.clone(), handle);

        Ok(dispatch_id)
    }

    async fn cancel(&self, dispatch_id: &DispatchId) -> anyhow::Result<()> {
        if let Some(handle) = self.tasks.write().await.remove(dispatch_id) {
            handle.cancellation_token.cancel();

            Ok(())
        } else {
            anyhow::bail!("No such dispatch {}", dispatch_id)
        }
    }

    async fn cancel_all_for_reminder(&self, reminder_id: &ReminderId) -> anyhow::Result<()> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, handle| {
            if handle.reminder_id == *reminder_id {
                handle.cancellation_token.cancel();
                false
            } else {
                true
            }
        });

        log::info!(
            "Cancelled {} dispatches. [reminder_id = {}]",
            before - tasks.len(),
            reminder_id
        );

        Ok(())
    }
}

pub(crate) fn delay_until(trigger_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (trigger_at - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests;
