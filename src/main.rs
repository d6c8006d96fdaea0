mod appsettings;
mod delivery;

use std::sync::Arc;

use anyhow::Context;
use local_dispatcher::LocalNotificationDispatcher;
use napomni_reminders::{LifecycleError, ReminderService, ServiceConfig, SystemClock};
use napomni_scheduler::{describe, format_relative};
use napomni_storage::SqliteKeyValueStore;
use tokio::sync::mpsc;

use crate::delivery::LogDeliveryChannel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = appsettings::load().context("Failed to read appsettings")?;
    let timezone = settings.schedule.timezone()?;
    let store = SqliteKeyValueStore::connect(&settings.storage.database_url)
        .await
        .context("Failed to open the reminder store")?;

    let (fired_tx, mut fired_rx) = mpsc::channel(64);
    let dispatcher = LocalNotificationDispatcher::new(Arc::new(LogDeliveryChannel::new(fired_tx)));

    let service = ReminderService::load(
        Arc::new(store),
        Arc::new(dispatcher),
        Arc::new(SystemClock),
        ServiceConfig {
            timezone,
            history_days: settings.schedule.history_days,
        },
    )
    .await?;

    let scheduled = service.reschedule_all().await?;
    log::info!(
        "Scheduled {} reminders. [warnings = {}]",
        scheduled.value,
        scheduled.warnings.len()
    );
    log_upcoming(&service).await;

    loop {
        tokio::select! {
            Some(notification_id) = fired_rx.recv() => {
                handle_fired(&service, &notification_id).await;
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn handle_fired(service: &ReminderService, notification_id: &str) {
    match service.handle_triggered(notification_id).await {
        Ok(outcome) => {
            if let Ok(Some(next)) = service.next_trigger_for(&outcome.value.reminder_id).await {
                log::info!(
                    "Next occurrence {}. [reminder_id = {}]",
                    format_relative(&next, &service.now()),
                    outcome.value.reminder_id
                );
            }
        }
        // Pruned or deleted before it fired.
        Err(LifecycleError::NotificationNotFound(id)) => {
            log::info!("Fired notification is no longer tracked. [notification_id = {}]", id);
        }
        Err(err) => {
            log::error!(
                "Failed to handle fired notification. [notification_id = {}, error = {:?}]",
                notification_id,
                err
            );
        }
    }
}

async fn log_upcoming(service: &ReminderService) {
    let now = service.now();
    for reminder in service.list().await {
        let next = match service.next_trigger_for(&reminder.id).await {
            Ok(Some(next)) => format_relative(&next, &now),
            Ok(None) => "not scheduled".to_string(),
            Err(_) => continue,
        };

        log::info!(
            "{} ({}): {}",
            reminder.title,
            describe(&reminder.recurrence),
            next
        );
    }
}
