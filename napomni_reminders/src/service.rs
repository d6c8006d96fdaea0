use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use napomni_models::error::ValidationError;
use napomni_models::notification::{
    DispatchId, NOTIFICATION_HISTORY_DAYS, NotificationStats, NotificationStatus,
    ScheduledNotification,
};
use napomni_models::reminder::{ReminderInput, ReminderRecord, is_known_ring_tone};
use napomni_models::settings::NotificationSettings;
use napomni_scheduler::{NotificationDispatcher, NotificationPayload, next_trigger};
use napomni_storage::{KeyValueStore, NotificationStorage, ReminderStorage, SettingsStorage};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{DispatchOperation, DispatchWarning, LifecycleError, Outcome};
use crate::filter::{ReminderFilters, apply_all_filters};
use crate::history::{history_cutoff, prune, within_window};
use crate::sort::{SortOrder, apply_sorting};

const DEFAULT_BODY: &str = "Time for your reminder!";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub timezone: Tz,
    pub history_days: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            history_days: NOTIFICATION_HISTORY_DAYS,
        }
    }
}

struct ServiceState {
    reminders: Vec<ReminderRecord>,
    notifications: Vec<ScheduledNotification>,
    settings: NotificationSettings,
}

pub struct ReminderService {
    reminder_storage: ReminderStorage,
    notification_storage: NotificationStorage,
    settings_storage: SettingsStorage,
    dispatcher: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
    state: Mutex<ServiceState>,
}

impl ReminderService {
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Result<Self, LifecycleError> {
        let reminder_storage = ReminderStorage::new(Arc::clone(&store));
        let notification_storage = NotificationStorage::new(Arc::clone(&store));
        let settings_storage = SettingsStorage::new(store);

        let reminders = reminder_storage.load(&config.timezone).await?;
        let mut notifications = notification_storage.load().await?;
        let settings = settings_storage.load().await?;

        let cutoff = history_cutoff(clock.now(), config.history_days);
        let pruned = prune(&mut notifications, &reminders, cutoff);
        if pruned > 0 {
            log::info!("Pruned {} stale notifications", pruned);
            notification_storage.save(&notifications).await?;
        }

        log::info!(
            "Loaded reminders. [reminders = {}, notifications = {}, timezone = {}]",
            reminders.len(),
            notifications.len(),
            config.timezone
        );

        Ok(Self {
            reminder_storage,
            notification_storage,
            settings_storage,
            dispatcher,
            clock,
            config,
            state: Mutex::new(ServiceState {
                reminders,
                notifications,
                settings,
            }),
        })
    }

    pub fn timezone(&self) -> Tz {
        self.config.timezone
    }

    pub fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.config.timezone)
    }

    pub async fn create(&self, input: ReminderInput) -> Result<Outcome<ReminderRecord>, LifecycleError> {
        let now = self.now();
        input.validate(now.date_naive())?;

        let mut state = self.state.lock().await;
        let ring_tone = resolve_ring_tone(&input, &state.settings);
        let record = ReminderRecord {
            id: Uuid::new_v4().to_string(),
            category: input.category,
            title: input.title.trim().to_string(),
            description: normalize_description(input.description),
            recurrence: input.recurrence,
            priority: input.priority,
            ring_tone,
            is_active: true,
            created_at: now.with_timezone(&Utc),
            updated_at: None,
            expiry_date: input.expiry_date,
        };

        let mut reminders = Vec::with_capacity(state.reminders.len() + 1);
        reminders.push(record.clone());
        reminders.extend(state.reminders.iter().cloned());
        self.reminder_storage.save(&reminders).await?;
        state.reminders = reminders;

        log::info!(
            "Created reminder. [reminder_id = {}, kind = {}]",
            record.id,
            record.recurrence.kind()
        );

        let warnings = self.reschedule(&mut state, &record, &now).await;
        Ok(Outcome::new(record, warnings))
    }

    pub async fn update(
        &self,
        id: &str,
        input: ReminderInput,
    ) -> Result<Outcome<ReminderRecord>, LifecycleError> {
        let now = self.now();
        input.validate(now.date_naive())?;

        let mut state = self.state.lock().await;
        let index = find_reminder(&state.reminders, id)?;
        let ring_tone = resolve_ring_tone(&input, &state.settings);

        let mut reminders = state.reminders.clone();
        let existing = &reminders[index];
        let updated = ReminderRecord {
            id: existing.id.clone(),
            category: input.category,
            title: input.title.trim().to_string(),
            description: normalize_description(input.description),
            recurrence: input.recurrence,
            priority: input.priority,
            ring_tone,
            is_active: existing.is_active,
            created_at: existing.created_at,
            updated_at: Some(now.with_timezone(&Utc)),
            expiry_date: input.expiry_date,
        };
        reminders[index] = updated.clone();

        self.reminder_storage.save(&reminders).await?;
        state.reminders = reminders;

        log::info!("Updated reminder. [reminder_id = {}]", updated.id);

        let warnings = self.reschedule(&mut state, &updated, &now).await;
        Ok(Outcome::new(updated, warnings))
    }

    pub async fn toggle_active(&self, id: &str) -> Result<Outcome<ReminderRecord>, LifecycleError> {
        let now = self.now();
        let mut state = self.state.lock().await;
        let index = find_reminder(&state.reminders, id)?;

        let mut reminders = state.reminders.clone();
        let toggled = &mut reminders[index];
        toggled.is_active = !toggled.is_active;
        toggled.updated_at = Some(now.with_timezone(&Utc));
        let toggled = toggled.clone();

        self.reminder_storage.save(&reminders).await?;
        state.reminders = reminders;

        log::info!(
            "Toggled reminder. [reminder_id = {}, is_active = {}]",
            toggled.id,
            toggled.is_active
        );

        let warnings = self.reschedule(&mut state, &toggled, &now).await;
        Ok(Outcome::new(toggled, warnings))
    }

    pub async fn delete(&self, id: &str) -> Result<Outcome<ReminderRecord>, LifecycleError> {
        let mut state = self.state.lock().await;
        let index = find_reminder(&state.reminders, id)?;

        let mut reminders = state.reminders.clone();
        let removed = reminders.remove(index);
        self.reminder_storage.save(&reminders).await?;
        state.reminders = reminders;

        log::info!("Deleted reminder. [reminder_id = {}]", removed.id);

        let mut warnings = Vec::new();
        if let Err(err) = self.dispatcher.cancel_all_for_reminder(&removed.id).await {
            warnings.push(DispatchWarning::new(
                Some(&removed.id),
                DispatchOperation::Cancel,
                err,
            ));
        }

        let mut notifications = state.notifications.clone();
        notifications.retain(|notification| notification.reminder_id != removed.id);
        self.commit_notifications(&mut state, notifications, &mut warnings)
            .await;

        Ok(Outcome::new(removed, warnings))
    }

    pub async fn get(&self, id: &str) -> Option<ReminderRecord> {
        let state = self.state.lock().await;
        state.reminders.iter().find(|r| r.id == id).cloned()
    }

    pub async fn list(&self) -> Vec<ReminderRecord> {
        self.state.lock().await.reminders.clone()
    }

    pub async fn next_trigger_for(&self, id: &str) -> Result<Option<DateTime<Tz>>, LifecycleError> {
        let state = self.state.lock().await;
        let index = find_reminder(&state.reminders, id)?;
        let reminder = &state.reminders[index];

        if !reminder.is_active {
            return Ok(None);
        }

        let now = self.now();
        Ok(upcoming_trigger(reminder, &now))
    }

    pub async fn filtered(&self, filters: &ReminderFilters, order: SortOrder) -> Vec<ReminderRecord> {
        let now = self.now();
        let state = self.state.lock().await;
        let filtered = apply_all_filters(&state.reminders, filters, &now);
        apply_sorting(filtered, order, &self.config.timezone)
    }

    pub async fn reschedule_all(&self) -> Result<Outcome<usize>, LifecycleError> {
        let mut state = self.state.lock().await;
        self.reschedule_all_locked(&mut state).await
    }

    pub async fn handle_triggered(
        &self,
        notification_id: &str,
    ) -> Result<Outcome<ScheduledNotification>, LifecycleError> {
        let fired_at = self.clock.now();
        let mut state = self.state.lock().await;
        let was_snoozed = state
            .notifications
            .iter()
            .any(|n| n.id == notification_id && n.status == NotificationStatus::Snoozed);
        let fired = self
            .set_notification_status(
                &mut state,
                notification_id,
                NotificationStatus::Triggered,
                fired_at,
            )
            .await?;

        if was_snoozed {
            return Ok(Outcome::new(fired, Vec::new()));
        }

        let reminder = state
            .reminders
            .iter()
            .find(|r| r.id == fired.reminder_id)
            .cloned();

        let warnings = match reminder {
            Some(reminder) => {
                let after = (fired.scheduled_at.max(fired_at) + TimeDelta::seconds(1))
                    .with_timezone(&self.config.timezone);
                self.reschedule(&mut state, &reminder, &after).await
            }
            None => {
                log::warn!(
                    "Triggered notification has no reminder. [notification_id = {}, reminder_id = {}]",
                    fired.id,
                    fired.reminder_id
                );
                Vec::new()
            }
        };

        Ok(Outcome::new(fired, warnings))
    }

    pub async fn complete_notification(
        &self,
        notification_id: &str,
    ) -> Result<ScheduledNotification, LifecycleError> {
        let completed_at = self.clock.now();
        let mut state = self.state.lock().await;
        self.set_notification_status(
            &mut state,
            notification_id,
            NotificationStatus::Completed,
            completed_at,
        )
        .await
    }

    pub async fn snooze(
        &self,
        notification_id: &str,
    ) -> Result<Outcome<Option<DispatchId>>, LifecycleError> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let original = state
            .notifications
            .iter()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| LifecycleError::NotificationNotFound(notification_id.to_string()))?;

        let snoozed = ScheduledNotification {
            id: Uuid::new_v4().to_string(),
            scheduled_at: now + TimeDelta::minutes(state.settings.snooze_minutes()),
            status: NotificationStatus::Snoozed,
            dispatch_id: None,
            created_at: now,
            updated_at: None,
            ..original.clone()
        };

        let payload = payload_for(&state.settings, &snoozed);
        let dispatch_id = match self.dispatcher.schedule(payload).await {
            Ok(dispatch_id) => dispatch_id,
            Err(err) => {
                let warning = DispatchWarning::new(
                    Some(&snoozed.reminder_id),
                    DispatchOperation::Schedule,
                    err,
                );
                return Ok(Outcome::new(None, vec![warning]));
            }
        };

        log::info!(
            "Snoozed notification. [notification_id = {}, snoozed_id = {}, minutes = {}]",
            notification_id,
            snoozed.id,
            state.settings.snooze_minutes()
        );

        let mut warnings = Vec::new();
        let mut notifications = state.notifications.clone();
        notifications.push(ScheduledNotification {
            dispatch_id: Some(dispatch_id.clone()),
            ..snoozed
        });
        self.commit_notifications(&mut state, notifications, &mut warnings)
            .await;

        Ok(Outcome::new(Some(dispatch_id), warnings))
    }

    pub async fn notification_history(&self, days: i64) -> Vec<ScheduledNotification> {
        let cutoff = history_cutoff(self.clock.now(), days);
        let state = self.state.lock().await;
        within_window(&state.notifications, cutoff)
    }

    pub async fn notifications_for(&self, reminder_id: &str) -> Vec<ScheduledNotification> {
        let state = self.state.lock().await;
        state
            .notifications
            .iter()
            .filter(|n| n.reminder_id == reminder_id)
            .cloned()
            .collect()
    }

    pub async fn notification_stats(&self) -> NotificationStats {
        let state = self.state.lock().await;
        NotificationStats::collect(&state.notifications)
    }

    pub async fn notification_settings(&self) -> NotificationSettings {
        self.state.lock().await.settings.clone()
    }

    pub async fn update_notification_settings(
        &self,
        settings: NotificationSettings,
    ) -> Result<Outcome<usize>, LifecycleError> {
        if !is_known_ring_tone(&settings.default_ringtone) {
            return Err(ValidationError::UnknownRingTone(settings.default_ringtone).into());
        }

        let mut state = self.state.lock().await;
        self.settings_storage.save(&settings).await?;
        state.settings = settings;

        log::info!("Updated notification settings");

        self.reschedule_all_locked(&mut state).await
    }
}

impl ReminderService {
    async fn reschedule_all_locked(
        &self,
        state: &mut ServiceState,
    ) -> Result<Outcome<usize>, LifecycleError> {
        let now = self.now();

        let mut reminders = state.reminders.clone();
        let mut expired = 0;
        for reminder in reminders
            .iter_mut()
            .filter(|r| r.is_active && r.is_expired(&now))
        {
            reminder.is_active = false;
            reminder.updated_at = Some(now.with_timezone(&Utc));
            expired += 1;
        }

        if expired > 0 {
            self.reminder_storage.save(&reminders).await?;
            state.reminders = reminders;
            log::info!("Deactivated {} expired reminders", expired);
        }

        let mut warnings = Vec::new();
        let mut notifications = state.notifications.clone();
        prune(
            &mut notifications,
            &state.reminders,
            history_cutoff(now.with_timezone(&Utc), self.config.history_days),
        );

        let mut scheduled = 0;
        for reminder in &state.reminders {
            self.cancel_pending(&mut notifications, &state.settings, reminder, &mut warnings)
                .await;
            if let Some(notification) = self
                .schedule_next(&state.settings, reminder, &now, &mut warnings)
                .await
            {
                notifications.push(notification);
                scheduled += 1;
            }
        }

        self.commit_notifications(state, notifications, &mut warnings)
            .await;

        log::info!(
            "Rescheduled reminders. [scheduled = {}, warnings = {}]",
            scheduled,
            warnings.len()
        );

        Ok(Outcome::new(scheduled, warnings))
    }

    async fn reschedule(
        &self,
        state: &mut ServiceState,
        reminder: &ReminderRecord,
        after: &DateTime<Tz>,
    ) -> Vec<DispatchWarning> {
        let mut warnings = Vec::new();
        let mut notifications = state.notifications.clone();

        self.cancel_pending(&mut notifications, &state.settings, reminder, &mut warnings)
            .await;
        if let Some(notification) = self
            .schedule_next(&state.settings, reminder, after, &mut warnings)
            .await
        {
            notifications.push(notification);
        }

        self.commit_notifications(state, notifications, &mut warnings)
            .await;
        warnings
    }

    // Cancelling is per reminder, so live snoozes are dispatched again while
    // the reminder stays active and dropped once it is paused.
    async fn cancel_pending(
        &self,
        notifications: &mut Vec<ScheduledNotification>,
        settings: &NotificationSettings,
        reminder: &ReminderRecord,
        warnings: &mut Vec<DispatchWarning>,
    ) {
        if let Err(err) = self.dispatcher.cancel_all_for_reminder(&reminder.id).await {
            warnings.push(DispatchWarning::new(
                Some(&reminder.id),
                DispatchOperation::Cancel,
                err,
            ));
        }

        let now = self.clock.now();
        notifications.retain(|notification| {
            notification.reminder_id != reminder.id
                || match notification.status {
                    NotificationStatus::Pending => false,
                    NotificationStatus::Snoozed => {
                        reminder.is_active || notification.scheduled_at <= now
                    }
                    _ => true,
                }
        });

        if !reminder.is_active {
            return;
        }

        for snoozed in notifications.iter_mut().filter(|n| {
            n.reminder_id == reminder.id
                && n.status == NotificationStatus::Snoozed
                && n.scheduled_at > now
        }) {
            let payload = payload_for(settings, snoozed);
            snoozed.dispatch_id = match self.dispatcher.schedule(payload).await {
                Ok(dispatch_id) => Some(dispatch_id),
                Err(err) => {
                    warnings.push(DispatchWarning::new(
                        Some(&reminder.id),
                        DispatchOperation::Schedule,
                        err,
                    ));
                    None
                }
            };
        }
    }

    async fn schedule_next(
        &self,
        settings: &NotificationSettings,
        reminder: &ReminderRecord,
        after: &DateTime<Tz>,
        warnings: &mut Vec<DispatchWarning>,
    ) -> Option<ScheduledNotification> {
        if !reminder.is_active || !settings.notifications_enabled {
            return None;
        }

        let Some(trigger) = upcoming_trigger(reminder, after) else {
            log::info!(
                "Nothing left to schedule. [reminder_id = {}]",
                reminder.id
            );
            return None;
        };

        let notification = ScheduledNotification {
            id: Uuid::new_v4().to_string(),
            reminder_id: reminder.id.clone(),
            scheduled_at: trigger.with_timezone(&Utc),
            title: reminder.title.clone(),
            description: reminder.description.clone(),
            category: reminder.category,
            ring_tone: reminder.ring_tone.clone(),
            status: NotificationStatus::Pending,
            dispatch_id: None,
            created_at: self.clock.now(),
            updated_at: None,
        };

        let payload = payload_for(settings, &notification);
        match self.dispatcher.schedule(payload).await {
            Ok(dispatch_id) => {
                log::info!(
                    "[SCHEDULE] Next trigger at {}. [reminder_id = {}, notification_id = {}]",
                    trigger,
                    reminder.id,
                    notification.id
                );
                Some(ScheduledNotification {
                    dispatch_id: Some(dispatch_id),
                    ..notification
                })
            }
            Err(err) => {
                warnings.push(DispatchWarning::new(
                    Some(&reminder.id),
                    DispatchOperation::Schedule,
                    err,
                ));
                None
            }
        }
    }

    async fn commit_notifications(
        &self,
        state: &mut ServiceState,
        notifications: Vec<ScheduledNotification>,
        warnings: &mut Vec<DispatchWarning>,
    ) {
        if let Err(err) = self.notification_storage.save(&notifications).await {
            warnings.push(DispatchWarning::new(
                None,
                DispatchOperation::RecordHistory,
                err,
            ));
        }
        state.notifications = notifications;
    }

    async fn set_notification_status(
        &self,
        state: &mut ServiceState,
        notification_id: &str,
        status: NotificationStatus,
        at: DateTime<Utc>,
    ) -> Result<ScheduledNotification, LifecycleError> {
        let mut notifications = state.notifications.clone();
        let notification = notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| LifecycleError::NotificationNotFound(notification_id.to_string()))?;

        notification.status = status;
        notification.updated_at = Some(at);
        let updated = notification.clone();

        self.notification_storage.save(&notifications).await?;
        state.notifications = notifications;

        Ok(updated)
    }
}

fn find_reminder(reminders: &[ReminderRecord], id: &str) -> Result<usize, LifecycleError> {
    reminders
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| LifecycleError::NotFound(id.to_string()))
}

fn upcoming_trigger(reminder: &ReminderRecord, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let trigger = next_trigger(&reminder.recurrence, after);
    if trigger < *after {
        return None;
    }

    match reminder.expiry_date {
        Some(expiry) if trigger.date_naive() > expiry => None,
        _ => Some(trigger),
    }
}

fn resolve_ring_tone(input: &ReminderInput, settings: &NotificationSettings) -> String {
    input
        .ring_tone
        .clone()
        .unwrap_or_else(|| settings.default_ringtone.clone())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn body_of(notification: &ScheduledNotification) -> String {
    let body = notification.description.as_deref().unwrap_or(DEFAULT_BODY);
    match notification.status {
        NotificationStatus::Snoozed => format!("Snoozed: {}", body),
        _ => body.to_string(),
    }
}

fn payload_for(
    settings: &NotificationSettings,
    notification: &ScheduledNotification,
) -> NotificationPayload {
    NotificationPayload {
        reminder_id: notification.reminder_id.clone(),
        notification_id: notification.id.clone(),
        title: notification.title.clone(),
        body: body_of(notification),
        trigger_at: notification.scheduled_at,
        sound: settings.sound_for(&notification.ring_tone),
        channel_hint: settings.channel_hint(&notification.ring_tone),
        vibration: settings.vibration(),
        timeout: settings.timeout(),
    }
}
