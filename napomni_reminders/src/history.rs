use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use napomni_models::notification::ScheduledNotification;
use napomni_models::reminder::ReminderRecord;

pub(crate) fn history_cutoff(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - TimeDelta::days(days)
}

pub(crate) fn prune(
    notifications: &mut Vec<ScheduledNotification>,
    reminders: &[ReminderRecord],
    cutoff: DateTime<Utc>,
) -> usize {
    let known: HashSet<&str> = reminders.iter().map(|r| r.id.as_str()).collect();
    let before = notifications.len();

    notifications.retain(|notification| {
        notification.created_at >= cutoff && known.contains(notification.reminder_id.as_str())
    });

    before - notifications.len()
}

pub(crate) fn within_window(
    notifications: &[ScheduledNotification],
    cutoff: DateTime<Utc>,
) -> Vec<ScheduledNotification> {
    notifications
        .iter()
        .filter(|notification| notification.created_at >= cutoff)
        .cloned()
        .collect()
}
