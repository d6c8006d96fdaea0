use chrono::{DateTime, Utc};

use crate::reminder::{Category, ReminderId};

pub type NotificationId = String;
pub type DispatchId = String;

pub const NOTIFICATION_HISTORY_DAYS: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationStatus {
    Pending,
    Triggered,
    Completed,
    Snoozed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledNotification {
    pub id: NotificationId,
    pub reminder_id: ReminderId,
    pub scheduled_at: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub ring_tone: String,
    pub status: NotificationStatus,
    pub dispatch_id: Option<DispatchId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotificationStats {
    pub total: usize,
    pub pending: usize,
    pub triggered: usize,
    pub completed: usize,
    pub snoozed: usize,
}

impl NotificationStats {
    pub fn collect<'a>(notifications: impl IntoIterator<Item = &'a ScheduledNotification>) -> Self {
        notifications
            .into_iter()
            .fold(Self::default(), |mut stats, notification| {
                stats.total += 1;
                match notification.status {
                    NotificationStatus::Pending => stats.pending += 1,
                    NotificationStatus::Triggered => stats.triggered += 1,
                    NotificationStatus::Completed => stats.completed += 1,
                    NotificationStatus::Snoozed => stats.snoozed += 1,
                }
                stats
            })
    }
}
