use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use napomni_models::error::ValidationError;
use napomni_models::notification::{NotificationStatus, ScheduledNotification};
use napomni_models::recurrence::{
    CustomRecurrence, DEFAULT_CYCLE_PERIOD_DAYS, DayOfMonth, RecurrenceSpec, Repeat, Weekday,
    WeeklyTimes,
};
use napomni_models::reminder::{Category, DEFAULT_RING_TONE, Priority, ReminderRecord};
use napomni_models::wall_clock::WallClockTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Custom schedule marks {0} as specific but stores no value")]
    MissingCustomValue(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredWallClock {
    pub hours: u8,
    pub minutes: u8,
}

impl From<WallClockTime> for StoredWallClock {
    fn from(value: WallClockTime) -> Self {
        Self {
            hours: value.hours(),
            minutes: value.minutes(),
        }
    }
}

impl TryFrom<StoredWallClock> for WallClockTime {
    type Error = ValidationError;

    fn try_from(value: StoredWallClock) -> Result<Self, Self::Error> {
        WallClockTime::new(value.hours, value.minutes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StoredWeekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl From<Weekday> for StoredWeekday {
    fn from(value: Weekday) -> Self {
        match value {
            Weekday::Mon => StoredWeekday::Mon,
            Weekday::Tue => StoredWeekday::Tue,
            Weekday::Wed => StoredWeekday::Wed,
            Weekday::Thu => StoredWeekday::Thu,
            Weekday::Fri => StoredWeekday::Fri,
            Weekday::Sat => StoredWeekday::Sat,
            Weekday::Sun => StoredWeekday::Sun,
        }
    }
}

impl From<StoredWeekday> for Weekday {
    fn from(value: StoredWeekday) -> Self {
        match value {
            StoredWeekday::Mon => Weekday::Mon,
            StoredWeekday::Tue => Weekday::Tue,
            StoredWeekday::Wed => Weekday::Wed,
            StoredWeekday::Thu => Weekday::Thu,
            StoredWeekday::Fri => Weekday::Fri,
            StoredWeekday::Sat => Weekday::Sat,
            StoredWeekday::Sun => Weekday::Sun,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthlyKeyword {
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredMonthlyDate {
    Day(u8),
    Keyword(MonthlyKeyword),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredRepeat {
    Specific,
    Every,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCustomSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<u32>,
    pub time: StoredWallClock,
    pub year_repeat: StoredRepeat,
    pub month_repeat: StoredRepeat,
    pub date_repeat: StoredRepeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoredRecurrence {
    #[serde(rename = "hourly", rename_all = "camelCase")]
    Hourly {
        hourly_interval: u32,
        hourly_start_time: StoredWallClock,
    },
    #[serde(rename = "weekly", rename_all = "camelCase")]
    Weekly {
        weekly_times: BTreeMap<StoredWeekday, Vec<StoredWallClock>>,
    },
    #[serde(rename = "15days", rename_all = "camelCase")]
    FifteenDays {
        fifteen_days_start: NaiveDate,
        fifteen_days_time: StoredWallClock,
        #[serde(default = "default_cycle_period")]
        fifteen_days_period: u32,
    },
    #[serde(rename = "monthly", rename_all = "camelCase")]
    Monthly {
        monthly_date: StoredMonthlyDate,
        monthly_time: StoredWallClock,
    },
    #[serde(rename = "custom", rename_all = "camelCase")]
    Custom {
        custom_settings: StoredCustomSettings,
    },
}

fn default_cycle_period() -> u32 {
    DEFAULT_CYCLE_PERIOD_DAYS
}

fn default_ring_tone() -> String {
    DEFAULT_RING_TONE.to_string()
}

fn default_active() -> bool {
    true
}

fn default_priority() -> String {
    "normal".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReminder {
    pub id: String,
    pub category: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub recurrence: StoredRecurrence,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_ring_tone")]
    pub ring_tone: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

pub fn to_storage(record: &ReminderRecord) -> StoredReminder {
    StoredReminder::from(record)
}

pub fn from_storage(stored: StoredReminder) -> Result<ReminderRecord, CodecError> {
    ReminderRecord::try_from(stored)
}

impl From<&RecurrenceSpec> for StoredRecurrence {
    fn from(value: &RecurrenceSpec) -> Self {
        match value {
            RecurrenceSpec::Hourly {
                interval_hours,
                start_time,
            } => StoredRecurrence::Hourly {
                hourly_interval: *interval_hours,
                hourly_start_time: (*start_time).into(),
            },
            RecurrenceSpec::Weekly { days_with_times } => StoredRecurrence::Weekly {
                weekly_times: days_with_times
                    .days()
                    .map(|(day, times)| {
                        (
                            StoredWeekday::from(day),
                            times
                                .iter()
                                .copied()
                                .map(StoredWallClock::from)
                                .collect::<Vec<_>>(),
                        )
                    })
                    .collect(),
            },
            RecurrenceSpec::FixedCycle {
                anchor_date,
                time_of_day,
                period_days,
            } => StoredRecurrence::FifteenDays {
                fifteen_days_start: *anchor_date,
                fifteen_days_time: (*time_of_day).into(),
                fifteen_days_period: *period_days,
            },
            RecurrenceSpec::Monthly {
                day_of_month,
                time_of_day,
            } => StoredRecurrence::Monthly {
                monthly_date: match day_of_month {
                    DayOfMonth::Day(day) => StoredMonthlyDate::Day(*day),
                    DayOfMonth::Last => StoredMonthlyDate::Keyword(MonthlyKeyword::Last),
                },
                monthly_time: (*time_of_day).into(),
            },
            RecurrenceSpec::Custom(custom) => {
                let (year, year_repeat) = split_repeat(custom.year);
                let (month, month_repeat) = split_repeat(custom.month);
                let (date, date_repeat) = split_repeat(custom.date);

                StoredRecurrence::Custom {
                    custom_settings: StoredCustomSettings {
                        year,
                        month,
                        date,
                        time: custom.time_of_day.into(),
                        year_repeat,
                        month_repeat,
                        date_repeat,
                    },
                }
            }
        }
    }
}

impl TryFrom<StoredRecurrence> for RecurrenceSpec {
    type Error = CodecError;

    fn try_from(value: StoredRecurrence) -> Result<Self, Self::Error> {
        let spec = match value {
            StoredRecurrence::Hourly {
                hourly_interval,
                hourly_start_time,
            } => RecurrenceSpec::Hourly {
                interval_hours: hourly_interval,
                start_time: hourly_start_time.try_into()?,
            },
            StoredRecurrence::Weekly { weekly_times } => {
                let mut days_with_times = WeeklyTimes::new();
                for (day, times) in weekly_times {
                    for time in times {
                        days_with_times.insert(Weekday::from(day), time.try_into()?);
                    }
                }
                RecurrenceSpec::Weekly { days_with_times }
            }
            StoredRecurrence::FifteenDays {
                fifteen_days_start,
                fifteen_days_time,
                fifteen_days_period,
            } => RecurrenceSpec::FixedCycle {
                anchor_date: fifteen_days_start,
                time_of_day: fifteen_days_time.try_into()?,
                period_days: fifteen_days_period,
            },
            StoredRecurrence::Monthly {
                monthly_date,
                monthly_time,
            } => RecurrenceSpec::Monthly {
                day_of_month: match monthly_date {
                    StoredMonthlyDate::Day(day) => DayOfMonth::Day(day),
                    StoredMonthlyDate::Keyword(MonthlyKeyword::Last) => DayOfMonth::Last,
                },
                time_of_day: monthly_time.try_into()?,
            },
            StoredRecurrence::Custom { custom_settings } => {
                RecurrenceSpec::Custom(CustomRecurrence {
                    year: join_repeat(custom_settings.year, custom_settings.year_repeat, "year")?,
                    month: join_repeat(
                        custom_settings.month,
                        custom_settings.month_repeat,
                        "month",
                    )?,
                    date: join_repeat(custom_settings.date, custom_settings.date_repeat, "date")?,
                    time_of_day: custom_settings.time.try_into()?,
                })
            }
        };

        spec.validate()?;
        Ok(spec)
    }
}

fn split_repeat<T: Copy>(repeat: Repeat<T>) -> (Option<T>, StoredRepeat) {
    match repeat {
        Repeat::Every => (None, StoredRepeat::Every),
        Repeat::Specific(value) => (Some(value), StoredRepeat::Specific),
    }
}

fn join_repeat<T>(
    value: Option<T>,
    repeat: StoredRepeat,
    field: &'static str,
) -> Result<Repeat<T>, CodecError> {
    match (repeat, value) {
        (StoredRepeat::Every, _) => Ok(Repeat::Every),
        (StoredRepeat::Specific, Some(value)) => Ok(Repeat::Specific(value)),
        (StoredRepeat::Specific, None) => Err(CodecError::MissingCustomValue(field)),
    }
}

impl From<&ReminderRecord> for StoredReminder {
    fn from(value: &ReminderRecord) -> Self {
        Self {
            id: value.id.clone(),
            category: category_name(value.category).to_string(),
            title: value.title.clone(),
            description: value.description.clone(),
            recurrence: (&value.recurrence).into(),
            priority: priority_name(value.priority).to_string(),
            ring_tone: value.ring_tone.clone(),
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
            expiry_date: value.expiry_date,
        }
    }
}

impl TryFrom<StoredReminder> for ReminderRecord {
    type Error = CodecError;

    fn try_from(value: StoredReminder) -> Result<Self, Self::Error> {
        Ok(Self {
            category: parse_category(&value.category),
            priority: parse_priority(&value.priority),
            recurrence: value.recurrence.try_into()?,
            id: value.id,
            title: value.title,
            description: value.description,
            ring_tone: value.ring_tone,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
            expiry_date: value.expiry_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNotification {
    pub id: String,
    pub reminder_id: String,
    pub scheduled_time: DateTime<Utc>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(default = "default_ring_tone")]
    pub ring_tone: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&ScheduledNotification> for StoredNotification {
    fn from(value: &ScheduledNotification) -> Self {
        Self {
            id: value.id.clone(),
            reminder_id: value.reminder_id.clone(),
            scheduled_time: value.scheduled_at,
            title: value.title.clone(),
            description: value.description.clone(),
            category: category_name(value.category).to_string(),
            ring_tone: value.ring_tone.clone(),
            status: status_name(value.status).to_string(),
            dispatch_id: value.dispatch_id.clone(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<StoredNotification> for ScheduledNotification {
    fn from(value: StoredNotification) -> Self {
        Self {
            category: parse_category(&value.category),
            status: parse_status(&value.status),
            id: value.id,
            reminder_id: value.reminder_id,
            scheduled_at: value.scheduled_time,
            title: value.title,
            description: value.description,
            ring_tone: value.ring_tone,
            dispatch_id: value.dispatch_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

fn category_name(category: Category) -> &'static str {
    match category {
        Category::Medication => "medication",
        Category::Fitness => "fitness",
        Category::Habits => "habits",
        Category::Others => "others",
    }
}

fn parse_category(category: &str) -> Category {
    match category {
        "medication" => Category::Medication,
        "fitness" => Category::Fitness,
        "habits" => Category::Habits,
        "others" => Category::Others,
        other => {
            log::warn!("Unknown category {}, defaulting to others", other);
            Category::Others
        }
    }
}

fn priority_name(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Normal => "normal",
        Priority::High => "high",
        Priority::Urgent => "urgent",
    }
}

fn parse_priority(priority: &str) -> Priority {
    match priority {
        "low" => Priority::Low,
        "normal" => Priority::Normal,
        "high" => Priority::High,
        "urgent" => Priority::Urgent,
        other => {
            log::warn!("Unknown priority {}, defaulting to normal", other);
            Priority::Normal
        }
    }
}

fn status_name(status: NotificationStatus) -> &'static str {
    match status {
        NotificationStatus::Pending => "pending",
        NotificationStatus::Triggered => "triggered",
        NotificationStatus::Completed => "completed",
        NotificationStatus::Snoozed => "snoozed",
    }
}

fn parse_status(status: &str) -> NotificationStatus {
    match status {
        "pending" => NotificationStatus::Pending,
        "triggered" => NotificationStatus::Triggered,
        "completed" => NotificationStatus::Completed,
        "snoozed" => NotificationStatus::Snoozed,
        other => {
            log::warn!("Unknown notification status {}, defaulting to triggered", other);
            NotificationStatus::Triggered
        }
    }
}
