use chrono::{DateTime, TimeZone, Utc};
use napomni_models::recurrence::{DayOfMonth, RecurrenceSpec};
use napomni_models::reminder::{Category, Priority, ReminderRecord};
use napomni_models::wall_clock::WallClockTime;

pub(crate) fn at(hours: u8, minutes: u8) -> WallClockTime {
    WallClockTime::new(hours, minutes).unwrap()
}

pub(crate) fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub(crate) fn monthly(day: u8, hours: u8) -> RecurrenceSpec {
    RecurrenceSpec::Monthly {
        day_of_month: DayOfMonth::Day(day),
        time_of_day: at(hours, 0),
    }
}

pub(crate) fn record(id: &str, title: &str, created_at: DateTime<Utc>) -> ReminderRecord {
    ReminderRecord {
        id: id.to_string(),
        category: Category::Others,
        title: title.to_string(),
        description: None,
        recurrence: monthly(1, 9),
        priority: Priority::Normal,
        ring_tone: "default".to_string(),
        is_active: true,
        created_at,
        updated_at: None,
        expiry_date: None,
    }
}
