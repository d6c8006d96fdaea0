use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Reminder title must not be empty")]
    EmptyTitle,

    #[error("Wall clock time is out of range [hours = {hours}, minutes = {minutes}]")]
    WallClockOutOfRange { hours: u8, minutes: u8 },

    #[error("Hourly interval must be between 1 and {max} hours, got {interval}")]
    HourlyIntervalOutOfRange { interval: u32, max: u32 },

    #[error("Weekly reminder needs at least one weekday with at least one time")]
    EmptyWeeklySchedule,

    #[error("Fixed cycle period must be at least one day")]
    EmptyCyclePeriod,

    #[error("Day of month must be between 1 and 31 or 'last', got {0}")]
    DayOfMonthOutOfRange(u8),

    #[error("Custom year must have four digits, got {0}")]
    CustomYearOutOfRange(i32),

    #[error("Custom month must be between 1 and 12, got {0}")]
    CustomMonthOutOfRange(u32),

    #[error("Custom date must be between 1 and 31, got {0}")]
    CustomDateOutOfRange(u32),

    #[error("Unknown ring tone {0}")]
    UnknownRingTone(String),

    #[error("Expiry date {expiry} is before today ({today})")]
    ExpiryInPast { expiry: NaiveDate, today: NaiveDate },
}
