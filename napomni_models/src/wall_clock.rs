use std::fmt;

use chrono::{NaiveTime, Timelike};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallClockTime {
    hours: u8,
    minutes: u8,
}

impl WallClockTime {
    pub const MIDNIGHT: WallClockTime = WallClockTime {
        hours: 0,
        minutes: 0,
    };

    pub fn new(hours: u8, minutes: u8) -> Result<Self, ValidationError> {
        if hours > 23 || minutes > 59 {
            return Err(ValidationError::WallClockOutOfRange { hours, minutes });
        }

        Ok(Self { hours, minutes })
    }

    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            hours: time.hour() as u8,
            minutes: time.minute() as u8,
        }
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        u32::from(self.hours) * 60 + u32::from(self.minutes)
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hours.into(), self.minutes.into(), 0).unwrap_or_default()
    }
}

impl From<NaiveTime> for WallClockTime {
    fn from(value: NaiveTime) -> Self {
        Self::from_time(value)
    }
}

impl fmt::Display for WallClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let period = if self.hours >= 12 { "PM" } else { "AM" };
        let display_hours = match self.hours % 12 {
            0 => 12,
            hours => hours,
        };

        write!(f, "{}:{:02} {}", display_hours, self.minutes, period)
    }
}
