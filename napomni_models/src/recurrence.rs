use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::wall_clock::WallClockTime;

pub const DEFAULT_CYCLE_PERIOD_DAYS: u32 = 15;
pub const MAX_HOURLY_INTERVAL: u32 = 24 * 31;

// chrono::Weekday has no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn short_name(&self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        }
    }

    pub fn from_short_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|day| day.short_name().eq_ignore_ascii_case(name))
    }

    pub fn num_days_from_monday(&self) -> u32 {
        *self as u32
    }

    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Weekday::Mon => chrono::Weekday::Mon,
            Weekday::Tue => chrono::Weekday::Tue,
            Weekday::Wed => chrono::Weekday::Wed,
            Weekday::Thu => chrono::Weekday::Thu,
            Weekday::Fri => chrono::Weekday::Fri,
            Weekday::Sat => chrono::Weekday::Sat,
            Weekday::Sun => chrono::Weekday::Sun,
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
            chrono::Weekday::Sun => Weekday::Sun,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyTimes(BTreeMap<Weekday, BTreeSet<WallClockTime>>);

impl WeeklyTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, day: Weekday, time: WallClockTime) {
        self.0.entry(day).or_default().insert(time);
    }

    pub fn remove(&mut self, day: Weekday, time: WallClockTime) {
        if let Some(times) = self.0.get_mut(&day) {
            times.remove(&time);
            if times.is_empty() {
                self.0.remove(&day);
            }
        }
    }

    pub fn set_day(&mut self, day: Weekday, times: impl IntoIterator<Item = WallClockTime>) {
        let times: BTreeSet<_> = times.into_iter().collect();
        if times.is_empty() {
            self.0.remove(&day);
        } else {
            self.0.insert(day, times);
        }
    }

    pub fn times_for(&self, day: Weekday) -> Option<&BTreeSet<WallClockTime>> {
        self.0.get(&day)
    }

    pub fn days(&self) -> impl Iterator<Item = (Weekday, &BTreeSet<WallClockTime>)> {
        self.0.iter().map(|(day, times)| (*day, times))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, WallClockTime)> + '_ {
        self.0
            .iter()
            .flat_map(|(day, times)| times.iter().map(move |time| (*day, *time)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Weekday, WallClockTime)> for WeeklyTimes {
    fn from_iter<I: IntoIterator<Item = (Weekday, WallClockTime)>>(iter: I) -> Self {
        let mut weekly = WeeklyTimes::new();
        for (day, time) in iter {
            weekly.insert(day, time);
        }
        weekly
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOfMonth {
    Day(u8),
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat<T> {
    Every,
    Specific(T),
}

impl<T: Copy> Repeat<T> {
    pub fn specific_or(&self, current: T) -> T {
        match self {
            Repeat::Every => current,
            Repeat::Specific(value) => *value,
        }
    }

    pub fn is_every(&self) -> bool {
        matches!(self, Repeat::Every)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomRecurrence {
    pub year: Repeat<i32>,
    pub month: Repeat<u32>,
    pub date: Repeat<u32>,
    pub time_of_day: WallClockTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceSpec {
    Hourly {
        interval_hours: u32,
        start_time: WallClockTime,
    },
    Weekly {
        days_with_times: WeeklyTimes,
    },
    FixedCycle {
        anchor_date: NaiveDate,
        time_of_day: WallClockTime,
        period_days: u32,
    },
    Monthly {
        day_of_month: DayOfMonth,
        time_of_day: WallClockTime,
    },
    Custom(CustomRecurrence),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecurrenceKind {
    Hourly,
    Weekly,
    FixedCycle,
    Monthly,
    Custom,
}

impl RecurrenceKind {
    pub const ALL: [RecurrenceKind; 5] = [
        RecurrenceKind::Hourly,
        RecurrenceKind::Weekly,
        RecurrenceKind::FixedCycle,
        RecurrenceKind::Monthly,
        RecurrenceKind::Custom,
    ];

    pub fn frequency_rank(&self) -> u8 {
        match self {
            RecurrenceKind::Hourly => 1,
            RecurrenceKind::Weekly => 2,
            RecurrenceKind::FixedCycle => 3,
            RecurrenceKind::Monthly => 4,
            RecurrenceKind::Custom => 5,
        }
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecurrenceKind::Hourly => "hourly",
            RecurrenceKind::Weekly => "weekly",
            RecurrenceKind::FixedCycle => "fixed cycle",
            RecurrenceKind::Monthly => "monthly",
            RecurrenceKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl RecurrenceSpec {
    pub fn kind(&self) -> RecurrenceKind {
        match self {
            RecurrenceSpec::Hourly { .. } => RecurrenceKind::Hourly,
            RecurrenceSpec::Weekly { .. } => RecurrenceKind::Weekly,
            RecurrenceSpec::FixedCycle { .. } => RecurrenceKind::FixedCycle,
            RecurrenceSpec::Monthly { .. } => RecurrenceKind::Monthly,
            RecurrenceSpec::Custom(_) => RecurrenceKind::Custom,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            RecurrenceSpec::Hourly { interval_hours, .. } => {
                if !(1..=MAX_HOURLY_INTERVAL).contains(interval_hours) {
                    return Err(ValidationError::HourlyIntervalOutOfRange {
                        interval: *interval_hours,
                        max: MAX_HOURLY_INTERVAL,
                    });
                }
            }
            RecurrenceSpec::Weekly { days_with_times } => {
                if days_with_times.is_empty() {
                    return Err(ValidationError::EmptyWeeklySchedule);
                }
            }
            RecurrenceSpec::FixedCycle { period_days, .. } => {
                if *period_days == 0 {
                    return Err(ValidationError::EmptyCyclePeriod);
                }
            }
            RecurrenceSpec::Monthly { day_of_month, .. } => {
                if let DayOfMonth::Day(day) = day_of_month {
                    if !(1..=31).contains(day) {
                        return Err(ValidationError::DayOfMonthOutOfRange(*day));
                    }
                }
            }
            RecurrenceSpec::Custom(custom) => {
                if let Repeat::Specific(year) = custom.year {
                    if !(1000..=9999).contains(&year) {
                        return Err(ValidationError::CustomYearOutOfRange(year));
                    }
                }
                if let Repeat::Specific(month) = custom.month {
                    if !(1..=12).contains(&month) {
                        return Err(ValidationError::CustomMonthOutOfRange(month));
                    }
                }
                if let Repeat::Specific(date) = custom.date {
                    if !(1..=31).contains(&date) {
                        return Err(ValidationError::CustomDateOutOfRange(date));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hours: u8, minutes: u8) -> WallClockTime {
        WallClockTime::new(hours, minutes).unwrap()
    }

    #[test]
    fn weekly_times_prune_empty_days() {
        let mut weekly = WeeklyTimes::new();
        weekly.insert(Weekday::Mon, at(9, 0));
        weekly.insert(Weekday::Thu, at(18, 0));

        weekly.remove(Weekday::Mon, at(9, 0));
        assert!(weekly.times_for(Weekday::Mon).is_none());

        weekly.set_day(Weekday::Thu, []);
        assert!(weekly.is_empty());
    }

    #[test]
    fn weekly_times_iterate_in_calendar_order() {
        let weekly: WeeklyTimes = [
            (Weekday::Thu, at(18, 0)),
            (Weekday::Mon, at(9, 0)),
            (Weekday::Mon, at(7, 30)),
            (Weekday::Mon, at(9, 0)),
        ]
        .into_iter()
        .collect();

        let pairs: Vec<_> = weekly.iter().collect();
        assert_eq!(
            pairs,
            vec![
                (Weekday::Mon, at(7, 30)),
                (Weekday::Mon, at(9, 0)),
                (Weekday::Thu, at(18, 0)),
            ]
        );
    }

    #[test]
    fn weekday_converts_both_ways() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::from(day.to_chrono()), day);
            assert_eq!(
                day.num_days_from_monday(),
                day.to_chrono().num_days_from_monday()
            );
            assert_eq!(Weekday::from_short_name(day.short_name()), Some(day));
        }
    }

    #[test]
    fn hourly_interval_bounds() {
        let valid = RecurrenceSpec::Hourly {
            interval_hours: 1,
            start_time: at(9, 0),
        };
        let zero = RecurrenceSpec::Hourly {
            interval_hours: 0,
            start_time: at(9, 0),
        };
        let too_long = RecurrenceSpec::Hourly {
            interval_hours: MAX_HOURLY_INTERVAL + 1,
            start_time: at(9, 0),
        };

        assert_eq!(valid.validate(), Ok(()));
        assert!(matches!(
            zero.validate(),
            Err(ValidationError::HourlyIntervalOutOfRange { interval: 0, .. })
        ));
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn weekly_requires_a_time() {
        let spec = RecurrenceSpec::Weekly {
            days_with_times: WeeklyTimes::new(),
        };

        assert_eq!(spec.validate(), Err(ValidationError::EmptyWeeklySchedule));
    }

    #[test]
    fn fixed_cycle_requires_positive_period() {
        let spec = RecurrenceSpec::FixedCycle {
            anchor_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time_of_day: at(8, 0),
            period_days: 0,
        };

        assert_eq!(spec.validate(), Err(ValidationError::EmptyCyclePeriod));
    }

    #[test]
    fn monthly_day_range() {
        let last = RecurrenceSpec::Monthly {
            day_of_month: DayOfMonth::Last,
            time_of_day: at(23, 0),
        };
        let thirty_second = RecurrenceSpec::Monthly {
            day_of_month: DayOfMonth::Day(32),
            time_of_day: at(23, 0),
        };

        assert_eq!(last.validate(), Ok(()));
        assert_eq!(
            thirty_second.validate(),
            Err(ValidationError::DayOfMonthOutOfRange(32))
        );
    }

    #[test]
    fn custom_accepts_loose_dates() {
        let february_31 = RecurrenceSpec::Custom(CustomRecurrence {
            year: Repeat::Every,
            month: Repeat::Specific(2),
            date: Repeat::Specific(31),
            time_of_day: at(10, 0),
        });

        assert_eq!(february_31.validate(), Ok(()));
    }

    #[test]
    fn custom_rejects_out_of_range_values() {
        let base = CustomRecurrence {
            year: Repeat::Every,
            month: Repeat::Every,
            date: Repeat::Every,
            time_of_day: at(10, 0),
        };

        let bad_year = RecurrenceSpec::Custom(CustomRecurrence {
            year: Repeat::Specific(999),
            ..base
        });
        let bad_month = RecurrenceSpec::Custom(CustomRecurrence {
            month: Repeat::Specific(13),
            ..base
        });
        let bad_date = RecurrenceSpec::Custom(CustomRecurrence {
            date: Repeat::Specific(0),
            ..base
        });

        assert_eq!(
            bad_year.validate(),
            Err(ValidationError::CustomYearOutOfRange(999))
        );
        assert_eq!(
            bad_month.validate(),
            Err(ValidationError::CustomMonthOutOfRange(13))
        );
        assert_eq!(
            bad_date.validate(),
            Err(ValidationError::CustomDateOutOfRange(0))
        );
    }

    #[test]
    fn frequency_rank_orders_kinds() {
        let ranks: Vec<_> = RecurrenceKind::ALL
            .iter()
            .map(RecurrenceKind::frequency_rank)
            .collect();

        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }
}
