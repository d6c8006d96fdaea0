use chrono::{DateTime, TimeZone};
use napomni_models::recurrence::{CustomRecurrence, DayOfMonth, RecurrenceSpec, Repeat, Weekday};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn describe(spec: &RecurrenceSpec) -> String {
    match spec {
        RecurrenceSpec::Hourly {
            interval_hours: 1,
            start_time,
        } => format!("Every hour from {}", start_time),
        RecurrenceSpec::Hourly {
            interval_hours,
            start_time,
        } => format!("Every {} hours from {}", interval_hours, start_time),
        RecurrenceSpec::Weekly { days_with_times } => {
            let mut days = days_with_times.days().peekable();
            let Some((_, first_times)) = days.peek().copied() else {
                return "No days selected".to_string();
            };

            let shared_times = days_with_times.days().all(|(_, times)| times == first_times);
            if shared_times {
                let day_names = if days_with_times.days().count() == Weekday::ALL.len() {
                    "Every day".to_string()
                } else {
                    join(days_with_times.days().map(|(day, _)| day.to_string()), ", ")
                };
                format!(
                    "{} at {}",
                    day_names,
                    join(first_times.iter().map(ToString::to_string), ", ")
                )
            } else {
                join(
                    days_with_times.days().map(|(day, times)| {
                        format!(
                            "{} at {}",
                            day,
                            join(times.iter().map(ToString::to_string), ", ")
                        )
                    }),
                    "; ",
                )
            }
        }
        RecurrenceSpec::FixedCycle {
            time_of_day,
            period_days: 1,
            ..
        } => format!("Every day at {}", time_of_day),
        RecurrenceSpec::FixedCycle {
            time_of_day,
            period_days,
            ..
        } => format!("Every {} days at {}", period_days, time_of_day),
        RecurrenceSpec::Monthly {
            day_of_month: DayOfMonth::Last,
            time_of_day,
        } => format!("Last day of each month at {}", time_of_day),
        RecurrenceSpec::Monthly {
            day_of_month: DayOfMonth::Day(day),
            time_of_day,
        } => format!(
            "{}{} of each month at {}",
            day,
            day_suffix(u32::from(*day)),
            time_of_day
        ),
        RecurrenceSpec::Custom(custom) => describe_custom(custom),
    }
}

fn describe_custom(custom: &CustomRecurrence) -> String {
    let time = custom.time_of_day;
    match (custom.year, custom.month, custom.date) {
        (_, _, Repeat::Every) if custom.month.is_every() && custom.year.is_every() => {
            format!("Every day at {}", time)
        }
        (Repeat::Every, Repeat::Every, Repeat::Specific(date)) => {
            format!("{}{} of each month at {}", date, day_suffix(date), time)
        }
        (Repeat::Every, Repeat::Specific(month), Repeat::Specific(date)) => {
            format!("Every year on {} {} at {}", month_name(month), date, time)
        }
        (Repeat::Specific(year), Repeat::Specific(month), Repeat::Specific(date)) => {
            format!("Once on {:04}-{:02}-{:02} at {}", year, month, date, time)
        }
        (year, month, date) => format!(
            "Year {}, month {}, day {} at {}",
            repeat_label(year),
            repeat_label(month),
            repeat_label(date),
            time
        ),
    }
}

pub fn format_relative<Tz: TimeZone>(trigger: &DateTime<Tz>, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let diff = trigger.clone() - now.clone();
    if diff < chrono::TimeDelta::zero() {
        return "overdue".to_string();
    }

    let minutes = diff.num_minutes();
    let hours = diff.num_hours();
    if minutes < 60 {
        format!("in {} min", minutes)
    } else if hours < 24 {
        format!("in {}h {}m", hours, minutes % 60)
    } else {
        trigger.format("%b %-d, %H:%M").to_string()
    }
}

pub fn day_suffix(day: u32) -> &'static str {
    if (4..=20).contains(&day) {
        return "th";
    }

    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES.get(index as usize))
        .copied()
        .unwrap_or("?")
}

fn repeat_label<T: std::fmt::Display>(repeat: Repeat<T>) -> String {
    match repeat {
        Repeat::Every => "every".to_string(),
        Repeat::Specific(value) => value.to_string(),
    }
}

fn join(items: impl Iterator<Item = String>, separator: &str) -> String {
    items.collect::<Vec<_>>().join(separator)
}
