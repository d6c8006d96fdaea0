use chrono::{DateTime, Datelike, Days, NaiveDate, TimeDelta, TimeZone};
use napomni_models::recurrence::{CustomRecurrence, DayOfMonth, RecurrenceSpec, WeeklyTimes};
use napomni_models::wall_clock::WallClockTime;

// A custom schedule with no occurrence left resolves to its past candidate.
pub fn next_trigger<Tz: TimeZone>(spec: &RecurrenceSpec, now: &DateTime<Tz>) -> DateTime<Tz> {
    match spec {
        RecurrenceSpec::Hourly {
            interval_hours,
            start_time,
        } => next_hourly(*interval_hours, *start_time, now),
        RecurrenceSpec::Weekly { days_with_times } => next_weekly(days_with_times, now),
        RecurrenceSpec::FixedCycle {
            anchor_date,
            time_of_day,
            period_days,
        } => next_fixed_cycle(*anchor_date, *time_of_day, *period_days, now),
        RecurrenceSpec::Monthly {
            day_of_month,
            time_of_day,
        } => next_monthly(*day_of_month, *time_of_day, now),
        RecurrenceSpec::Custom(custom) => next_custom(custom, now),
    }
}

pub fn has_future_occurrence<Tz: TimeZone>(spec: &RecurrenceSpec, now: &DateTime<Tz>) -> bool {
    match spec {
        RecurrenceSpec::Weekly { days_with_times } if days_with_times.is_empty() => false,
        _ => next_trigger(spec, now) >= *now,
    }
}

// Ambiguous local times take the earlier mapping. Times in a DST gap move
// forward by whole hours.
pub fn localize<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: WallClockTime) -> DateTime<Tz> {
    let naive = date.and_time(time.to_naive_time());
    if let Some(local) = tz.from_local_datetime(&naive).earliest() {
        return local;
    }

    for hours in 1..=3 {
        let shifted = naive.checked_add_signed(TimeDelta::hours(hours));
        if let Some(local) = shifted.and_then(|s| tz.from_local_datetime(&s).earliest()) {
            return local;
        }
    }

    log::warn!(
        "Could not map local time, falling back to UTC reading. [local = {}]",
        naive
    );
    tz.from_utc_datetime(&naive)
}

fn next_hourly<Tz: TimeZone>(
    interval_hours: u32,
    start_time: WallClockTime,
    now: &DateTime<Tz>,
) -> DateTime<Tz> {
    let interval = TimeDelta::hours(i64::from(interval_hours.max(1)));
    let start = localize(&now.timezone(), now.date_naive(), start_time);

    let elapsed = now.clone() - start.clone();
    let steps = elapsed.num_seconds().div_euclid(interval.num_seconds());
    let mut candidate = start + interval * steps as i32;

    while candidate < *now {
        candidate = candidate + interval;
    }
    while candidate.clone() - interval >= *now {
        candidate = candidate - interval;
    }

    candidate
}

fn next_weekly<Tz: TimeZone>(days_with_times: &WeeklyTimes, now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    let current = today.weekday().num_days_from_monday();

    days_with_times
        .iter()
        .map(|(day, time)| {
            let offset = (day.num_days_from_monday() + 7 - current) % 7;
            let date = add_days(today, u64::from(offset));
            let candidate = localize(&tz, date, time);
            if candidate <= *now {
                localize(&tz, add_days(date, 7), time)
            } else {
                candidate
            }
        })
        .min()
        .unwrap_or_else(|| now.clone())
}

fn next_fixed_cycle<Tz: TimeZone>(
    anchor_date: NaiveDate,
    time_of_day: WallClockTime,
    period_days: u32,
    now: &DateTime<Tz>,
) -> DateTime<Tz> {
    let tz = now.timezone();
    let period = u64::from(period_days.max(1));
    let today = now.date_naive();

    let mut date = anchor_date;
    if anchor_date < today {
        let days_since_anchor = (today - anchor_date).num_days() as u64;
        date = add_days(anchor_date, days_since_anchor / period * period);
    }

    let mut candidate = localize(&tz, date, time_of_day);
    while candidate < *now {
        match date.checked_add_days(Days::new(period)) {
            Some(next) => date = next,
            None => break,
        }
        candidate = localize(&tz, date, time_of_day);
    }

    candidate
}

fn next_monthly<Tz: TimeZone>(
    day_of_month: DayOfMonth,
    time_of_day: WallClockTime,
    now: &DateTime<Tz>,
) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    let this_month = monthly_date(day_of_month, today.year(), today.month());

    let candidate = localize(&tz, this_month, time_of_day);
    if candidate >= *now {
        return candidate;
    }

    let (year, month) = next_month(today.year(), today.month());
    localize(&tz, monthly_date(day_of_month, year, month), time_of_day)
}

fn monthly_date(day_of_month: DayOfMonth, year: i32, month: u32) -> NaiveDate {
    match day_of_month {
        DayOfMonth::Last => clamped_date(year, month, 31),
        DayOfMonth::Day(day) => clamped_date(year, month, u32::from(day)),
    }
}

fn next_custom<Tz: TimeZone>(custom: &CustomRecurrence, now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    let time = custom.time_of_day;

    let year = custom.year.specific_or(today.year());
    let month = custom.month.specific_or(today.month());
    let day = custom.date.specific_or(today.day());

    let initial_date = clamped_date(year, month, day);
    let initial = localize(&tz, initial_date, time);
    if initial >= *now {
        return initial;
    }

    // Periods before the current one all resolve before `now`, so rolling
    // starts from the current day, month or year.
    if custom.date.is_every() {
        roll_forward(initial_date.max(today), now, |date| add_days(date, 1), |date| {
            localize(&tz, date, time)
        })
    } else if custom.month.is_every() {
        let start = (year, month).max((today.year(), today.month()));
        roll_forward(
            start,
            now,
            |(year, month)| next_month(year, month),
            |(year, month)| localize(&tz, clamped_date(year, month, day), time),
        )
    } else if custom.year.is_every() {
        roll_forward(year.max(today.year()), now, |year| year + 1, |year| {
            localize(&tz, clamped_date(year, month, day), time)
        })
    } else {
        initial
    }
}

// Two steps past the current period always suffice.
fn roll_forward<P: Copy, Tz: TimeZone>(
    mut period: P,
    now: &DateTime<Tz>,
    step: impl Fn(P) -> P,
    instant: impl Fn(P) -> DateTime<Tz>,
) -> DateTime<Tz> {
    let mut candidate = instant(period);
    for _ in 0..3 {
        if candidate >= *now {
            break;
        }
        period = step(period);
        candidate = instant(period);
    }

    candidate
}

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = next_month(year, month);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

pub fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let month = month.clamp(1, 12);
    let day = day.clamp(1, last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MAX)
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}
