use chrono::{DateTime, NaiveDate, TimeZone, Timelike};
use napomni_models::recurrence::Weekday;
use serde_json::{Map, Value, json};

const WALL_CLOCK_FIELDS: [&str; 3] = ["hourlyStartTime", "fifteenDaysTime", "monthlyTime"];
const DATE_FIELDS: [&str; 2] = ["fifteenDaysStart", "expiryDate"];
const CUSTOM_NUMBER_FIELDS: [&str; 3] = ["year", "month", "date"];
const DAILY_FIELDS: [&str; 5] = [
    "dailyMode",
    "dailyInterval",
    "dailyStartTime",
    "dailyExactTimes",
    "dailyExactDateTime",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub value: Value,
    pub migrated: usize,
}

pub fn migrate_reminders<Tz: TimeZone>(raw: &Value, tz: &Tz) -> Migration {
    let Some(reminders) = raw.as_array() else {
        log::warn!("Stored reminders are not a list, leaving them untouched");
        return Migration {
            value: raw.clone(),
            migrated: 0,
        };
    };

    let mut migrated = 0;
    let value = reminders
        .iter()
        .map(|reminder| {
            let Some(original) = reminder.as_object() else {
                return reminder.clone();
            };

            let mut updated = original.clone();
            migrate_reminder(&mut updated, tz);
            if updated != *original {
                migrated += 1;
            }
            Value::Object(updated)
        })
        .collect();

    Migration {
        value: Value::Array(value),
        migrated,
    }
}

fn migrate_reminder<Tz: TimeZone>(reminder: &mut Map<String, Value>, tz: &Tz) {
    if !reminder.contains_key("isActive") {
        reminder.insert("isActive".to_string(), Value::Bool(true));
    }

    if !reminder.contains_key("ringTone") {
        if let Some(sound) = reminder.remove("notificationSound") {
            reminder.insert("ringTone".to_string(), sound);
        }
    }

    if reminder.get("type").and_then(Value::as_str) == Some("daily") {
        migrate_daily(reminder, tz);
    }

    for field in WALL_CLOCK_FIELDS {
        normalize_wall_clock(reminder, field, tz);
    }

    for field in DATE_FIELDS {
        normalize_date(reminder, field, tz);
    }

    if let Some(custom) = reminder
        .get_mut("customSettings")
        .and_then(Value::as_object_mut)
    {
        normalize_wall_clock(custom, "time", tz);
        for field in CUSTOM_NUMBER_FIELDS {
            normalize_number(custom, field);
        }
    }

    normalize_number(reminder, "monthlyDate");
    normalize_number(reminder, "hourlyInterval");

    if reminder.get("type").and_then(Value::as_str) == Some("weekly") {
        migrate_weekly(reminder);
    }
}

fn migrate_daily<Tz: TimeZone>(reminder: &mut Map<String, Value>, tz: &Tz) {
    let exact_mode = reminder.get("dailyMode").and_then(Value::as_str) == Some("exact");

    if exact_mode {
        let mut times: Vec<Value> = reminder
            .get("dailyExactTimes")
            .and_then(Value::as_array)
            .map(|labels| labels.iter().filter_map(clock_label_value).collect())
            .unwrap_or_default();

        if times.is_empty() {
            normalize_wall_clock(reminder, "dailyExactDateTime", tz);
            if let Some(time) = reminder.get("dailyExactDateTime").filter(|v| v.is_object()) {
                times.push(time.clone());
            }
        }

        let weekly_times: Map<String, Value> = Weekday::ALL
            .iter()
            .map(|day| (day.short_name().to_string(), Value::Array(times.clone())))
            .collect();

        reminder.insert("type".to_string(), json!("weekly"));
        reminder.insert("weeklyTimes".to_string(), Value::Object(weekly_times));
    } else {
        let interval = reminder
            .get("dailyInterval")
            .or_else(|| reminder.get("hourlyInterval"))
            .and_then(number_like)
            .unwrap_or(1);

        normalize_wall_clock(reminder, "dailyStartTime", tz);
        normalize_wall_clock(reminder, "hourlyStartTime", tz);
        let start_time = reminder
            .get("dailyStartTime")
            .filter(|v| v.is_object())
            .or_else(|| reminder.get("hourlyStartTime").filter(|v| v.is_object()))
            .cloned()
            .unwrap_or_else(|| wall_clock_value(0, 0));

        reminder.insert("type".to_string(), json!("hourly"));
        reminder.insert("hourlyInterval".to_string(), json!(interval));
        reminder.insert("hourlyStartTime".to_string(), start_time);
    }

    for field in DAILY_FIELDS {
        reminder.remove(field);
    }
}

fn migrate_weekly(reminder: &mut Map<String, Value>) {
    let days: Vec<&'static str> = reminder
        .get("weeklyDays")
        .and_then(Value::as_array)
        .map(|days| {
            days.iter()
                .filter_map(Value::as_str)
                .filter_map(normalize_day)
                .collect()
        })
        .unwrap_or_default();

    let weekly_times = match reminder.get("weeklyTimes") {
        Some(Value::Array(labels)) => {
            let times: Vec<Value> = labels.iter().filter_map(time_entry_value).collect();
            let per_day: Map<String, Value> = days
                .iter()
                .map(|day| (day.to_string(), Value::Array(times.clone())))
                .collect();
            Some(Value::Object(per_day))
        }
        Some(Value::Object(per_day)) => {
            let per_day: Map<String, Value> = per_day
                .iter()
                .filter_map(|(day, times)| {
                    let day = normalize_day(day)?;
                    let times = times
                        .as_array()
                        .map(|times| times.iter().filter_map(time_entry_value).collect())
                        .unwrap_or_default();
                    Some((day.to_string(), Value::Array(times)))
                })
                .collect();
            Some(Value::Object(per_day))
        }
        _ => None,
    };

    if let Some(weekly_times) = weekly_times {
        reminder.insert("weeklyTimes".to_string(), weekly_times);
    }
    reminder.remove("weeklyDays");
}

fn normalize_wall_clock<Tz: TimeZone>(map: &mut Map<String, Value>, field: &str, tz: &Tz) {
    let hours_key = format!("{}_hours", field);
    let minutes_key = format!("{}_minutes", field);

    if let Some(hours) = map.remove(&hours_key) {
        let minutes = map.remove(&minutes_key);
        let already_object = map.get(field).is_some_and(Value::is_object);
        if let (false, Some(hours)) = (already_object, number_like(&hours)) {
            let minutes = minutes.as_ref().and_then(number_like).unwrap_or(0);
            map.insert(field.to_string(), wall_clock_value(hours, minutes));
        }
        return;
    }

    let Some(text) = map.get(field).and_then(Value::as_str).map(str::to_string) else {
        return;
    };

    let converted = parse_timestamp(&text, tz)
        .map(|local| wall_clock_value(u64::from(local.hour()), u64::from(local.minute())))
        .or_else(|| parse_clock_label(&text).map(|(h, m)| wall_clock_value(h.into(), m.into())));

    match converted {
        Some(value) => {
            map.insert(field.to_string(), value);
        }
        None => log::warn!(
            "Could not read legacy time value. [field = {}, value = {}]",
            field,
            text
        ),
    }
}

fn normalize_date<Tz: TimeZone>(map: &mut Map<String, Value>, field: &str, tz: &Tz) {
    let Some(text) = map.get(field).and_then(Value::as_str).map(str::to_string) else {
        return;
    };

    if NaiveDate::parse_from_str(&text, "%Y-%m-%d").is_ok() {
        return;
    }

    match parse_timestamp(&text, tz) {
        Some(local) => {
            let date = local.date_naive().format("%Y-%m-%d").to_string();
            map.insert(field.to_string(), Value::String(date));
        }
        None => log::warn!(
            "Could not read legacy date value. [field = {}, value = {}]",
            field,
            text
        ),
    }
}

fn normalize_number(map: &mut Map<String, Value>, field: &str) {
    let Some(number) = map
        .get(field)
        .and_then(Value::as_str)
        .and_then(|text| text.trim().parse::<i64>().ok())
    else {
        return;
    };

    map.insert(field.to_string(), json!(number));
}

fn parse_timestamp<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|instant| instant.with_timezone(tz))
}

fn number_like(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn wall_clock_value(hours: u64, minutes: u64) -> Value {
    json!({ "hours": hours, "minutes": minutes })
}

fn time_entry_value(entry: &Value) -> Option<Value> {
    if entry.is_object() {
        return Some(entry.clone());
    }
    clock_label_value(entry)
}

fn clock_label_value(label: &Value) -> Option<Value> {
    let (hours, minutes) = parse_clock_label(label.as_str()?)?;
    Some(wall_clock_value(u64::from(hours), u64::from(minutes)))
}

// "9:00 AM", "12:30 pm" or "18:05".
pub(crate) fn parse_clock_label(label: &str) -> Option<(u32, u32)> {
    let upper = label.trim().to_ascii_uppercase();
    let (clock, pm) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim(), Some(false))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim(), Some(true))
    } else {
        (upper.as_str(), None)
    };

    let (hours, minutes) = clock.split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;

    let hours = match pm {
        Some(_) if hours == 0 || hours > 12 => return None,
        Some(true) => hours % 12 + 12,
        Some(false) => hours % 12,
        None => hours,
    };

    (hours < 24 && minutes < 60).then_some((hours, minutes))
}

fn normalize_day(name: &str) -> Option<&'static str> {
    let short = name.trim().get(..3)?;
    Weekday::from_short_name(short).map(|day| day.short_name())
}

#[cfg(test)]
mod tests;
