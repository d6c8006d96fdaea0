use super::*;

use chrono::{FixedOffset, SecondsFormat, Utc};
use chrono_tz::Europe::Berlin;
use proptest::prelude::*;

use crate::codec::{StoredReminder, from_storage};
use napomni_models::recurrence::{DayOfMonth, RecurrenceSpec, Repeat};
use napomni_models::wall_clock::WallClockTime;

fn migrate_one(reminder: Value) -> Value {
    let migration = migrate_reminders(&json!([reminder]), &Berlin);
    migration.value[0].clone()
}

fn decode(value: Value) -> RecurrenceSpec {
    let stored: StoredReminder = serde_json::from_value(value).unwrap();
    from_storage(stored).unwrap().recurrence
}

fn at(hours: u8, minutes: u8) -> WallClockTime {
    WallClockTime::new(hours, minutes).unwrap()
}

#[test]
fn flat_component_fields_become_objects() {
    let migrated = migrate_one(json!({
        "id": "1",
        "category": "medication",
        "title": "Pills",
        "type": "monthly",
        "monthlyDate": 31,
        "monthlyTime_hours": 23,
        "monthlyTime_minutes": 5,
        "createdAt": "2024-01-01T10:00:00Z"
    }));

    assert_eq!(migrated["monthlyTime"], json!({ "hours": 23, "minutes": 5 }));
    assert!(migrated.get("monthlyTime_hours").is_none());
    assert_eq!(migrated["isActive"], true);
    assert_eq!(
        decode(migrated),
        RecurrenceSpec::Monthly {
            day_of_month: DayOfMonth::Day(31),
            time_of_day: at(23, 5),
        }
    );
}

#[test]
fn iso_wall_clock_is_read_in_given_timezone() {
    // 07:30 UTC in January is 08:30 in Berlin.
    let migrated = migrate_one(json!({
        "id": "2",
        "category": "fitness",
        "title": "Stretch",
        "type": "hourly",
        "hourlyInterval": "4",
        "hourlyStartTime": "2024-01-15T07:30:00.000Z",
        "createdAt": "2024-01-01T10:00:00Z"
    }));

    assert_eq!(migrated["hourlyStartTime"], json!({ "hours": 8, "minutes": 30 }));
    assert_eq!(migrated["hourlyInterval"], 4);
}

#[test]
fn fifteen_day_start_becomes_local_date() {
    // 23:30 UTC on Feb 29 is already Mar 1 in Berlin.
    let migrated = migrate_one(json!({
        "id": "3",
        "category": "habits",
        "title": "Filter",
        "type": "15days",
        "fifteenDaysStart": "2024-02-29T23:30:00.000Z",
        "fifteenDaysTime_hours": 8,
        "fifteenDaysTime_minutes": 0,
        "expiryDate": "2024-12-30T23:00:00.000Z",
        "createdAt": "2024-01-01T10:00:00Z"
    }));

    assert_eq!(migrated["fifteenDaysStart"], "2024-03-01");
    assert_eq!(migrated["expiryDate"], "2024-12-31");
    assert_eq!(migrated["fifteenDaysTime"], json!({ "hours": 8, "minutes": 0 }));
}

#[test]
fn weekly_label_list_is_spread_over_selected_days() {
    let migrated = migrate_one(json!({
        "id": "4",
        "category": "others",
        "title": "Trash",
        "type": "weekly",
        "weeklyDays": ["Mon", "Thursday"],
        "weeklyTimes": ["9:00 AM", "6:30 PM"],
        "createdAt": "2024-01-01T10:00:00Z"
    }));

    let both = json!([{ "hours": 9, "minutes": 0 }, { "hours": 18, "minutes": 30 }]);
    assert_eq!(migrated["weeklyTimes"], json!({ "Mon": both, "Thu": both }));
    assert!(migrated.get("weeklyDays").is_none());
}

#[test]
fn weekly_label_map_is_converted_per_day() {
    let migrated = migrate_one(json!({
        "id": "5",
        "category": "others",
        "title": "Piano",
        "type": "weekly",
        "weeklyDays": ["Tue", "Sat"],
        "weeklyTimes": { "Tue": ["7:15 PM"], "Sat": ["12:00 AM", "10:00 AM"] },
        "createdAt": "2024-01-01T10:00:00Z"
    }));

    assert_eq!(
        migrated["weeklyTimes"],
        json!({
            "Tue": [{ "hours": 19, "minutes": 15 }],
            "Sat": [{ "hours": 0, "minutes": 0 }, { "hours": 10, "minutes": 0 }]
        })
    );
}

#[test]
fn daily_interval_becomes_hourly() {
    let migrated = migrate_one(json!({
        "id": "6",
        "category": "medication",
        "title": "Drops",
        "type": "daily",
        "dailyMode": "interval",
        "dailyInterval": 6,
        "dailyStartTime_hours": 7,
        "dailyStartTime_minutes": 0,
        "createdAt": "2024-01-01T10:00:00Z"
    }));

    assert_eq!(migrated["type"], "hourly");
    assert!(migrated.get("dailyMode").is_none());
    assert_eq!(
        decode(migrated),
        RecurrenceSpec::Hourly {
            interval_hours: 6,
            start_time: at(7, 0),
        }
    );
}

#[test]
fn legacy_hourly_start_fields_still_read() {
    let migrated = migrate_one(json!({
        "id": "7",
        "category": "medication",
        "title": "Drops",
        "type": "daily",
        "dailyInterval": "8",
        "hourlyStartTime_hours": 6,
        "createdAt": "2024-01-01T10:00:00Z"
    }));

    assert_eq!(
        decode(migrated),
        RecurrenceSpec::Hourly {
            interval_hours: 8,
            start_time: at(6, 0),
        }
    );
}

#[test]
fn daily_exact_times_become_weekly_every_day() {
    let migrated = migrate_one(json!({
        "id": "8",
        "category": "habits",
        "title": "Journal",
        "type": "daily",
        "dailyMode": "exact",
        "dailyExactTimes": ["9:00 AM", "9:00 PM"],
        "createdAt": "2024-01-01T10:00:00Z"
    }));

    let RecurrenceSpec::Weekly { days_with_times } = decode(migrated) else {
        panic!("expected weekly");
    };
    assert_eq!(days_with_times.days().count(), 7);
    assert!(
        days_with_times
            .days()
            .all(|(_, times)| times.iter().copied().eq([at(9, 0), at(21, 0)]))
    );
}

#[test]
fn custom_settings_are_normalized() {
    let migrated = migrate_one(json!({
        "id": "9",
        "category": "others",
        "title": "Anniversary",
        "type": "custom",
        "customSettings": {
            "year": "2025",
            "month": 3,
            "date": "8",
            "time_hours": 10,
            "time_minutes": 45,
            "yearRepeat": "every",
            "monthRepeat": "specific",
            "dateRepeat": "specific"
        },
        "createdAt": "2024-01-01T10:00:00Z"
    }));

    assert_eq!(migrated["customSettings"]["year"], 2025);
    assert_eq!(migrated["customSettings"]["date"], 8);
    let RecurrenceSpec::Custom(custom) = decode(migrated) else {
        panic!("expected custom");
    };
    assert_eq!(custom.year, Repeat::Every);
    assert_eq!(custom.month, Repeat::Specific(3));
    assert_eq!(custom.date, Repeat::Specific(8));
    assert_eq!(custom.time_of_day, at(10, 45));
}

#[test]
fn notification_sound_moves_to_ring_tone() {
    let migrated = migrate_one(json!({
        "id": "10",
        "category": "others",
        "title": "Call",
        "type": "monthly",
        "monthlyDate": "last",
        "monthlyTime": { "hours": 9, "minutes": 0 },
        "notificationSound": "chord",
        "createdAt": "2024-01-01T10:00:00Z"
    }));

    assert_eq!(migrated["ringTone"], "chord");
    assert_eq!(migrated["monthlyDate"], "last");
    assert!(migrated.get("notificationSound").is_none());
}

#[test]
fn migrated_data_is_left_byte_identical() {
    let legacy = json!([
        {
            "id": "1",
            "category": "medication",
            "title": "Pills",
            "type": "daily",
            "dailyMode": "exact",
            "dailyExactTimes": ["8:00 AM"],
            "createdAt": "2024-01-01T10:00:00Z"
        },
        {
            "id": "2",
            "category": "fitness",
            "title": "Run",
            "type": "15days",
            "fifteenDaysStart": "2024-02-29T23:30:00.000Z",
            "fifteenDaysTime": "2024-02-29T05:00:00.000Z",
            "createdAt": "2024-01-01T10:00:00Z"
        }
    ]);

    let first = migrate_reminders(&legacy, &Berlin);
    assert_eq!(first.migrated, 2);

    let second = migrate_reminders(&first.value, &Berlin);
    assert_eq!(second.migrated, 0);
    assert_eq!(
        serde_json::to_string(&second.value).unwrap(),
        serde_json::to_string(&first.value).unwrap()
    );
}

#[test]
fn non_list_value_is_untouched() {
    let raw = json!({ "unexpected": true });

    let migration = migrate_reminders(&raw, &Utc);

    assert_eq!(migration.value, raw);
    assert_eq!(migration.migrated, 0);
}

#[test]
fn clock_labels() {
    assert_eq!(parse_clock_label("9:00 AM"), Some((9, 0)));
    assert_eq!(parse_clock_label("12:00 AM"), Some((0, 0)));
    assert_eq!(parse_clock_label("12:30 pm"), Some((12, 30)));
    assert_eq!(parse_clock_label("6:05PM"), Some((18, 5)));
    assert_eq!(parse_clock_label("18:05"), Some((18, 5)));
    assert_eq!(parse_clock_label("13:00 PM"), None);
    assert_eq!(parse_clock_label("noon"), None);
}

proptest! {
    #[test]
    fn legacy_timestamp_keeps_local_hours_and_minutes(
        seconds in 0i64..253_402_300_799,
        offset_minutes in -12i32 * 60..=14 * 60,
    ) {
        let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
        let instant = DateTime::from_timestamp(seconds, 0).unwrap();
        let iso = instant.to_rfc3339_opts(SecondsFormat::Millis, true);
        let expected = instant.with_timezone(&offset);

        let migration = migrate_reminders(
            &json!([{ "type": "monthly", "monthlyTime": iso }]),
            &offset,
        );

        prop_assert_eq!(
            &migration.value[0]["monthlyTime"],
            &json!({ "hours": expected.hour(), "minutes": expected.minute() })
        );
    }

    #[test]
    fn migration_is_idempotent_for_component_fields(
        hours in 0u8..24,
        minutes in 0u8..60,
        interval in 1u32..48,
    ) {
        let legacy = json!([{
            "type": "hourly",
            "hourlyInterval": interval,
            "hourlyStartTime_hours": hours,
            "hourlyStartTime_minutes": minutes,
        }]);

        let first = migrate_reminders(&legacy, &Berlin);
        let second = migrate_reminders(&first.value, &Berlin);

        prop_assert_eq!(second.migrated, 0);
        prop_assert_eq!(
            serde_json::to_string(&second.value).unwrap(),
            serde_json::to_string(&first.value).unwrap()
        );
    }
}
