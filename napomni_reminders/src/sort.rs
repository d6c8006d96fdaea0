use std::cmp::{Ordering, Reverse};

use chrono::{TimeZone, Timelike};
use icu_collator::{Collator, CollatorOptions, Strength};
use napomni_models::reminder::ReminderRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DateNewest,
    DateOldest,
    AlphabeticalAsc,
    AlphabeticalDesc,
    TimeEarly,
    TimeLate,
    Frequency,
}

pub fn apply_sorting<Tz: TimeZone>(
    mut reminders: Vec<ReminderRecord>,
    order: SortOrder,
    tz: &Tz,
) -> Vec<ReminderRecord> {
    match order {
        SortOrder::DateNewest => reminders.sort_by_key(|r| Reverse(r.created_at)),
        SortOrder::DateOldest => reminders.sort_by_key(|r| r.created_at),
        SortOrder::AlphabeticalAsc => sort_by_title(&mut reminders, false),
        SortOrder::AlphabeticalDesc => sort_by_title(&mut reminders, true),
        SortOrder::TimeEarly => reminders.sort_by_key(|r| minute_of_day(r, tz)),
        SortOrder::TimeLate => reminders.sort_by_key(|r| Reverse(minute_of_day(r, tz))),
        SortOrder::Frequency => reminders.sort_by_key(|r| r.recurrence.kind().frequency_rank()),
    }

    reminders
}

// Secondary strength ignores case.
fn sort_by_title(reminders: &mut [ReminderRecord], descending: bool) {
    let directed = |ordering: Ordering| {
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    };

    match title_collator() {
        Some(collator) => {
            reminders.sort_by(|a, b| directed(collator.compare(&a.title, &b.title)))
        }
        None => reminders.sort_by(|a, b| {
            directed(a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }),
    }
}

fn title_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);

    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(err) => {
            log::warn!("Falling back to lowercase title order. [error = {:?}]", err);
            None
        }
    }
}

fn minute_of_day<Tz: TimeZone>(reminder: &ReminderRecord, tz: &Tz) -> u32 {
    let local = reminder.created_at.with_timezone(tz);
    local.hour() * 60 + local.minute()
}
