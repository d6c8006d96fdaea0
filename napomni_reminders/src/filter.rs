use std::collections::HashSet;

use chrono::{DateTime, Days, Months, NaiveDate, TimeZone, Timelike};
use napomni_models::recurrence::RecurrenceKind;
use napomni_models::reminder::{Category, ReminderRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeSlot {
    pub fn of_hour(hour: u32) -> Self {
        match hour {
            6..12 => TimeSlot::Morning,
            12..18 => TimeSlot::Afternoon,
            18..24 => TimeSlot::Evening,
            _ => TimeSlot::Night,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Today,
    Tomorrow,
    ThisWeek,
    ThisMonth,
    Between { start: NaiveDate, end: NaiveDate },
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateRange::Today => date == today,
            DateRange::Tomorrow => Some(date) == today.checked_add_days(Days::new(1)),
            DateRange::ThisWeek => match today.checked_add_days(Days::new(7)) {
                Some(end) => date >= today && date < end,
                None => date >= today,
            },
            DateRange::ThisMonth => match today.checked_add_months(Months::new(1)) {
                Some(end) => date >= today && date < end,
                None => date >= today,
            },
            DateRange::Between { start, end } => date >= *start && date <= *end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityFilter {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderFilters {
    pub categories: HashSet<Category>,
    pub date_range: Option<DateRange>,
    pub time_slots: HashSet<TimeSlot>,
    pub activity: HashSet<ActivityFilter>,
    pub kinds: HashSet<RecurrenceKind>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilteredCount {
    pub total: usize,
    pub filtered: usize,
}

impl ReminderFilters {
    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0
    }

    pub fn active_filter_count(&self) -> usize {
        [
            !self.categories.is_empty(),
            self.date_range.is_some(),
            !self.time_slots.is_empty(),
            !self.activity.is_empty(),
            !self.kinds.is_empty(),
            self.search_needle().is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn matches<Tz: TimeZone>(&self, reminder: &ReminderRecord, now: &DateTime<Tz>) -> bool {
        let created = reminder.created_at.with_timezone(&now.timezone());

        if !self.categories.is_empty() && !self.categories.contains(&reminder.category) {
            return false;
        }

        if let Some(range) = &self.date_range {
            if !range.contains(created.date_naive(), now.date_naive()) {
                return false;
            }
        }

        if !self.time_slots.is_empty()
            && !self.time_slots.contains(&TimeSlot::of_hour(created.hour()))
        {
            return false;
        }

        if !self.activity.is_empty() {
            let activity = if reminder.is_active {
                ActivityFilter::Active
            } else {
                ActivityFilter::Inactive
            };
            if !self.activity.contains(&activity) {
                return false;
            }
        }

        if !self.kinds.is_empty() && !self.kinds.contains(&reminder.recurrence.kind()) {
            return false;
        }

        match self.search_needle() {
            Some(needle) => matches_text(reminder, &needle),
            None => true,
        }
    }

    fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase)
    }
}

fn matches_text(reminder: &ReminderRecord, needle: &str) -> bool {
    reminder.title.to_lowercase().contains(needle)
        || reminder
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(needle))
}

pub fn apply_all_filters<Tz: TimeZone>(
    reminders: &[ReminderRecord],
    filters: &ReminderFilters,
    now: &DateTime<Tz>,
) -> Vec<ReminderRecord> {
    reminders
        .iter()
        .filter(|reminder| filters.matches(reminder, now))
        .cloned()
        .collect()
}

pub fn filtered_count(reminders: &[ReminderRecord], filtered: &[ReminderRecord]) -> FilteredCount {
    FilteredCount {
        total: reminders.len(),
        filtered: filtered.len(),
    }
}
