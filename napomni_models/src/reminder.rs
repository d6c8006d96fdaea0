use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::error::ValidationError;
use crate::recurrence::RecurrenceSpec;

pub type ReminderId = String;

pub const DEFAULT_RING_TONE: &str = "default";

pub const RING_TONES: [&str; 10] = [
    "default", "polite", "calm", "glass", "chord", "cloud", "jinja", "reverie", "beeper", "sharp",
];

pub fn is_known_ring_tone(ring_tone: &str) -> bool {
    RING_TONES.contains(&ring_tone)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Medication,
    Fitness,
    Habits,
    Others,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderRecord {
    pub id: ReminderId,
    pub category: Category,
    pub title: String,
    pub description: Option<String>,
    pub recurrence: RecurrenceSpec,
    pub priority: Priority,
    pub ring_tone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub expiry_date: Option<NaiveDate>,
}

impl ReminderRecord {
    pub fn is_expired<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        match self.expiry_date {
            Some(expiry) => now.date_naive() > expiry,
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderInput {
    pub category: Category,
    pub title: String,
    pub description: Option<String>,
    pub recurrence: RecurrenceSpec,
    pub priority: Priority,
    pub ring_tone: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl ReminderInput {
    pub fn new(category: Category, title: impl Into<String>, recurrence: RecurrenceSpec) -> Self {
        Self {
            category,
            title: title.into(),
            description: None,
            recurrence,
            priority: Priority::default(),
            ring_tone: None,
            expiry_date: None,
        }
    }

    pub fn ring_tone_or_default(&self) -> &str {
        self.ring_tone.as_deref().unwrap_or(DEFAULT_RING_TONE)
    }

    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        self.recurrence.validate()?;

        let ring_tone = self.ring_tone_or_default();
        if !is_known_ring_tone(ring_tone) {
            return Err(ValidationError::UnknownRingTone(ring_tone.to_string()));
        }

        if let Some(expiry) = self.expiry_date {
            if expiry < today {
                return Err(ValidationError::ExpiryInPast { expiry, today });
            }
        }

        Ok(())
    }
}
