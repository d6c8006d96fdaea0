use std::sync::Arc;

use chrono::TimeZone;
use napomni_models::reminder::ReminderRecord;

use crate::REMINDERS_KEY;
use crate::codec::{StoredReminder, from_storage, to_storage};
use crate::migration::{Migration, migrate_reminders};
use crate::store::{KeyValueStore, StoreError};

pub struct ReminderStorage {
    store: Arc<dyn KeyValueStore>,
}

impl ReminderStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    // A record that cannot be decoded fails the whole load.
    pub async fn load<Tz: TimeZone>(&self, tz: &Tz) -> Result<Vec<ReminderRecord>, StoreError> {
        let Some(raw) = self.store.get(REMINDERS_KEY).await? else {
            return Ok(Vec::new());
        };

        let Migration { value, migrated } = migrate_reminders(&raw, tz);
        if migrated > 0 {
            log::info!("Migrated {} legacy reminders", migrated);
            self.store.set(REMINDERS_KEY, value.clone()).await?;
        }

        let stored: Vec<StoredReminder> = serde_json::from_value(value)?;
        let reminders = stored
            .into_iter()
            .map(from_storage)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reminders)
    }

    pub async fn save(&self, reminders: &[ReminderRecord]) -> Result<(), StoreError> {
        let stored: Vec<StoredReminder> = reminders.iter().map(to_storage).collect();
        self.store
            .set(REMINDERS_KEY, serde_json::to_value(stored)?)
            .await
    }
}
