use std::sync::Arc;

use napomni_models::notification::ScheduledNotification;
use serde_json::Value;

use crate::NOTIFICATIONS_KEY;
use crate::codec::StoredNotification;
use crate::store::{KeyValueStore, StoreError};

pub struct NotificationStorage {
    store: Arc<dyn KeyValueStore>,
}

impl NotificationStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<Vec<ScheduledNotification>, StoreError> {
        let Some(raw) = self.store.get(NOTIFICATIONS_KEY).await? else {
            return Ok(Vec::new());
        };

        let entries: Vec<Value> = serde_json::from_value(raw)?;
        let notifications = entries
            .into_iter()
            .filter_map(
                |entry| match serde_json::from_value::<StoredNotification>(entry) {
                    Ok(stored) => Some(stored.into()),
                    Err(err) => {
                        log::warn!("Skipping unreadable notification entry. [error = {}]", err);
                        None
                    }
                },
            )
            .collect();

        Ok(notifications)
    }

    pub async fn save(&self, notifications: &[ScheduledNotification]) -> Result<(), StoreError> {
        let stored: Vec<StoredNotification> =
            notifications.iter().map(StoredNotification::from).collect();
        self.store
            .set(NOTIFICATIONS_KEY, serde_json::to_value(stored)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryKeyValueStore;
    use chrono::{TimeZone, Utc};
    use napomni_models::notification::NotificationStatus;
    use napomni_models::reminder::Category;
    use serde_json::json;

    fn notification(id: &str) -> ScheduledNotification {
        let at = Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap();
        ScheduledNotification {
            id: id.to_string(),
            reminder_id: "r-1".to_string(),
            scheduled_at: at,
            title: "Pills".to_string(),
            description: Some("Two of them".to_string()),
            category: Category::Medication,
            ring_tone: "default".to_string(),
            status: NotificationStatus::Pending,
            dispatch_id: Some("d-1".to_string()),
            created_at: at,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn save_and_load() {
        let storage = NotificationStorage::new(Arc::new(InMemoryKeyValueStore::new()));
        let notifications = vec![notification("notif_1"), notification("notif_2")];

        storage.save(&notifications).await.unwrap();

        assert_eq!(storage.load().await.unwrap(), notifications);
    }

    #[tokio::test]
    async fn unreadable_entries_are_skipped() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let storage = NotificationStorage::new(store.clone());
        storage.save(&[notification("notif_1")]).await.unwrap();

        let mut raw = store.get(NOTIFICATIONS_KEY).await.unwrap().unwrap();
        raw.as_array_mut().unwrap().push(json!({ "id": "broken" }));
        store.set(NOTIFICATIONS_KEY, raw).await.unwrap();

        let loaded = storage.load().await.unwrap();
        assert_eq!(loaded, vec![notification("notif_1")]);
    }
}
