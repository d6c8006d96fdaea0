use std::sync::Arc;

use napomni_models::settings::NotificationSettings;

use crate::NOTIFICATION_SETTINGS_KEY;
use crate::store::{KeyValueStore, StoreError};

pub struct SettingsStorage {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<NotificationSettings, StoreError> {
        match self.store.get(NOTIFICATION_SETTINGS_KEY).await? {
            Some(raw) => Ok(serde_json::from_value(raw)?),
            None => Ok(NotificationSettings::default()),
        }
    }

    pub async fn save(&self, settings: &NotificationSettings) -> Result<(), StoreError> {
        self.store
            .set(NOTIFICATION_SETTINGS_KEY, serde_json::to_value(settings)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryKeyValueStore;
    use napomni_models::settings::VibrationPattern;
    use serde_json::json;

    #[tokio::test]
    async fn defaults_when_absent() {
        let storage = SettingsStorage::new(Arc::new(InMemoryKeyValueStore::new()));

        assert_eq!(storage.load().await.unwrap(), NotificationSettings::default());
    }

    #[tokio::test]
    async fn partial_settings_fill_in_defaults() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store
            .set(
                NOTIFICATION_SETTINGS_KEY,
                json!({ "silentMode": true, "vibrationPattern": "strong" }),
            )
            .await
            .unwrap();
        let storage = SettingsStorage::new(store);

        let settings = storage.load().await.unwrap();

        assert!(settings.silent_mode);
        assert_eq!(settings.vibration_pattern, VibrationPattern::Strong);
        assert_eq!(settings.snooze_time, 10);
        assert!(settings.notifications_enabled);
    }

    #[tokio::test]
    async fn saved_settings_use_camel_case_keys() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let storage = SettingsStorage::new(store.clone());

        storage
            .save(&NotificationSettings {
                snooze_time: 5,
                ..Default::default()
            })
            .await
            .unwrap();

        let raw = store.get(NOTIFICATION_SETTINGS_KEY).await.unwrap().unwrap();
        assert_eq!(raw["snoozeTime"], 5);
        assert_eq!(raw["defaultRingtone"], "default");
        assert_eq!(raw["notificationDuration"], 30);
    }
}
