mod codec;
mod migration;
mod notification_storage;
mod reminder_storage;
mod settings_storage;
mod sqlite;
mod store;

pub use codec::{
    CodecError, StoredNotification, StoredRecurrence, StoredReminder, StoredWallClock,
    from_storage, to_storage,
};
pub use migration::{Migration, migrate_reminders};
pub use notification_storage::NotificationStorage;
pub use reminder_storage::ReminderStorage;
pub use settings_storage::SettingsStorage;
pub use sqlite::SqliteKeyValueStore;
pub use store::{InMemoryKeyValueStore, KeyValueStore, StoreError};

pub const REMINDERS_KEY: &str = "reminders";
pub const NOTIFICATIONS_KEY: &str = "notifications";
pub const NOTIFICATION_SETTINGS_KEY: &str = "notificationSettings";
