use napomni_models::error::ValidationError;
use napomni_models::notification::NotificationId;
use napomni_models::reminder::ReminderId;
use napomni_storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Reminder {0} not found")]
    NotFound(ReminderId),

    #[error("Notification {0} not found")]
    NotificationNotFound(NotificationId),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOperation {
    Schedule,
    Cancel,
    RecordHistory,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation:?} failed: {message}")]
pub struct DispatchWarning {
    pub reminder_id: Option<ReminderId>,
    pub operation: DispatchOperation,
    pub message: String,
}

impl DispatchWarning {
    pub(crate) fn new(
        reminder_id: Option<&ReminderId>,
        operation: DispatchOperation,
        error: impl std::fmt::Display,
    ) -> Self {
        let warning = Self {
            reminder_id: reminder_id.cloned(),
            operation,
            message: error.to_string(),
        };
        log::warn!(
            "{}. [reminder_id = {}]",
            warning,
            warning.reminder_id.as_deref().unwrap_or("-")
        );
        warning
    }
}

#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<DispatchWarning>,
}

impl<T> Outcome<T> {
    pub fn new(value: T, warnings: Vec<DispatchWarning>) -> Self {
        Self { value, warnings }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
