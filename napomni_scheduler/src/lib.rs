pub mod delivery;
mod dispatcher;
pub mod display;
pub mod resolver;

pub use dispatcher::{NotificationDispatcher, NotificationPayload};
pub use display::{describe, format_relative};
pub use resolver::{has_future_occurrence, next_trigger};
