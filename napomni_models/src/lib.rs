pub mod error;
pub mod notification;
pub mod recurrence;
pub mod reminder;
pub mod settings;
pub mod wall_clock;

pub use chrono;
pub use chrono_tz;
