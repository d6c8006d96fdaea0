mod clock;
mod error;
mod filter;
mod history;
mod service;
mod sort;
#[cfg(test)]
mod test_support;

pub use clock::{Clock, SystemClock};
pub use error::{DispatchOperation, DispatchWarning, LifecycleError, Outcome};
pub use filter::{
    ActivityFilter, DateRange, FilteredCount, ReminderFilters, TimeSlot, apply_all_filters,
    filtered_count,
};
pub use service::{ReminderService, ServiceConfig};
pub use sort::{SortOrder, apply_sorting};
