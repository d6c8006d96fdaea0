use crate::delay_until;

use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use proptest::prelude::*;

fn noon() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 5, 31)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
}

#[test]
fn future_trigger_delay_is_time_left() {
    let now = noon();
    let trigger_at = now + TimeDelta::hours(1);

    assert_eq!(delay_until(trigger_at, now), Duration::from_secs(3600));
}

#[test]
fn past_trigger_fires_immediately() {
    let now = noon();
    let trigger_at = now - TimeDelta::minutes(5);

    assert_eq!(delay_until(trigger_at, now), Duration::ZERO);
}

proptest! {
    #[test]
    fn delay_lands_on_trigger(offset_secs in -86_400i64..86_400 * 30) {
        let now = noon();
        let trigger_at = now + TimeDelta::seconds(offset_secs);
        let delay = delay_until(trigger_at, now);

        if offset_secs >= 0 {
            prop_assert_eq!(delay.as_secs() as i64, offset_secs);
        } else {
            prop_assert_eq!(delay, Duration::ZERO);
        }
    }
}
