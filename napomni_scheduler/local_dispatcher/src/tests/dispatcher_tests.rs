use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use proptest::prelude::*;
use test_strategy::proptest;

use crate::*;

type DeliveredNotifications = Arc<Mutex<Vec<String>>>;

#[derive(Clone)]
struct TestDeliveryChannel {
    delivered: DeliveredNotifications,
}

#[async_trait]
impl NotificationDeliveryChannel for TestDeliveryChannel {
    async fn deliver(&self, payload: &NotificationPayload) -> anyhow::Result<()> {
        self.delivered
            .lock()
            .unwrap()
            .push(payload.notification_id.clone());
        Ok(())
    }
}

struct TestContext {
    delivered: DeliveredNotifications,
    dispatcher: LocalNotificationDispatcher,
}

impl TestContext {
    fn new() -> Self {
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let channel = TestDeliveryChannel {
            delivered: delivered.clone(),
        };
        let dispatcher = LocalNotificationDispatcher::new(Arc::new(channel));

        Self {
            delivered,
            dispatcher,
        }
    }

    fn delivered(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }
}

fn tokio_ct(
    future: impl std::future::Future<Output = Result<(), TestCaseError>>,
) -> Result<(), TestCaseError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
        .block_on(future)
}

fn payload(reminder_id: &str, notification_id: &str, delay_minutes: i64) -> NotificationPayload {
    NotificationPayload {
        reminder_id: reminder_id.to_string(),
        notification_id: notification_id.to_string(),
        title: "Drink water".to_string(),
        body: "Time for your reminder!".to_string(),
        trigger_at: Utc::now() + TimeDelta::minutes(delay_minutes),
        sound: Some("default".to_string()),
        channel_hint: "default".to_string(),
        vibration: vec![0, 250, 250, 250],
        timeout: Some(Duration::from_secs(30)),
    }
}

async fn wait_minutes(minutes: i64) {
    tokio::time::sleep(Duration::from_secs(minutes as u64 * 60 + 1)).await;
}

#[proptest(async = tokio_ct)]
async fn fires_after_delay_proptest(#[strategy(1i64..24 * 60)] delay_minutes: i64) {
    let ctx = TestContext::new();

    ctx.dispatcher
        .schedule(payload("r1", "n1", delay_minutes))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(delay_minutes as u64 * 60 - 30)).await;
    prop_assert!(ctx.delivered().is_empty());

    wait_minutes(1).await;
    prop_assert_eq!(ctx.delivered(), vec!["n1".to_string()]);
}

#[proptest(async = tokio_ct)]
async fn cancelled_dispatch_never_fires_proptest(#[strategy(1i64..24 * 60)] delay_minutes: i64) {
    let ctx = TestContext::new();

    let dispatch_id = ctx
        .dispatcher
        .schedule(payload("r1", "n1", delay_minutes))
        .await
        .unwrap();
    ctx.dispatcher.cancel(&dispatch_id).await.unwrap();

    wait_minutes(delay_minutes).await;

    prop_assert!(ctx.delivered().is_empty());
}

#[tokio::test(start_paused = true)]
async fn past_trigger_fires_right_away() {
    let ctx = TestContext::new();

    ctx.dispatcher
        .schedule(payload("r1", "n1", -5))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(ctx.delivered(), vec!["n1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn cancel_all_for_reminder_keeps_other_reminders() {
    let ctx = TestContext::new();

    ctx.dispatcher
        .schedule(payload("r1", "n1", 10))
        .await
        .unwrap();
    ctx.dispatcher
        .schedule(payload("r1", "n2", 20))
        .await
        .unwrap();
    ctx.dispatcher
        .schedule(payload("r2", "n3", 15))
        .await
        .unwrap();

    ctx.dispatcher
        .cancel_all_for_reminder(&"r1".to_string())
        .await
        .unwrap();
    wait_minutes(30).await;

    assert_eq!(ctx.delivered(), vec!["n3".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn cancel_unknown_dispatch_fails() {
    let ctx = TestContext::new();

    let result = ctx.dispatcher.cancel(&"missing".to_string()).await;

    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn cancel_all_for_unknown_reminder_is_a_no_op() {
    let ctx = TestContext::new();

    ctx.dispatcher
        .cancel_all_for_reminder(&"missing".to_string())
        .await
        .unwrap();

    assert_eq!(ctx.dispatcher.pending_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn cleanup_drops_fired_tasks() {
    let ctx = TestContext::new();

    ctx.dispatcher
        .schedule(payload("r1", "n1", 1))
        .await
        .unwrap();
    ctx.dispatcher
        .schedule(payload("r2", "n2", 60))
        .await
        .unwrap();
    assert_eq!(ctx.dispatcher.pending_count().await, 2);

    wait_minutes(6).await;

    assert_eq!(ctx.dispatcher.pending_count().await, 1);
    assert_eq!(ctx.dispatcher.tasks.read().await.len(), 1);
}
