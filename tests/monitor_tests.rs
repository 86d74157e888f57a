mod common;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use common::{
    monitor_with, test_config, PanicOnceFetcher, RecordingChannel, SlowFetcher,
    StaticFetcher, TimeoutFetcher, OFFLINE_CARD, THREE_CARDS,
};
use funpayhunter::models::{Listing, MonitorStatus};
use funpayhunter::services::monitor::{Monitor, StartOutcome, StopOutcome};
use funpayhunter::services::notifier::{format_listing_message, NotifierGate};
use funpayhunter::services::telegram::ParseMode;

async fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    done()
}

#[tokio::test]
async fn same_page_twice_notifies_exactly_once() {
    let channel = RecordingChannel::new();
    let monitor = monitor_with(StaticFetcher::ok(THREE_CARDS), channel.clone());

    let first = monitor.run_pipeline_once().await;
    let second = monitor.run_pipeline_once().await;

    assert_eq!(first.scraped, 1);
    assert_eq!(first.discovered, 1);
    assert_eq!(first.notified, 1);
    assert_eq!(second.discovered, 0);
    assert_eq!(second.notified, 0);

    assert_eq!(channel.count(), 1);
    let sent = channel.sent.lock().unwrap()[0].clone();
    assert_eq!(sent.1, ParseMode::Html);
    assert!(sent.0.contains("Black Russia Vouchers"));
    assert!(sent.0.contains("1500"));
}

#[tokio::test]
async fn offline_listing_is_recorded_without_notification() {
    let channel = RecordingChannel::new();
    let monitor = monitor_with(StaticFetcher::ok(OFFLINE_CARD), channel.clone());

    let report = monitor.run_pipeline_once().await;

    assert_eq!(report.discovered, 1);
    assert_eq!(report.notified, 0);
    assert_eq!(channel.count(), 0);
    assert_eq!(monitor.store().len(), 1);

    // stays known, not re-evaluated
    assert_eq!(monitor.run_pipeline_once().await.discovered, 0);
}

#[tokio::test]
async fn failed_delivery_still_marks_listing_as_seen() {
    let channel = RecordingChannel::failing();
    let monitor = monitor_with(StaticFetcher::ok(THREE_CARDS), channel.clone());

    let report = monitor.run_pipeline_once().await;
    assert_eq!(report.delivery_failures, 1);
    assert_eq!(report.notified, 0);
    assert_eq!(monitor.store().len(), 1);

    let again = monitor.run_pipeline_once().await;
    assert_eq!(again.discovered, 0);
    assert_eq!(channel.count(), 1);
}

#[tokio::test]
async fn bad_status_and_transport_errors_yield_an_empty_pass() {
    let channel = RecordingChannel::new();

    let blocked = monitor_with(StaticFetcher::with_status(403, THREE_CARDS), channel.clone());
    let report = blocked.run_pipeline_once().await;
    assert_eq!(report.source_failures, 1);
    assert_eq!(report.scraped, 0);
    assert!(blocked.store().is_empty());

    let slow = monitor_with(Arc::new(TimeoutFetcher), channel.clone());
    let report = slow.run_pipeline_once().await;
    assert_eq!(report.source_failures, 1);
    assert!(slow.store().is_empty());

    assert_eq!(channel.count(), 0);
}

#[tokio::test]
async fn manual_pass_runs_while_stopped() {
    let monitor = monitor_with(StaticFetcher::ok(THREE_CARDS), RecordingChannel::new());

    monitor.run_pipeline_once().await;

    assert_eq!(
        monitor.status(),
        MonitorStatus {
            active: false,
            item_count: 1
        }
    );
}

#[tokio::test]
async fn start_and_stop_are_idempotent() {
    let fetcher = StaticFetcher::ok(THREE_CARDS);
    let monitor = monitor_with(fetcher.clone(), RecordingChannel::new());

    assert_eq!(monitor.stop(), StopOutcome::NotRunning);
    assert!(!monitor.status().active);

    assert_eq!(monitor.start(), StartOutcome::Started);
    assert_eq!(monitor.start(), StartOutcome::AlreadyRunning);
    assert!(monitor.status().active);

    assert!(wait_until(|| monitor.store().len() == 1).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    // one loop, one immediate pass, then a 60s wait
    assert_eq!(fetcher.calls(), 1);

    assert_eq!(monitor.stop(), StopOutcome::Stopped);
    assert_eq!(monitor.stop(), StopOutcome::NotRunning);
    assert!(!monitor.status().active);
    assert_eq!(monitor.status().item_count, 1);
}

#[tokio::test]
async fn stop_interrupts_the_wait_between_passes() {
    let monitor = monitor_with(StaticFetcher::ok(THREE_CARDS), RecordingChannel::new());

    monitor.start();
    assert!(wait_until(|| monitor.store().len() == 1).await);

    tokio::time::timeout(Duration::from_secs(1), monitor.shutdown())
        .await
        .expect("loop should exit well before the 60s interval");
    assert!(!monitor.is_active());
}

#[tokio::test]
async fn quick_restart_waits_for_the_stopped_loop() {
    let fetcher = SlowFetcher::new(THREE_CARDS, Duration::from_millis(300));
    let monitor = monitor_with(fetcher.clone(), RecordingChannel::new());

    assert_eq!(monitor.start(), StartOutcome::Started);
    tokio::time::sleep(Duration::from_millis(50)).await;

    // first loop is still inside its fetch
    assert_eq!(monitor.stop(), StopOutcome::Stopped);
    assert_eq!(monitor.start(), StartOutcome::Started);
    assert!(monitor.is_active());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fetcher.calls(), 1);

    assert!(wait_until(|| fetcher.calls() == 2).await);
    tokio::time::sleep(Duration::from_millis(350)).await;

    assert_eq!(fetcher.peak(), 1);
    assert_eq!(monitor.store().len(), 1);

    tokio::time::timeout(Duration::from_secs(2), monitor.shutdown())
        .await
        .expect("both loops should have exited");
    assert!(!monitor.is_active());
}

#[tokio::test]
async fn loop_survives_a_crashing_pass() {
    let fetcher = Arc::new(PanicOnceFetcher {
        body: THREE_CARDS.to_string(),
        calls: AtomicUsize::new(0),
    });
    let channel = RecordingChannel::new();
    let monitor = Monitor::new(
        test_config(Duration::from_secs(60), Duration::from_millis(20)),
        fetcher,
        channel.clone(),
    );

    monitor.start();

    assert!(wait_until(|| monitor.store().len() == 1).await);
    assert!(monitor.is_active());
    assert_eq!(channel.count(), 1);

    monitor.shutdown().await;
}

#[test]
fn message_format_is_deterministic() {
    let listing = Listing::new(
        "Black Russia <VIP> & co",
        1500,
        "https://funpay.com/chips/offer?id=1".to_string(),
        "c",
        true,
    );
    let at = Utc.with_ymd_and_hms(2026, 1, 2, 13, 4, 5).unwrap();

    let text = format_listing_message(&listing, &at);

    assert_eq!(text, format_listing_message(&listing, &at));
    assert!(text.contains("Black Russia &lt;VIP&gt; &amp; co"));
    assert!(text.contains("1500 RUB"));
    assert!(text.contains("Seller online"));
    assert!(text.contains("<a href='https://funpay.com/chips/offer?id=1'>"));
    assert!(text.ends_with("13:04:05"));
}

#[test]
fn gate_only_lets_online_sellers_through() {
    let online = Listing::new("Black Russia a", 100, String::new(), "c", true);
    let offline = Listing::new("Black Russia b", 100, String::new(), "c", false);

    assert!(NotifierGate::should_notify(&online));
    assert!(!NotifierGate::should_notify(&offline));
}
