#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use funpayhunter::error::{ChannelError, TransportError};
use funpayhunter::models::Source;
use funpayhunter::services::fetcher::{FetchedPage, Fetcher};
use funpayhunter::services::monitor::{Monitor, MonitorConfig};
use funpayhunter::services::telegram::{NotifyChannel, ParseMode};

pub const SOURCE_URL: &str = "https://funpay.com/chips/186/";

/// (a) matches and is online, (b) fails the keyword filter, (c) fails the price range.
pub const THREE_CARDS: &str = r#"
<html><body>
<div class="tc">
  <a class="tc-item" href="/chips/offer?id=101">
    <div class="tc-desc-text">Black Russia Vouchers</div>
    <div class="tc-price">1 500 руб.</div>
    <div class="media-user-status">Онлайн</div>
  </a>
  <a class="tc-item" href="/chips/offer?id=102">
    <div class="tc-desc-text">Unrelated Item</div>
    <div class="tc-price">200</div>
    <div class="media-user-status">online</div>
  </a>
  <a class="tc-item" href="/chips/offer?id=103">
    <div class="tc-desc-text">BlackRussia Gold</div>
    <div class="tc-price">99999</div>
    <div class="media-user-status">offline</div>
  </a>
</div>
</body></html>
"#;

pub const OFFLINE_CARD: &str = r#"
<html><body>
  <a class="tc-item" href="/chips/offer?id=201">
    <div class="tc-desc-text">Black Russia coins, fast delivery</div>
    <div class="tc-price">350</div>
    <div class="media-user-status">был 3 часа назад</div>
  </a>
</body></html>
"#;

pub struct StaticFetcher {
    pub status: u16,
    pub body: String,
    pub calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn ok(body: &str) -> Arc<Self> {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body: body.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, _url: &str, _timeout: Duration) -> Result<FetchedPage, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchedPage {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

pub struct TimeoutFetcher;

#[async_trait]
impl Fetcher for TimeoutFetcher {
    async fn fetch(&self, _url: &str, timeout: Duration) -> Result<FetchedPage, TransportError> {
        Err(TransportError::Timeout(timeout))
    }
}

/// Panics on the first call, serves `body` afterwards.
pub struct PanicOnceFetcher {
    pub body: String,
    pub calls: AtomicUsize,
}

#[async_trait]
impl Fetcher for PanicOnceFetcher {
    async fn fetch(&self, _url: &str, _timeout: Duration) -> Result<FetchedPage, TransportError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("markup exploded");
        }
        Ok(FetchedPage {
            status: 200,
            body: self.body.clone(),
        })
    }
}

/// Serves `body` after `delay`, tracking how many fetches overlap.
pub struct SlowFetcher {
    pub body: String,
    pub delay: Duration,
    pub calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl SlowFetcher {
    pub fn new(body: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            body: body.to_string(),
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for SlowFetcher {
    async fn fetch(&self, _url: &str, _timeout: Duration) -> Result<FetchedPage, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(FetchedPage {
            status: 200,
            body: self.body.clone(),
        })
    }
}

#[derive(Default)]
pub struct RecordingChannel {
    pub sent: Mutex<Vec<(String, ParseMode)>>,
    pub fail: bool,
}

impl RecordingChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotifyChannel for RecordingChannel {
    async fn send(&self, text: &str, mode: ParseMode) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push((text.to_string(), mode));
        if self.fail {
            return Err(ChannelError::Api {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(())
    }
}

pub fn test_config(poll_interval: Duration, error_backoff: Duration) -> MonitorConfig {
    MonitorConfig {
        sources: vec![Source::new(SOURCE_URL, "Black Russia")],
        poll_interval,
        error_backoff,
        fetch_timeout: Duration::from_secs(1),
        probe_timeout: Duration::from_secs(1),
    }
}

pub fn monitor_with(fetcher: Arc<dyn Fetcher>, channel: Arc<dyn NotifyChannel>) -> Monitor {
    Monitor::new(
        test_config(Duration::from_secs(60), Duration::from_secs(60)),
        fetcher,
        channel,
    )
}
