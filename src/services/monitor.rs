//! The polling scheduler: owns the start/stop lifecycle and runs the
//! fetch -> parse -> filter-new -> notify pass.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::models::{Listing, MonitorStatus, PassReport, Source};
use crate::services::fetcher::{FetchedPage, Fetcher};
use crate::services::listing_parser::{self, MarkupProbe};
use crate::services::notifier::{Dispatch, NotifierGate};
use crate::services::seen_store::SeenStore;
use crate::services::telegram::NotifyChannel;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub sources: Vec<Source>,
    // pause between two passes
    pub poll_interval: Duration,
    // pause after a pass that crashed
    pub error_backoff: Duration,
    pub fetch_timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sources: vec![Source::new(
                crate::config::DEFAULT_SOURCE_URL,
                crate::config::DEFAULT_SOURCE_CATEGORY,
            )],
            poll_interval: Duration::from_secs(30),
            error_backoff: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

/// Result of the connectivity check against a source page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceProbe {
    pub status: u16,
    pub elapsed_ms: u64,
    pub probe: MarkupProbe,
}

struct RunningTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct TaskSlot {
    running: Option<RunningTask>,
    // cancelled loop that may still be finishing its pass
    retiring: Option<JoinHandle<()>>,
}

/// Shared handle to the scheduler. Clones drive the same store and the same loop.
#[derive(Clone)]
pub struct Monitor {
    config: Arc<MonitorConfig>,
    fetcher: Arc<dyn Fetcher>,
    gate: NotifierGate,
    store: SeenStore,
    task: Arc<Mutex<TaskSlot>>,
}

impl Monitor {
    pub fn new(
        config: MonitorConfig,
        fetcher: Arc<dyn Fetcher>,
        channel: Arc<dyn NotifyChannel>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
            gate: NotifierGate::new(channel),
            store: SeenStore::new(),
            task: Arc::new(Mutex::new(TaskSlot::default())),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn store(&self) -> &SeenStore {
        &self.store
    }

    fn slot(&self) -> MutexGuard<'_, TaskSlot> {
        self.task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_active(&self) -> bool {
        self.slot().running.is_some()
    }

    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            active: self.is_active(),
            item_count: self.store.len(),
        }
    }

    /// Spawns the polling loop unless one is already live. Must be called inside a
    /// tokio runtime.
    ///
    /// A loop stopped moments ago may still be inside its last pass; the new loop waits
    /// for it to exit before its own first pass.
    pub fn start(&self) -> StartOutcome {
        let mut slot = self.slot();
        if slot.running.is_some() {
            tracing::info!("monitoring already running");
            return StartOutcome::AlreadyRunning;
        }

        let previous = slot.retiring.take();
        let token = CancellationToken::new();
        let handle = tokio::spawn(self.clone().run_loop(token.clone(), previous));
        slot.running = Some(RunningTask { token, handle });

        StartOutcome::Started
    }

    /// Signals the loop to end. A pass in flight finishes first; the wait between passes
    /// is cut short.
    pub fn stop(&self) -> StopOutcome {
        let mut slot = self.slot();
        match slot.running.take() {
            Some(task) => {
                task.token.cancel();
                slot.retiring = Some(task.handle);
                tracing::info!("monitoring stop requested");
                StopOutcome::Stopped
            }
            None => StopOutcome::NotRunning,
        }
    }

    /// Stops the loop and waits for it to exit.
    pub async fn shutdown(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut slot = self.slot();
            let running = slot.running.take().map(|task| {
                task.token.cancel();
                task.handle
            });
            running.into_iter().chain(slot.retiring.take()).collect()
        };

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "monitoring task ended abnormally");
            }
        }
    }

    async fn run_loop(self, token: CancellationToken, previous: Option<JoinHandle<()>>) {
        // awaited in full even if we are cancelled meanwhile, so a later restart that
        // waits on this loop also waits on the one before it
        if let Some(previous) = previous {
            if let Err(e) = previous.await {
                tracing::error!(error = %e, "previous monitoring task ended abnormally");
            }
        }

        tracing::info!(
            interval = ?self.config.poll_interval,
            sources = self.config.sources.len(),
            "monitoring loop started"
        );

        while !token.is_cancelled() {
            let pause = match AssertUnwindSafe(self.run_pipeline_once())
                .catch_unwind()
                .await
            {
                Ok(_) => self.config.poll_interval,
                Err(panic) => {
                    tracing::error!(reason = %panic_message(&*panic), "monitoring pass crashed");
                    self.config.error_backoff
                }
            };

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        tracing::info!("monitoring loop stopped");
    }

    /// One full pass over every source. Runs whether or not the loop is active.
    pub async fn run_pipeline_once(&self) -> PassReport {
        tracing::info!("checking for new listings");
        let mut report = PassReport::default();

        for source in &self.config.sources {
            let Some(listings) = self.scrape(source).await else {
                report.source_failures += 1;
                continue;
            };
            report.scraped += listings.len();

            let fresh = self.store.filter_new(listings);
            report.discovered += fresh.len();

            for listing in &fresh {
                match self.gate.dispatch(listing).await {
                    Dispatch::Sent => report.notified += 1,
                    Dispatch::Failed => report.delivery_failures += 1,
                    Dispatch::Suppressed => {}
                }
            }
        }

        tracing::info!(
            discovered = report.discovered,
            notified = report.notified,
            total = self.store.len(),
            "pass finished"
        );
        report
    }

    /// Parses a source without recording anything.
    pub async fn preview(&self, source: &Source) -> Vec<Listing> {
        self.scrape(source).await.unwrap_or_default()
    }

    pub async fn probe_source(&self, source: &Source) -> Result<SourceProbe, TransportError> {
        let started = Instant::now();
        let page = self
            .fetcher
            .fetch(&source.url, self.config.probe_timeout)
            .await?;

        Ok(SourceProbe {
            status: page.status,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            probe: listing_parser::probe(&page.body),
        })
    }

    async fn scrape(&self, source: &Source) -> Option<Vec<Listing>> {
        let page = self.fetch_page(&source.url).await?;
        Some(listing_parser::parse(&page.body, &source.category, &source.url))
    }

    async fn fetch_page(&self, url: &str) -> Option<FetchedPage> {
        match self.fetcher.fetch(url, self.config.fetch_timeout).await {
            Ok(page) if page.is_ok() => Some(page),
            Ok(page) => {
                tracing::error!(url, status = page.status, "unexpected HTTP status");
                None
            }
            Err(e) => {
                tracing::error!(url, error = %e, "fetch failed");
                None
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
