use std::{env, time::Duration};

use crate::models::Source;
use crate::services::monitor::MonitorConfig;

pub const DEFAULT_SOURCE_URL: &str = "https://funpay.com/chips/186/";
pub const DEFAULT_SOURCE_CATEGORY: &str = "Black Russia - Вирты";

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub telegram_bot_token: String,
    pub telegram_chat_id: String,

    pub sources: Vec<Source>,
    pub poll_interval_secs: u64,
    pub error_backoff_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Settings {
    pub fn telegram_configured(&self) -> bool {
        !self.telegram_bot_token.is_empty() && !self.telegram_chat_id.is_empty()
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            sources: self.sources.clone(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            error_backoff: Duration::from_secs(self.error_backoff_secs),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            ..MonitorConfig::default()
        }
    }
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(5000);

    let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let telegram_chat_id = env::var("TELEGRAM_CHAT_ID")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let sources = env::var("MONITOR_SOURCES")
        .ok()
        .map(|raw| parse_sources(&raw))
        .filter(|list| !list.is_empty())
        .unwrap_or_else(|| {
            vec![Source::new(DEFAULT_SOURCE_URL, DEFAULT_SOURCE_CATEGORY)]
        });

    Settings {
        host,
        port,
        telegram_bot_token,
        telegram_chat_id,
        sources,
        poll_interval_secs: secs_var("POLL_INTERVAL_SECS", 30),
        error_backoff_secs: secs_var("ERROR_BACKOFF_SECS", 10),
        fetch_timeout_secs: secs_var("FETCH_TIMEOUT_SECS", 10),
    }
}

fn secs_var(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default)
}

/// Parses `url|category;url|category`. Entries without a category reuse the url.
pub fn parse_sources(raw: &str) -> Vec<Source> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('|') {
            Some((url, category)) => Source::new(url.trim(), category.trim()),
            None => Source::new(entry, entry),
        })
        .collect()
}
