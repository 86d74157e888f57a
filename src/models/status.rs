use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    pub active: bool,
    pub item_count: usize,
}

/// Counters for one fetch -> parse -> filter -> notify pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub scraped: usize,
    pub discovered: usize,
    pub notified: usize,
    pub delivery_failures: usize,
    pub source_failures: usize,
}
