use axum::{extract::State, http::StatusCode, response::Response};
use serde_json::json;

use crate::{
    controllers::{announce, page},
    services::monitor::{StartOutcome, StopOutcome},
    AppState,
};

fn notice(state: &AppState, title: &str, heading: &str, lines: &[String]) -> Response {
    page(
        state,
        StatusCode::OK,
        title,
        "pages/notice",
        json!({ "heading": heading, "lines": lines }),
    )
}

fn no_source(state: &AppState) -> Response {
    page(
        state,
        StatusCode::SERVICE_UNAVAILABLE,
        "No source",
        "pages/notice",
        json!({ "heading": "❌ No source configured", "lines": [] }),
    )
}

// GET /test
pub async fn get_parse_test(State(state): State<AppState>) -> Response {
    let Some(source) = state.monitor.config().sources.first().cloned() else {
        return no_source(&state);
    };

    let listings = state.monitor.preview(&source).await;
    let ctx = json!({ "count": listings.len(), "listings": listings });

    page(&state, StatusCode::OK, "Parse test", "pages/preview", ctx)
}

// GET /quick_test
pub async fn get_quick_test(State(state): State<AppState>) -> Response {
    let Some(source) = state.monitor.config().sources.first().cloned() else {
        return no_source(&state);
    };

    let ctx = match state.monitor.probe_source(&source).await {
        Ok(probe) => json!({ "probe": probe }),
        Err(e) => json!({ "error": e.to_string() }),
    };

    page(&state, StatusCode::OK, "Quick test", "pages/probe", ctx)
}

// GET /start_monitor
pub async fn get_start_monitor(State(state): State<AppState>) -> Response {
    match state.monitor.start() {
        StartOutcome::Started => {
            let every = state.monitor.config().poll_interval.as_secs();
            announce(
                &state,
                &format!(
                    "✅ <b>Monitoring started!</b>\nChecking for new offers every {every} seconds."
                ),
            )
            .await;

            notice(
                &state,
                "Monitoring",
                "✅ Monitoring started",
                &[
                    format!("Checking for new offers every {every} seconds."),
                    "New listings from online sellers are sent to Telegram.".to_string(),
                ],
            )
        }
        StartOutcome::AlreadyRunning => {
            notice(&state, "Monitoring", "⚠️ Monitoring is already running", &[])
        }
    }
}

// GET /stop_monitor
pub async fn get_stop_monitor(State(state): State<AppState>) -> Response {
    if state.monitor.stop() == StopOutcome::Stopped {
        announce(&state, "⏸️ <b>Monitoring stopped</b>").await;
    }

    notice(
        &state,
        "Monitoring",
        "⏸️ Monitoring stopped",
        &["New offers are no longer checked.".to_string()],
    )
}

// GET /check
pub async fn get_check(State(state): State<AppState>) -> Response {
    let report = state.monitor.run_pipeline_once().await;
    let total = state.monitor.store().len();

    notice(
        &state,
        "Check",
        "🔍 Check finished",
        &[
            format!("New listings: {}", report.discovered),
            format!("Notifications sent: {}", report.notified),
            format!("Listings in memory: {total}"),
        ],
    )
}
