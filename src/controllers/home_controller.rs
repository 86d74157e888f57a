use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Local;
use serde_json::json;

use crate::{controllers::page, AppState};

pub async fn home(State(state): State<AppState>) -> Response {
    let status = state.monitor.status();

    let ctx = json!({
        "active": status.active,
        "item_count": status.item_count,
        "time": Local::now().format("%H:%M:%S").to_string(),
        "telegram": state.settings.telegram_configured(),
        "sources": state.monitor.config().sources,
    });

    page(&state, StatusCode::OK, "FunPay Hunter", "pages/home", ctx)
}

pub async fn not_found(State(state): State<AppState>) -> Response {
    page(&state, StatusCode::NOT_FOUND, "404", "pages/not_found", json!({}))
}

// GET /status
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.monitor.status())
}

// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.monitor.status();

    Json(json!({
        "status": "ok",
        "monitoring": status.active,
        "items": status.item_count,
        "time": Local::now().to_rfc3339(),
    }))
}
