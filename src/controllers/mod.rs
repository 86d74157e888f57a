pub mod home_controller;
pub mod monitor_controller;
pub mod webhook_controller;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{error::ChannelError, render, services::telegram::ParseMode, AppState};

pub(crate) fn page(
    state: &AppState,
    status: StatusCode,
    title: &str,
    tpl: &str,
    ctx: serde_json::Value,
) -> Response {
    match render::render_page(state, title, tpl, &ctx) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("template error: {e}")),
        )
            .into_response(),
    }
}

/// Best-effort chat message outside the listing flow (announcements, bot replies).
pub(crate) async fn announce(state: &AppState, text: &str) {
    match state.channel.send(text, ParseMode::Html).await {
        Ok(()) | Err(ChannelError::NotConfigured) => {}
        Err(e) => tracing::error!(error = %e, "chat message failed"),
    }
}
