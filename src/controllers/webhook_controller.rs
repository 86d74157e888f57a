use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use crate::{
    controllers::announce,
    services::listing_parser::{MAX_PRICE, MIN_PRICE},
    services::monitor::StartOutcome,
    AppState,
};

// Only the fields the bot reacts to; Telegram sends much more.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub text: Option<String>,
    pub chat: Chat,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Check,
    Monitor,
    Stop,
    Status,
}

impl BotCommand {
    /// Accepts `/status` as well as the group-chat form `/status@SomeBot`.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.split('@').next().unwrap_or(word);

        match name {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/check" => Some(Self::Check),
            "/monitor" => Some(Self::Monitor),
            "/stop" => Some(Self::Stop),
            "/status" => Some(Self::Status),
            _ => None,
        }
    }
}

fn reply_status(status: StatusCode, value: &str) -> Response {
    (status, Json(json!({ "status": value }))).into_response()
}

// POST /webhook
pub async fn post_webhook(State(state): State<AppState>, Json(update): Json<Update>) -> Response {
    let Some(message) = update.message else {
        return reply_status(StatusCode::OK, "ok");
    };

    if message.chat.id.to_string() != state.settings.telegram_chat_id {
        tracing::warn!(chat_id = message.chat.id, "webhook message from unknown chat");
        return reply_status(StatusCode::FORBIDDEN, "error");
    }

    let Some(command) = message.text.as_deref().and_then(BotCommand::parse) else {
        return reply_status(StatusCode::OK, "ok");
    };

    tracing::info!(?command, "bot command");
    run_command(&state, command).await;

    reply_status(StatusCode::OK, "ok")
}

async fn run_command(state: &AppState, command: BotCommand) {
    let every = state.monitor.config().poll_interval.as_secs();

    match command {
        BotCommand::Start => {
            announce(
                state,
                "🚀 <b>FunPay Hunter for Black Russia</b>\n\n\
                 I watch FunPay for new offers and message you when a seller is online.\n\n\
                 <b>Commands:</b>\n\
                 /check - check now\n\
                 /monitor - start automatic checks\n\
                 /stop - stop\n\
                 /status - status\n\
                 /help - help",
            )
            .await;
        }
        BotCommand::Help => {
            announce(
                state,
                &format!(
                    "❓ <b>Help</b>\n\n\
                     The bot tracks Black Russia offers on FunPay.\n\
                     Online sellers only, price {MIN_PRICE}-{MAX_PRICE} RUB.\n\n\
                     Open the service address in a browser for the web panel."
                ),
            )
            .await;
        }
        BotCommand::Check => {
            announce(state, "🔍 Checking...").await;
            state.monitor.run_pipeline_once().await;
            let total = state.monitor.store().len();
            announce(state, &format!("✅ Done. Listings in memory: {total}")).await;
        }
        BotCommand::Monitor => match state.monitor.start() {
            StartOutcome::Started => {
                announce(
                    state,
                    &format!("✅ Monitoring started! Checking every {every} seconds."),
                )
                .await;
            }
            StartOutcome::AlreadyRunning => {
                announce(state, "⚠️ Monitoring is already running").await;
            }
        },
        BotCommand::Stop => {
            state.monitor.stop();
            announce(state, "⏸️ Monitoring stopped").await;
        }
        BotCommand::Status => {
            let status = state.monitor.status();
            let label = if status.active { "🟢 ACTIVE" } else { "🔴 STOPPED" };
            announce(
                state,
                &format!(
                    "📊 <b>Status</b>\n\nMonitoring: {label}\nListings: {}\nTime: {}",
                    status.item_count,
                    Local::now().format("%H:%M:%S")
                ),
            )
            .await;
        }
    }
}
