use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::ChannelError;

const API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Plain,
    Html,
}

impl ParseMode {
    fn as_api_str(self) -> Option<&'static str> {
        match self {
            ParseMode::Plain => None,
            ParseMode::Html => Some("HTML"),
        }
    }
}

/// Outbound chat messages.
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    async fn send(&self, text: &str, mode: ParseMode) -> Result<(), ChannelError>;
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            http: Client::new(),
            bot_token,
            chat_id,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.bot_token.trim().is_empty() && !self.chat_id.trim().is_empty()
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

#[async_trait]
impl NotifyChannel for TelegramClient {
    async fn send(&self, text: &str, mode: ParseMode) -> Result<(), ChannelError> {
        if !self.is_configured() {
            tracing::warn!("Telegram is not configured, message dropped");
            return Err(ChannelError::NotConfigured);
        }

        let url = format!("{API_BASE}/bot{}/sendMessage", self.bot_token);
        let res = self
            .http
            .post(url)
            .timeout(SEND_TIMEOUT)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
                parse_mode: mode.as_api_str(),
            })
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Api { status, body });
        }

        let preview: String = text.chars().take(50).collect();
        tracing::info!(%preview, "sent to Telegram");
        Ok(())
    }
}
