use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};

use crate::models::Listing;
use crate::services::telegram::{NotifyChannel, ParseMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Sent,
    Failed,
    // seller offline, nothing sent
    Suppressed,
}

/// Decides which newly discovered listings reach the chat.
#[derive(Clone)]
pub struct NotifierGate {
    channel: Arc<dyn NotifyChannel>,
}

impl NotifierGate {
    pub fn new(channel: Arc<dyn NotifyChannel>) -> Self {
        Self { channel }
    }

    pub fn should_notify(listing: &Listing) -> bool {
        listing.seller_online
    }

    /// Sends the offer if its seller is online. Delivery is best effort: a failure is
    /// logged and reported, nothing is retried.
    pub async fn dispatch(&self, listing: &Listing) -> Dispatch {
        if !Self::should_notify(listing) {
            return Dispatch::Suppressed;
        }

        let text = format_listing_message(listing, &Local::now());
        match self.channel.send(&text, ParseMode::Html).await {
            Ok(()) => Dispatch::Sent,
            Err(e) => {
                tracing::error!(id = %listing.id, error = %e, "listing notification failed");
                Dispatch::Failed
            }
        }
    }
}

pub fn format_listing_message<Tz>(listing: &Listing, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "🎮 <b>NEW OFFER</b>\n\n\
         📦 {title}\n\
         💰 <b>Price:</b> {price} RUB\n\
         🟢 <b>Seller online</b>\n\
         🔗 <a href='{link}'>Open on FunPay</a>\n\n\
         ⏰ {time}",
        title = esc(&listing.title),
        price = listing.price,
        link = esc(&listing.link),
        time = at.format("%H:%M:%S"),
    )
}

/// Telegram HTML mode rejects unescaped markup characters.
pub fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
