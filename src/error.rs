//! Error types shared by the fetcher, the parser and the notification channel.

use thiserror::Error;

/// Failures while fetching a listing page.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the fetch timeout
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connection, TLS or body read failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Why a single candidate node was skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no title text found")]
    MissingTitle,

    #[error("title does not mention the tracked game")]
    KeywordMismatch,

    #[error("no price digits found")]
    MissingPrice,

    #[error("price {0} is outside the accepted range")]
    PriceOutOfRange(u64),
}

/// Errors that can occur when delivering a chat message.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Bot token or chat id missing
    #[error("channel not configured")]
    NotConfigured,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered with a non-success status
    #[error("Bot API rejected message: {status} {body}")]
    Api { status: u16, body: String },
}
