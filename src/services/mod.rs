pub mod fetcher;
pub mod listing_parser;
pub mod monitor;
pub mod notifier;
pub mod seen_store;
pub mod telegram;
