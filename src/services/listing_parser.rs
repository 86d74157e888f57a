//! Extracts listings from a FunPay category page.
//!
//! The page markup is not under our control and changes shape from time to time, so every
//! field is looked up through an ordered list of selectors and the first hit wins. A card
//! that cannot be read is skipped on its own; it never aborts the rest of the page.

use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::{error::ParseError, models::Listing};

pub const SITE_ORIGIN: &str = "https://funpay.com";

/// Cards processed per page, in document order.
pub const MAX_CANDIDATES: usize = 15;

pub const MIN_PRICE: u64 = 10;
pub const MAX_PRICE: u64 = 50_000;

/// Lower-case spellings of the tracked game, matched as plain substrings.
pub const KEYWORDS: [&str; 6] = [
    "black russia",
    "blackrussia",
    "блек раша",
    "блэк раша",
    "br ",
    "бр ",
];

const ONLINE_MARKERS: [&str; 2] = ["онлайн", "online"];

static CARD_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&["div.tc-item", "a.tc-item", ".tc-item", r#"[class*="tc-item"]"#])
});
static TITLE_SELECTOR: LazyLock<Vec<Selector>> = LazyLock::new(|| selectors(&["div.tc-desc-text"]));
static TITLE_FALLBACK_SELECTOR: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors(&["div, span, h3, h4"]));
static PRICE_SELECTOR: LazyLock<Vec<Selector>> = LazyLock::new(|| selectors(&["div.tc-price"]));
static LINK_SELECTOR: LazyLock<Vec<Selector>> = LazyLock::new(|| selectors(&["a"]));
static STATUS_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&["div.media-user-status", "div.online-status", "div.status"])
});

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

fn selectors(patterns: &[&str]) -> Vec<Selector> {
    patterns
        .iter()
        .filter_map(|p| Selector::parse(p).ok())
        .collect()
}

/// Parses one category page into at most [`MAX_CANDIDATES`] matching listings.
pub fn parse(markup: &str, category: &str, source_url: &str) -> Vec<Listing> {
    let document = Html::parse_document(markup);
    let cards = candidate_cards(&document);

    tracing::info!(category, cards = cards.len(), "unique cards found");

    let mut listings = Vec::new();
    for card in cards.into_iter().take(MAX_CANDIDATES) {
        match extract_listing(card, category, source_url) {
            Ok(listing) => {
                tracing::info!(
                    title = %listing.title,
                    price = listing.price,
                    online = listing.seller_online,
                    "matching listing"
                );
                listings.push(listing);
            }
            Err(reason) => tracing::debug!(%reason, "card skipped"),
        }
    }

    tracing::info!(category, matches = listings.len(), "page parsed");
    listings
}

/// Every element hit by any card selector, in document order, each distinct card markup
/// kept once.
fn candidate_cards(document: &Html) -> Vec<ElementRef<'_>> {
    let mut seen = HashSet::new();

    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| CARD_SELECTORS.iter().any(|s| s.matches(el)))
        .filter(|card| {
            let mut hasher = DefaultHasher::new();
            card.html().hash(&mut hasher);
            seen.insert(hasher.finish())
        })
        .collect()
}

fn extract_listing(
    card: ElementRef<'_>,
    category: &str,
    source_url: &str,
) -> Result<Listing, ParseError> {
    let title = extract_title(card).ok_or(ParseError::MissingTitle)?;

    if !matches_keywords(&title) {
        return Err(ParseError::KeywordMismatch);
    }

    let price = extract_price(card)?;
    let link = extract_link(card, source_url);
    let seller_online = extract_seller_online(card);

    Ok(Listing::new(&title, price, link, category, seller_online))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_match<'a>(card: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|s| card.select(s).next())
}

fn extract_title(card: ElementRef<'_>) -> Option<String> {
    if let Some(desc) = first_match(card, &TITLE_SELECTOR) {
        let text = element_text(desc);
        return (!text.is_empty()).then_some(text);
    }

    TITLE_FALLBACK_SELECTOR
        .iter()
        .flat_map(|s| card.select(s))
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Case-insensitive substring test against [`KEYWORDS`].
pub fn matches_keywords(title: &str) -> bool {
    let lowered = title.to_lowercase();
    KEYWORDS.iter().any(|k| lowered.contains(k))
}

fn extract_price(card: ElementRef<'_>) -> Result<u32, ParseError> {
    let text = first_match(card, &PRICE_SELECTOR)
        .map(element_text)
        .ok_or(ParseError::MissingPrice)?;

    let price = parse_price(&text)?;
    if !(MIN_PRICE..=MAX_PRICE).contains(&price) {
        return Err(ParseError::PriceOutOfRange(price));
    }

    u32::try_from(price).map_err(|_| ParseError::PriceOutOfRange(price))
}

/// Concatenates every digit run of `text` after dropping whitespace, so "1 500 руб." is 1500.
pub fn parse_price(text: &str) -> Result<u64, ParseError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits: String = DIGIT_RUN
        .find_iter(&compact)
        .map(|m| m.as_str())
        .collect();

    if digits.is_empty() {
        return Err(ParseError::MissingPrice);
    }

    // too many digits to fit is out of range anyway
    Ok(digits.parse::<u64>().unwrap_or(u64::MAX))
}

fn extract_link(card: ElementRef<'_>, source_url: &str) -> String {
    let anchor = if card.value().name() == "a" {
        Some(card)
    } else {
        first_match(card, &LINK_SELECTOR)
    };

    anchor
        .and_then(|a| a.value().attr("href"))
        .and_then(resolve_href)
        .unwrap_or_else(|| source_url.to_string())
}

/// Makes an `href` absolute against [`SITE_ORIGIN`]. `None` for anything not resolvable.
pub fn resolve_href(href: &str) -> Option<String> {
    let href = href.trim();
    if href.starts_with("//") {
        Some(format!("https:{href}"))
    } else if href.starts_with('/') {
        Some(format!("{SITE_ORIGIN}{href}"))
    } else if href.starts_with("http") {
        Some(href.to_string())
    } else {
        None
    }
}

fn extract_seller_online(card: ElementRef<'_>) -> bool {
    STATUS_SELECTORS.iter().any(|selector| {
        card.select(selector).next().is_some_and(|status| {
            let text = element_text(status).to_lowercase();
            ONLINE_MARKERS.iter().any(|m| text.contains(m))
        })
    })
}

/// Node counts for the connectivity diagnostics page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkupProbe {
    pub divs: usize,
    pub items: usize,
    pub descriptions: usize,
    pub bytes: usize,
}

pub fn probe(markup: &str) -> MarkupProbe {
    let document = Html::parse_document(markup);
    let count = |pattern: &str| {
        Selector::parse(pattern)
            .map(|s| document.select(&s).count())
            .unwrap_or(0)
    };

    MarkupProbe {
        divs: count("div"),
        items: count(".tc-item"),
        descriptions: count(".tc-desc-text"),
        bytes: markup.len(),
    }
}
