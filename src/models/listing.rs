use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const MAX_TITLE_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    // "{title hash}_{price}", see `listing_identity`
    pub id: String,

    pub title: String,
    pub price: u32,
    pub link: String,
    pub category: String,

    // best effort, read from the card's status badge
    pub seller_online: bool,
}

impl Listing {
    pub fn new(
        title: &str,
        price: u32,
        link: String,
        category: &str,
        seller_online: bool,
    ) -> Self {
        Self {
            id: listing_identity(title, price),
            title: title.chars().take(MAX_TITLE_CHARS).collect(),
            price,
            link,
            category: category.to_string(),
            seller_online,
        }
    }
}

/// Deduplication key for an offer. Same (title, price) always gives the same key,
/// across calls and across process restarts.
pub fn listing_identity(title: &str, price: u32) -> String {
    let digest = Sha256::digest(title.as_bytes());
    format!("{}_{}", &hex::encode(digest)[..16], price)
}
