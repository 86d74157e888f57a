use serde::Serialize;

/// One listing page to poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub url: String,
    pub category: String,
}

impl Source {
    pub fn new(url: &str, category: &str) -> Self {
        Self {
            url: url.to_string(),
            category: category.to_string(),
        }
    }
}
