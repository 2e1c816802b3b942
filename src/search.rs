use crate::config::ScrapeConfig;

/// One keyword/location search, immutable for the duration of a scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub location: String,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>, location: impl Into<String>) -> Self {
        SearchQuery {
            keyword: keyword.into(),
            location: location.into(),
        }
    }

    /// Stable key identifying this query in the progress file.
    pub fn progress_key(&self) -> String {
        format!("{}|{}", self.keyword.trim(), self.location.trim())
    }
}

// Spaces become '+'; the site takes everything else as-is.
fn url_escape(term: &str) -> String {
    term.trim().replace(' ', "+")
}

/// Render the page request for `query` at `offset` (a multiple of the page size).
pub fn build_search_url(config: &ScrapeConfig, query: &SearchQuery, offset: usize) -> String {
    format!(
        "{}?q={}&l={}&start={}",
        config.base_url.trim_end_matches('/'),
        url_escape(&query.keyword),
        url_escape(&query.location),
        offset
    )
}
