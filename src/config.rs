use std::time::Duration;

// Browser-mimicking headers, sent verbatim on every request.
// Accept-Encoding is left to the client, which negotiates gzip/brotli and
// decompresses transparently.
const DEFAULT_HEADERS: [(&str, &str); 4] = [
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    ),
    ("Accept-Language", "en-US,en;q=0.9,hi;q=0.8"),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    ),
    ("Referer", "https://www.google.com/"),
];

/// Tunables for a scrape run. `Default` matches the public Indeed endpoint.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Search endpoint, without the query string.
    pub base_url: String,
    /// Results the site serves per page. A page yielding fewer extracted
    /// jobs is treated as the last one.
    pub page_size: usize,
    /// Safety bound on requests issued for a single search.
    pub max_pages: usize,
    /// Uniform bounds, in seconds, for the politeness delay between pages.
    pub delay_bounds: (f64, f64),
    /// Per-request timeout.
    pub timeout: Duration,
    /// Header name/value pairs installed as client defaults.
    pub headers: Vec<(String, String)>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            base_url: "https://www.indeed.co.in/jobs".to_string(),
            page_size: 10,
            max_pages: 5,
            delay_bounds: (2.0, 5.0),
            timeout: Duration::from_secs(10),
            headers: DEFAULT_HEADERS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_site_constants() {
        let config = ScrapeConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.delay_bounds, (2.0, 5.0));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.base_url.starts_with("https://"));
    }

    #[test]
    fn default_headers_include_browser_identity() {
        let config = ScrapeConfig::default();
        let names: Vec<&str> = config.headers.iter().map(|(n, _)| n.as_str()).collect();
        for expected in ["User-Agent", "Accept-Language", "Accept", "Referer"] {
            assert!(names.contains(&expected), "missing header {}", expected);
        }
    }
}
