use std::collections::VecDeque;

use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::config::ScrapeConfig;
use crate::delay_manager::{Delay, RandomDelay};
use crate::error::FetchError;
use crate::extractor::{Extractor, JobRecord};
use crate::search::{build_search_url, SearchQuery};

/// Fetches one search-results page by URL. Seam between the pagination
/// loop and the network, so tests can serve scripted pages.
pub trait PageFetcher {
    fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

impl<F: PageFetcher + ?Sized> PageFetcher for &F {
    fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch_page(url)
    }
}

/// How a pagination run ended. The record sequence itself does not
/// distinguish these; `Jobs::status` reports the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStatus {
    Running,
    EndOfResults,
    PageLimit,
    Blocked,
    TransportError,
}

impl Default for ScrapeStatus {
    fn default() -> Self {
        ScrapeStatus::Running
    }
}

pub struct JobScraper {
    config: ScrapeConfig,
    client: Client,
    extractor: Extractor,
}

impl JobScraper {
    pub fn new(config: ScrapeConfig) -> Self {
        Url::parse(&config.base_url).expect("Invalid base URL in scrape config");

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .expect("Invalid header name in scrape config");
            let value =
                HeaderValue::from_str(value).expect("Invalid header value in scrape config");
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        JobScraper {
            config,
            client,
            extractor: Extractor::new(),
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Lazily paginate through the results for `query`. Each call re-runs
    /// the full fetch sequence; dropping the iterator early issues no
    /// further requests.
    pub fn search(&self, query: &SearchQuery) -> Jobs<'_, &JobScraper, RandomDelay> {
        info!("Searching jobs: '{}' in '{}'", query.keyword, query.location);
        Jobs::new(
            self,
            RandomDelay::new(self.config.delay_bounds),
            &self.extractor,
            &self.config,
            query.clone(),
        )
    }
}

impl PageFetcher for JobScraper {
    fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.text()?)
    }
}

/// Lazy iterator over the records of one search. A page is fetched only
/// once the previous page's records have been drained.
pub struct Jobs<'a, F: PageFetcher, D: Delay> {
    fetcher: F,
    delay: D,
    extractor: &'a Extractor,
    config: &'a ScrapeConfig,
    query: SearchQuery,
    offset: usize,
    pages_fetched: usize,
    buffered: VecDeque<JobRecord>,
    status: ScrapeStatus,
}

impl<'a, F: PageFetcher, D: Delay> Jobs<'a, F, D> {
    pub fn new(
        fetcher: F,
        delay: D,
        extractor: &'a Extractor,
        config: &'a ScrapeConfig,
        query: SearchQuery,
    ) -> Self {
        Jobs {
            fetcher,
            delay,
            extractor,
            config,
            query,
            offset: 0,
            pages_fetched: 0,
            buffered: VecDeque::new(),
            status: ScrapeStatus::Running,
        }
    }

    pub fn status(&self) -> ScrapeStatus {
        self.status
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fetch_next_page(&mut self) {
        if self.pages_fetched >= self.config.max_pages {
            self.status = ScrapeStatus::PageLimit;
            return;
        }

        // Politeness pause before every request except the first.
        if self.pages_fetched > 0 {
            self.delay.pause();
        }

        let url = build_search_url(self.config, &self.query, self.offset);
        info!(
            "Fetching page {} (offset {}): {}",
            self.pages_fetched + 1,
            self.offset,
            url
        );

        let body = match self.fetcher.fetch_page(&url) {
            Ok(body) => body,
            Err(e) => {
                if e.is_blocked() {
                    warn!("Blocked at {}: {}", url, e);
                    self.status = ScrapeStatus::Blocked;
                } else {
                    warn!("Stopping pagination: {}", e);
                    self.status = ScrapeStatus::TransportError;
                }
                return;
            }
        };
        self.pages_fetched += 1;

        let records = self.extractor.extract_page(&body, &self.query.location);
        debug!(
            "Extracted {} records from page {}",
            records.len(),
            self.pages_fetched
        );

        // A short page signals the end of the listings.
        if records.len() < self.config.page_size {
            self.status = ScrapeStatus::EndOfResults;
        }

        self.offset += self.config.page_size;
        self.buffered.extend(records);
    }
}

impl<F: PageFetcher, D: Delay> Iterator for Jobs<'_, F, D> {
    type Item = JobRecord;

    fn next(&mut self) -> Option<JobRecord> {
        loop {
            if let Some(record) = self.buffered.pop_front() {
                return Some(record);
            }
            if self.status != ScrapeStatus::Running {
                return None;
            }
            self.fetch_next_page();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Paused,
        Fetched(String),
    }

    type EventLog = Rc<RefCell<Vec<Event>>>;

    struct ScriptedFetcher {
        pages: RefCell<VecDeque<Result<String, FetchError>>>,
        events: EventLog,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<Result<String, FetchError>>, events: EventLog) -> Self {
            ScriptedFetcher {
                pages: RefCell::new(pages.into()),
                events,
            }
        }
    }

    impl PageFetcher for ScriptedFetcher {
        fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
            self.events.borrow_mut().push(Event::Fetched(url.to_string()));
            self.pages
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(FetchError::Status(StatusCode::NOT_FOUND)))
        }
    }

    struct RecordingDelay {
        events: EventLog,
    }

    impl Delay for RecordingDelay {
        fn pause(&mut self) {
            self.events.borrow_mut().push(Event::Paused);
        }
    }

    fn card(i: usize) -> String {
        format!(
            r#"<div class="jobsearch-SerpJobCard">
                <a data-tn-element="jobTitle">Role {i}</a>
                <span class="company">Corp {i}</span>
                <div class="location">City {i}</div>
            </div>"#
        )
    }

    fn wrap(cards: &str) -> String {
        format!("<html><body>{}</body></html>", cards)
    }

    fn page_with(n: usize) -> String {
        let cards: String = (0..n).map(card).collect();
        wrap(&cards)
    }

    fn test_config() -> ScrapeConfig {
        ScrapeConfig {
            base_url: "https://jobs.example.com/search".to_string(),
            page_size: 2,
            max_pages: 3,
            ..ScrapeConfig::default()
        }
    }

    fn run(
        pages: Vec<Result<String, FetchError>>,
        config: &ScrapeConfig,
        extractor: &Extractor,
    ) -> (Vec<JobRecord>, ScrapeStatus, usize, Vec<Event>) {
        let events: EventLog = Rc::new(RefCell::new(Vec::new()));
        let fetcher = ScriptedFetcher::new(pages, events.clone());
        let delay = RecordingDelay {
            events: events.clone(),
        };
        let mut jobs = Jobs::new(
            fetcher,
            delay,
            extractor,
            config,
            SearchQuery::new("Rust Developer", "Remote"),
        );
        let records: Vec<JobRecord> = jobs.by_ref().collect();
        let log = events.borrow().clone();
        (records, jobs.status(), jobs.pages_fetched(), log)
    }

    fn fetch_count(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, Event::Fetched(_)))
            .count()
    }

    #[test]
    fn short_page_ends_pagination() {
        let config = test_config();
        let extractor = Extractor::new();
        let (records, status, pages, events) = run(
            vec![Ok(page_with(2)), Ok(page_with(1)), Ok(page_with(2))],
            &config,
            &extractor,
        );
        assert_eq!(records.len(), 3);
        assert_eq!(status, ScrapeStatus::EndOfResults);
        assert_eq!(pages, 2);
        assert_eq!(fetch_count(&events), 2);
    }

    #[test]
    fn empty_page_is_final() {
        let config = test_config();
        let extractor = Extractor::new();
        let (records, status, pages, events) =
            run(vec![Ok(page_with(0))], &config, &extractor);
        assert!(records.is_empty());
        assert_eq!(status, ScrapeStatus::EndOfResults);
        assert_eq!(pages, 1);
        assert_eq!(fetch_count(&events), 1);
    }

    #[test]
    fn page_limit_bounds_requests() {
        let config = test_config();
        let extractor = Extractor::new();
        let full = || Ok(page_with(2));
        let (records, status, pages, events) = run(
            vec![full(), full(), full(), full(), full()],
            &config,
            &extractor,
        );
        assert_eq!(records.len(), 6);
        assert_eq!(status, ScrapeStatus::PageLimit);
        assert_eq!(pages, 3);
        assert_eq!(fetch_count(&events), 3);
    }

    #[test]
    fn transport_failure_preserves_earlier_records() {
        let config = test_config();
        let extractor = Extractor::new();
        let (records, status, _, events) = run(
            vec![
                Ok(page_with(2)),
                Err(FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR)),
                Ok(page_with(2)),
            ],
            &config,
            &extractor,
        );
        assert_eq!(records.len(), 2);
        assert_eq!(status, ScrapeStatus::TransportError);
        assert_eq!(fetch_count(&events), 2);
    }

    #[test]
    fn blocked_response_is_classified() {
        let config = test_config();
        let extractor = Extractor::new();
        let (records, status, _, _) = run(
            vec![
                Ok(page_with(2)),
                Err(FetchError::Status(StatusCode::TOO_MANY_REQUESTS)),
            ],
            &config,
            &extractor,
        );
        assert_eq!(records.len(), 2);
        assert_eq!(status, ScrapeStatus::Blocked);
    }

    #[test]
    fn delay_precedes_every_request_except_the_first() {
        let config = test_config();
        let extractor = Extractor::new();
        let (_, _, _, events) = run(
            vec![Ok(page_with(2)), Ok(page_with(2)), Ok(page_with(1))],
            &config,
            &extractor,
        );
        let kinds: Vec<bool> = events
            .iter()
            .map(|e| matches!(e, Event::Paused))
            .collect();
        // fetch, pause, fetch, pause, fetch
        assert_eq!(kinds, vec![false, true, false, true, false]);
    }

    #[test]
    fn offset_advances_by_page_size() {
        let config = test_config();
        let extractor = Extractor::new();
        let (_, _, _, events) = run(
            vec![Ok(page_with(2)), Ok(page_with(2)), Ok(page_with(0))],
            &config,
            &extractor,
        );
        let urls: Vec<&String> = events
            .iter()
            .filter_map(|e| match e {
                Event::Fetched(url) => Some(url),
                Event::Paused => None,
            })
            .collect();
        assert!(urls[0].ends_with("start=0"));
        assert!(urls[1].ends_with("start=2"));
        assert!(urls[2].ends_with("start=4"));
    }

    #[test]
    fn fetching_is_driven_by_consumption() {
        let config = test_config();
        let extractor = Extractor::new();
        let events: EventLog = Rc::new(RefCell::new(Vec::new()));
        let fetcher = ScriptedFetcher::new(
            vec![Ok(page_with(2)), Ok(page_with(2))],
            events.clone(),
        );
        let delay = RecordingDelay {
            events: events.clone(),
        };
        let mut jobs = Jobs::new(
            fetcher,
            delay,
            &extractor,
            &config,
            SearchQuery::new("Rust", "Remote"),
        );
        assert!(jobs.next().is_some());
        assert!(jobs.next().is_some());
        // Second page not requested until its first record is demanded.
        assert_eq!(fetch_count(&events.borrow()), 1);
        assert!(jobs.next().is_some());
        assert_eq!(fetch_count(&events.borrow()), 2);
    }

    #[test]
    fn exhausted_iterator_issues_no_further_requests() {
        let config = test_config();
        let extractor = Extractor::new();
        let events: EventLog = Rc::new(RefCell::new(Vec::new()));
        let fetcher = ScriptedFetcher::new(vec![Ok(page_with(1))], events.clone());
        let delay = RecordingDelay {
            events: events.clone(),
        };
        let mut jobs = Jobs::new(
            fetcher,
            delay,
            &extractor,
            &config,
            SearchQuery::new("Rust", "Remote"),
        );
        assert_eq!(jobs.by_ref().count(), 1);
        assert!(jobs.next().is_none());
        assert!(jobs.next().is_none());
        assert_eq!(fetch_count(&events.borrow()), 1);
    }

    #[test]
    fn cards_missing_fields_do_not_count_toward_the_page() {
        // Two cards served, one unusable: the page falls short and ends
        // pagination even though the raw card count matched the page size.
        let config = test_config();
        let extractor = Extractor::new();
        let page = wrap(&format!(
            r#"{}<div class="jobsearch-SerpJobCard">
                <a data-tn-element="jobTitle">No Company</a>
            </div>"#,
            card(0)
        ));
        let (records, status, _, _) =
            run(vec![Ok(page), Ok(page_with(2))], &config, &extractor);
        assert_eq!(records.len(), 1);
        assert_eq!(status, ScrapeStatus::EndOfResults);
    }
}
