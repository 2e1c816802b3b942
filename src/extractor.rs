use log::debug;
use scraper::{ElementRef, Html, Selector};

/// One extracted listing. `location` falls back to the search location
/// when the card carries none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
}

/// Pulls `JobRecord`s out of a search-results page.
///
/// The site serves two card variants, so the card selector accepts either
/// class-name substring. A card missing its title or company is dropped;
/// a missing location falls back to the query's location.
pub struct Extractor {
    card: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
}

impl Extractor {
    pub fn new() -> Self {
        Extractor {
            card: Selector::parse(
                r#"div[class*="jobsearch-SerpJobCard"], div[class*="job_list_item"]"#,
            )
            .unwrap(),
            title: Selector::parse(r#"a[data-tn-element="jobTitle"]"#).unwrap(),
            company: Selector::parse("span.company").unwrap(),
            location: Selector::parse("div.location, span.location").unwrap(),
        }
    }

    /// Extract every complete record from one page of results.
    pub fn extract_page(&self, html: &str, fallback_location: &str) -> Vec<JobRecord> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();
        for card in document.select(&self.card) {
            match self.extract_card(&card, fallback_location) {
                Some(record) => records.push(record),
                None => debug!("Skipping card without title/company"),
            }
        }
        records
    }

    fn extract_card(&self, card: &ElementRef, fallback_location: &str) -> Option<JobRecord> {
        let title = self.text_of(card, &self.title)?;
        let company = self.text_of(card, &self.company)?;
        let location = self
            .text_of(card, &self.location)
            .unwrap_or_else(|| fallback_location.to_string());
        Some(JobRecord {
            title,
            company,
            location,
        })
    }

    fn text_of(&self, card: &ElementRef, selector: &Selector) -> Option<String> {
        let element = card.select(selector).next()?;
        let text = element.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor::new()
    }
}
