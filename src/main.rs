use job_scraper_lib::{delay_manager, input_loader, logger};
use job_scraper_lib::{JobScraper, ProgressState, ScrapeConfig, ScrapeStatus};

use std::env;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use log::{info, warn, error};
use chrono::Local;

const DEFAULT_INPUT: &str = "queries.csv";
const OUTPUT_CSV: &str = "results.csv";

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    info!("Starting Job Scraper...");

    // 1. Load queries (CSV or Excel)
    let input_file = env::args().nth(1).unwrap_or_else(|| DEFAULT_INPUT.to_string());
    let queries = input_loader::load_queries(&input_file);
    if queries.is_empty() {
        error!(
            "No queries found in {}. Please ensure the file exists and has headers: Keyword, Location",
            input_file
        );
        return Ok(());
    }

    // 2. Load Resume State
    let mut progress = ProgressState::load();

    // 3. Initialize Scraper
    let scraper = JobScraper::new(ScrapeConfig::default());

    // 4. Initialize CSV Writer
    let file_exists = Path::new(OUTPUT_CSV).exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(OUTPUT_CSV)?;

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if !file_exists {
        csv_writer.write_record([
            "keyword",
            "location",
            "title",
            "company",
            "job_location",
            "timestamp",
        ])?;
        csv_writer.flush()?;
    }

    let total = queries.len();
    let mut processed_count = 0;

    for (i, record) in queries.iter().enumerate() {
        let query = record.to_query();
        let key = query.progress_key();

        if progress.contains(&key) {
            continue;
        }

        processed_count += 1;
        info!(
            "Processing {} / {} : '{}' in '{}'",
            i + 1,
            total,
            query.keyword,
            query.location
        );

        // DELAY between queries
        if processed_count > 1 {
            delay_manager::random_query_delay();
        }

        let mut jobs = scraper.search(&query);
        let mut found = 0;

        for job in jobs.by_ref() {
            found += 1;
            info!("Job {:>3}: {} at {} ({})", found, job.title, job.company, job.location);

            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            if let Err(e) = csv_writer.write_record([
                query.keyword.as_str(),
                query.location.as_str(),
                job.title.as_str(),
                job.company.as_str(),
                job.location.as_str(),
                timestamp.as_str(),
            ]) {
                error!("Failed to write CSV record for '{}': {}", job.title, e);
            }
        }
        csv_writer.flush()?;

        let status_str = match jobs.status() {
            ScrapeStatus::EndOfResults => "end_of_results",
            ScrapeStatus::PageLimit => "page_limit",
            ScrapeStatus::Blocked => "blocked",
            ScrapeStatus::TransportError => "transport_error",
            ScrapeStatus::Running => "running",
        };

        if jobs.status() == ScrapeStatus::Blocked {
            warn!("Site refused further requests for '{}' in '{}'", query.keyword, query.location);
        }

        info!(
            "'{}' in '{}': {} jobs over {} pages ({})",
            query.keyword,
            query.location,
            found,
            jobs.pages_fetched(),
            status_str
        );

        progress.mark_complete(key);
    }

    info!("Scraping completed. Processed {} new queries.", processed_count);
    Ok(())
}
