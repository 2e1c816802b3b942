use std::fs::File;
use std::path::Path;
use log::{info, error};
use serde::Deserialize;
use calamine::{open_workbook, Reader, Xlsx};

use crate::search::SearchQuery;

#[derive(Debug, Deserialize, Clone)]
pub struct QueryRecord {
    #[serde(
        rename = "Keyword",
        alias = "keyword",
        alias = "Job Title",
        alias = "job title",
        alias = "Title",
        alias = "Role"
    )]
    pub keyword: String,
    #[serde(
        rename = "Location",
        alias = "location",
        alias = "City",
        alias = "Where",
        default
    )]
    pub location: String,
}

impl QueryRecord {
    pub fn to_query(&self) -> SearchQuery {
        SearchQuery::new(self.keyword.trim(), self.location.trim())
    }
}

pub fn load_queries<P: AsRef<Path>>(filename: P) -> Vec<QueryRecord> {
    let path_ref = filename.as_ref();

    if !path_ref.exists() {
        error!("Input file {:?} does not exist.", path_ref);
        return Vec::new();
    }

    let is_excel = path_ref
        .extension()
        .map_or(false, |ext| ext == "xlsx" || ext == "xls");

    if is_excel {
        return load_excel(path_ref);
    }

    load_csv(path_ref)
}

fn load_csv(path: &Path) -> Vec<QueryRecord> {
    let mut records = Vec::new();
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            error!("Could not open CSV file: {}", e);
            return records;
        }
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    for result in rdr.deserialize::<QueryRecord>() {
        match result {
            Ok(record) => {
                if record.keyword.trim().is_empty() {
                    continue;
                }
                records.push(record);
            }
            Err(e) => {
                error!("Error parsing CSV record: {}", e);
            }
        }
    }
    info!("Loaded {} queries from CSV {:?}", records.len(), path);
    records
}

fn load_excel(path: &Path) -> Vec<QueryRecord> {
    let mut records = Vec::new();
    let mut excel: Xlsx<_> = match open_workbook(path) {
        Ok(wb) => wb,
        Err(e) => {
            error!("Could not open Excel file: {}", e);
            return records;
        }
    };

    let worksheets = excel.worksheets();
    if let Some((_name, range)) = worksheets.first() {
        // First row is the header; locate the keyword/location columns.
        let mut keyword_idx = None;
        let mut location_idx = None;

        for (row_idx, row) in range.rows().enumerate() {
            if row_idx == 0 {
                for (col_idx, cell) in row.iter().enumerate() {
                    let header = cell.to_string().to_lowercase();
                    if header.contains("keyword") || header.contains("title") || header.contains("role") {
                        keyword_idx = Some(col_idx);
                    } else if header.contains("location") || header.contains("city") {
                        location_idx = Some(col_idx);
                    }
                }

                if keyword_idx.is_none() {
                    error!("Excel header missing 'Keyword' column");
                    return records;
                }
                continue;
            }

            let keyword = keyword_idx
                .and_then(|i| row.get(i))
                .map(|c| c.to_string())
                .unwrap_or_default();
            let location = location_idx
                .and_then(|i| row.get(i))
                .map(|c| c.to_string())
                .unwrap_or_default();

            if !keyword.trim().is_empty() {
                records.push(QueryRecord { keyword, location });
            }
        }
    }

    info!("Loaded {} queries from Excel {:?}", records.len(), path);
    records
}
