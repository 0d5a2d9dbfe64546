//! CSV catalog ingestion.
//!
//! Reads a CSV of video metadata and bulk-loads it into the warehouse in
//! overwrite mode. Source column headers are mapped to the warehouse layout
//! (`Title` -> `VIDEO_TITLE`, `Thumbnail URL` -> `THUMBNAIL`, and so on).

use crate::error::{Result, SokError};
use crate::store::{VideoRecord, Warehouse};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument, warn};

/// One row of the source CSV, with the headers it actually carries.
#[derive(Debug, Deserialize)]
struct CsvVideoRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Thumbnail URL")]
    thumbnail_url: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Year")]
    year: i32,
}

impl From<CsvVideoRow> for VideoRecord {
    fn from(row: CsvVideoRow) -> Self {
        VideoRecord {
            title: row.title,
            thumbnail_url: row.thumbnail_url,
            description: row.description,
            year: row.year,
        }
    }
}

/// Outcome of a catalog load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// Rows written to the warehouse.
    pub rows_loaded: usize,
    /// Malformed rows skipped during parsing.
    pub rows_skipped: usize,
}

/// Parse a video catalog from any CSV reader.
///
/// Malformed rows (missing columns, unparseable years) are skipped and
/// counted, not fatal. A CSV with no valid rows is an ingest error.
pub fn read_catalog<R: Read>(reader: R) -> Result<(Vec<VideoRecord>, usize)> {
    let mut csv_reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in csv_reader.deserialize::<CsvVideoRow>() {
        match row {
            Ok(row) => records.push(row.into()),
            Err(e) => {
                warn!("Skipping malformed CSV row: {}", e);
                skipped += 1;
            }
        }
    }

    if records.is_empty() {
        return Err(SokError::Ingest(
            "CSV contained no valid video rows".to_string(),
        ));
    }

    Ok((records, skipped))
}

/// Parse a video catalog from a CSV file on disk.
pub fn read_catalog_file(path: &Path) -> Result<(Vec<VideoRecord>, usize)> {
    let file = std::fs::File::open(path).map_err(|e| {
        SokError::Ingest(format!("Cannot open CSV file {}: {}", path.display(), e))
    })?;
    read_catalog(file)
}

/// Load a CSV catalog file into the warehouse, replacing any previous contents.
#[instrument(skip(warehouse))]
pub async fn load_catalog(warehouse: &dyn Warehouse, path: &Path) -> Result<LoadReport> {
    let (records, rows_skipped) = read_catalog_file(path)?;

    warehouse.provision().await?;
    let rows_loaded = warehouse.replace_all(&records).await?;

    info!(
        "Catalog load complete: {} loaded, {} skipped",
        rows_loaded, rows_skipped
    );

    Ok(LoadReport {
        rows_loaded,
        rows_skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteWarehouse;

    const SAMPLE_CSV: &str = "\
Title,Thumbnail URL,Description,Year
The Power of Habits,https://img.example/habits.jpg,How small routines shape behavior,2015
Deep Ocean Life,https://img.example/ocean.jpg,Creatures of the abyssal zone,2018
";

    #[test]
    fn test_read_catalog_maps_columns() {
        let (records, skipped) = read_catalog(SAMPLE_CSV.as_bytes()).unwrap();

        assert_eq!(skipped, 0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "The Power of Habits");
        assert_eq!(records[0].thumbnail_url, "https://img.example/habits.jpg");
        assert_eq!(records[0].year, 2015);
        assert_eq!(records[1].year, 2018);
    }

    #[test]
    fn test_read_catalog_skips_malformed_rows() {
        let csv = "\
Title,Thumbnail URL,Description,Year
Good Row,https://img.example/a.jpg,Fine,2016
Bad Row,https://img.example/b.jpg,Year is not a number,twenty-twenty
";
        let (records, skipped) = read_catalog(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(skipped, 1);
        assert_eq!(records[0].title, "Good Row");
    }

    #[test]
    fn test_read_catalog_rejects_empty() {
        let csv = "Title,Thumbnail URL,Description,Year\n";
        let err = read_catalog(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SokError::Ingest(_)));
    }

    #[tokio::test]
    async fn test_load_catalog_into_warehouse() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("catalog.csv");
        std::fs::write(&csv_path, SAMPLE_CSV).unwrap();

        let warehouse = SqliteWarehouse::in_memory().unwrap();
        let report = load_catalog(&warehouse, &csv_path).await.unwrap();

        assert_eq!(report.rows_loaded, 2);
        assert_eq!(report.rows_skipped, 0);
        assert_eq!(warehouse.count().await.unwrap(), 2);
    }
}
