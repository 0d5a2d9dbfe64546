//! Load command - CSV catalog ingestion.

use crate::cli::commands::open_warehouse;
use crate::cli::Output;
use crate::config::Settings;
use crate::ingest;
use crate::store::Warehouse;
use anyhow::Result;
use std::path::Path;

/// Run the load command.
pub async fn run_load(csv: &str, settings: Settings) -> Result<()> {
    let path = Path::new(csv);
    if !path.exists() {
        Output::error(&format!("CSV file not found: {}", csv));
        anyhow::bail!("CSV file not found: {}", csv);
    }

    let warehouse = open_warehouse(&settings)?;

    let spinner = Output::spinner("Loading catalog into warehouse...");
    let result = ingest::load_catalog(&warehouse, path).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            Output::success(&format!("Loaded {} videos", report.rows_loaded));
            if report.rows_skipped > 0 {
                Output::warning(&format!(
                    "Skipped {} malformed rows",
                    report.rows_skipped
                ));
            }

            let total = warehouse.count().await?;
            Output::kv("Catalog size", &total.to_string());
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Load failed: {}", e));
            Err(anyhow::anyhow!("{}", e))
        }
    }
}
