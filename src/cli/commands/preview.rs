//! Preview command - inspect the loaded catalog.

use crate::cli::commands::open_warehouse;
use crate::cli::Output;
use crate::config::Settings;
use crate::store::Warehouse;
use anyhow::Result;

/// Run the preview command.
pub async fn run_preview(limit: usize, settings: Settings) -> Result<()> {
    let warehouse = open_warehouse(&settings)?;
    warehouse.provision().await?;

    let rows = warehouse.preview(limit).await?;

    if rows.is_empty() {
        Output::info("No data available in the catalog yet. Run 'sok load <csv>' first.");
        return Ok(());
    }

    let total = warehouse.count().await?;
    Output::header(&format!("Catalog preview ({} of {} videos)", rows.len(), total));

    for row in &rows {
        Output::catalog_row(&row.title, row.year, &row.description);
    }

    Ok(())
}
