//! Search command implementation.

use crate::cli::commands::{build_index, build_summarizer, open_warehouse};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SokError;
use crate::search::YearRange;
use crate::session::Session;
use crate::store::Warehouse;
use anyhow::Result;

/// Run the search command: one session, submit, optionally navigate, print.
pub async fn run_search(
    query: &str,
    year_from: Option<i32>,
    year_to: Option<i32>,
    page: usize,
    settings: Settings,
) -> Result<()> {
    let years = match (year_from, year_to) {
        (None, None) => None,
        (Some(from), Some(to)) => Some(YearRange::new(from, to)?),
        _ => {
            Output::error("Both --year-from and --year-to are required to filter by year.");
            anyhow::bail!("Incomplete year range");
        }
    };

    let warehouse = open_warehouse(&settings)?;
    warehouse.provision().await?;

    let index = build_index(&settings, &warehouse).await?;
    let summarizer = build_summarizer(&settings)?;
    let mut session = Session::new(index, summarizer, settings.search.page_size)
        .with_summary_rows(settings.summary.max_rows);

    let spinner = Output::spinner("Searching...");
    let outcome = session.submit_search(query, years).await;
    spinner.finish_and_clear();

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    };

    if outcome.total_count == 0 {
        Output::warning("No results found.");
        return Ok(());
    }

    if page > 1 {
        match session.go_to_page(page).await {
            Ok(()) => {}
            Err(SokError::InvalidInput(msg)) => {
                Output::error(&msg);
                anyhow::bail!("{}", msg);
            }
            Err(e) => {
                // Navigation failed; the first page is still displayable
                Output::warning(&format!("Could not fetch page {}: {}", page, e));
            }
        }
    }

    if let Some(summary) = session.summary() {
        Output::summary_block(summary);
    } else if let Some(reason) = &outcome.summary_error {
        Output::warning(&format!("Summary unavailable: {}", reason));
    }

    let current = session
        .current_page()
        .expect("page present after successful search");
    let page_size = session.page_size();
    let shown_from = (current.query.page - 1) * page_size + 1;
    let shown_to = shown_from + current.rows.len().saturating_sub(1);

    Output::success(&format!(
        "Showing results {} to {} of {} (page {} of {})",
        shown_from,
        shown_to,
        current.total_count,
        current.query.page,
        outcome.total_pages
    ));

    for row in &current.rows {
        Output::video_result(&row.title, row.year, &row.description, &row.thumbnail_url);
    }

    Ok(())
}
