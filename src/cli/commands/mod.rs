//! CLI command implementations.

mod config;
mod init;
mod load;
mod preview;
mod search;
mod serve;

pub use config::run_config;
pub use init::run_init;
pub use load::run_load;
pub use preview::run_preview;
pub use search::run_search;
pub use serve::run_serve;

use crate::config::{Prompts, SearchProvider, Settings};
use crate::error::{Result, SokError};
use crate::search::{MemorySearchIndex, RemoteSearchIndex, SearchIndex};
use crate::store::{SqliteWarehouse, Warehouse};
use crate::summary::{OpenAISummarizer, Summarizer};
use std::sync::Arc;

/// Open the configured warehouse.
pub(crate) fn open_warehouse(settings: &Settings) -> Result<SqliteWarehouse> {
    SqliteWarehouse::new(&settings.sqlite_path())
}

/// Build the configured search index.
///
/// Local mode snapshots the warehouse into an in-process index; remote mode
/// talks to the hosted service.
pub(crate) async fn build_index(
    settings: &Settings,
    warehouse: &dyn Warehouse,
) -> Result<Arc<dyn SearchIndex>> {
    match settings.search.provider {
        SearchProvider::Local => {
            let index = MemorySearchIndex::from_warehouse(warehouse).await?;
            Ok(Arc::new(index))
        }
        SearchProvider::Remote => {
            let endpoint = settings.search.endpoint.as_deref().ok_or_else(|| {
                SokError::Config(
                    "search.endpoint must be set for the remote provider".to_string(),
                )
            })?;
            let api_key = std::env::var(&settings.search.api_key_env).ok();
            let index =
                RemoteSearchIndex::new(endpoint, api_key, settings.search.columns.clone())?;
            Ok(Arc::new(index))
        }
    }
}

/// Build the configured summarizer.
pub(crate) fn build_summarizer(settings: &Settings) -> Result<Arc<dyn Summarizer>> {
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    Ok(Arc::new(
        OpenAISummarizer::new(&settings.summary.model).with_prompts(prompts),
    ))
}
