//! Relational warehouse abstraction for the video catalog.
//!
//! Provides a trait-based interface over the table that backs the search index.

mod sqlite;

pub use sqlite::SqliteWarehouse;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single video row in the catalog table.
///
/// Field names mirror the warehouse column layout:
/// `VIDEO_TITLE`, `THUMBNAIL`, `VIDEO_DESCRIPTION`, `VIDEO_YEAR`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Video title.
    pub title: String,
    /// Thumbnail image URL.
    pub thumbnail_url: String,
    /// Video description.
    pub description: String,
    /// Year of publication.
    pub year: i32,
}

/// Trait for warehouse implementations.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Create the catalog table if it does not exist.
    async fn provision(&self) -> Result<()>;

    /// Replace the full table contents with the given rows (overwrite load).
    async fn replace_all(&self, rows: &[VideoRecord]) -> Result<usize>;

    /// Fetch the first rows of the table for inspection.
    async fn preview(&self, limit: usize) -> Result<Vec<VideoRecord>>;

    /// Get the total row count.
    async fn count(&self) -> Result<usize>;

    /// Fetch every row, in insertion order.
    async fn all(&self) -> Result<Vec<VideoRecord>>;

    /// Drop the catalog table.
    async fn drop_table(&self) -> Result<()>;
}
