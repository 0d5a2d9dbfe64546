//! Semantic search index abstraction.
//!
//! Provides a trait-based interface over the index that answers catalog
//! queries, with a hosted remote backend and an in-process backend.

mod memory;
mod remote;

pub use memory::MemorySearchIndex;
pub use remote::RemoteSearchIndex;

use crate::error::{Result, SokError};
use crate::store::VideoRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An inclusive year range filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    /// Create a year range; both bounds are inclusive.
    pub fn new(min: i32, max: i32) -> Result<Self> {
        if min > max {
            return Err(SokError::InvalidInput(format!(
                "Year range start {} is after end {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Check whether a year falls inside the range.
    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

/// One page worth of index query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Natural-language query text.
    pub text: String,
    /// Maximum number of rows to return.
    pub limit: usize,
    /// Number of ranked rows to skip.
    pub offset: usize,
    /// Optional inclusive year filter; None matches all years.
    pub years: Option<YearRange>,
}

/// A single ranked result row, as returned by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoHit {
    /// Video title.
    pub title: String,
    /// Video description.
    pub description: String,
    /// Thumbnail image URL.
    pub thumbnail_url: String,
    /// Year of publication.
    pub year: i32,
}

impl From<VideoRecord> for VideoHit {
    fn from(record: VideoRecord) -> Self {
        Self {
            title: record.title,
            description: record.description,
            thumbnail_url: record.thumbnail_url,
            year: record.year,
        }
    }
}

/// The index's answer to one [`SearchRequest`].
#[derive(Debug, Clone)]
pub struct ResultSet {
    /// Matching rows in rank order, at most `limit` of them.
    pub hits: Vec<VideoHit>,
    /// Exact number of matches for the query and filter, across all pages.
    pub total_count: usize,
}

/// Trait for search index implementations.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Run one paged query against the index.
    async fn search(&self, request: &SearchRequest) -> Result<ResultSet>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_range_inclusive() {
        let range = YearRange::new(2015, 2018).unwrap();
        assert!(range.contains(2015));
        assert!(range.contains(2018));
        assert!(!range.contains(2014));
        assert!(!range.contains(2019));
    }

    #[test]
    fn test_year_range_rejects_inverted_bounds() {
        assert!(YearRange::new(2020, 2015).is_err());
        assert!(YearRange::new(2020, 2020).is_ok());
    }
}
