//! In-process search index implementation.
//!
//! Used for local mode and testing. Ranking is a plain term-frequency score
//! over title and description with insertion order as the tie-break, so a
//! stable catalog always yields the same ordering.

use super::{ResultSet, SearchIndex, SearchRequest, VideoHit};
use crate::error::Result;
use crate::store::Warehouse;
use async_trait::async_trait;
use std::sync::RwLock;
use tracing::debug;

/// In-process search index.
pub struct MemorySearchIndex {
    hits: RwLock<Vec<VideoHit>>,
}

impl MemorySearchIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self {
            hits: RwLock::new(Vec::new()),
        }
    }

    /// Build an index from the current contents of a warehouse.
    pub async fn from_warehouse(warehouse: &dyn Warehouse) -> Result<Self> {
        let records = warehouse.all().await?;
        let index = Self::new();
        index.index_batch(records.into_iter().map(Into::into).collect());
        Ok(index)
    }

    /// Add a row to the index.
    pub fn index(&self, hit: VideoHit) {
        self.hits.write().unwrap().push(hit);
    }

    /// Add a batch of rows to the index.
    pub fn index_batch(&self, batch: Vec<VideoHit>) {
        self.hits.write().unwrap().extend(batch);
    }

    /// Replace the indexed rows wholesale (after a fresh catalog load).
    pub fn replace_all(&self, batch: Vec<VideoHit>) {
        let mut hits = self.hits.write().unwrap();
        hits.clear();
        hits.extend(batch);
    }

    /// Number of indexed rows.
    pub fn len(&self) -> usize {
        self.hits.read().unwrap().len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Term-frequency score of a hit against the query terms.
    fn score(hit: &VideoHit, terms: &[String]) -> usize {
        let haystack = format!("{} {}", hit.title, hit.description).to_lowercase();
        terms
            .iter()
            .map(|term| haystack.matches(term.as_str()).count())
            .sum()
    }
}

impl Default for MemorySearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    async fn search(&self, request: &SearchRequest) -> Result<ResultSet> {
        let terms: Vec<String> = request
            .text
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let hits = self.hits.read().unwrap();

        let mut scored: Vec<(usize, usize, &VideoHit)> = hits
            .iter()
            .enumerate()
            .filter(|(_, hit)| {
                request
                    .years
                    .map(|range| range.contains(hit.year))
                    .unwrap_or(true)
            })
            .map(|(order, hit)| (Self::score(hit, &terms), order, hit))
            .filter(|(score, _, _)| *score > 0)
            .collect();

        // Rank by score, then insertion order for a stable total order
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let total_count = scored.len();
        let page: Vec<VideoHit> = scored
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .map(|(_, _, hit)| hit.clone())
            .collect();

        debug!(
            "Query '{}' matched {} rows, returning {} from offset {}",
            request.text,
            total_count,
            page.len(),
            request.offset
        );

        Ok(ResultSet {
            hits: page,
            total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::YearRange;

    fn hit(title: &str, description: &str, year: i32) -> VideoHit {
        VideoHit {
            title: title.to_string(),
            description: description.to_string(),
            thumbnail_url: format!("https://img.example/{}.jpg", year),
            year,
        }
    }

    fn request(text: &str, limit: usize, offset: usize, years: Option<YearRange>) -> SearchRequest {
        SearchRequest {
            text: text.to_string(),
            limit,
            offset,
            years,
        }
    }

    #[tokio::test]
    async fn test_ranking_and_total_count() {
        let index = MemorySearchIndex::new();
        index.index_batch(vec![
            hit("Ocean life", "A film about the ocean and ocean currents", 2016),
            hit("Mountain trails", "Hiking in the alps", 2017),
            hit("Ocean myths", "Stories of the sea", 2018),
        ]);

        let result = index.search(&request("ocean", 10, 0, None)).await.unwrap();
        assert_eq!(result.total_count, 2);
        // Higher term frequency ranks first
        assert_eq!(result.hits[0].title, "Ocean life");
        assert_eq!(result.hits[1].title, "Ocean myths");
    }

    #[tokio::test]
    async fn test_deterministic_ordering() {
        let index = MemorySearchIndex::new();
        index.index_batch(vec![
            hit("Space walk", "Astronauts in space", 2015),
            hit("Space food", "Eating in space", 2016),
        ]);

        let first = index.search(&request("space", 10, 0, None)).await.unwrap();
        let second = index.search(&request("space", 10, 0, None)).await.unwrap();
        assert_eq!(first.hits, second.hits);
    }

    #[tokio::test]
    async fn test_year_filter_applied_before_counting() {
        let index = MemorySearchIndex::new();
        index.index_batch(vec![
            hit("Climate report", "climate data", 2014),
            hit("Climate talks", "climate policy", 2015),
            hit("Climate future", "climate models", 2018),
            hit("Climate history", "climate archives", 2019),
        ]);

        let range = YearRange::new(2015, 2018).unwrap();
        let result = index
            .search(&request("climate", 10, 0, Some(range)))
            .await
            .unwrap();

        assert_eq!(result.total_count, 2);
        assert!(result.hits.iter().all(|h| (2015..=2018).contains(&h.year)));

        let unfiltered = index.search(&request("climate", 10, 0, None)).await.unwrap();
        assert_eq!(unfiltered.total_count, 4);
    }

    #[tokio::test]
    async fn test_offset_and_limit() {
        let index = MemorySearchIndex::new();
        // Equal scores, so insertion order is the rank order
        for i in 0..5 {
            index.index(hit(&format!("robot {}", i), "one machine", 2020 + i));
        }

        let page = index.search(&request("robot", 2, 2, None)).await.unwrap();
        assert_eq!(page.total_count, 5);
        assert_eq!(page.hits.len(), 2);
        assert_eq!(page.hits[0].title, "robot 2");
        assert_eq!(page.hits[1].title, "robot 3");

        let tail = index.search(&request("robot", 2, 4, None)).await.unwrap();
        assert_eq!(tail.hits.len(), 1);
        assert_eq!(tail.hits[0].title, "robot 4");
    }

    #[tokio::test]
    async fn test_no_matches() {
        let index = MemorySearchIndex::new();
        index.index(hit("Gardening", "Growing tomatoes", 2021));

        let result = index.search(&request("quantum", 10, 0, None)).await.unwrap();
        assert_eq!(result.total_count, 0);
        assert!(result.hits.is_empty());
    }
}
