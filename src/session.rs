//! Per-session search controller.
//!
//! A [`Session`] owns the state of one interactive search session: the current
//! query, the current page of results, and the summary of the top results. It
//! translates discrete user actions (submit a search, go to a page, refresh
//! the summary) into at most one index fetch per action and at most one
//! completion call per fresh result set.
//!
//! Operations take `&mut self` and run to completion, so a session can never
//! have two fetches in flight; callers that share a session across tasks must
//! serialize access (the HTTP layer wraps each session in a mutex).

use crate::error::{Result, SokError};
use crate::search::{SearchIndex, SearchRequest, VideoHit, YearRange};
use crate::summary::Summarizer;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Most rows the summarizer ever sees.
pub const MAX_SUMMARY_ROWS: usize = 3;

/// An issued query: text, 1-indexed page, optional year filter.
///
/// Immutable once issued; every user action produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub page: usize,
    pub years: Option<YearRange>,
}

/// One fetched page of results, replaced wholesale on the next fetch.
#[derive(Debug, Clone)]
pub struct ResultPage {
    /// The query this page answers.
    pub query: SearchQuery,
    /// Rows in the rank order the index returned them.
    pub rows: Vec<VideoHit>,
    /// Exact number of matches for the query and filter, across all pages.
    pub total_count: usize,
}

/// State owned by one session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub current_query: Option<SearchQuery>,
    pub current_page: Option<ResultPage>,
    pub summary: Option<String>,
}

/// What a successful `submit_search` reports back to the caller.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub total_count: usize,
    pub total_pages: usize,
    /// Set when the results were fetched but summarization failed.
    pub summary_error: Option<String>,
}

/// Total page count for a result set: `ceil(total_count / page_size)`.
pub fn total_pages(total_count: usize, page_size: usize) -> usize {
    total_count.div_ceil(page_size)
}

/// Controller for one interactive search session.
pub struct Session {
    index: Arc<dyn SearchIndex>,
    summarizer: Arc<dyn Summarizer>,
    page_size: usize,
    summary_rows: usize,
    state: SessionState,
}

impl Session {
    /// Create a session over the given collaborators. A page size of zero is
    /// treated as one; page math divides by it.
    pub fn new(
        index: Arc<dyn SearchIndex>,
        summarizer: Arc<dyn Summarizer>,
        page_size: usize,
    ) -> Self {
        Self {
            index,
            summarizer,
            page_size: page_size.max(1),
            summary_rows: MAX_SUMMARY_ROWS,
            state: SessionState::default(),
        }
    }

    /// Set how many top rows are summarized (clamped to 1-3).
    pub fn with_summary_rows(mut self, rows: usize) -> Self {
        self.summary_rows = rows.clamp(1, MAX_SUMMARY_ROWS);
        self
    }

    /// The session's page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Current session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The page currently displayed, if any.
    pub fn current_page(&self) -> Option<&ResultPage> {
        self.state.current_page.as_ref()
    }

    /// The summary of the current result set, if any.
    pub fn summary(&self) -> Option<&str> {
        self.state.summary.as_deref()
    }

    /// Total page count for the current result set; 0 when there is none.
    pub fn total_pages(&self) -> usize {
        self.state
            .current_page
            .as_ref()
            .map(|page| total_pages(page.total_count, self.page_size))
            .unwrap_or(0)
    }

    /// Start a fresh search: page resets to 1, the previous result set and
    /// summary are replaced, and the top rows are summarized once.
    ///
    /// A blank query is rejected before any fetch. If the index call fails
    /// the session state is left untouched. Summarization failure is not
    /// fatal: the rows stay displayable and the failure is reported in the
    /// returned [`SearchOutcome`].
    #[instrument(skip(self), fields(query = %text))]
    pub async fn submit_search(
        &mut self,
        text: &str,
        years: Option<YearRange>,
    ) -> Result<SearchOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SokError::EmptyQuery);
        }

        let query = SearchQuery {
            text: text.to_string(),
            page: 1,
            years,
        };

        let result = self
            .index
            .search(&SearchRequest {
                text: query.text.clone(),
                limit: self.page_size,
                offset: 0,
                years: query.years,
            })
            .await?;

        info!(
            "Search '{}' matched {} rows ({} on page 1)",
            query.text,
            result.total_count,
            result.hits.len()
        );

        let page = ResultPage {
            query: query.clone(),
            rows: result.hits,
            total_count: result.total_count,
        };

        let mut summary_error = None;
        self.state.summary = None;

        if !page.rows.is_empty() {
            let top = &page.rows[..page.rows.len().min(self.summary_rows)];
            match self.summarizer.summarize(top).await {
                Ok(summary) => self.state.summary = Some(summary),
                Err(e) => {
                    warn!("Summarization failed: {}", e);
                    summary_error = Some(e.to_string());
                }
            }
        }

        let outcome = SearchOutcome {
            total_count: page.total_count,
            total_pages: total_pages(page.total_count, self.page_size),
            summary_error,
        };

        self.state.current_query = Some(query);
        self.state.current_page = Some(page);

        Ok(outcome)
    }

    /// Navigate to a page of the current result set.
    ///
    /// The fetch reuses the active query text and filter; only the offset
    /// changes. Out-of-range pages are rejected, never clamped. On a failed
    /// fetch the previously displayed page stays intact. Navigation never
    /// re-triggers summarization; use [`Session::refresh_summary`] for that.
    #[instrument(skip(self))]
    pub async fn go_to_page(&mut self, page_number: usize) -> Result<()> {
        let query = self
            .state
            .current_query
            .clone()
            .ok_or_else(|| SokError::InvalidInput("No active search".to_string()))?;

        let pages = self.total_pages();
        if page_number < 1 || page_number > pages {
            return Err(SokError::InvalidInput(format!(
                "Page {} is out of range (1-{})",
                page_number, pages
            )));
        }

        // Fetch first, assign after: a failed fetch must not blank the
        // currently displayed page.
        let result = self
            .index
            .search(&SearchRequest {
                text: query.text.clone(),
                limit: self.page_size,
                offset: (page_number - 1) * self.page_size,
                years: query.years,
            })
            .await?;

        debug!(
            "Page {} of '{}': {} rows",
            page_number,
            query.text,
            result.hits.len()
        );

        let query = SearchQuery {
            page: page_number,
            ..query
        };

        self.state.current_page = Some(ResultPage {
            query: query.clone(),
            rows: result.hits,
            total_count: result.total_count,
        });
        self.state.current_query = Some(query);

        Ok(())
    }

    /// Explicitly re-summarize the top rows of the current first page.
    ///
    /// The stored summary is cleared up front; a failed completion call must
    /// not leave a summary of the previous attempt on display.
    #[instrument(skip(self))]
    pub async fn refresh_summary(&mut self) -> Result<&str> {
        let top = {
            let page = self
                .state
                .current_page
                .as_ref()
                .ok_or_else(|| SokError::InvalidInput("No active search".to_string()))?;

            if page.query.page != 1 {
                return Err(SokError::InvalidInput(
                    "Summaries cover the first page of results".to_string(),
                ));
            }
            if page.rows.is_empty() {
                return Err(SokError::NoResults);
            }

            page.rows[..page.rows.len().min(self.summary_rows)].to_vec()
        };

        self.state.summary = None;
        let summary = self.summarizer.summarize(&top).await?;
        self.state.summary = Some(summary);

        Ok(self.state.summary.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{ResultSet, SearchIndex};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn hit(n: usize, year: i32) -> VideoHit {
        VideoHit {
            title: format!("Video {}", n),
            description: format!("Description {}", n),
            thumbnail_url: format!("https://img.example/{}.jpg", n),
            year,
        }
    }

    /// Index fake: every catalog row matches every query, rank order is
    /// insertion order, and failure can be toggled per call.
    struct FakeIndex {
        catalog: Vec<VideoHit>,
        calls: AtomicUsize,
        fail_next: AtomicBool,
    }

    impl FakeIndex {
        fn new(catalog: Vec<VideoHit>) -> Self {
            Self {
                catalog,
                calls: AtomicUsize::new(0),
                fail_next: AtomicBool::new(false),
            }
        }

        fn with_rows(count: usize) -> Self {
            Self::new((1..=count).map(|n| hit(n, 2016)).collect())
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn fail_next(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl SearchIndex for FakeIndex {
        async fn search(&self, request: &SearchRequest) -> crate::Result<ResultSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(SokError::Unavailable("index down".to_string()));
            }

            let matches: Vec<VideoHit> = self
                .catalog
                .iter()
                .filter(|h| request.years.map(|r| r.contains(h.year)).unwrap_or(true))
                .cloned()
                .collect();

            let total_count = matches.len();
            let hits = matches
                .into_iter()
                .skip(request.offset)
                .take(request.limit)
                .collect();

            Ok(ResultSet { hits, total_count })
        }
    }

    struct FakeSummarizer {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl FakeSummarizer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }

        fn failing() -> Self {
            let s = Self::new();
            s.fail();
            s
        }

        fn fail(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn summarize(&self, hits: &[VideoHit]) -> crate::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(SokError::Summarization("model offline".to_string()));
            }
            Ok(format!("summary of {} rows", hits.len()))
        }
    }

    fn session(index: Arc<FakeIndex>, summarizer: Arc<FakeSummarizer>) -> Session {
        Session::new(index, summarizer, DEFAULT_PAGE_SIZE)
    }

    #[test]
    fn test_total_pages_math() {
        assert_eq!(total_pages(0, 50), 0);
        assert_eq!(total_pages(1, 50), 1);
        assert_eq!(total_pages(50, 50), 1);
        assert_eq!(total_pages(51, 50), 2);
        assert_eq!(total_pages(120, 50), 3);
        assert_eq!(total_pages(7, 3), 3);
    }

    #[tokio::test]
    async fn test_empty_query_rejected_without_fetch() {
        let index = Arc::new(FakeIndex::with_rows(10));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = session(index.clone(), summarizer.clone());

        let err = session.submit_search("   ", None).await.unwrap_err();
        assert!(matches!(err, SokError::EmptyQuery));
        assert_eq!(index.calls(), 0);
        assert_eq!(summarizer.calls(), 0);
        assert!(session.current_page().is_none());
    }

    #[tokio::test]
    async fn test_pagination_scenario_120_rows() {
        let index = Arc::new(FakeIndex::with_rows(120));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = session(index, summarizer);

        let outcome = session.submit_search("climate change", None).await.unwrap();
        assert_eq!(outcome.total_count, 120);
        assert_eq!(outcome.total_pages, 3);

        let page = session.current_page().unwrap();
        assert_eq!(page.rows.len(), 50);
        assert_eq!(page.rows[0].title, "Video 1");
        assert_eq!(page.rows[49].title, "Video 50");
        assert_eq!(page.query.page, 1);

        session.go_to_page(3).await.unwrap();
        let page = session.current_page().unwrap();
        assert_eq!(page.rows.len(), 20);
        assert_eq!(page.rows[0].title, "Video 101");
        assert_eq!(page.rows[19].title, "Video 120");
    }

    #[tokio::test]
    async fn test_page_invariant_held() {
        let index = Arc::new(FakeIndex::with_rows(120));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = session(index, summarizer);

        session.submit_search("anything", None).await.unwrap();
        session.go_to_page(2).await.unwrap();

        let state = session.state();
        let query = state.current_query.as_ref().unwrap();
        let page = state.current_page.as_ref().unwrap();
        assert_eq!(query.page, 2);
        assert_eq!(page.query.page, query.page);
    }

    #[tokio::test]
    async fn test_out_of_range_pages_rejected() {
        let index = Arc::new(FakeIndex::with_rows(120));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = session(index, summarizer);

        session.submit_search("anything", None).await.unwrap();

        assert!(matches!(
            session.go_to_page(0).await,
            Err(SokError::InvalidInput(_))
        ));
        assert!(matches!(
            session.go_to_page(4).await,
            Err(SokError::InvalidInput(_))
        ));
        // Rejection does not disturb the displayed page
        assert_eq!(session.current_page().unwrap().query.page, 1);
    }

    #[tokio::test]
    async fn test_navigation_without_search_rejected() {
        let index = Arc::new(FakeIndex::with_rows(10));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = session(index.clone(), summarizer);

        assert!(matches!(
            session.go_to_page(1).await,
            Err(SokError::InvalidInput(_))
        ));
        assert_eq!(index.calls(), 0);
    }

    #[tokio::test]
    async fn test_summarizer_called_once_per_submit() {
        let index = Arc::new(FakeIndex::with_rows(120));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = session(index, summarizer.clone());

        session.submit_search("anything", None).await.unwrap();
        assert_eq!(summarizer.calls(), 1);
        assert_eq!(session.summary(), Some("summary of 3 rows"));

        // Navigation never re-summarizes, including back to page 1
        session.go_to_page(2).await.unwrap();
        session.go_to_page(1).await.unwrap();
        assert_eq!(summarizer.calls(), 1);

        // The explicit re-trigger does
        session.refresh_summary().await.unwrap();
        assert_eq!(summarizer.calls(), 2);
    }

    #[tokio::test]
    async fn test_no_summary_for_empty_result_set() {
        let index = Arc::new(FakeIndex::with_rows(0));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = session(index, summarizer.clone());

        let outcome = session.submit_search("anything", None).await.unwrap();
        assert_eq!(outcome.total_count, 0);
        assert_eq!(outcome.total_pages, 0);
        assert_eq!(summarizer.calls(), 0);
        assert!(session.summary().is_none());

        assert!(matches!(
            session.refresh_summary().await,
            Err(SokError::NoResults)
        ));
    }

    #[tokio::test]
    async fn test_summary_failure_is_not_fatal() {
        let index = Arc::new(FakeIndex::with_rows(10));
        let summarizer = Arc::new(FakeSummarizer::failing());
        let mut session = session(index, summarizer);

        let outcome = session.submit_search("anything", None).await.unwrap();
        assert!(outcome.summary_error.is_some());
        assert!(session.summary().is_none());
        // Rows remain displayable
        assert_eq!(session.current_page().unwrap().rows.len(), 10);
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_summary() {
        let index = Arc::new(FakeIndex::with_rows(10));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = session(index, summarizer.clone());

        session.submit_search("anything", None).await.unwrap();
        assert!(session.summary().is_some());

        summarizer.fail();
        let err = session.refresh_summary().await.unwrap_err();
        assert!(matches!(err, SokError::Summarization(_)));

        // The stale summary is gone; the rows are still displayable
        assert!(session.summary().is_none());
        assert_eq!(session.current_page().unwrap().rows.len(), 10);
    }

    #[tokio::test]
    async fn test_zero_page_size_clamped_to_one() {
        let index = Arc::new(FakeIndex::with_rows(3));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = Session::new(index, summarizer, 0);
        assert_eq!(session.page_size(), 1);

        let outcome = session.submit_search("anything", None).await.unwrap();
        assert_eq!(outcome.total_pages, 3);
        assert_eq!(session.current_page().unwrap().rows.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_submit_leaves_state_unset() {
        let index = Arc::new(FakeIndex::with_rows(10));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = session(index.clone(), summarizer);

        index.fail_next();
        let err = session.submit_search("anything", None).await.unwrap_err();
        assert!(matches!(err, SokError::Unavailable(_)));
        assert!(session.current_page().is_none());
        assert!(session.state().current_query.is_none());
    }

    #[tokio::test]
    async fn test_failed_navigation_keeps_previous_page() {
        let index = Arc::new(FakeIndex::with_rows(120));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = session(index.clone(), summarizer);

        session.submit_search("anything", None).await.unwrap();
        let before: Vec<String> = session
            .current_page()
            .unwrap()
            .rows
            .iter()
            .map(|r| r.title.clone())
            .collect();

        index.fail_next();
        let err = session.go_to_page(2).await.unwrap_err();
        assert!(matches!(err, SokError::Unavailable(_)));

        let page = session.current_page().unwrap();
        assert_eq!(page.query.page, 1);
        let after: Vec<String> = page.rows.iter().map(|r| r.title.clone()).collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_consecutive_identical_searches_are_deterministic() {
        let index = Arc::new(FakeIndex::with_rows(30));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = session(index, summarizer);

        session.submit_search("stable query", None).await.unwrap();
        let first: Vec<String> = session
            .current_page()
            .unwrap()
            .rows
            .iter()
            .map(|r| r.title.clone())
            .collect();

        session.submit_search("stable query", None).await.unwrap();
        let second: Vec<String> = session
            .current_page()
            .unwrap()
            .rows
            .iter()
            .map(|r| r.title.clone())
            .collect();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_year_filter_threads_through_navigation() {
        let mut catalog: Vec<VideoHit> = (1..=60).map(|n| hit(n, 2016)).collect();
        catalog.extend((61..=80).map(|n| hit(n, 2022)));
        let index = Arc::new(FakeIndex::new(catalog));
        let summarizer = Arc::new(FakeSummarizer::new());
        let mut session = session(index, summarizer);

        let range = YearRange::new(2015, 2018).unwrap();
        let outcome = session.submit_search("anything", Some(range)).await.unwrap();
        assert_eq!(outcome.total_count, 60);
        assert_eq!(outcome.total_pages, 2);

        session.go_to_page(2).await.unwrap();
        let page = session.current_page().unwrap();
        assert_eq!(page.rows.len(), 10);
        assert!(page.rows.iter().all(|r| r.year == 2016));
        assert_eq!(page.query.years, Some(range));
    }
}
