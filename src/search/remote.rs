//! Hosted search service client.
//!
//! Thin JSON client for a managed semantic search index. The service does the
//! ranking; this client only builds the request (query, columns, paging, year
//! filter) and maps the response rows back to [`VideoHit`]s.

use super::{ResultSet, SearchIndex, SearchRequest, VideoHit, YearRange};
use crate::error::{Result, SokError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

/// Client for a hosted semantic search index.
pub struct RemoteSearchIndex {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    columns: Vec<String>,
}

/// Request body the hosted service expects.
#[derive(Debug, Serialize)]
struct RemoteRequest<'a> {
    query: &'a str,
    columns: &'a [String],
    limit: usize,
    offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
}

/// Response body the hosted service returns.
#[derive(Debug, Deserialize)]
struct RemoteResponse {
    results: Vec<RemoteHit>,
    total_count: usize,
}

/// One result row, keyed by warehouse column names.
#[derive(Debug, Deserialize)]
struct RemoteHit {
    #[serde(rename = "VIDEO_TITLE")]
    title: String,
    #[serde(rename = "VIDEO_DESCRIPTION")]
    description: String,
    #[serde(rename = "THUMBNAIL")]
    thumbnail_url: String,
    #[serde(rename = "VIDEO_YEAR")]
    year: i32,
}

impl From<RemoteHit> for VideoHit {
    fn from(hit: RemoteHit) -> Self {
        Self {
            title: hit.title,
            description: hit.description,
            thumbnail_url: hit.thumbnail_url,
            year: hit.year,
        }
    }
}

impl RemoteSearchIndex {
    /// Create a client for the given service endpoint.
    pub fn new(endpoint: &str, api_key: Option<String>, columns: Vec<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SokError::Config(format!("Invalid search endpoint '{}': {}", endpoint, e)))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            columns,
        })
    }

    /// Year filter in the service's predicate grammar: a conjunction of
    /// inclusive lower and upper bounds on `VIDEO_YEAR`.
    fn filter_predicate(years: &YearRange) -> serde_json::Value {
        json!({
            "@and": [
                { "@gte": { "VIDEO_YEAR": years.min } },
                { "@lte": { "VIDEO_YEAR": years.max } },
            ]
        })
    }
}

#[async_trait]
impl SearchIndex for RemoteSearchIndex {
    #[instrument(skip(self), fields(query = %request.text))]
    async fn search(&self, request: &SearchRequest) -> Result<ResultSet> {
        let body = RemoteRequest {
            query: &request.text,
            columns: &self.columns,
            limit: request.limit,
            offset: request.offset,
            filter: request.years.as_ref().map(Self::filter_predicate),
        };

        let mut http_request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                SokError::Unavailable(format!("Search service unreachable: {}", e))
            } else {
                SokError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(SokError::Unavailable(
                    "Search service rejected credentials".to_string(),
                ));
            }
            if status.is_server_error() {
                return Err(SokError::Unavailable(format!(
                    "Search service error: {}",
                    status
                )));
            }
            let detail = response.text().await.unwrap_or_default();
            return Err(SokError::Search(format!(
                "Search request failed ({}): {}",
                status, detail
            )));
        }

        let remote: RemoteResponse = response
            .json()
            .await
            .map_err(|e| SokError::Search(format!("Malformed search response: {}", e)))?;

        debug!(
            "Remote index returned {} of {} matches",
            remote.results.len(),
            remote.total_count
        );

        Ok(ResultSet {
            hits: remote.results.into_iter().map(Into::into).collect(),
            total_count: remote.total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        let result = RemoteSearchIndex::new("not a url", None, vec![]);
        assert!(matches!(result, Err(SokError::Config(_))));
    }

    #[test]
    fn test_filter_predicate_shape() {
        let range = YearRange::new(2015, 2018).unwrap();
        let predicate = RemoteSearchIndex::filter_predicate(&range);

        assert_eq!(predicate["@and"][0]["@gte"]["VIDEO_YEAR"], 2015);
        assert_eq!(predicate["@and"][1]["@lte"]["VIDEO_YEAR"], 2018);
    }

    #[test]
    fn test_request_body_omits_absent_filter() {
        let columns = vec!["VIDEO_TITLE".to_string()];
        let body = RemoteRequest {
            query: "ocean",
            columns: &columns,
            limit: 50,
            offset: 0,
            filter: None,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("filter").is_none());
        assert_eq!(value["limit"], 50);
    }

    #[test]
    fn test_response_row_mapping() {
        let raw = r#"{
            "results": [{
                "VIDEO_TITLE": "Ocean life",
                "VIDEO_DESCRIPTION": "The deep sea",
                "THUMBNAIL": "https://img.example/ocean.jpg",
                "VIDEO_YEAR": 2016
            }],
            "total_count": 42
        }"#;

        let parsed: RemoteResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.total_count, 42);

        let hit: VideoHit = parsed.results.into_iter().next().unwrap().into();
        assert_eq!(hit.title, "Ocean life");
        assert_eq!(hit.year, 2016);
    }
}
