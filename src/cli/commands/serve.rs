//! HTTP API server for interactive search sessions.
//!
//! Each session owns one controller; actions on a session are serialized
//! through its mutex, so a session never has two fetches in flight.

use crate::cli::Output;
use crate::config::{SearchProvider, Settings};
use crate::error::{Result as SokResult, SokError};
use crate::ingest;
use crate::search::{MemorySearchIndex, RemoteSearchIndex, SearchIndex, VideoHit, YearRange};
use crate::session::Session;
use crate::store::{SqliteWarehouse, VideoRecord, Warehouse};
use crate::summary::Summarizer;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// One live session: its controller plus bookkeeping.
#[derive(Clone)]
struct SessionEntry {
    session: Arc<tokio::sync::Mutex<Session>>,
    created_at: DateTime<Utc>,
}

/// Shared application state.
struct AppState {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    index: Arc<dyn SearchIndex>,
    summarizer: Arc<dyn Summarizer>,
    /// Present in local mode so a catalog load can rebuild the index.
    local_index: Option<Arc<MemorySearchIndex>>,
    warehouse: Arc<SqliteWarehouse>,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let warehouse = Arc::new(SqliteWarehouse::new(&settings.sqlite_path())?);
    warehouse.provision().await?;

    let (index, local_index): (Arc<dyn SearchIndex>, Option<Arc<MemorySearchIndex>>) =
        match settings.search.provider {
            SearchProvider::Local => {
                let index = Arc::new(MemorySearchIndex::from_warehouse(warehouse.as_ref()).await?);
                (index.clone(), Some(index))
            }
            SearchProvider::Remote => {
                let endpoint = settings.search.endpoint.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("search.endpoint must be set for the remote provider")
                })?;
                let api_key = std::env::var(&settings.search.api_key_env).ok();
                let index = Arc::new(RemoteSearchIndex::new(
                    endpoint,
                    api_key,
                    settings.search.columns.clone(),
                )?);
                (index, None)
            }
        };

    let summarizer = super::build_summarizer(&settings)?;

    let state = Arc::new(AppState {
        sessions: Mutex::new(HashMap::new()),
        index,
        summarizer,
        local_index,
        warehouse,
        settings,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/catalog/load", post(load_catalog))
        .route("/catalog/preview", get(preview_catalog))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/search", post(session_search))
        .route("/sessions/{id}/page", post(session_page))
        .route("/sessions/{id}/summary", post(session_summary))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Sok API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Load Catalog", "POST /catalog/load");
    Output::kv("Preview Catalog", "GET  /catalog/preview");
    Output::kv("New Session", "POST /sessions");
    Output::kv("Session State", "GET  /sessions/:id");
    Output::kv("Search", "POST /sessions/:id/search");
    Output::kv("Go To Page", "POST /sessions/:id/page");
    Output::kv("Refresh Summary", "POST /sessions/:id/summary");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct LoadRequest {
    /// Path to the catalog CSV file on the server host
    path: String,
}

#[derive(Serialize)]
struct LoadResponse {
    rows_loaded: usize,
    rows_skipped: usize,
    total: usize,
}

#[derive(Serialize)]
struct PreviewResponse {
    rows: Vec<VideoRecord>,
    total: usize,
}

#[derive(Serialize)]
struct CreateSessionResponse {
    session_id: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct SessionStateResponse {
    session_id: Uuid,
    created_at: DateTime<Utc>,
    query: Option<String>,
    page: Option<usize>,
    total_count: Option<usize>,
    total_pages: usize,
    summary: Option<String>,
}

#[derive(Deserialize)]
struct SearchRequestBody {
    query: String,
    year_from: Option<i32>,
    year_to: Option<i32>,
}

#[derive(Serialize)]
struct SearchResponseBody {
    page: usize,
    total_count: usize,
    total_pages: usize,
    rows: Vec<VideoHit>,
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary_error: Option<String>,
}

#[derive(Deserialize)]
struct PageRequestBody {
    page: usize,
}

#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Error handling ===

fn error_status(e: &SokError) -> StatusCode {
    match e {
        SokError::EmptyQuery | SokError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SokError::NoResults => StatusCode::NOT_FOUND,
        SokError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(e: &SokError) -> Response {
    (
        error_status(e),
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

fn session_not_found(id: Uuid) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Session not found: {}", id),
        }),
    )
        .into_response()
}

fn lookup_session(state: &AppState, id: Uuid) -> Option<SessionEntry> {
    state
        .sessions
        .lock()
        .ok()
        .and_then(|sessions| sessions.get(&id).cloned())
}

fn parse_years(from: Option<i32>, to: Option<i32>) -> SokResult<Option<YearRange>> {
    match (from, to) {
        (None, None) => Ok(None),
        (Some(from), Some(to)) => Ok(Some(YearRange::new(from, to)?)),
        _ => Err(SokError::InvalidInput(
            "Both year_from and year_to are required to filter by year".to_string(),
        )),
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn load_catalog(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoadRequest>,
) -> impl IntoResponse {
    let report = match ingest::load_catalog(
        state.warehouse.as_ref(),
        std::path::Path::new(&req.path),
    )
    .await
    {
        Ok(report) => report,
        Err(e) => return error_response(&e),
    };

    // Local mode serves from a snapshot; refresh it after a load
    if let Some(local) = &state.local_index {
        match state.warehouse.all().await {
            Ok(records) => local.replace_all(records.into_iter().map(Into::into).collect()),
            Err(e) => return error_response(&e),
        }
    }

    match state.warehouse.count().await {
        Ok(total) => Json(LoadResponse {
            rows_loaded: report.rows_loaded,
            rows_skipped: report.rows_skipped,
            total,
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn preview_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rows = match state.warehouse.preview(5).await {
        Ok(rows) => rows,
        Err(e) => return error_response(&e),
    };

    match state.warehouse.count().await {
        Ok(total) => Json(PreviewResponse { rows, total }).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = Session::new(
        state.index.clone(),
        state.summarizer.clone(),
        state.settings.search.page_size,
    )
    .with_summary_rows(state.settings.summary.max_rows);

    let entry = SessionEntry {
        session: Arc::new(tokio::sync::Mutex::new(session)),
        created_at: Utc::now(),
    };

    let id = Uuid::new_v4();
    let created_at = entry.created_at;

    match state.sessions.lock() {
        Ok(mut sessions) => {
            sessions.insert(id, entry);
        }
        Err(e) => {
            return error_response(&SokError::Search(format!(
                "Failed to register session: {}",
                e
            )))
        }
    }

    Json(CreateSessionResponse {
        session_id: id,
        created_at,
    })
    .into_response()
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(entry) = lookup_session(&state, id) else {
        return session_not_found(id);
    };

    let session = entry.session.lock().await;
    let snapshot = session.state();

    Json(SessionStateResponse {
        session_id: id,
        created_at: entry.created_at,
        query: snapshot.current_query.as_ref().map(|q| q.text.clone()),
        page: snapshot.current_query.as_ref().map(|q| q.page),
        total_count: snapshot.current_page.as_ref().map(|p| p.total_count),
        total_pages: session.total_pages(),
        summary: snapshot.summary.clone(),
    })
    .into_response()
}

async fn session_search(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SearchRequestBody>,
) -> impl IntoResponse {
    let Some(entry) = lookup_session(&state, id) else {
        return session_not_found(id);
    };

    let years = match parse_years(req.year_from, req.year_to) {
        Ok(years) => years,
        Err(e) => return error_response(&e),
    };

    let mut session = entry.session.lock().await;

    match session.submit_search(&req.query, years).await {
        Ok(outcome) => {
            let page = session
                .current_page()
                .map(|p| (p.query.page, p.rows.clone()))
                .unwrap_or((1, Vec::new()));

            Json(SearchResponseBody {
                page: page.0,
                total_count: outcome.total_count,
                total_pages: outcome.total_pages,
                rows: page.1,
                summary: session.summary().map(str::to_string),
                summary_error: outcome.summary_error,
            })
            .into_response()
        }
        Err(e) => error_response(&e),
    }
}

async fn session_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<PageRequestBody>,
) -> impl IntoResponse {
    let Some(entry) = lookup_session(&state, id) else {
        return session_not_found(id);
    };

    let mut session = entry.session.lock().await;

    match session.go_to_page(req.page).await {
        Ok(()) => {
            let page = session
                .current_page()
                .expect("page present after successful navigation");

            Json(SearchResponseBody {
                page: page.query.page,
                total_count: page.total_count,
                total_pages: session.total_pages(),
                rows: page.rows.clone(),
                summary: session.summary().map(str::to_string),
                summary_error: None,
            })
            .into_response()
        }
        Err(e) => error_response(&e),
    }
}

async fn session_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let Some(entry) = lookup_session(&state, id) else {
        return session_not_found(id);
    };

    let mut session = entry.session.lock().await;

    match session.refresh_summary().await {
        Ok(summary) => Json(SummaryResponse {
            summary: summary.to_string(),
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}
