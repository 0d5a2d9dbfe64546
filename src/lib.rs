//! Sok - Semantic Video Search
//!
//! A CLI tool and HTTP service for searching a video catalog with natural language.
//!
//! The name "Sok" comes from the Norwegian word for "search."
//!
//! # Overview
//!
//! Sok allows you to:
//! - Load a CSV catalog of video metadata into a warehouse table
//! - Search the catalog with natural-language queries, paginated and optionally
//!   filtered by year
//! - Get an AI-generated summary of the top results of each search
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `store` - Relational warehouse abstraction
//! - `ingest` - CSV catalog loading
//! - `search` - Semantic search index abstraction
//! - `summary` - Result summarization via LLM completion
//! - `session` - Per-session search controller (query, page, cached results)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sok::search::MemorySearchIndex;
//! use sok::session::Session;
//! use sok::summary::OpenAISummarizer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let index = Arc::new(MemorySearchIndex::new());
//!     let summarizer = Arc::new(OpenAISummarizer::new("gpt-4o-mini"));
//!     let mut session = Session::new(index, summarizer, 50);
//!
//!     let outcome = session.submit_search("climate change", None).await?;
//!     println!("{} matches across {} pages", outcome.total_count, outcome.total_pages);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod search;
pub mod session;
pub mod store;
pub mod summary;

pub use error::{Result, SokError};
