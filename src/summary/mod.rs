//! Summarization of top search results via LLM completion.

mod openai;

pub use openai::OpenAISummarizer;

use crate::error::Result;
use crate::search::VideoHit;
use async_trait::async_trait;

/// Trait for result summarizers.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce a short summary connecting the given rows (1-3 of them).
    async fn summarize(&self, hits: &[VideoHit]) -> Result<String>;
}

/// Render the rows into the prompt block: one numbered entry per video with
/// its title and description.
pub fn format_hits_for_prompt(hits: &[VideoHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(idx, hit)| {
            format!(
                "Video {}:\nTitle: {}\nDescription: {}",
                idx + 1,
                hit.title,
                hit.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
