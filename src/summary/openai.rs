//! OpenAI-backed summarizer.

use super::{format_hits_for_prompt, Summarizer};
use crate::config::Prompts;
use crate::error::{Result, SokError};
use crate::search::VideoHit;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Timeout for completion calls (2 minutes).
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// API client with the request timeout applied.
fn create_client() -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}

/// Summarizer backed by the OpenAI chat completion API.
pub struct OpenAISummarizer {
    client: Client<OpenAIConfig>,
    model: String,
    prompts: Prompts,
}

impl OpenAISummarizer {
    /// Create a summarizer for the given model.
    pub fn new(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }
}

#[async_trait]
impl Summarizer for OpenAISummarizer {
    #[instrument(skip(self, hits), fields(rows = hits.len()))]
    async fn summarize(&self, hits: &[VideoHit]) -> Result<String> {
        if hits.is_empty() {
            return Err(SokError::Summarization(
                "No rows to summarize".to_string(),
            ));
        }

        let mut vars = HashMap::new();
        vars.insert("count".to_string(), hits.len().to_string());
        vars.insert("videos".to_string(), format_hits_for_prompt(hits));

        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.summary.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.summary.system.clone())
                .build()
                .map_err(|e| SokError::Summarization(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| SokError::Summarization(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .build()
            .map_err(|e| SokError::Summarization(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SokError::OpenAI(format!("Failed to generate summary: {}", e)))?;

        let summary = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SokError::Summarization("Empty response from LLM".to_string()))?;

        debug!("Generated summary of {} rows", hits.len());
        Ok(summary)
    }
}
