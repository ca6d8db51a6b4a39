use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Text in, shorter text out.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    text: String,
}

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const MAX_INPUT_CHARS: usize = 4000;
const MAX_ATTEMPTS: u32 = 3;

pub struct ClaudeSummarizer {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ClaudeSummarizer {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn try_summarize(&self, text: &str) -> Result<String> {
        let truncated: String = text.chars().take(MAX_INPUT_CHARS).collect();

        let prompt = format!(
            r#"Summarize the following news article in exactly three concise, professional sentences.
Write in the same language as the article. Put each sentence on its own line.
Use only facts stated in the article.

---
{}
---"#,
            truncated
        );

        let request = ClaudeRequest {
            model: "claude-3-5-haiku-20241022".to_string(),
            max_tokens: 512,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Claude API")?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Claude API error: {}", error_text);
        }

        let claude_response = response
            .json::<ClaudeResponse>()
            .await
            .context("Failed to parse Claude API response")?;

        let summary = claude_response
            .content
            .first()
            .map(|c| c.text.trim().to_string())
            .unwrap_or_default();

        if summary.is_empty() {
            anyhow::bail!("Claude API returned an empty summary");
        }

        Ok(summary)
    }
}

#[async_trait]
impl Summarizer for ClaudeSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.try_summarize(text).await {
                Ok(summary) => return Ok(summary),
                Err(e) if attempt + 1 >= MAX_ATTEMPTS => return Err(e),
                Err(e) => {
                    let backoff = std::time::Duration::from_millis(1000 * 2_u64.pow(attempt));
                    warn!(error = %e, ?backoff, "Summarization failed, retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Summaries for `texts`, in input order, with at most two requests in
/// flight. Empty texts and failed requests yield an empty summary.
pub async fn summarize_all(summarizer: &dyn Summarizer, texts: Vec<String>) -> Vec<String> {
    stream::iter(texts)
        .map(|text| async move {
            if text.trim().is_empty() {
                return String::new();
            }
            match summarizer.summarize(&text).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(error = %e, "Could not summarize article, leaving it blank");
                    String::new()
                }
            }
        })
        .buffered(2)
        .collect()
        .await
}
