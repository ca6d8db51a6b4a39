use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::RawArticle;
use crate::source::ArticleSource;

const DEFAULT_BASE_URL: &str = "https://openapi.naver.com";

#[derive(Debug, Deserialize)]
struct NaverResponse {
    /// Decoded one at a time so a malformed item only costs itself.
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// Client for the Naver news search API.
pub struct NaverNewsClient {
    client: Client,
    client_id: String,
    client_secret: String,
    base_url: String,
}

impl NaverNewsClient {
    pub fn new(client_id: String, client_secret: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            client_id,
            client_secret,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ArticleSource for NaverNewsClient {
    async fn fetch_page(
        &self,
        query: &str,
        page_size: usize,
        start: usize,
    ) -> Result<Vec<RawArticle>> {
        let url = format!(
            "{}/v1/search/news.json?query={}&display={}&start={}&sort=sim",
            self.base_url,
            urlencoding::encode(query),
            page_size,
            start
        );

        let response = self
            .client
            .get(&url)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .send()
            .await
            .context("Failed to fetch news from Naver")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Naver API returned error: {} - {}", status, error_text);
        }

        let naver_response = response
            .json::<NaverResponse>()
            .await
            .context("Failed to parse Naver API response")?;

        let received = naver_response.items.len();
        let items: Vec<RawArticle> = naver_response
            .items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(raw) => Some(raw),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed news item");
                    None
                }
            })
            .collect();

        debug!(query, start, received, count = items.len(), "Fetched news page");
        Ok(items)
    }
}
