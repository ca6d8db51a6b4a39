use anyhow::Result;
use async_trait::async_trait;

use crate::models::RawArticle;

/// Anything that can page through news search results.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// One page of up to `page_size` results starting at the 1-based offset
    /// `start`. An empty page means there is nothing more to read.
    async fn fetch_page(&self, query: &str, page_size: usize, start: usize)
        -> Result<Vec<RawArticle>>;
}
