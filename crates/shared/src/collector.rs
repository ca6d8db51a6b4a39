use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::dedup::{DedupConfig, Deduplicator};
use crate::memory::{TopicMemory, DEFAULT_DAYS_TO_KEEP};
use crate::models::{Article, NewsDigest, NewsItem};
use crate::source::ArticleSource;
use crate::summarizer::{summarize_all, Summarizer};
use crate::title::clean;

/// Only the top stories get an AI summary.
pub const SUMMARIZED_ARTICLES: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct CollectorConfig {
    /// Upper bound on pages requested per run.
    pub max_rounds: usize,
    pub page_size: usize,
    /// Fetching stops once `target_count * pool_multiplier` candidates are in.
    pub pool_multiplier: usize,
    /// Pause between pages to stay under the upstream rate limit.
    pub round_delay: Duration,
    pub days_to_keep: i64,
    pub dedup: DedupConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_rounds: 2,
            page_size: 100,
            pool_multiplier: 5,
            round_delay: Duration::from_millis(500),
            days_to_keep: DEFAULT_DAYS_TO_KEEP,
            dedup: DedupConfig::default(),
        }
    }
}

/// Pulls news for a query, drops what was already reported today, keeps one
/// article per story and remembers what it picked.
pub struct NewsCollector {
    source: Box<dyn ArticleSource>,
    memory: TopicMemory,
    deduplicator: Deduplicator,
    summarizer: Option<Box<dyn Summarizer>>,
    config: CollectorConfig,
}

impl NewsCollector {
    pub fn new(source: Box<dyn ArticleSource>, memory: TopicMemory, config: CollectorConfig) -> Self {
        Self {
            source,
            memory,
            deduplicator: Deduplicator::new(config.dedup),
            summarizer: None,
            config,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn memory(&self) -> &TopicMemory {
        &self.memory
    }

    /// Representative articles for `query`, at most `target_count`, largest
    /// stories first. An empty result means there is no new news.
    pub async fn collect(&self, query: &str, target_count: usize) -> Vec<Article> {
        // Recency and the logical day read the same clock.
        let now = self.memory.now().with_timezone(&Utc);

        // Expired ledgers go before today's is read.
        self.memory.sweep_retention(self.config.days_to_keep);
        let seen = self.memory.load();

        let pool = self.gather(query, target_count, &seen, now).await;
        if pool.is_empty() {
            info!(query, "No new news found");
            return Vec::new();
        }

        let clusters = self.deduplicator.cluster(pool);
        debug!(clusters = clusters.len(), "Grouped candidate articles");
        let selection = self.deduplicator.rank(clusters, target_count);

        self.memory.append(&selection.topics_to_persist);
        info!(
            query,
            selected = selection.representatives.len(),
            "Selected representative articles"
        );
        selection.representatives
    }

    /// Fresh, unseen candidates from up to `max_rounds` pages.
    async fn gather(
        &self,
        query: &str,
        target_count: usize,
        seen: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> Vec<Article> {
        let wanted = target_count.saturating_mul(self.config.pool_multiplier);
        let mut pool = Vec::new();
        let mut start = 1;

        for round in 1..=self.config.max_rounds {
            match self.source.fetch_page(query, self.config.page_size, start).await {
                Ok(raw) if raw.is_empty() => {
                    debug!(round, "No more results");
                    break;
                }
                Ok(raw) => {
                    let fetched = raw.len();
                    let articles: Vec<Article> =
                        raw.into_iter().filter_map(Article::from_raw).collect();
                    let recent = self.deduplicator.filter_recent(articles, now);
                    let fresh = self.deduplicator.filter_unseen(recent, seen);
                    debug!(round, fetched, kept = fresh.len(), "Filtered news page");
                    pool.extend(fresh);
                }
                Err(e) => {
                    warn!(round, error = %e, "News fetch failed, skipping this page");
                }
            }

            if pool.len() >= wanted || round == self.config.max_rounds {
                break;
            }
            start += self.config.page_size;
            tokio::time::sleep(self.config.round_delay).await;
        }

        pool
    }

    /// Collect and package the result for export, summarizing the top few
    /// articles when a summarizer is configured.
    pub async fn digest(&self, query: &str, target_count: usize) -> NewsDigest {
        let articles = self.collect(query, target_count).await;

        let summaries = match &self.summarizer {
            Some(summarizer) => {
                let texts = articles
                    .iter()
                    .take(SUMMARIZED_ARTICLES)
                    .map(|article| clean(&article.description))
                    .collect();
                summarize_all(summarizer.as_ref(), texts).await
            }
            None => Vec::new(),
        };

        let items = articles
            .iter()
            .enumerate()
            .map(|(i, article)| {
                NewsItem::from_article(article, summaries.get(i).cloned().unwrap_or_default())
            })
            .collect();

        NewsDigest::new(query, self.memory.logical_date(), items)
    }
}
