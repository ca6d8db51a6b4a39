use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

use crate::models::Article;
use crate::similarity::token_sort_ratio;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 50.0;
pub const DEFAULT_RECENCY_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy)]
pub struct DedupConfig {
    /// Minimum `token_sort_ratio` (0-100) for two titles to be the same story.
    pub threshold: f64,
    /// Articles published longer ago than this are dropped.
    pub window: Duration,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            window: Duration::hours(DEFAULT_RECENCY_HOURS),
        }
    }
}

/// Result of a deduplication pass.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// One article per cluster, largest clusters first.
    pub representatives: Vec<Article>,
    /// Cleaned titles of the representatives, to be remembered as seen.
    pub topics_to_persist: Vec<String>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.representatives.is_empty()
    }
}

/// Groups near-duplicate headlines and picks one article per story.
///
/// Stateless: the set of already seen topics is passed in and the titles to
/// remember are handed back, persisting them is up to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deduplicator {
    config: DedupConfig,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> DedupConfig {
        self.config
    }

    pub fn select(
        &self,
        articles: Vec<Article>,
        seen: &HashSet<String>,
        target_count: usize,
        now: DateTime<Utc>,
    ) -> Selection {
        let recent = self.filter_recent(articles, now);
        let fresh = self.filter_unseen(recent, seen);
        self.rank(self.cluster(fresh), target_count)
    }

    pub fn filter_recent(&self, articles: Vec<Article>, now: DateTime<Utc>) -> Vec<Article> {
        let cutoff = now - self.config.window;
        articles
            .into_iter()
            .filter(|article| article.published_at > cutoff)
            .collect()
    }

    pub fn filter_unseen(&self, articles: Vec<Article>, seen: &HashSet<String>) -> Vec<Article> {
        articles
            .into_iter()
            .filter(|article| !self.was_seen(&article.cleaned_title, seen))
            .collect()
    }

    fn was_seen(&self, cleaned_title: &str, seen: &HashSet<String>) -> bool {
        seen.iter()
            .any(|topic| token_sort_ratio(cleaned_title, topic) >= self.config.threshold)
    }

    /// Greedy clustering in input order. Each article joins the first cluster
    /// whose anchor (first member) it resembles, otherwise it starts a new one.
    /// Only anchors are compared, so membership is not transitive.
    pub fn cluster(&self, articles: Vec<Article>) -> Vec<Vec<Article>> {
        let mut clusters: Vec<Vec<Article>> = Vec::new();

        for article in articles {
            let home = clusters.iter().position(|cluster| {
                token_sort_ratio(&article.cleaned_title, &cluster[0].cleaned_title)
                    >= self.config.threshold
            });
            match home {
                Some(index) => clusters[index].push(article),
                None => clusters.push(vec![article]),
            }
        }

        clusters
    }

    /// Anchors of the `target_count` largest clusters. Equal sizes keep
    /// discovery order.
    pub fn rank(&self, mut clusters: Vec<Vec<Article>>, target_count: usize) -> Selection {
        clusters.sort_by(|a, b| b.len().cmp(&a.len()));

        let representatives: Vec<Article> = clusters
            .into_iter()
            .take(target_count)
            .filter_map(|cluster| cluster.into_iter().next())
            .collect();

        let topics_to_persist = representatives
            .iter()
            .map(|article| article.cleaned_title.clone())
            .collect();

        Selection {
            representatives,
            topics_to_persist,
        }
    }
}
