use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::title::clean;

/// An article record as delivered by a news search API. Missing fields come
/// through empty and are rejected by `Article::from_raw`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    /// RFC 822 timestamp, e.g. `Tue, 10 Mar 2026 09:30:00 +0900`.
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
}

/// A fetched article with its title normalized and timestamp parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub title: String,
    pub cleaned_title: String,
    pub description: String,
    pub link: String,
    pub pub_date: String,
    pub published_at: DateTime<FixedOffset>,
}

impl Article {
    /// Returns `None` when the title or link is missing or the publication
    /// timestamp cannot be parsed.
    pub fn from_raw(raw: RawArticle) -> Option<Self> {
        if raw.title.trim().is_empty() || raw.link.trim().is_empty() {
            return None;
        }
        let published_at = DateTime::parse_from_rfc2822(raw.pub_date.trim()).ok()?;
        Some(Self {
            cleaned_title: clean(&raw.title),
            title: raw.title,
            description: raw.description,
            link: raw.link,
            pub_date: raw.pub_date,
            published_at,
        })
    }

    pub fn formatted_date(&self) -> String {
        self.published_at.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// One exported news entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub cleaned_title: String,
    #[serde(default)]
    pub summary: String,
    pub link: String,
    pub publication_date: String,
    pub formatted_date: String,
}

impl NewsItem {
    pub fn from_article(article: &Article, summary: String) -> Self {
        Self {
            cleaned_title: article.cleaned_title.clone(),
            summary,
            link: article.link.clone(),
            publication_date: article.pub_date.clone(),
            formatted_date: article.formatted_date(),
        }
    }
}

/// Everything one collection run produced, as saved for the briefing stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsDigest {
    pub version: String,
    pub created_at: String,
    pub topic: String,
    pub logical_date: NaiveDate,
    pub articles: Vec<NewsItem>,
}

impl NewsDigest {
    pub const VERSION: &'static str = "1.0";

    pub fn new(topic: impl Into<String>, logical_date: NaiveDate, articles: Vec<NewsItem>) -> Self {
        Self {
            version: Self::VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            topic: topic.into(),
            logical_date,
            articles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, pub_date: &str) -> RawArticle {
        RawArticle {
            title: title.to_string(),
            description: "<b>Body</b> text".to_string(),
            link: "https://n.news.naver.com/article/001/0001".to_string(),
            pub_date: pub_date.to_string(),
        }
    }

    #[test]
    fn test_from_raw_parses_rfc822() {
        let article = Article::from_raw(raw("[속보] <b>Fed</b> raises rates", "Tue, 10 Mar 2026 09:30:00 +0900")).unwrap();
        assert_eq!(article.cleaned_title, "Fed raises rates");
        assert_eq!(article.title, "[속보] <b>Fed</b> raises rates");
        assert_eq!(article.formatted_date(), "2026-03-10 09:30");
        assert_eq!(article.published_at.offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_from_raw_rejects_bad_timestamp() {
        assert!(Article::from_raw(raw("Fed raises rates", "yesterday")).is_none());
        assert!(Article::from_raw(raw("Fed raises rates", "")).is_none());
    }

    #[test]
    fn test_from_raw_rejects_missing_title_or_link() {
        let date = "Tue, 10 Mar 2026 09:30:00 +0900";
        assert!(Article::from_raw(raw("  ", date)).is_none());
        assert!(Article::from_raw(RawArticle { link: String::new(), ..raw("Fed raises rates", date) }).is_none());
    }

    #[test]
    fn test_raw_article_tolerates_missing_fields() {
        let raw: RawArticle = serde_json::from_str(r#"{"title": "Fed raises rates"}"#).unwrap();
        assert_eq!(raw.title, "Fed raises rates");
        assert!(raw.pub_date.is_empty());
        assert!(Article::from_raw(raw).is_none());
    }

    #[test]
    fn test_raw_article_deserializes_api_shape() {
        let json = r#"{
            "title": "Fed <b>raises</b> rates",
            "originallink": "https://example.com/fed",
            "link": "https://n.news.naver.com/fed",
            "description": "The central bank...",
            "pubDate": "Tue, 10 Mar 2026 09:30:00 +0900"
        }"#;
        let raw: RawArticle = serde_json::from_str(json).unwrap();
        assert_eq!(raw.link, "https://n.news.naver.com/fed");
        assert_eq!(raw.pub_date, "Tue, 10 Mar 2026 09:30:00 +0900");
    }

    #[test]
    fn test_news_item_from_article() {
        let article = Article::from_raw(raw("Fed raises rates", "Tue, 10 Mar 2026 09:30:00 +0900")).unwrap();
        let item = NewsItem::from_article(&article, "Summary".to_string());
        assert_eq!(item.cleaned_title, "Fed raises rates");
        assert_eq!(item.publication_date, "Tue, 10 Mar 2026 09:30:00 +0900");
        assert_eq!(item.formatted_date, "2026-03-10 09:30");
        assert_eq!(item.summary, "Summary");
    }
}
