// Public modules
pub mod briefing;
pub mod clock;
pub mod collector;
pub mod config;
pub mod dedup;
pub mod io;
pub mod logging;
pub mod memory;
pub mod models;
pub mod naver;
pub mod similarity;
pub mod source;
pub mod summarizer;
pub mod title;

// Re-export commonly used types
pub use briefing::BriefingGenerator;
pub use clock::{logical_date, Clock, SystemClock};
pub use collector::{CollectorConfig, NewsCollector};
pub use config::{cutoff_hour_from_env, load_dotenv, output_dir_from_env, Config};
pub use dedup::{DedupConfig, Deduplicator, Selection};
pub use io::{digest_path, get_default_output_dir, list_digests, load_digest, save_digest};
pub use memory::{ResetOutcome, TopicMemory};
pub use models::{Article, NewsDigest, NewsItem, RawArticle};
pub use naver::NaverNewsClient;
pub use similarity::token_sort_ratio;
pub use source::ArticleSource;
pub use summarizer::{ClaudeSummarizer, Summarizer};
pub use title::clean;
