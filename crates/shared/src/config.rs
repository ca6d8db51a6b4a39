use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::clock::DEFAULT_CUTOFF_HOUR;
use crate::dedup::DEFAULT_SIMILARITY_THRESHOLD;
use crate::io::get_default_output_dir;
use crate::memory::DEFAULT_DAYS_TO_KEEP;

pub const DEFAULT_TARGET_COUNT: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub naver_client_id: String,
    pub naver_client_secret: String,
    /// Summaries are skipped when no key is configured.
    pub anthropic_api_key: Option<String>,
    pub news_keyword: Option<String>,
    pub target_count: usize,
    pub output_dir: PathBuf,
    pub similarity_threshold: f64,
    pub cutoff_hour: u32,
    pub days_to_keep: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        load_dotenv();

        let naver_client_id = env::var("NAVER_CLIENT_ID").context(
            "NAVER_CLIENT_ID not found.\n\n\
            To fix this, create ~/.config/news-memory/.env with:\n  \
            NAVER_CLIENT_ID=your_client_id\n  \
            NAVER_CLIENT_SECRET=your_client_secret\n\n\
            Register an application at: https://developers.naver.com/apps",
        )?;

        let naver_client_secret = env::var("NAVER_CLIENT_SECRET").context(
            "NAVER_CLIENT_SECRET not found. Set it as an environment variable or in ~/.config/news-memory/.env",
        )?;

        let config = Self {
            naver_client_id,
            naver_client_secret,
            anthropic_api_key: optional_var("ANTHROPIC_API_KEY"),
            news_keyword: optional_var("NEWS_KEYWORD"),
            target_count: parse_var("TARGET_NEWS_COUNT", DEFAULT_TARGET_COUNT)?,
            output_dir: output_dir_from_env()?,
            similarity_threshold: parse_var("NEWS_SIMILARITY_THRESHOLD", DEFAULT_SIMILARITY_THRESHOLD)?,
            cutoff_hour: cutoff_hour_from_env()?,
            days_to_keep: parse_var("NEWS_DAYS_TO_KEEP", DEFAULT_DAYS_TO_KEEP)?,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.similarity_threshold) {
            anyhow::bail!(
                "Similarity threshold must be between 0 and 100, got {}",
                self.similarity_threshold
            );
        }
        if self.cutoff_hour > 23 {
            anyhow::bail!("Cutoff hour must be between 0 and 23, got {}", self.cutoff_hour);
        }
        if self.days_to_keep < 0 {
            anyhow::bail!("Days to keep cannot be negative, got {}", self.days_to_keep);
        }
        Ok(())
    }
}

/// Load `.env` from the first location that has one: the current directory,
/// `~/.config/news-memory/`, then the home directory.
pub fn load_dotenv() {
    // 1. Current directory (for development)
    if dotenvy::dotenv().is_ok() {
        return;
    }

    // 2. ~/.config/news-memory/.env (standard config location)
    if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("news-memory").join(".env");
        if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
            return;
        }
    }

    // 3. ~/.env (home directory)
    if let Some(home_dir) = dirs::home_dir() {
        let home_path = home_dir.join(".env");
        if home_path.exists() {
            let _ = dotenvy::from_path(&home_path);
        }
    }
}

/// `NEWS_OUTPUT_DIR`, or the platform data directory.
pub fn output_dir_from_env() -> Result<PathBuf> {
    match optional_var("NEWS_OUTPUT_DIR") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => get_default_output_dir(),
    }
}

/// `NEWS_CUTOFF_HOUR`, or the default morning cutoff.
pub fn cutoff_hour_from_env() -> Result<u32> {
    let hour = parse_var("NEWS_CUTOFF_HOUR", DEFAULT_CUTOFF_HOUR)?;
    if hour > 23 {
        anyhow::bail!("NEWS_CUTOFF_HOUR must be between 0 and 23, got {}", hour);
    }
    Ok(hour)
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_var(name) {
        Some(value) => parse_value(name, &value),
        None => Ok(default),
    }
}

fn parse_value<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("{} has an invalid value: {:?}", name, value))
}
