use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::models::NewsDigest;

const DIGEST_PREFIX: &str = "news_summary_";
const DIGEST_SUFFIX: &str = ".json";

/// Default directory for ledgers and digests.
pub fn get_default_output_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .context("Could not determine local data directory")?
        .join("news-memory");

    Ok(data_dir)
}

pub fn digest_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}{}{}", DIGEST_PREFIX, date.format("%Y-%m-%d"), DIGEST_SUFFIX))
}

/// Write the digest for its logical date, replacing any earlier run that day.
pub fn save_digest(dir: &Path, digest: &NewsDigest) -> Result<PathBuf> {
    fs::create_dir_all(dir).context("Failed to create output directory")?;
    let filepath = digest_path(dir, digest.logical_date);

    let json = serde_json::to_string_pretty(digest).context("Failed to serialize news digest")?;

    fs::write(&filepath, json)
        .with_context(|| format!("Failed to write news digest: {}", filepath.display()))?;

    Ok(filepath)
}

pub fn load_digest(filepath: &Path) -> Result<NewsDigest> {
    if !filepath.exists() {
        anyhow::bail!("News digest not found: {}", filepath.display());
    }

    let content = fs::read_to_string(filepath)
        .with_context(|| format!("Failed to read news digest: {}", filepath.display()))?;

    let digest: NewsDigest = serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse news digest from {}. The file may be corrupted.",
            filepath.display()
        )
    })?;

    if digest.version != NewsDigest::VERSION {
        anyhow::bail!(
            "Unsupported news digest version: {}. Expected {}. Re-run collect-news to regenerate it.",
            digest.version,
            NewsDigest::VERSION
        );
    }

    Ok(digest)
}

/// All readable digests in `dir`, newest logical date first.
pub fn list_digests(dir: &Path) -> Result<Vec<(PathBuf, NewsDigest)>> {
    let mut digests = Vec::new();

    if !dir.exists() {
        return Ok(digests);
    }

    for entry in fs::read_dir(dir).context("Failed to read output directory")? {
        let path = entry?.path();
        let is_digest = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(DIGEST_PREFIX) && name.ends_with(DIGEST_SUFFIX))
            .unwrap_or(false);
        if !is_digest {
            continue;
        }

        match load_digest(&path) {
            Ok(digest) => digests.push((path, digest)),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable news digest"),
        }
    }

    digests.sort_by(|a, b| b.1.logical_date.cmp(&a.1.logical_date));

    Ok(digests)
}
