use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Timelike};
use clap::Parser;
use shared::{
    cutoff_hour_from_env, digest_path, list_digests, load_digest, load_dotenv, logical_date,
    output_dir_from_env, BriefingGenerator, NewsDigest,
};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "prepare-briefing")]
#[command(about = "Render a saved news digest as an HTML and org-mode briefing")]
struct Args {
    /// Path to a news digest (defaults to today's)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Logical date of the digest to render (YYYY-MM-DD)
    #[arg(short, long, conflicts_with = "file")]
    date: Option<NaiveDate>,

    /// Directory holding news digests (defaults to NEWS_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Hour at which a new news day starts (defaults to NEWS_CUTOFF_HOUR, then 6)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
    cutoff_hour: Option<u32>,

    /// Heading for the briefing (defaults to one matching the time of day)
    #[arg(short, long)]
    title: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    shared::logging::init(&args.log_level);

    // Same .env lookup as collect-news, so both agree on where digests live.
    load_dotenv();
    let output_dir = match args.output_dir.clone() {
        Some(dir) => dir,
        None => output_dir_from_env()?,
    };
    let cutoff_hour = match args.cutoff_hour {
        Some(hour) => hour,
        None => cutoff_hour_from_env()?,
    };

    let now = Local::now().naive_local();
    let digest_file = match (&args.file, args.date) {
        (Some(path), _) => path.clone(),
        (None, Some(date)) => digest_path(&output_dir, date),
        (None, None) => digest_path(&output_dir, logical_date(now, cutoff_hour)),
    };
    debug!(path = %digest_file.display(), "Selected news digest");

    let digest = match load_digest(&digest_file) {
        Ok(digest) => digest,
        Err(e) => {
            print_available(&output_dir);
            return Err(e);
        }
    };

    println!("📖 Loaded digest for \"{}\" ({})", digest.topic, digest.logical_date);
    println!("✓ {} stories", digest.articles.len());

    let title = args
        .title
        .unwrap_or_else(|| BriefingGenerator::briefing_title(now.hour()).to_string());
    let target_dir = digest_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    render(&digest, &title, now, target_dir)
}

fn render(digest: &NewsDigest, title: &str, now: chrono::NaiveDateTime, dir: &Path) -> Result<()> {
    println!("\n📝 Generating HTML briefing...");
    let html = BriefingGenerator::generate(digest, title, now);
    let html_path = BriefingGenerator::save(&html, dir, digest, "html")
        .context("Failed to save HTML briefing")?;
    println!("✓ HTML saved to: {}", html_path.display());

    println!("\n📝 Generating org-mode briefing...");
    let org = BriefingGenerator::generate_org_mode(digest, title);
    let org_path = BriefingGenerator::save(&org, dir, digest, "org")
        .context("Failed to save org-mode briefing")?;
    println!("✓ Org-mode saved to: {}", org_path.display());

    Ok(())
}

fn print_available(dir: &Path) {
    match list_digests(dir) {
        Ok(digests) if !digests.is_empty() => {
            println!("Available news digests in {}:", dir.display());
            for (path, digest) in digests {
                println!(
                    "  {}  {:<20} {} stories  {}",
                    digest.logical_date,
                    digest.topic,
                    digest.articles.len(),
                    path.display()
                );
            }
        }
        _ => println!("No news digests found in {}. Run collect-news first.", dir.display()),
    }
}
