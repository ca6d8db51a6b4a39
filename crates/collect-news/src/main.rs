use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::{
    save_digest, ClaudeSummarizer, CollectorConfig, Config, DedupConfig, NaverNewsClient,
    NewsCollector, NewsDigest, ResetOutcome, TopicMemory,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "collect-news")]
#[command(about = "Collect today's news, skipping stories already reported")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory for seen-topic ledgers and news digests
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Log level when RUST_LOG is not set (error, warn, info, debug)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Collect news, remember the chosen topics and save today's digest
    Run(CollectArgs),

    /// Collect news without reading or writing any files
    Preview(CollectArgs),

    /// Forget the topics reported today
    Reset,

    /// Forget today's topics, then preview fresh news
    Refresh(CollectArgs),
}

#[derive(clap::Args)]
struct CollectArgs {
    /// Search keyword (defaults to NEWS_KEYWORD)
    #[arg(short, long)]
    query: Option<String>,

    /// Number of stories to report (defaults to TARGET_NEWS_COUNT)
    #[arg(short, long)]
    count: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    shared::logging::init(&args.log_level);

    let mut config = Config::from_env()?;
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    match args.command {
        Command::Run(collect) => run(&config, &collect).await,
        Command::Preview(collect) => preview(&config, &collect).await,
        Command::Reset => {
            reset(&config);
            Ok(())
        }
        Command::Refresh(collect) => {
            reset(&config);
            preview(&config, &collect).await
        }
    }
}

fn persistent_memory(config: &Config) -> TopicMemory {
    TopicMemory::new(Some(config.output_dir.clone()), config.cutoff_hour)
}

fn build_collector(config: &Config, memory: TopicMemory) -> Result<NewsCollector> {
    let source = NaverNewsClient::new(
        config.naver_client_id.clone(),
        config.naver_client_secret.clone(),
    )?;

    let collector_config = CollectorConfig {
        days_to_keep: config.days_to_keep,
        dedup: DedupConfig {
            threshold: config.similarity_threshold,
            ..DedupConfig::default()
        },
        ..CollectorConfig::default()
    };

    let collector = NewsCollector::new(Box::new(source), memory, collector_config);
    match &config.anthropic_api_key {
        Some(key) => Ok(collector.with_summarizer(Box::new(ClaudeSummarizer::new(key.clone())?))),
        None => {
            info!("ANTHROPIC_API_KEY not set, articles will not be summarized");
            Ok(collector)
        }
    }
}

fn resolve(config: &Config, collect: &CollectArgs) -> Result<(String, usize)> {
    let query = collect
        .query
        .clone()
        .or_else(|| config.news_keyword.clone())
        .context("No search keyword. Pass --query or set NEWS_KEYWORD.")?;
    let count = collect.count.unwrap_or(config.target_count);
    Ok((query, count))
}

async fn run(config: &Config, collect: &CollectArgs) -> Result<()> {
    let (query, count) = resolve(config, collect)?;

    println!("\n📰 Collecting news for \"{}\"...", query);
    let collector = build_collector(config, persistent_memory(config))?;
    let digest = collector.digest(&query, count).await;

    print_digest(&digest);

    let path = save_digest(&config.output_dir, &digest).context("Failed to save news digest")?;
    println!("\n✅ News digest saved to: {}", path.display());

    Ok(())
}

async fn preview(config: &Config, collect: &CollectArgs) -> Result<()> {
    let (query, count) = resolve(config, collect)?;

    println!("\n👀 Previewing news for \"{}\" (nothing will be saved)...", query);
    let collector = build_collector(config, TopicMemory::new(None, config.cutoff_hour))?;
    let digest = collector.digest(&query, count).await;

    print_digest(&digest);
    println!("\n{}", serde_json::to_string_pretty(&digest)?);

    Ok(())
}

fn reset(config: &Config) {
    match persistent_memory(config).reset() {
        ResetOutcome::Removed(path) => {
            println!("✓ Cleared today's topic memory ({})", path.display())
        }
        ResetOutcome::NothingToRemove => println!("No topic memory to clear for today."),
        ResetOutcome::Ephemeral => println!("Topic memory is disabled, nothing to clear."),
        ResetOutcome::Failed(reason) => println!("⚠ Could not clear topic memory: {}", reason),
    }
}

fn print_digest(digest: &NewsDigest) {
    if digest.articles.is_empty() {
        println!("No new news found.");
        return;
    }

    println!("✓ {} new stories for {}", digest.articles.len(), digest.logical_date);
    for (index, item) in digest.articles.iter().enumerate() {
        println!("  {}. {} ({})", index + 1, item.cleaned_title, item.formatted_date);
        println!("     {}", item.link);
    }
}
