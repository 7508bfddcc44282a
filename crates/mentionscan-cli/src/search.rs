//! The `search` subcommand: build the connector registry from
//! configuration, run one search, print the results.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use mentionscan_connectors::{
    ConnectorRegistry, HackerNewsConnector, MastodonConnector, PlatformConnector, RedditConnector,
};
use mentionscan_core::{
    load_app_config, AppConfig, ContentType, FilterSpec, Period, Platform, SearchRequest,
    Sentiment,
};
use mentionscan_search::{SearchOrchestrator, SearchResults};
use std::sync::Arc;

use crate::store::JsonFileSnapshotStore;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Keyword to search for; repeat for multiple keywords.
    #[arg(short, long = "keyword", required = true)]
    keywords: Vec<String>,

    /// Platform to search; repeat for multiple platforms.
    #[arg(short, long = "platform", required = true)]
    platforms: Vec<Platform>,

    /// Keep only mentions with this sentiment.
    #[arg(long)]
    sentiment: Option<Sentiment>,

    /// Keep only mentions created within this period (last-day, last-week,
    /// last-month, last-year).
    #[arg(long)]
    period: Option<Period>,

    /// Language code filter, e.g. "en".
    #[arg(long)]
    language: Option<String>,

    /// Minimum total engagement (likes + shares + comments).
    #[arg(long)]
    min_engagement: Option<u64>,

    /// Maximum total engagement.
    #[arg(long)]
    max_engagement: Option<u64>,

    /// Keep only mentions of this content type.
    #[arg(long)]
    content_type: Option<ContentType>,

    /// Country-of-origin filter, e.g. "us".
    #[arg(long)]
    country: Option<String>,

    /// Keep only mentions whose text contains this substring.
    #[arg(long)]
    contains: Option<String>,

    /// Directory to write a JSON snapshot of the result set into.
    #[arg(long, value_name = "DIR")]
    save: Option<PathBuf>,

    /// Print the full result set as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

impl SearchArgs {
    fn filters(&self) -> FilterSpec {
        FilterSpec {
            language: self.language.clone(),
            period: self.period,
            sentiment: self.sentiment,
            min_engagement: self.min_engagement,
            max_engagement: self.max_engagement,
            content_type: self.content_type,
            country: self.country.clone(),
            contains: self.contains.clone(),
        }
    }
}

pub async fn run(args: SearchArgs) -> anyhow::Result<()> {
    let config = load_app_config().context("failed to load configuration")?;
    let registry = build_registry(&config, &args.platforms)?;

    let mut orchestrator = SearchOrchestrator::from_config(registry, &config);
    if let Some(dir) = &args.save {
        orchestrator = orchestrator.with_snapshot_store(JsonFileSnapshotStore::new(dir.clone()));
    }

    let request = SearchRequest::new(args.keywords.clone(), args.platforms.clone())
        .with_filters(args.filters());
    let results = orchestrator
        .search(&request)
        .await
        .context("search failed")?;

    if args.json {
        print_json(&results)?;
    } else {
        print_summary(&results);
    }
    Ok(())
}

/// Construct connectors for exactly the requested platforms.
fn build_registry(
    config: &AppConfig,
    platforms: &[Platform],
) -> anyhow::Result<ConnectorRegistry> {
    let mut registry = ConnectorRegistry::new();
    for platform in platforms {
        if registry.contains(*platform) {
            continue;
        }
        let connector: Arc<dyn PlatformConnector> = match platform {
            Platform::Reddit => Arc::new(RedditConnector::new(&config.user_agent)?),
            Platform::Hackernews => Arc::new(HackerNewsConnector::new(&config.user_agent)?),
            Platform::Mastodon => {
                let token = std::env::var("MENTIONSCAN_MASTODON_TOKEN").ok();
                Arc::new(MastodonConnector::new(&config.user_agent, token)?)
            }
            other => anyhow::bail!("platform '{other}' has no connector in this build"),
        };
        registry.register(connector);
    }
    Ok(registry)
}

fn print_json(results: &SearchResults) -> anyhow::Result<()> {
    let body = serde_json::json!({
        "fingerprint": results.fingerprint.as_str(),
        "from_cache": results.from_cache,
        "partial_failure": results.partial_failure,
        "failed_platforms": results.failed_platforms,
        "platform_counts": results.platform_counts,
        "mentions": results.mentions,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn print_summary(results: &SearchResults) {
    println!(
        "{} mentions ({})",
        results.mentions.len(),
        if results.from_cache { "cached" } else { "fresh" }
    );
    for (platform, count) in &results.platform_counts {
        println!("  {platform}: {count} fetched");
    }
    for platform in &results.failed_platforms {
        println!("  {platform}: failed");
    }
    for mention in &results.mentions {
        let url = mention.url.as_deref().unwrap_or("-");
        println!(
            "[{}] {} | {} | {}",
            mention.platform,
            mention.created_at.format("%Y-%m-%d %H:%M"),
            truncate(&mention.text, 80),
            url
        );
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_owned()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 80), "short");
        assert_eq!(truncate("ééééé", 3), "ééé…");
    }
}
