use std::io::{self, Write};
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use khabari::cli::{Cli, Commands, FeedArgs};
use khabari::config::Config;
use khabari::domain::{Article, Category};
use khabari::errors::NewsResult;
use khabari::services::{AnsweredBy, FallbackAggregator, FeedIntent, FeedSession, FeedUpdate, SyntheticNewsGenerator};
use khabari::sources::{ProviderRegistry, ReqwestTransport};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        eprintln!("Please check your settings and try again.");
        std::process::exit(1);
    }
}

/// Logs go to stderr so rendered output stays clean; RUST_LOG overrides
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

async fn run() -> NewsResult<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if cli.offline {
        config.offline = true;
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    match cli.command {
        Commands::Categories => cmd_categories(cli.json),
        Commands::Headlines { feed } => cmd_feed(&config, None, feed, cli.json).await,
        Commands::Search { query, feed } => cmd_feed(&config, Some(query), feed, cli.json).await,
    }
}

fn cmd_categories(json: bool) -> NewsResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&Category::ALL)?);
        return Ok(());
    }

    println!("Categories:\n");
    for category in Category::ALL {
        println!("  {:<12} {}", category.as_str(), category.label());
    }

    Ok(())
}

async fn cmd_feed(config: &Config, query: Option<String>, feed: FeedArgs, json: bool) -> NewsResult<()> {
    let transport = Arc::new(ReqwestTransport::new()?);
    let registry = ProviderRegistry::from_config(transport, config);
    let aggregator = FallbackAggregator::new(
        registry,
        SyntheticNewsGenerator::from_config(config),
        config.page_size,
    );
    let session = FeedSession::with_category(aggregator, feed.category);

    let first = match &query {
        Some(query) => session.handle(FeedIntent::Search(query.clone())).await,
        None => session.handle(FeedIntent::Refresh).await,
    };

    let mut updates = vec![first];
    for _ in 1..feed.pages {
        if !session.can_load_more() {
            break;
        }
        let update = session.handle(FeedIntent::LoadMore).await;
        let exhausted = update == FeedUpdate::NoMore;
        updates.push(update);
        if exhausted {
            break;
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&session.articles())?);
        return Ok(());
    }

    let session_query = session.query();
    if session_query.is_empty() {
        println!("Top headlines: {}\n", feed.category.label());
    } else {
        println!("Search results for \"{}\" ({})\n", session_query, feed.category.label());
    }

    if session.answered_by() == Some(AnsweredBy::Synthetic) {
        println!("Live sources are unavailable; showing demo articles.\n");
    }

    let mut stdout = io::stdout().lock();
    let mut shown = 0;
    for update in updates {
        match update {
            FeedUpdate::Fresh(articles) | FeedUpdate::More(articles) => {
                for article in &articles {
                    shown += 1;
                    render_article(&mut stdout, shown, article)?;
                }
            }
            FeedUpdate::NoMore => writeln!(stdout, "No more articles.")?,
            FeedUpdate::Ignored => {}
        }
    }

    Ok(())
}

fn render_article(out: &mut impl Write, index: usize, article: &Article) -> io::Result<()> {
    writeln!(out, "{:>3}. {}", index, article.title)?;
    writeln!(
        out,
        "     {} | {}",
        article.source_name,
        article.time_ago(Utc::now())
    )?;
    writeln!(out, "     {}", article.description)?;
    if article.has_link() {
        writeln!(out, "     {}", article.url)?;
    } else {
        writeln!(out, "     [demo article]")?;
    }
    writeln!(out)
}
