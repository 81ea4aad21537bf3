use clap::{Args, Parser, Subcommand};

use crate::config::parse_page_size;
use crate::domain::Category;
use crate::errors::NewsError;

#[derive(Parser)]
#[command(name = "khabari")]
#[command(about = "News headlines and search from several sources, with fallback")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Skip every network provider and serve generated articles
    #[arg(long, global = true)]
    pub offline: bool,

    /// Articles per page (1-100)
    #[arg(long, global = true, env = "KHABARI_PAGE_SIZE", value_parser = parse_page_size)]
    pub page_size: Option<usize>,

    /// Seed for generated articles, for reproducible output
    #[arg(long, global = true, env = "KHABARI_SEED")]
    pub seed: Option<u64>,

    /// Print articles as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FeedArgs {
    /// general, technology, business, sports or health
    #[arg(short, long, default_value = "general", value_parser = parse_category)]
    pub category: Category,

    /// Pages to show; pages after the first are loaded incrementally
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show top headlines for a category
    Headlines {
        #[command(flatten)]
        feed: FeedArgs,
    },

    /// Search articles
    Search {
        /// Search terms
        query: String,

        #[command(flatten)]
        feed: FeedArgs,
    },

    /// List the available categories
    Categories,
}

fn parse_category(raw: &str) -> Result<Category, NewsError> {
    raw.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_parses_flags() {
        let cli = Cli::parse_from([
            "khabari", "search", "rockets", "--category", "tech", "--pages", "2", "--offline",
        ]);

        assert!(cli.offline);
        match cli.command {
            Commands::Search { query, feed } => {
                assert_eq!(query, "rockets");
                assert_eq!(feed.category, Category::Technology);
                assert_eq!(feed.pages, 2);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["khabari", "headlines", "--category", "weather"]).is_err());
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        assert!(Cli::try_parse_from(["khabari", "--page-size", "0", "categories"]).is_err());
    }

    #[test]
    fn test_oversized_page_size_is_rejected() {
        assert!(Cli::try_parse_from(["khabari", "--page-size", "1000000000", "categories"]).is_err());
        assert!(Cli::try_parse_from(["khabari", "--page-size", "100", "categories"]).is_ok());
    }

    #[test]
    fn test_zero_pages_is_rejected() {
        assert!(Cli::try_parse_from(["khabari", "headlines", "--pages", "0"]).is_err());
    }
}
