use std::collections::HashMap;

use crate::domain::Category;
use crate::errors::{NewsError, NewsResult};

pub const DEFAULT_PAGE_SIZE: usize = 12;
/// Largest page NewsAPI will serve
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_SYNTHETIC_DELAY_MS: u64 = 800;

/// Feed sources per category, in the order they are tried
const DEFAULT_FEEDS: &[(Category, [&str; 3])] = &[
    (
        Category::General,
        [
            "http://rss.cnn.com/rss/edition.rss",
            "https://feeds.bbci.co.uk/news/rss.xml",
            "https://www.theguardian.com/world/rss",
        ],
    ),
    (
        Category::Technology,
        [
            "http://rss.cnn.com/rss/edition_technology.rss",
            "https://feeds.feedburner.com/TechCrunch",
            "https://www.wired.com/feed/rss",
        ],
    ),
    (
        Category::Business,
        [
            "http://rss.cnn.com/rss/money_latest.rss",
            "https://feeds.bloomberg.com/markets/news.rss",
            "https://feeds.reuters.com/reuters/businessNews",
        ],
    ),
    (
        Category::Sports,
        [
            "http://rss.cnn.com/rss/edition_sport.rss",
            "https://feeds.skysports.com/feeds/11095",
            "https://www.espn.com/espn/rss/news",
        ],
    ),
    (
        Category::Health,
        [
            "http://rss.cnn.com/rss/edition_health.rss",
            "https://feeds.medicalnewstoday.com/medicalnewstoday",
            "https://www.reuters.com/rssFeed/healthNews",
        ],
    ),
];

/// Category to feed URL mapping used by the RSS provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCatalog {
    feeds: HashMap<Category, Vec<String>>,
}

impl FeedCatalog {
    pub fn new(feeds: HashMap<Category, Vec<String>>) -> Self {
        Self { feeds }
    }

    pub fn feeds_for(&self, category: Category) -> &[String] {
        self.feeds
            .get(&category)
            .or_else(|| self.feeds.get(&Category::General))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every category's feeds, in navigation order
    pub fn all_feeds(&self) -> Vec<String> {
        Category::ALL
            .iter()
            .flat_map(|c| self.feeds.get(c).into_iter().flatten().cloned())
            .collect()
    }

    pub fn replace(&mut self, category: Category, urls: Vec<String>) {
        self.feeds.insert(category, urls);
    }
}

impl Default for FeedCatalog {
    fn default() -> Self {
        let feeds = DEFAULT_FEEDS
            .iter()
            .map(|(category, urls)| (*category, urls.iter().map(|u| u.to_string()).collect()))
            .collect();
        Self { feeds }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub news_api_key: Option<String>,
    pub gnews_api_key: Option<String>,
    pub country: String,
    pub language: String,
    pub page_size: usize,
    pub synthetic_delay_ms: u64,
    pub seed: Option<u64>,
    pub offline: bool,
    pub feeds: FeedCatalog,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news_api_key: None,
            gnews_api_key: None,
            country: DEFAULT_COUNTRY.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            synthetic_delay_ms: DEFAULT_SYNTHETIC_DELAY_MS,
            seed: None,
            offline: false,
            feeds: FeedCatalog::default(),
        }
    }
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> NewsResult<Self> {
        // Try to load .env from executable's directory first
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> NewsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config {
            news_api_key: lookup("NEWS_API_KEY").and_then(usable_key),
            gnews_api_key: lookup("GNEWS_API_KEY").and_then(usable_key),
            ..Config::default()
        };

        if let Some(country) = non_empty(lookup("KHABARI_COUNTRY")) {
            config.country = country.to_lowercase();
        }

        if let Some(language) = non_empty(lookup("KHABARI_LANGUAGE")) {
            config.language = language.to_lowercase();
        }

        if let Some(raw) = non_empty(lookup("KHABARI_PAGE_SIZE")) {
            config.page_size = parse_page_size(&raw)?;
        }

        if let Some(raw) = non_empty(lookup("KHABARI_SYNTHETIC_DELAY_MS")) {
            config.synthetic_delay_ms = raw.parse().map_err(|_| {
                NewsError::Config(format!("KHABARI_SYNTHETIC_DELAY_MS must be a number, got '{}'", raw))
            })?;
        }

        if let Some(raw) = non_empty(lookup("KHABARI_SEED")) {
            config.seed = Some(raw.parse().map_err(|_| {
                NewsError::Config(format!("KHABARI_SEED must be a number, got '{}'", raw))
            })?);
        }

        if let Some(raw) = non_empty(lookup("KHABARI_OFFLINE")) {
            config.offline = parse_flag(&raw)?;
        }

        for category in Category::ALL {
            let key = format!("KHABARI_FEEDS_{}", category.as_str().to_uppercase());
            if let Some(raw) = non_empty(lookup(&key)) {
                let urls: Vec<String> = raw
                    .split(',')
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty())
                    .collect();
                if !urls.is_empty() {
                    config.feeds.replace(category, urls);
                }
            }
        }

        Ok(config)
    }
}

/// Keys that are blank or still hold the sample value disable their provider
fn usable_key(key: String) -> Option<String> {
    let key = key.trim();
    if key.is_empty() || (key.starts_with("YOUR_") && key.ends_with("_HERE")) {
        None
    } else {
        Some(key.to_string())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn parse_page_size(raw: &str) -> NewsResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(size) if (1..=MAX_PAGE_SIZE).contains(&size) => Ok(size),
        _ => Err(NewsError::Config(format!(
            "page size must be between 1 and {}, got '{}'",
            MAX_PAGE_SIZE, raw
        ))),
    }
}

fn parse_flag(raw: &str) -> NewsResult<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(NewsError::Config(format!("expected a boolean, got '{}'", raw))),
    }
}
