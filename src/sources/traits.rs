use async_trait::async_trait;

use crate::domain::{Article, Category};
use crate::errors::ProviderResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    NewsApi,
    GNews,
    RssFeeds,
    HackerNews,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::NewsApi => "newsapi",
            ProviderKind::GNews => "gnews",
            ProviderKind::RssFeeds => "rss",
            ProviderKind::HackerNews => "hackernews",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the feed is asking for on one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub category: Category,
    pub query: Option<String>,
    pub page_size: usize,
}

impl FetchRequest {
    /// Blank queries mean headline mode
    pub fn new(category: Category, query: &str, page_size: usize) -> Self {
        let query = query.trim();
        Self {
            category,
            query: (!query.is_empty()).then(|| query.to_string()),
            page_size,
        }
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn is_search(&self) -> bool {
        self.query.is_some()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Identifies this provider
    fn kind(&self) -> ProviderKind;

    /// Disabled providers are skipped without counting as a failure
    fn is_enabled(&self) -> bool {
        true
    }

    /// One attempt at the provider, normalized
    async fn fetch(&self, request: &FetchRequest) -> ProviderResult<Vec<Article>>;
}
