use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::config::{Config, FeedCatalog};
use crate::domain::article::parse_timestamp;
use crate::domain::Article;
use crate::errors::{ProviderError, ProviderResult};
use crate::normalize;
use crate::sources::payloads::{FeedItem, FeedResponse};
use crate::sources::traits::{FetchRequest, NewsProvider, ProviderKind};
use crate::sources::transport::{endpoint, HttpTransport};

const RSS_TO_JSON: &str = "https://api.rss2json.com/v1/api.json";

/// Feed requests allowed in flight at once
pub const MAX_CONCURRENT_FEEDS: usize = 2;

/// Feeds consulted on one fetch
pub const FEEDS_PER_FETCH: usize = 3;

/// Curated RSS feeds read through the rss2json converter.
///
/// Individual feeds are allowed to fail; the provider reports whatever the
/// remaining feeds produced, possibly nothing.
pub struct RssFeedSource {
    transport: Arc<dyn HttpTransport>,
    catalog: FeedCatalog,
}

impl RssFeedSource {
    pub fn new(transport: Arc<dyn HttpTransport>, catalog: FeedCatalog) -> Self {
        Self { transport, catalog }
    }

    pub fn from_config(transport: Arc<dyn HttpTransport>, config: &Config) -> Self {
        Self::new(transport, config.feeds.clone())
    }

    /// Searches pool every category's feeds; headlines read the category's own
    fn select_feeds(&self, request: &FetchRequest) -> Vec<String> {
        let pool = if request.is_search() {
            self.catalog.all_feeds()
        } else {
            self.catalog.feeds_for(request.category).to_vec()
        };

        pool.into_iter().take(FEEDS_PER_FETCH).collect()
    }

    async fn fetch_feed(&self, feed_url: &str, count: usize) -> Vec<FeedItem> {
        match self.try_fetch_feed(feed_url, count).await {
            Ok(items) => {
                debug!(feed = %feed_url, count = items.len(), "Feed fetched");
                items
            }
            Err(e) => {
                warn!(feed = %feed_url, error = %e, "Skipping feed");
                Vec::new()
            }
        }
    }

    async fn try_fetch_feed(&self, feed_url: &str, count: usize) -> ProviderResult<Vec<FeedItem>> {
        let count = count.to_string();
        let url = endpoint(RSS_TO_JSON, &[("rss_url", feed_url), ("count", &count)])?;

        let payload: FeedResponse = self.transport.get_json(&url).await?.into_payload()?;
        if payload.status != "ok" {
            return Err(ProviderError::ParseFailure(format!(
                "converter status {}",
                payload.status
            )));
        }

        // A malformed entry costs that entry, not the feed
        Ok(payload
            .items
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect())
    }
}

/// Case-insensitive match against title, description or content
pub fn filter_by_query(items: Vec<FeedItem>, query: &str) -> Vec<FeedItem> {
    let needle = query.to_lowercase();
    let matches = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|text| text.to_lowercase().contains(&needle))
    };

    items
        .into_iter()
        .filter(|item| matches(&item.title) || matches(&item.description) || matches(&item.content))
        .collect()
}

/// Newest first; undated items sink to the end in their original order
pub fn sort_newest_first(items: &mut [FeedItem]) {
    items.sort_by_key(|item| Reverse(item.pub_date.as_deref().and_then(parse_timestamp)));
}

#[async_trait]
impl NewsProvider for RssFeedSource {
    fn kind(&self) -> ProviderKind {
        ProviderKind::RssFeeds
    }

    async fn fetch(&self, request: &FetchRequest) -> ProviderResult<Vec<Article>> {
        let feeds = self.select_feeds(request);
        debug!(feeds = feeds.len(), search = request.is_search(), "Reading RSS feeds");

        let pending: Vec<_> = feeds
            .iter()
            .map(|feed| self.fetch_feed(feed, request.page_size))
            .collect();
        let batches: Vec<Vec<FeedItem>> = stream::iter(pending)
            .buffered(MAX_CONCURRENT_FEEDS)
            .collect()
            .await;

        let mut items: Vec<FeedItem> = batches.into_iter().flatten().collect();
        if let Some(query) = request.query() {
            items = filter_by_query(items, query);
        }

        sort_newest_first(&mut items);

        // Untitled entries must not take page slots
        let mut articles = normalize::from_feed_items(&items);
        articles.truncate(request.page_size);

        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use crate::sources::transport::{HttpResponse, MockHttpTransport};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn item(title: &str, description: &str, pub_date: &str) -> FeedItem {
        FeedItem {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            pub_date: Some(pub_date.to_string()),
            link: Some("https://www.bbc.co.uk/news/1".to_string()),
            ..Default::default()
        }
    }

    fn single_feed_catalog() -> FeedCatalog {
        let feeds = [(Category::General, vec!["https://feeds.example.com/general".to_string()])];
        FeedCatalog::new(feeds.into_iter().collect())
    }

    #[test]
    fn test_filter_matches_description() {
        let items = vec![
            item("Budget talks", "Parliament debates spending", "2024-01-01 10:00:00"),
            item("Weather", "Rockets grounded by storms", "2024-01-01 11:00:00"),
            item("Football", "Late winner", "2024-01-01 12:00:00"),
        ];

        let filtered = filter_by_query(items, "rockets");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title.as_deref(), Some("Weather"));
    }

    #[test]
    fn test_filter_checks_content() {
        let mut hit = item("Untitled", "", "");
        hit.content = Some("<p>SpaceX ROCKETS</p>".to_string());

        assert_eq!(filter_by_query(vec![hit], "rockets").len(), 1);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut items = vec![
            item("t0", "", "2024-01-01 08:00:00"),
            item("t2", "", "2024-01-01 10:00:00"),
            item("t1", "", "2024-01-01 09:00:00"),
        ];

        sort_newest_first(&mut items);

        let titles: Vec<_> = items.iter().filter_map(|i| i.title.as_deref()).collect();
        assert_eq!(titles, vec!["t2", "t1", "t0"]);
    }

    #[test]
    fn test_undated_items_sort_last() {
        let mut items = vec![
            item("undated", "", "sometime"),
            item("dated", "", "Mon, 01 Jan 2024 08:00:00 GMT"),
        ];

        sort_newest_first(&mut items);
        assert_eq!(items[0].title.as_deref(), Some("dated"));
    }

    #[test]
    fn test_search_pools_feeds_from_first_categories() {
        let source = RssFeedSource::new(Arc::new(MockHttpTransport::new()), FeedCatalog::default());

        let search = source.select_feeds(&FetchRequest::new(Category::Sports, "rockets", 12));
        let all = FeedCatalog::default().all_feeds();
        assert_eq!(search, all[..FEEDS_PER_FETCH].to_vec());

        let headlines = source.select_feeds(&FetchRequest::new(Category::Sports, "", 12));
        assert_eq!(
            headlines,
            FeedCatalog::default().feeds_for(Category::Sports)[..FEEDS_PER_FETCH].to_vec()
        );
    }

    #[tokio::test]
    async fn test_failed_feeds_are_skipped() {
        let mut catalog = FeedCatalog::default();
        catalog.replace(
            Category::Health,
            vec![
                "https://feeds.example.com/broken".to_string(),
                "https://feeds.example.com/good".to_string(),
                "https://feeds.example.com/down".to_string(),
            ],
        );

        let mut transport = MockHttpTransport::new();
        transport
            .expect_get_json()
            .withf(|url| url.contains("broken"))
            .returning(|_| Ok(HttpResponse::ok(json!({ "status": "error", "message": "bad feed" }))));
        transport
            .expect_get_json()
            .withf(|url| url.contains("down"))
            .returning(|_| Err(ProviderError::Transport("connection refused".to_string())));
        transport
            .expect_get_json()
            .withf(|url| url.contains("good"))
            .returning(|_| {
                Ok(HttpResponse::ok(json!({
                    "status": "ok",
                    "items": [
                        { "title": "Clinic opens", "pubDate": "2024-02-02 09:00:00",
                          "link": "https://www.nhs.uk/news/1", "description": "<b>New</b> clinic" }
                    ]
                })))
            });

        let source = RssFeedSource::new(Arc::new(transport), catalog);
        let articles = source
            .fetch(&FetchRequest::new(Category::Health, "", 12))
            .await
            .unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Clinic opens");
        assert_eq!(articles[0].source_name, "NHS");
    }

    #[tokio::test]
    async fn test_all_feeds_failing_yields_empty_list() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get_json()
            .returning(|_| Ok(HttpResponse::new(500, serde_json::Value::Null)));

        let source = RssFeedSource::new(Arc::new(transport), single_feed_catalog());
        let articles = source
            .fetch(&FetchRequest::new(Category::General, "", 12))
            .await
            .unwrap();

        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_query_filters_and_truncates() {
        let mut transport = MockHttpTransport::new();
        transport.expect_get_json().returning(|_| {
            Ok(HttpResponse::ok(json!({
                "status": "ok",
                "items": [
                    { "title": "Rockets one", "pubDate": "2024-01-01 08:00:00", "link": "https://a.example.com/1" },
                    { "title": "Gardening", "pubDate": "2024-01-01 09:00:00", "link": "https://a.example.com/2" },
                    { "title": "Rockets two", "pubDate": "2024-01-01 10:00:00", "link": "https://a.example.com/3" },
                    { "title": "Rockets three", "pubDate": "2024-01-01 07:00:00", "link": "https://a.example.com/4" }
                ]
            })))
        });

        let source = RssFeedSource::new(Arc::new(transport), single_feed_catalog());
        let articles = source
            .fetch(&FetchRequest::new(Category::General, "rockets", 2))
            .await
            .unwrap();

        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Rockets two", "Rockets one"]);
    }

    #[tokio::test]
    async fn test_untitled_entries_do_not_use_page_slots() {
        let mut transport = MockHttpTransport::new();
        transport.expect_get_json().returning(|_| {
            Ok(HttpResponse::ok(json!({
                "status": "ok",
                "items": [
                    { "title": "[Removed]", "pubDate": "2024-01-01 12:00:00", "link": "https://a.example.com/1" },
                    { "title": "", "pubDate": "2024-01-01 11:00:00", "link": "https://a.example.com/2" },
                    { "title": "Valid A", "pubDate": "2024-01-01 10:00:00", "link": "https://a.example.com/3" },
                    { "title": "Valid B", "pubDate": "2024-01-01 09:00:00", "link": "https://a.example.com/4" }
                ]
            })))
        });

        let source = RssFeedSource::new(Arc::new(transport), single_feed_catalog());
        let articles = source
            .fetch(&FetchRequest::new(Category::General, "", 2))
            .await
            .unwrap();

        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Valid A", "Valid B"]);
    }

    /// Records the highest number of overlapping requests
    #[derive(Default)]
    struct CountingTransport {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HttpTransport for CountingTransport {
        async fn get_json(&self, _url: &str) -> ProviderResult<HttpResponse> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(20)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(HttpResponse::ok(json!({ "status": "ok", "items": [] })))
        }
    }

    #[tokio::test]
    async fn test_feed_requests_are_bounded() {
        let transport = Arc::new(CountingTransport::default());
        let source = RssFeedSource::new(transport.clone(), FeedCatalog::default());

        source
            .fetch(&FetchRequest::new(Category::General, "", 12))
            .await
            .unwrap();

        assert_eq!(transport.calls.load(Ordering::SeqCst), FEEDS_PER_FETCH);
        assert_eq!(transport.peak.load(Ordering::SeqCst), MAX_CONCURRENT_FEEDS);
    }
}
