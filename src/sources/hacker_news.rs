use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::domain::Article;
use crate::errors::ProviderResult;
use crate::normalize;
use crate::sources::payloads::{HnSearchResponse, HnStory};
use crate::sources::traits::{FetchRequest, NewsProvider, ProviderKind};
use crate::sources::transport::{endpoint, HttpTransport};

const ALGOLIA_SEARCH: &str = "https://hn.algolia.com/api/v1/search";
const FIREBASE_BASE: &str = "https://hacker-news.firebaseio.com/v0";

/// Story details fetched per top-stories request
pub const TOP_STORY_LIMIT: usize = 10;

/// Last resort before synthetic data. No key needed.
pub struct HackerNewsSource {
    transport: Arc<dyn HttpTransport>,
}

impl HackerNewsSource {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    async fn search(&self, query: &str, page_size: usize) -> ProviderResult<Vec<Article>> {
        let hits = page_size.to_string();
        let url = endpoint(
            ALGOLIA_SEARCH,
            &[("query", query), ("tags", "story"), ("hitsPerPage", &hits)],
        )?;
        debug!(url = %url, "Searching Hacker News");

        let payload: HnSearchResponse = self.transport.get_json(&url).await?.into_payload()?;
        debug!(count = payload.hits.len(), query = %query, "Search index answered");

        Ok(normalize::from_hn_hits(payload.hits))
    }

    async fn top_stories(&self) -> ProviderResult<Vec<Article>> {
        let ids: Vec<u64> = self
            .transport
            .get_json(&format!("{}/topstories.json", FIREBASE_BASE))
            .await?
            .into_payload()?;

        let details = ids
            .into_iter()
            .take(TOP_STORY_LIMIT)
            .map(|id| self.story(id));

        // Deleted items come back as null
        let stories: Vec<HnStory> = try_join_all(details).await?.into_iter().flatten().collect();
        debug!(count = stories.len(), "Top stories fetched");

        Ok(normalize::from_hn_stories(stories))
    }

    async fn story(&self, id: u64) -> ProviderResult<Option<HnStory>> {
        self.transport
            .get_json(&format!("{}/item/{}.json", FIREBASE_BASE, id))
            .await?
            .into_payload()
    }
}

#[async_trait]
impl NewsProvider for HackerNewsSource {
    fn kind(&self) -> ProviderKind {
        ProviderKind::HackerNews
    }

    async fn fetch(&self, request: &FetchRequest) -> ProviderResult<Vec<Article>> {
        match request.query() {
            Some(query) => match self.search(query, request.page_size).await {
                Ok(articles) => Ok(articles),
                Err(e) => {
                    warn!(error = %e, "Hacker News search failed, using top stories");
                    self.top_stories().await
                }
            },
            None => self.top_stories().await,
        }
    }
}
