use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::domain::{Article, Category};
use crate::services::aggregator::{AnsweredBy, FallbackAggregator};

/// User actions that drive the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedIntent {
    ChangeCategory(Category),
    Search(String),
    Refresh,
    LoadMore,
}

/// What the presenter should do with the result of an intent
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    /// Replace the displayed list
    Fresh(Vec<Article>),
    /// Append to the displayed list
    More(Vec<Article>),
    /// Load-more found nothing beyond what is shown
    NoMore,
    /// Dropped: a fetch was already running, or nothing changed
    Ignored,
}

#[derive(Debug, Default)]
struct FeedState {
    category: Category,
    query: String,
    articles: Vec<Article>,
    answered_by: Option<AnsweredBy>,
}

/// Current category, query and article list, plus the single in-flight fetch.
///
/// Only one fetch runs at a time: an intent arriving while another is being
/// served comes back as [`FeedUpdate::Ignored`].
pub struct FeedSession {
    aggregator: FallbackAggregator,
    fetching: AtomicBool,
    state: Mutex<FeedState>,
}

/// Holds the fetching flag; clears it when dropped
struct FetchGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl FeedSession {
    pub fn new(aggregator: FallbackAggregator) -> Self {
        Self::with_category(aggregator, Category::default())
    }

    pub fn with_category(aggregator: FallbackAggregator, category: Category) -> Self {
        Self {
            aggregator,
            fetching: AtomicBool::new(false),
            state: Mutex::new(FeedState {
                category,
                ..FeedState::default()
            }),
        }
    }

    pub async fn handle(&self, intent: FeedIntent) -> FeedUpdate {
        let Some(_guard) = self.try_begin() else {
            debug!(?intent, "Fetch in progress, ignoring");
            return FeedUpdate::Ignored;
        };

        match intent {
            FeedIntent::ChangeCategory(category) => {
                if category == self.category() {
                    return FeedUpdate::Ignored;
                }
                self.with_state(|s| {
                    s.category = category;
                    s.query.clear();
                    s.articles.clear();
                });
                self.reload().await
            }
            FeedIntent::Search(query) => {
                let query = query.trim().to_string();
                self.with_state(|s| {
                    if !query.is_empty() {
                        s.articles.clear();
                    }
                    s.query = query;
                });
                self.reload().await
            }
            FeedIntent::Refresh => self.reload().await,
            FeedIntent::LoadMore => self.load_more().await,
        }
    }

    pub fn category(&self) -> Category {
        self.with_state(|s| s.category)
    }

    pub fn query(&self) -> String {
        self.with_state(|s| s.query.clone())
    }

    pub fn articles(&self) -> Vec<Article> {
        self.with_state(|s| s.articles.clone())
    }

    /// Which provider (or the synthetic generator) served the last fetch
    pub fn answered_by(&self) -> Option<AnsweredBy> {
        self.with_state(|s| s.answered_by)
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::Acquire)
    }

    /// Offer load-more once at least a full page is shown
    pub fn can_load_more(&self) -> bool {
        let page_size = self.aggregator.page_size();
        self.with_state(|s| s.articles.len() >= page_size)
    }

    fn try_begin(&self) -> Option<FetchGuard<'_>> {
        self.fetching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FetchGuard {
                flag: &self.fetching,
            })
    }

    async fn reload(&self) -> FeedUpdate {
        let (category, query) = self.with_state(|s| (s.category, s.query.clone()));
        let outcome = self.aggregator.fetch_outcome(category, &query).await;

        info!(category = %category, answered_by = %outcome.answered_by, count = outcome.articles.len(), "Feed loaded");
        self.with_state(|s| {
            s.articles = outcome.articles.clone();
            s.answered_by = Some(outcome.answered_by);
        });

        FeedUpdate::Fresh(outcome.articles)
    }

    async fn load_more(&self) -> FeedUpdate {
        let (category, query, held) =
            self.with_state(|s| (s.category, s.query.clone(), s.articles.len()));
        let outcome = self.aggregator.fetch_outcome(category, &query).await;

        let fresh: Vec<Article> = outcome.articles.into_iter().skip(held).collect();
        if fresh.is_empty() {
            debug!(held, "Nothing beyond the current list");
            return FeedUpdate::NoMore;
        }

        self.with_state(|s| {
            s.articles.extend(fresh.iter().cloned());
            s.answered_by = Some(outcome.answered_by);
        });
        FeedUpdate::More(fresh)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FeedState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::synthetic::SyntheticNewsGenerator;
    use crate::sources::traits::MockNewsProvider;
    use crate::sources::{ProviderKind, ProviderRegistry};
    use std::time::Duration;

    fn articles(count: usize) -> Vec<Article> {
        (0..count)
            .map(|i| Article::new(format!("Story {}", i), "Wire".to_string()))
            .collect()
    }

    fn session_with(provider: MockNewsProvider, page_size: usize) -> FeedSession {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(provider));
        let synthetic = SyntheticNewsGenerator::new(Some(1), Duration::ZERO);
        FeedSession::new(FallbackAggregator::new(registry, synthetic, page_size))
    }

    fn provider_returning(counts: Vec<usize>) -> MockNewsProvider {
        let mut provider = MockNewsProvider::new();
        provider.expect_kind().return_const(ProviderKind::NewsApi);
        provider.expect_is_enabled().return_const(true);

        let mut seq = mockall::Sequence::new();
        for count in counts {
            provider
                .expect_fetch()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| Ok(articles(count)));
        }
        provider
    }

    #[tokio::test]
    async fn test_refresh_replaces_feed() {
        let session = session_with(provider_returning(vec![3, 2]), 12);

        assert_eq!(session.handle(FeedIntent::Refresh).await, FeedUpdate::Fresh(articles(3)));
        assert_eq!(session.handle(FeedIntent::Refresh).await, FeedUpdate::Fresh(articles(2)));
        assert_eq!(session.articles().len(), 2);
        assert_eq!(
            session.answered_by(),
            Some(AnsweredBy::Provider(ProviderKind::NewsApi))
        );
    }

    #[tokio::test]
    async fn test_load_more_appends_only_new_items() {
        let session = session_with(provider_returning(vec![4, 6, 6]), 12);

        session.handle(FeedIntent::Refresh).await;

        match session.handle(FeedIntent::LoadMore).await {
            FeedUpdate::More(more) => {
                let titles: Vec<_> = more.iter().map(|a| a.title.as_str()).collect();
                assert_eq!(titles, vec!["Story 4", "Story 5"]);
            }
            other => panic!("expected More, got {:?}", other),
        }
        assert_eq!(session.articles().len(), 6);

        assert_eq!(session.handle(FeedIntent::LoadMore).await, FeedUpdate::NoMore);
        assert_eq!(session.articles().len(), 6);
    }

    #[tokio::test]
    async fn test_same_category_is_ignored() {
        let mut provider = MockNewsProvider::new();
        provider.expect_kind().return_const(ProviderKind::NewsApi);
        provider.expect_is_enabled().return_const(true);
        provider.expect_fetch().times(0);

        let session = session_with(provider, 12);
        assert_eq!(
            session.handle(FeedIntent::ChangeCategory(Category::General)).await,
            FeedUpdate::Ignored
        );
    }

    #[tokio::test]
    async fn test_category_change_clears_query() {
        let mut provider = MockNewsProvider::new();
        provider.expect_kind().return_const(ProviderKind::NewsApi);
        provider.expect_is_enabled().return_const(true);
        provider
            .expect_fetch()
            .withf(|r| r.query() == Some("rockets"))
            .times(1)
            .returning(|_| Ok(articles(2)));
        provider
            .expect_fetch()
            .withf(|r| r.category == Category::Sports && r.query().is_none())
            .times(1)
            .returning(|_| Ok(articles(1)));

        let session = session_with(provider, 12);
        session.handle(FeedIntent::Search("rockets".to_string())).await;
        assert_eq!(session.query(), "rockets");

        session.handle(FeedIntent::ChangeCategory(Category::Sports)).await;
        assert_eq!(session.query(), "");
        assert_eq!(session.category(), Category::Sports);
        assert_eq!(session.articles().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_search_reloads_category() {
        let mut provider = MockNewsProvider::new();
        provider.expect_kind().return_const(ProviderKind::NewsApi);
        provider.expect_is_enabled().return_const(true);
        provider
            .expect_fetch()
            .withf(|r| !r.is_search())
            .times(1)
            .returning(|_| Ok(articles(5)));

        let session = session_with(provider, 12);
        assert_eq!(
            session.handle(FeedIntent::Search("   ".to_string())).await,
            FeedUpdate::Fresh(articles(5))
        );
    }

    #[tokio::test]
    async fn test_intent_while_fetching_is_ignored() {
        let mut provider = MockNewsProvider::new();
        provider.expect_kind().return_const(ProviderKind::NewsApi);
        provider.expect_is_enabled().return_const(true);
        provider.expect_fetch().times(1).returning(|_| Ok(articles(1)));

        let session = session_with(provider, 12);

        let guard = session.try_begin();
        assert!(guard.is_some());
        assert!(session.is_fetching());
        assert_eq!(session.handle(FeedIntent::Refresh).await, FeedUpdate::Ignored);

        drop(guard);
        assert!(!session.is_fetching());
        assert!(matches!(session.handle(FeedIntent::Refresh).await, FeedUpdate::Fresh(_)));
        assert!(!session.is_fetching());
    }

    #[tokio::test]
    async fn test_can_load_more_needs_a_full_page() {
        let session = session_with(provider_returning(vec![3, 4]), 4);

        session.handle(FeedIntent::Refresh).await;
        assert!(!session.can_load_more());

        session.handle(FeedIntent::Refresh).await;
        assert!(session.can_load_more());
    }
}
