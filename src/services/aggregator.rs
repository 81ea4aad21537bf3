use tracing::{debug, info, warn};

use crate::domain::{Article, Category};
use crate::errors::ProviderError;
use crate::services::synthetic::SyntheticNewsGenerator;
use crate::sources::{FetchRequest, ProviderKind, ProviderRegistry};

/// Who produced the articles of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsweredBy {
    Provider(ProviderKind),
    Synthetic,
}

impl std::fmt::Display for AnsweredBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnsweredBy::Provider(kind) => write!(f, "{}", kind),
            AnsweredBy::Synthetic => write!(f, "synthetic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub articles: Vec<Article>,
    pub answered_by: AnsweredBy,
}

/// Walks the provider chain until one answers with articles.
///
/// Provider failures never escape: each one is logged and the next provider
/// gets its turn. When the chain is exhausted the synthetic generator fills
/// the page, so a fetch always yields at least one article.
pub struct FallbackAggregator {
    registry: ProviderRegistry,
    synthetic: SyntheticNewsGenerator,
    page_size: usize,
}

impl FallbackAggregator {
    pub fn new(registry: ProviderRegistry, synthetic: SyntheticNewsGenerator, page_size: usize) -> Self {
        Self {
            registry,
            synthetic,
            page_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn fetch(&self, category: Category, query: &str) -> Vec<Article> {
        self.fetch_outcome(category, query).await.articles
    }

    pub async fn fetch_outcome(&self, category: Category, query: &str) -> FetchOutcome {
        let request = FetchRequest::new(category, query, self.page_size);

        for provider in self.registry.providers() {
            let kind = provider.kind();
            if !provider.is_enabled() {
                debug!(provider = %kind, "Provider disabled, skipping");
                continue;
            }

            let result = provider.fetch(&request).await.and_then(|articles| {
                if articles.is_empty() {
                    Err(ProviderError::Empty)
                } else {
                    Ok(articles)
                }
            });

            match result {
                Ok(mut articles) => {
                    articles.truncate(self.page_size);
                    info!(provider = %kind, count = articles.len(), category = %category, "Articles fetched");
                    return FetchOutcome {
                        articles,
                        answered_by: AnsweredBy::Provider(kind),
                    };
                }
                Err(e) => {
                    warn!(provider = %kind, error = %e, "Provider failed, trying next");
                }
            }
        }

        warn!(category = %category, "All providers failed, using synthetic articles");
        FetchOutcome {
            articles: self.synthetic.produce(&request).await,
            answered_by: AnsweredBy::Synthetic,
        }
    }
}
