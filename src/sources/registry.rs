use std::sync::Arc;

use crate::config::Config;
use crate::sources::gnews::GNewsSource;
use crate::sources::hacker_news::HackerNewsSource;
use crate::sources::newsapi::NewsApiSource;
use crate::sources::rss_feed::RssFeedSource;
use crate::sources::traits::{NewsProvider, ProviderKind};
use crate::sources::transport::HttpTransport;

/// Providers in the order the aggregator consults them
pub struct ProviderRegistry {
    providers: Vec<Box<dyn NewsProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// The standard chain. Order matters: earlier providers win.
    pub fn from_config(transport: Arc<dyn HttpTransport>, config: &Config) -> Self {
        let mut registry = Self::new();
        if config.offline {
            return registry;
        }

        registry.register(Box::new(NewsApiSource::from_config(transport.clone(), config)));
        registry.register(Box::new(GNewsSource::from_config(transport.clone(), config)));
        registry.register(Box::new(RssFeedSource::from_config(transport.clone(), config)));
        registry.register(Box::new(HackerNewsSource::new(transport)));

        registry
    }

    pub fn register(&mut self, provider: Box<dyn NewsProvider>) {
        self.providers.push(provider);
    }

    pub fn providers(&self) -> &[Box<dyn NewsProvider>] {
        &self.providers
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
