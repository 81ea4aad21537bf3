use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::domain::Article;
use crate::errors::{ProviderError, ProviderResult};
use crate::normalize;
use crate::sources::payloads::NewsApiResponse;
use crate::sources::traits::{FetchRequest, NewsProvider, ProviderKind};
use crate::sources::transport::{endpoint, redact, HttpTransport};

const NEWS_API_BASE: &str = "https://newsapi.org/v2";

/// NewsAPI.org: first choice for both headlines and search
pub struct NewsApiSource {
    transport: Arc<dyn HttpTransport>,
    api_key: Option<String>,
    country: String,
    language: String,
}

impl NewsApiSource {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        api_key: Option<String>,
        country: String,
        language: String,
    ) -> Self {
        Self {
            transport,
            api_key,
            country,
            language,
        }
    }

    pub fn from_config(transport: Arc<dyn HttpTransport>, config: &Config) -> Self {
        Self::new(
            transport,
            config.news_api_key.clone(),
            config.country.clone(),
            config.language.clone(),
        )
    }

    fn build_url(&self, api_key: &str, request: &FetchRequest) -> ProviderResult<String> {
        let page_size = request.page_size.to_string();

        match request.query() {
            Some(query) => endpoint(
                &format!("{}/everything", NEWS_API_BASE),
                &[
                    ("q", query),
                    ("pageSize", &page_size),
                    ("apiKey", api_key),
                    ("sortBy", "publishedAt"),
                    ("language", &self.language),
                ],
            ),
            None => {
                let mut params = vec![
                    ("country", self.country.as_str()),
                    ("pageSize", page_size.as_str()),
                    ("apiKey", api_key),
                ];
                if let Some(category) = request.category.headline_filter() {
                    params.push(("category", category));
                }
                endpoint(&format!("{}/top-headlines", NEWS_API_BASE), &params)
            }
        }
    }
}

#[async_trait]
impl NewsProvider for NewsApiSource {
    fn kind(&self) -> ProviderKind {
        ProviderKind::NewsApi
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, request: &FetchRequest) -> ProviderResult<Vec<Article>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Transport("no NewsAPI key configured".to_string()))?;

        let url = self.build_url(api_key, request)?;
        debug!(provider = %self.kind(), url = %redact(&url), "Requesting articles");

        let payload: NewsApiResponse = self.transport.get_json(&url).await?.into_payload()?;

        // NewsAPI reports some failures with a 200 and an error status
        if payload.status != "ok" {
            return Err(ProviderError::ParseFailure(
                payload
                    .message
                    .unwrap_or_else(|| "NewsAPI returned an error".to_string()),
            ));
        }

        debug!(count = payload.articles.len(), "NewsAPI returned articles");
        Ok(normalize::from_newsapi(payload.articles))
    }
}
