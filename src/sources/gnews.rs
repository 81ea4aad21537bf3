use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::domain::Article;
use crate::errors::{ProviderError, ProviderResult};
use crate::normalize;
use crate::sources::payloads::GNewsResponse;
use crate::sources::traits::{FetchRequest, NewsProvider, ProviderKind};
use crate::sources::transport::{endpoint, redact, HttpTransport};

const GNEWS_BASE: &str = "https://gnews.io/api/v4";

pub struct GNewsSource {
    transport: Arc<dyn HttpTransport>,
    api_key: Option<String>,
    country: String,
    language: String,
}

impl GNewsSource {
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
            config.gnews_api_key.clone(),
            config.country.clone(),
            config.language.clone(),
        )
    }

    fn build_url(&self, token: &str, request: &FetchRequest) -> ProviderResult<String> {
        let max = request.page_size.to_string();

        match request.query() {
            Some(query) => endpoint(
                &format!("{}/search", GNEWS_BASE),
                &[
                    ("q", query),
                    ("token", token),
                    ("lang", &self.language),
                    ("max", &max),
                ],
            ),
            None => {
                let mut params = vec![
                    ("token", token),
                    ("lang", self.language.as_str()),
                    ("country", self.country.as_str()),
                    ("max", max.as_str()),
                ];
                if let Some(category) = request.category.headline_filter() {
                    params.push(("category", category));
                }
                endpoint(&format!("{}/top-headlines", GNEWS_BASE), &params)
            }
        }
    }
}

#[async_trait]
impl NewsProvider for GNewsSource {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GNews
    }

    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, request: &FetchRequest) -> ProviderResult<Vec<Article>> {
        let token = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Transport("no GNews key configured".to_string()))?;

        let url = self.build_url(token, request)?;
        debug!(provider = %self.kind(), url = %redact(&url), "Requesting articles");

        let payload: GNewsResponse = self.transport.get_json(&url).await?.into_payload()?;

        debug!(count = payload.articles.len(), "GNews returned articles");
        Ok(normalize::from_gnews(payload.articles))
    }
}
