use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{NewsResult, ProviderError, ProviderResult};

/// Status and decoded JSON body of a GET request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail on non-2xx, otherwise decode the body into a provider payload
    pub fn into_payload<T: DeserializeOwned>(self) -> ProviderResult<T> {
        if !self.is_success() {
            return Err(ProviderError::from_status(self.status));
        }
        Ok(serde_json::from_value(self.body)?)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET and decode the body as JSON.
    /// Non-2xx statuses are returned, not turned into errors.
    async fn get_json(&self, url: &str) -> ProviderResult<HttpResponse>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> NewsResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("khabari/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> ProviderResult<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;

        // Error pages are often HTML; keep the status and drop the body
        let body = match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => body,
            Err(e) if (200..300).contains(&status) => {
                return Err(ProviderError::ParseFailure(e.to_string()));
            }
            Err(_) => Value::Null,
        };

        Ok(HttpResponse { status, body })
    }
}

/// Build a request URL with properly encoded query parameters
pub fn endpoint(base: &str, params: &[(&str, &str)]) -> ProviderResult<String> {
    url::Url::parse_with_params(base, params)
        .map(String::from)
        .map_err(|e| ProviderError::Transport(format!("invalid endpoint {}: {}", base, e)))
}

/// Strip credentials from a URL before it goes into a log line
pub fn redact(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            let pairs: Vec<(String, String)> = parsed
                .query_pairs()
                .map(|(k, v)| {
                    let value = if matches!(k.as_ref(), "apiKey" | "token" | "api_key") {
                        "***".to_string()
                    } else {
                        v.into_owned()
                    };
                    (k.into_owned(), value)
                })
                .collect();

            if pairs.is_empty() {
                return parsed.to_string();
            }

            parsed.query_pairs_mut().clear().extend_pairs(pairs);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
