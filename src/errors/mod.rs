use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // User input errors
    #[error("Unknown category: {0} (expected general, technology, business, sports or health)")]
    UnknownCategory(String),

    // Network setup errors
    #[error("HTTP client unavailable: {0}")]
    Http(#[from] reqwest::Error),

    // Output errors
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NewsResult<T> = Result<T, NewsError>;

/// Why a single provider attempt produced nothing usable.
///
/// These never reach the presenter; the aggregator logs them and moves on
/// to the next provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Response parsing failed: {0}")]
    ParseFailure(String),

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("No articles returned")]
    Empty,

    #[error("Request failed: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Map a non-success HTTP status onto the taxonomy
    pub fn from_status(status: u16) -> Self {
        if status == 429 {
            ProviderError::RateLimited
        } else {
            ProviderError::HttpStatus(status)
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::ParseFailure(err.to_string())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_status_maps_to_rate_limited() {
        assert_eq!(ProviderError::from_status(429), ProviderError::RateLimited);
    }

    #[test]
    fn test_other_statuses_keep_code() {
        assert_eq!(ProviderError::from_status(500), ProviderError::HttpStatus(500));
        assert_eq!(ProviderError::from_status(401), ProviderError::HttpStatus(401));
    }

    #[test]
    fn test_json_error_is_parse_failure() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(ProviderError::from(err), ProviderError::ParseFailure(_)));
    }
}
