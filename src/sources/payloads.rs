//! Wire shapes returned by the upstream news services.
//!
//! Everything optional is `Option` so a sparse entry still decodes; the
//! normalizer decides what is usable.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedSource {
    pub name: Option<String>,
}

// NewsAPI

#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    pub status: String,
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub source: Option<NamedSource>,
}

// GNews

#[derive(Debug, Deserialize)]
pub struct GNewsResponse {
    #[serde(default)]
    pub articles: Vec<GNewsArticle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GNewsArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub published_at: Option<String>,
    pub source: Option<NamedSource>,
}

// rss2json

#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    pub status: String,
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedItem {
    pub title: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub enclosure: Option<Enclosure>,
    #[serde(rename = "media:content", default, deserialize_with = "lenient")]
    pub media_content: Option<MediaRef>,
    #[serde(rename = "media:thumbnail", default, deserialize_with = "lenient")]
    pub media_thumbnail: Option<MediaRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Enclosure {
    pub link: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaRef {
    pub url: Option<String>,
}

/// The converter emits `[]` instead of an object when a field is absent;
/// anything that is not the expected object reads as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// Hacker News

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HnStory {
    pub id: u64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub score: Option<i64>,
    pub descendants: Option<i64>,
    pub time: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HnSearchResponse {
    #[serde(default)]
    pub hits: Vec<HnHit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HnHit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub points: Option<i64>,
    pub num_comments: Option<i64>,
    pub created_at: Option<String>,
}
