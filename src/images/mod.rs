//! Display-image selection for articles.
//!
//! Providers hand over whatever image hints they have: a direct image field,
//! a raw feed item, or nothing. The resolver walks its strategies in order
//! and takes the first usable URL. When none applies it falls back to a
//! stock image chosen from the article title, so resolution always ends
//! with an absolute `https` URL.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::domain::Category;
use crate::sources::payloads::FeedItem;

/// URLs containing this token come from placeholder services, never real art
const PLACEHOLDER_TOKEN: &str = "placeholder";

static IMG_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']+)["'][^>]*>"#).expect("valid img tag pattern")
});

static BARE_IMAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s<>"]+\.(?:jpg|jpeg|png|gif|webp)"#).expect("valid image url pattern")
});

/// Title keywords per placeholder bucket; first bucket with a hit wins
const KEYWORD_BUCKETS: &[(Category, &[&str])] = &[
    (Category::Technology, &["tech", "ai", "software"]),
    (Category::Business, &["business", "market", "economy"]),
    (Category::Sports, &["sport", "game", "team"]),
    (Category::Health, &["health", "medical", "hospital"]),
];

/// Image hints available for one article
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageSource<'a> {
    pub direct: Option<&'a str>,
    pub item: Option<&'a FeedItem>,
}

impl<'a> ImageSource<'a> {
    pub fn direct(url: Option<&'a str>) -> Self {
        Self { direct: url, item: None }
    }

    pub fn feed_item(item: &'a FeedItem) -> Self {
        Self { direct: None, item: Some(item) }
    }
}

pub trait ImageStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Return a usable image URL if this strategy finds one
    fn try_extract(&self, source: &ImageSource<'_>) -> Option<String>;
}

/// Absolute https URL that does not point at a placeholder service
pub fn is_usable_image_url(candidate: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.to_lowercase().contains(PLACEHOLDER_TOKEN) {
        return false;
    }
    match Url::parse(candidate) {
        Ok(url) => url.scheme() == "https" && url.host_str().is_some(),
        Err(_) => false,
    }
}

fn usable(candidate: Option<&str>) -> Option<String> {
    candidate
        .map(str::trim)
        .filter(|c| is_usable_image_url(c))
        .map(str::to_string)
}

pub struct DirectUrl;

impl ImageStrategy for DirectUrl {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn try_extract(&self, source: &ImageSource<'_>) -> Option<String> {
        usable(source.direct)
    }
}

pub struct ImageEnclosure;

impl ImageStrategy for ImageEnclosure {
    fn name(&self) -> &'static str {
        "enclosure"
    }

    fn try_extract(&self, source: &ImageSource<'_>) -> Option<String> {
        let enclosure = source.item?.enclosure.as_ref()?;
        let is_image = enclosure
            .mime_type
            .as_deref()
            .is_some_and(|t| t.to_lowercase().starts_with("image/"));
        if !is_image {
            return None;
        }
        usable(enclosure.link.as_deref().or(enclosure.url.as_deref()))
    }
}

pub struct Thumbnail;

impl ImageStrategy for Thumbnail {
    fn name(&self) -> &'static str {
        "thumbnail"
    }

    fn try_extract(&self, source: &ImageSource<'_>) -> Option<String> {
        usable(source.item?.thumbnail.as_deref())
    }
}

pub struct MediaFields;

impl ImageStrategy for MediaFields {
    fn name(&self) -> &'static str {
        "media"
    }

    fn try_extract(&self, source: &ImageSource<'_>) -> Option<String> {
        let item = source.item?;
        [&item.media_content, &item.media_thumbnail]
            .into_iter()
            .flatten()
            .find_map(|media| usable(media.url.as_deref()))
    }
}

pub struct InlineImgTag;

impl ImageStrategy for InlineImgTag {
    fn name(&self) -> &'static str {
        "inline-img"
    }

    fn try_extract(&self, source: &ImageSource<'_>) -> Option<String> {
        let item = source.item?;
        [item.content.as_deref(), item.description.as_deref()]
            .into_iter()
            .flatten()
            .flat_map(|html| IMG_TAG.captures_iter(html))
            .find_map(|caps| usable(caps.get(1).map(|m| m.as_str())))
    }
}

pub struct BareImageUrl;

impl ImageStrategy for BareImageUrl {
    fn name(&self) -> &'static str {
        "bare-url"
    }

    fn try_extract(&self, source: &ImageSource<'_>) -> Option<String> {
        let item = source.item?;
        let text = item
            .content
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(item.description.as_deref())?;

        BARE_IMAGE_URL
            .find_iter(text)
            .find_map(|m| usable(Some(m.as_str())))
    }
}

/// Bucket a title into a category by keyword
pub fn placeholder_category(title: &str) -> Category {
    let title = title.to_lowercase();
    KEYWORD_BUCKETS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| title.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

/// Stock image bound to a category
pub fn category_image(category: Category) -> &'static str {
    match category {
        Category::General => {
            "https://images.unsplash.com/photo-1504711434969-e33886168f5c?w=400&h=250&fit=crop"
        }
        Category::Technology => {
            "https://images.unsplash.com/photo-1518186285589-2f7649de83e0?w=400&h=250&fit=crop"
        }
        Category::Business => {
            "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=400&h=250&fit=crop"
        }
        Category::Sports => {
            "https://images.unsplash.com/photo-1461896836934-ffe607ba8211?w=400&h=250&fit=crop"
        }
        Category::Health => {
            "https://images.unsplash.com/photo-1559757148-5c350d0d3c56?w=400&h=250&fit=crop"
        }
    }
}

pub fn placeholder_for(title: &str) -> String {
    category_image(placeholder_category(title)).to_string()
}

pub struct ImageResolver {
    strategies: Vec<Box<dyn ImageStrategy>>,
}

impl ImageResolver {
    pub fn new() -> Self {
        let mut resolver = Self {
            strategies: Vec::new(),
        };

        // Order is the priority
        resolver.register(Box::new(DirectUrl));
        resolver.register(Box::new(ImageEnclosure));
        resolver.register(Box::new(Thumbnail));
        resolver.register(Box::new(MediaFields));
        resolver.register(Box::new(InlineImgTag));
        resolver.register(Box::new(BareImageUrl));

        resolver
    }

    pub fn register(&mut self, strategy: Box<dyn ImageStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn resolve(&self, source: &ImageSource<'_>, title: &str) -> String {
        for strategy in &self.strategies {
            if let Some(url) = strategy.try_extract(source) {
                tracing::trace!(strategy = strategy.name(), %url, "Image resolved");
                return url;
            }
        }
        placeholder_for(title)
    }
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_RESOLVER: Lazy<ImageResolver> = Lazy::new(ImageResolver::new);

/// Resolve with the standard strategy order
pub fn resolve(source: &ImageSource<'_>, title: &str) -> String {
    DEFAULT_RESOLVER.resolve(source, title)
}
