//! Provider payloads to canonical [`Article`]s.
//!
//! These functions never fail. Entries without a usable title are dropped,
//! dates that cannot be read are passed through untouched.

use chrono::{DateTime, SecondsFormat, Utc};
use scraper::Html;
use url::Url;

use crate::domain::Article;
use crate::images::{self, ImageSource};
use crate::sources::payloads::{FeedItem, GNewsArticle, HnHit, HnStory, NamedSource, NewsApiArticle};

/// Title some providers substitute for withdrawn articles
pub const REMOVED_TITLE: &str = "[Removed]";

pub const MAX_DESCRIPTION_CHARS: usize = 200;

const UNKNOWN_SOURCE: &str = "Unknown Source";
const FEED_SOURCE_FALLBACK: &str = "News Source";

pub fn usable_title(title: Option<&str>) -> Option<String> {
    let title = title?.trim();
    if title.is_empty() || title == REMOVED_TITLE {
        None
    } else {
        Some(title.to_string())
    }
}

fn source_name(source: Option<NamedSource>) -> String {
    source
        .and_then(|s| s.name)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

pub fn from_newsapi(articles: Vec<NewsApiArticle>) -> Vec<Article> {
    articles
        .into_iter()
        .filter_map(|raw| {
            let title = usable_title(raw.title.as_deref())?;
            let image = images::resolve(&ImageSource::direct(raw.url_to_image.as_deref()), &title);

            Some(
                Article::new(title, source_name(raw.source))
                    .with_description(raw.description)
                    .with_url(raw.url)
                    .with_image_url(image)
                    .with_published_at(raw.published_at.unwrap_or_default()),
            )
        })
        .collect()
}

pub fn from_gnews(articles: Vec<GNewsArticle>) -> Vec<Article> {
    articles
        .into_iter()
        .filter_map(|raw| {
            let title = usable_title(raw.title.as_deref())?;
            let image = images::resolve(&ImageSource::direct(raw.image.as_deref()), &title);

            Some(
                Article::new(title, source_name(raw.source))
                    .with_description(raw.description)
                    .with_url(raw.url)
                    .with_image_url(image)
                    .with_published_at(raw.published_at.unwrap_or_default()),
            )
        })
        .collect()
}

pub fn from_feed_items(items: &[FeedItem]) -> Vec<Article> {
    items
        .iter()
        .filter_map(|item| {
            let title = usable_title(item.title.as_deref())?;
            let image = images::resolve(&ImageSource::feed_item(item), &title);
            let source = item
                .link
                .as_deref()
                .map(source_from_link)
                .unwrap_or_else(|| FEED_SOURCE_FALLBACK.to_string());

            Some(
                Article::new(title, source)
                    .with_description(item.description.as_deref().map(clean_description))
                    .with_url(item.link.clone())
                    .with_image_url(image)
                    .with_published_at(item.pub_date.clone().unwrap_or_default()),
            )
        })
        .collect()
}

pub fn from_hn_stories(stories: Vec<HnStory>) -> Vec<Article> {
    stories
        .into_iter()
        .filter_map(|story| {
            let title = usable_title(story.title.as_deref())?;
            let description = hn_description(story.score, story.descendants, story.url.is_some());
            let url = story.url.unwrap_or_else(|| discussion_url(&story.id.to_string()));
            let published = story
                .time
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(iso_timestamp)
                .unwrap_or_default();
            let image = images::resolve(&ImageSource::default(), &title);

            Some(
                Article::new(title, "Hacker News".to_string())
                    .with_description(Some(description))
                    .with_url(Some(url))
                    .with_image_url(image)
                    .with_published_at(published),
            )
        })
        .collect()
}

pub fn from_hn_hits(hits: Vec<HnHit>) -> Vec<Article> {
    hits.into_iter()
        .filter_map(|hit| {
            let title = usable_title(hit.title.as_deref())?;
            let description = hn_description(hit.points, hit.num_comments, hit.url.is_some());
            let url = hit.url.unwrap_or_else(|| discussion_url(&hit.object_id));
            let published = hit
                .created_at
                .map(|raw| match DateTime::parse_from_rfc3339(&raw) {
                    Ok(dt) => iso_timestamp(dt.with_timezone(&Utc)),
                    Err(_) => raw,
                })
                .unwrap_or_default();
            let image = images::resolve(&ImageSource::default(), &title);

            Some(
                Article::new(title, "Hacker News Search".to_string())
                    .with_description(Some(description))
                    .with_url(Some(url))
                    .with_image_url(image)
                    .with_published_at(published),
            )
        })
        .collect()
}

fn iso_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn discussion_url(id: &str) -> String {
    format!("https://news.ycombinator.com/item?id={}", id)
}

fn hn_description(score: Option<i64>, comments: Option<i64>, has_link: bool) -> String {
    format!(
        "Score: {} points | Comments: {} | {}",
        score.unwrap_or(0),
        comments.unwrap_or(0),
        if has_link { "External Link" } else { "Discussion" }
    )
}

/// Extract plain text from HTML, collapsing whitespace
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::new();

    for node in fragment.root_element().descendants() {
        if let Some(text_node) = node.value().as_text() {
            text.push_str(text_node);
        }
        // Block elements separate words
        if let Some(element) = node.value().as_element() {
            if matches!(element.name(), "p" | "br" | "div" | "li") {
                text.push(' ');
            }
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Feed descriptions arrive as HTML: strip it, cap the length and mark it
/// as an excerpt. Text-free markup yields an empty string.
pub fn clean_description(html: &str) -> String {
    let text = html_to_text(html);
    if text.is_empty() {
        return text;
    }

    let excerpt: String = text.chars().take(MAX_DESCRIPTION_CHARS).collect();
    format!("{}...", excerpt.trim_end())
}

/// "https://www.bbc.co.uk/news/1" -> "CO", "https://edition.cnn.com/x" -> "CNN"
pub fn source_from_link(link: &str) -> String {
    let host = match Url::parse(link).ok().and_then(|u| u.host_str().map(str::to_string)) {
        Some(host) => host,
        None => return FEED_SOURCE_FALLBACK.to_string(),
    };

    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() > 1 {
        parts[parts.len() - 2].to_uppercase()
    } else {
        host.to_uppercase()
    }
}
