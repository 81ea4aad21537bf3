use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::Config;
use crate::domain::{Article, Category};
use crate::images;
use crate::sources::FetchRequest;

/// Outlets credited on generated articles
pub const SOURCE_ROSTER: [&str; 8] = [
    "Reuters",
    "Associated Press",
    "BBC News",
    "CNN",
    "The Guardian",
    "NPR",
    "ABC News",
    "CBS News",
];

/// Appended to the query, in order, for search-mode titles
pub const QUERY_TEMPLATES: [&str; 12] = [
    "Latest Breaking News",
    "Updates and Analysis",
    "Industry Impact Report",
    "Expert Opinion and Commentary",
    "Market Response and Trends",
    "Global Implications Study",
    "Future Outlook and Predictions",
    "Stakeholder Reactions",
    "Policy Changes and Regulations",
    "Technology and Innovation Impact",
    "Economic Effects Analysis",
    "Social Media Response Compilation",
];

pub fn category_topics(category: Category) -> &'static [&'static str] {
    match category {
        Category::General => &[
            "Breaking News",
            "World Updates",
            "International Affairs",
            "Current Events",
        ],
        Category::Technology => &[
            "Tech Innovation",
            "Software Updates",
            "AI Development",
            "Cybersecurity",
            "Startup News",
        ],
        Category::Business => &[
            "Market Analysis",
            "Economic Trends",
            "Corporate News",
            "Financial Reports",
            "Industry Updates",
        ],
        Category::Sports => &[
            "Game Results",
            "Player Transfers",
            "Championship News",
            "Sports Analysis",
            "Team Updates",
        ],
        Category::Health => &[
            "Medical Breakthrough",
            "Health Study",
            "Public Health",
            "Healthcare News",
            "Wellness Tips",
        ],
    }
}

/// Plausible stand-in articles for when every provider came up empty.
///
/// Output is a pure function of the seed, the clock and the request, so a
/// seeded generator with a fixed clock reproduces the same page.
pub struct SyntheticNewsGenerator {
    rng: Mutex<StdRng>,
    delay: Duration,
    now: Option<DateTime<Utc>>,
}

impl SyntheticNewsGenerator {
    pub fn new(seed: Option<u64>, delay: Duration) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            rng: Mutex::new(rng),
            delay,
            now: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.seed, Duration::from_millis(config.synthetic_delay_ms))
    }

    /// Pin the clock used for timestamps
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Wait out the simulated latency, then generate a page
    pub async fn produce(&self, request: &FetchRequest) -> Vec<Article> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let articles = self.generate(request);
        info!(
            count = articles.len(),
            query = request.query().unwrap_or(""),
            "Serving synthetic articles"
        );
        articles
    }

    /// Exactly `page_size` articles, newest first
    pub fn generate(&self, request: &FetchRequest) -> Vec<Article> {
        let now = self.now.unwrap_or_else(Utc::now);
        // A poisoned lock still holds a usable generator
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        (0..request.page_size)
            .map(|i| {
                let source = SOURCE_ROSTER[rng.random_range(0..SOURCE_ROSTER.len())];
                let (title, description) = match request.query() {
                    Some(query) => query_article(query, i, source),
                    None => category_article(request.category, &mut *rng, source),
                };
                let published = now - chrono::Duration::hours(i as i64 + 1);
                let image = images::placeholder_for(&title);

                Article::new(title, source.to_string())
                    .with_description(Some(description))
                    .with_image_url(image)
                    .with_published_at(published.to_rfc3339_opts(SecondsFormat::Millis, true))
            })
            .collect()
    }
}

fn query_article(query: &str, index: usize, source: &str) -> (String, String) {
    let topic = QUERY_TEMPLATES[index % QUERY_TEMPLATES.len()];
    let title = format!("{} {}", query, topic);
    let description = format!(
        "Comprehensive coverage of {} from {}. This story includes expert analysis \
         and the latest developments as they unfold.",
        query, source
    );
    (title, description)
}

fn category_article(category: Category, rng: &mut StdRng, source: &str) -> (String, String) {
    let topics = category_topics(category);
    let topic = topics[rng.random_range(0..topics.len())];
    let title = format!("{}: Major developments reported by industry experts", topic);
    let description = format!(
        "Comprehensive coverage of {} with detailed analysis from {}. This developing \
         story includes expert commentary and the latest updates from the newsroom.",
        topic.to_lowercase(),
        source
    );
    (title, description)
}
