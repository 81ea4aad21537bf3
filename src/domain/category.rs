use serde::{Deserialize, Serialize};

use crate::errors::NewsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    General,
    Technology,
    Business,
    Sports,
    Health,
}

impl Category {
    /// All categories in navigation order
    pub const ALL: [Category; 5] = [
        Category::General,
        Category::Technology,
        Category::Business,
        Category::Sports,
        Category::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Technology => "technology",
            Category::Business => "business",
            Category::Sports => "sports",
            Category::Health => "health",
        }
    }

    /// Capitalized label, e.g. "Technology"
    pub fn label(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Technology => "Technology",
            Category::Business => "Business",
            Category::Sports => "Sports",
            Category::Health => "Health",
        }
    }

    /// Headline endpoints take no category filter for the general feed
    pub fn headline_filter(&self) -> Option<&'static str> {
        match self {
            Category::General => None,
            other => Some(other.as_str()),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(Category::General),
            "technology" | "tech" => Ok(Category::Technology),
            "business" => Ok(Category::Business),
            "sports" | "sport" => Ok(Category::Sports),
            "health" => Ok(Category::Health),
            _ => Err(NewsError::UnknownCategory(s.trim().to_string())),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Technology".parse::<Category>().unwrap(), Category::Technology);
        assert_eq!(" SPORTS ".parse::<Category>().unwrap(), Category::Sports);
        assert_eq!("tech".parse::<Category>().unwrap(), Category::Technology);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            "weather".parse::<Category>(),
            Err(NewsError::UnknownCategory(name)) if name == "weather"
        ));
    }

    #[test]
    fn test_general_has_no_headline_filter() {
        assert_eq!(Category::General.headline_filter(), None);
        assert_eq!(Category::Health.headline_filter(), Some("health"));
    }

    #[test]
    fn test_as_str_round_trips_for_all() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }
}
