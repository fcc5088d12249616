// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic query categorization.
//!
//! Maps a free-text query to a freshness category using ordered keyword
//! matching. No LLM pre-call, no network, no latency. Always succeeds:
//! unmatched queries fall through to [`QueryCategory::General`].

use remora_config::model::FreshnessConfig;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Freshness categories. Each maps to a maximum cached-content age.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QueryCategory {
    /// Forecasts and current conditions. Goes stale within hours.
    Weather,
    /// Road and transit conditions. The most perishable category.
    Traffic,
    /// Prices and market data.
    Stock,
    /// Headlines and current events.
    News,
    /// Everything else. Stable facts keep for a week.
    General,
}

/// One ordered classification rule: a category and the keywords that select it.
#[derive(Debug, Clone)]
struct CategoryRule {
    category: QueryCategory,
    keywords: Vec<String>,
}

/// Keyword-driven query classifier.
///
/// Rules are checked in order (weather, traffic, stock, news) and the first
/// category with a matching keyword wins. Matching is case-insensitive
/// substring containment, which keeps the classifier deterministic and total.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: Vec<CategoryRule>,
}

impl CategoryClassifier {
    /// Build a classifier from the configured keyword lists.
    pub fn from_config(config: &FreshnessConfig) -> Self {
        Self {
            rules: vec![
                CategoryRule {
                    category: QueryCategory::Weather,
                    keywords: lowercase_all(&config.weather_keywords),
                },
                CategoryRule {
                    category: QueryCategory::Traffic,
                    keywords: lowercase_all(&config.traffic_keywords),
                },
                CategoryRule {
                    category: QueryCategory::Stock,
                    keywords: lowercase_all(&config.stock_keywords),
                },
                CategoryRule {
                    category: QueryCategory::News,
                    keywords: lowercase_all(&config.news_keywords),
                },
            ],
        }
    }

    /// Classify a query. First rule with a keyword hit wins; no hit means
    /// [`QueryCategory::General`].
    pub fn classify(&self, query: &str) -> QueryCategory {
        let lower = query.to_lowercase();
        for rule in &self.rules {
            if rule.keywords.iter().any(|k| lower.contains(k.as_str())) {
                return rule.category;
            }
        }
        QueryCategory::General
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::from_config(&FreshnessConfig::default())
    }
}

fn lowercase_all(keywords: &[String]) -> Vec<String> {
    keywords.iter().map(|k| k.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_queries_classify_as_weather() {
        let c = CategoryClassifier::default();
        assert_eq!(c.classify("weather in Paris"), QueryCategory::Weather);
        assert_eq!(
            c.classify("what's the temperature today"),
            QueryCategory::Weather
        );
        assert_eq!(c.classify("will it RAIN tomorrow?"), QueryCategory::Weather);
    }

    #[test]
    fn traffic_queries_classify_as_traffic() {
        let c = CategoryClassifier::default();
        assert_eq!(c.classify("how is traffic on I-95"), QueryCategory::Traffic);
        assert_eq!(c.classify("my commute this morning"), QueryCategory::Traffic);
    }

    #[test]
    fn stock_queries_classify_as_stock() {
        let c = CategoryClassifier::default();
        assert_eq!(c.classify("MSFT stock price"), QueryCategory::Stock);
        assert_eq!(c.classify("how did the nasdaq close"), QueryCategory::Stock);
    }

    #[test]
    fn news_queries_classify_as_news() {
        let c = CategoryClassifier::default();
        assert_eq!(c.classify("any news about the election"), QueryCategory::News);
        assert_eq!(
            c.classify("what's happening in tech"),
            QueryCategory::News
        );
    }

    #[test]
    fn unmatched_queries_default_to_general() {
        let c = CategoryClassifier::default();
        assert_eq!(
            c.classify("tell me about machine learning"),
            QueryCategory::General
        );
        assert_eq!(c.classify(""), QueryCategory::General);
    }

    #[test]
    fn first_match_wins_across_categories() {
        // "weather" outranks "news" because weather rules are checked first.
        let c = CategoryClassifier::default();
        assert_eq!(
            c.classify("news about the weather forecast"),
            QueryCategory::Weather
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let c = CategoryClassifier::default();
        let query = "stock market headlines";
        let first = c.classify(query);
        for _ in 0..10 {
            assert_eq!(c.classify(query), first);
        }
    }

    #[test]
    fn custom_keywords_from_config() {
        let mut config = FreshnessConfig::default();
        config.weather_keywords = vec!["cyclone".to_string()];
        let c = CategoryClassifier::from_config(&config);
        assert_eq!(c.classify("cyclone warning"), QueryCategory::Weather);
        // Default keyword no longer present.
        assert_eq!(c.classify("forecast for tomorrow"), QueryCategory::General);
    }

    #[test]
    fn category_display() {
        assert_eq!(QueryCategory::Weather.to_string(), "weather");
        assert_eq!(QueryCategory::General.to_string(), "general");
    }
}
