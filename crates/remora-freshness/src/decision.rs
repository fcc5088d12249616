// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The refresh decision.
//!
//! A pure, synchronous computation: query text plus any cached item plus the
//! current time in, verdict plus a human-readable reason out. All I/O lives
//! behind the [`CacheStore`] seam; the decision itself never suspends and
//! never fails.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use remora_core::RemoraError;

use crate::category::{CategoryClassifier, QueryCategory};
use crate::policy::{FreshnessPolicy, TemporalRequirement};

/// A previously fetched piece of web content.
///
/// Items are immutable after creation. A re-fetch stores a new item that
/// supersedes the old one rather than mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedItem {
    /// Normalized lookup key (lowercased, whitespace-collapsed query).
    pub key: String,
    /// The fetched content payload.
    pub content: String,
    /// Where the content came from, when known.
    pub source_url: Option<String>,
    /// When the content was captured.
    pub captured_at: DateTime<Utc>,
}

impl CachedItem {
    /// Age of this item at `now`. Clamped to zero for clock skew.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.captured_at).max(Duration::zero())
    }
}

/// Normalize a query into a cache key.
pub fn normalize_key(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// The outcome of a freshness check. Transient, produced per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// True when the content should be re-fetched.
    pub needs_refresh: bool,
    /// Category the query classified into.
    pub category: QueryCategory,
    /// Age of the existing item, if one exists.
    #[serde(with = "age_seconds")]
    pub age: Option<Duration>,
    /// The threshold the age was compared against.
    #[serde(with = "duration_seconds")]
    pub max_age: Duration,
    /// Human-readable justification naming category, age, and threshold.
    pub reason: String,
}

/// Async seam to whatever stores cached web content.
///
/// Malformed rows are the store's concern: it must surface them as `None`
/// rather than hand a bad timestamp to the decision logic.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Newest active item for a normalized key, if any.
    async fn get(&self, key: &str) -> Result<Option<CachedItem>, RemoraError>;

    /// Store a new item, superseding prior items for the same key.
    async fn put(&self, item: CachedItem) -> Result<(), RemoraError>;

    /// All active items matching the key that are younger than `max_age`.
    /// Used for refresh suppression.
    async fn fresh_items(
        &self,
        key: &str,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<CachedItem>, RemoraError>;
}

/// Words that signal the user wants results beyond what is already cached.
const MORE_RESULTS_WORDS: &[&str] = &["more", "other", "else", "additional"];

/// Classifier plus policy, bundled as the freshness decision engine.
#[derive(Debug, Clone, Default)]
pub struct FreshnessEngine {
    classifier: CategoryClassifier,
    policy: FreshnessPolicy,
}

impl FreshnessEngine {
    pub fn new(classifier: CategoryClassifier, policy: FreshnessPolicy) -> Self {
        Self { classifier, policy }
    }

    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }

    pub fn policy(&self) -> &FreshnessPolicy {
        &self.policy
    }

    /// Decide whether content for `query` needs a re-fetch.
    ///
    /// No item means refresh. Otherwise the verdict is exactly
    /// `age > max_age` for the query's category.
    pub fn decide(
        &self,
        query: &str,
        item: Option<&CachedItem>,
        now: DateTime<Utc>,
    ) -> Decision {
        self.decide_with_temporal(query, item, now, TemporalRequirement::None)
    }

    /// Decide with a temporal requirement tightening the threshold.
    pub fn decide_with_temporal(
        &self,
        query: &str,
        item: Option<&CachedItem>,
        now: DateTime<Utc>,
        temporal: TemporalRequirement,
    ) -> Decision {
        let category = self.classifier.classify(query);
        let max_age = self.policy.effective_max_age(category, temporal);

        let Some(item) = item else {
            return Decision {
                needs_refresh: true,
                category,
                age: None,
                max_age,
                reason: format!("no existing content for {category} query"),
            };
        };

        let age = item.age(now);
        let needs_refresh = age > max_age;
        let reason = if needs_refresh {
            format!(
                "{category} content is {} old, exceeds {} limit",
                format_age(age),
                format_age(max_age)
            )
        } else {
            format!(
                "{category} content is {} old, within {} limit",
                format_age(age),
                format_age(max_age)
            )
        };

        Decision {
            needs_refresh,
            category,
            age: Some(age),
            max_age,
            reason,
        }
    }

    /// Decide, then suppress the refresh when fresh items already cover the
    /// query.
    ///
    /// Suppression applies unless the requirement is Immediate or the query
    /// asks for more results ("more", "other", "else", "additional"). The
    /// reason records how many fresh items were found.
    pub fn decide_with_suppression(
        &self,
        query: &str,
        newest: Option<&CachedItem>,
        fresh_count: usize,
        now: DateTime<Utc>,
        temporal: TemporalRequirement,
    ) -> Decision {
        let mut decision = self.decide_with_temporal(query, newest, now, temporal);

        if decision.needs_refresh
            && fresh_count > 0
            && temporal != TemporalRequirement::Immediate
            && !wants_more_results(query)
        {
            decision.needs_refresh = false;
            decision.reason = format!(
                "{} fresh cached item(s) already cover this query; {}",
                fresh_count, decision.reason
            );
        }

        decision
    }
}

fn wants_more_results(query: &str) -> bool {
    let lower = query.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| MORE_RESULTS_WORDS.contains(&word))
}

fn format_age(d: Duration) -> String {
    let minutes = d.num_minutes();
    if minutes < 60 {
        format!("{minutes}m")
    } else if minutes % 60 == 0 {
        format!("{}h", minutes / 60)
    } else {
        format!("{}h{}m", minutes / 60, minutes % 60)
    }
}

mod age_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        v.map(|d| d.num_seconds()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<i64>::deserialize(d)?.map(Duration::seconds))
    }
}

mod duration_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Duration, s: S) -> Result<S::Ok, S::Error> {
        v.num_seconds().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::seconds(i64::deserialize(d)?))
    }
}
