// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-query analysis that runs before any retrieval or provider call.
//!
//! Classifies the query, derives its temporal requirement and topic, detects
//! personal-fact questions that never need a web refresh, rewrites possessive
//! workplace references into the stored workplace, and collects already-shared
//! facts so update queries don't repeat them.

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use remora_core::RemoraError;
use remora_freshness::{CategoryClassifier, FreshnessPolicy, QueryCategory, TemporalRequirement};
use remora_memory::{extract_topic, ConversationTracker, MemoryStore};

/// Everything the chat pipeline needs to know about one query.
#[derive(Debug, Clone)]
pub struct QueryAnalysis {
    pub category: QueryCategory,
    pub temporal: TemporalRequirement,
    /// Topic label the turn files under.
    pub topic: String,
    /// Set when the query asks about a stored personal fact. Such queries
    /// are answered from the profile; no web refresh decision is made.
    pub personal_attribute: Option<String>,
    /// The query with possessive workplace references resolved, or the
    /// original text unchanged.
    pub search_query: String,
    /// Facts already shared on this topic that are still within the
    /// category's freshness window. Update queries must not repeat them.
    pub exclusions: Vec<String>,
    /// Shared facts older than the freshness window. Eligible for
    /// re-sharing if they resurface.
    pub stale_shared: Vec<String>,
}

/// Question-ish openers that turn a personal phrase into a personal query.
const QUESTION_OPENERS: &[&str] = &["what", "where", "who", "when", "how", "do you", "can you", "tell me"];

const PERSONAL_PATTERNS: &[(&str, &[&str])] = &[
    ("name", &["my name", "who am i"]),
    ("workplace", &["where do i work", "my job", "my workplace", "my employer", "my company name"]),
    ("location", &["where do i live", "where am i from", "my location"]),
    ("favorite_color", &["my favorite color", "my favourite colour"]),
];

pub struct QueryAnalyzer {
    classifier: CategoryClassifier,
    policy: FreshnessPolicy,
    workplace_re: Regex,
}

impl QueryAnalyzer {
    pub fn new(classifier: CategoryClassifier, policy: FreshnessPolicy) -> Self {
        Self {
            classifier,
            policy,
            workplace_re: Regex::new(r"(?i)\b(our office|my company|my workplace|my office)\b")
                .expect("static pattern"),
        }
    }

    pub async fn analyze(
        &self,
        store: &MemoryStore,
        tracker: &ConversationTracker,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<QueryAnalysis, RemoraError> {
        let category = self.classifier.classify(query);
        let mut topic = extract_topic(query, category);
        let mut has_prior = tracker.has_discussed(&topic).await?;

        // A follow-up like "anything new since we talked?" carries no topic
        // of its own; it refers to the most recently discussed one.
        if !has_prior
            && TemporalRequirement::is_update_phrase(query)
            && let Some(last) = tracker.latest_topic().await?
        {
            topic = last;
            has_prior = true;
        }

        let temporal = TemporalRequirement::from_query(query, has_prior);

        let personal_attribute = personal_attribute_of(query);
        let search_query = self.enhance_query(store, query).await?;

        let max_age = self.policy.max_age(category);
        let mut exclusions = Vec::new();
        let mut stale_shared = Vec::new();
        for shared in tracker.shared_facts(&topic).await? {
            let age = shared
                .created_at
                .parse::<DateTime<Utc>>()
                .ok()
                .map(|created| (now - created).max(chrono::Duration::zero()));
            match age {
                Some(age) if age <= max_age => exclusions.push(shared.fact),
                // Unparseable timestamps age out rather than recirculate.
                _ => stale_shared.push(shared.fact),
            }
        }

        debug!(
            %category,
            ?temporal,
            topic,
            personal = personal_attribute.is_some(),
            exclusions = exclusions.len(),
            "query analyzed"
        );

        Ok(QueryAnalysis {
            category,
            temporal,
            topic,
            personal_attribute,
            search_query,
            exclusions,
            stale_shared,
        })
    }

    /// Replace possessive workplace references with the stored workplace so
    /// "traffic near our office" searches for the actual place.
    async fn enhance_query(
        &self,
        store: &MemoryStore,
        query: &str,
    ) -> Result<String, RemoraError> {
        if !self.workplace_re.is_match(query) {
            return Ok(query.to_string());
        }
        let Some(fact) = store.fact_for_attribute("workplace").await? else {
            return Ok(query.to_string());
        };
        let Some(workplace) = fact.content.strip_prefix("User works at ") else {
            return Ok(query.to_string());
        };
        let enhanced = self
            .workplace_re
            .replace_all(query, workplace)
            .into_owned();
        debug!(enhanced, "workplace reference resolved");
        Ok(enhanced)
    }
}

/// The attribute a personal-fact question asks about, if it is one.
fn personal_attribute_of(query: &str) -> Option<String> {
    let lower = query.to_lowercase();
    let is_question = lower.contains('?')
        || QUESTION_OPENERS
            .iter()
            .any(|opener| lower.trim_start().starts_with(opener));
    if !is_question {
        return None;
    }
    for (attribute, phrases) in PERSONAL_PATTERNS {
        if phrases.iter().any(|phrase| lower.contains(phrase)) {
            return Some((*attribute).to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use remora_memory::FactExtractor;

    fn analyzer() -> QueryAnalyzer {
        QueryAnalyzer::new(CategoryClassifier::default(), FreshnessPolicy::default())
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    async fn fixtures() -> (MemoryStore, ConversationTracker) {
        let store = MemoryStore::open_in_memory().await.unwrap();
        let tracker = ConversationTracker::new(&store, 0.85);
        (store, tracker)
    }

    #[test]
    fn personal_name_question_detected() {
        assert_eq!(personal_attribute_of("what's my name?"), Some("name".to_string()));
        assert_eq!(personal_attribute_of("do you know my name?"), Some("name".to_string()));
        assert_eq!(personal_attribute_of("hello there"), None);
    }

    #[test]
    fn statement_is_not_a_personal_query() {
        assert_eq!(personal_attribute_of("my name is Alice"), None);
    }

    #[tokio::test]
    async fn analyze_classifies_and_files_topic() {
        let (store, tracker) = fixtures().await;
        let analysis = analyzer()
            .analyze(&store, &tracker, "what's the weather in Paris?", fixed_now())
            .await
            .unwrap();
        assert_eq!(analysis.category, QueryCategory::Weather);
        assert_eq!(analysis.topic, "weather_paris");
        assert!(analysis.personal_attribute.is_none());
    }

    #[tokio::test]
    async fn update_requires_prior_discussion() {
        let (store, tracker) = fixtures().await;

        let first = analyzer()
            .analyze(&store, &tracker, "anything new since we talked?", fixed_now())
            .await
            .unwrap();
        assert_ne!(first.temporal, TemporalRequirement::UpdateSinceLast);

        tracker
            .add_turn(&first.topic, "anything new since we talked?", "r", None)
            .await
            .unwrap();
        let second = analyzer()
            .analyze(&store, &tracker, "anything new since we talked?", fixed_now())
            .await
            .unwrap();
        assert_eq!(second.temporal, TemporalRequirement::UpdateSinceLast);
    }

    #[tokio::test]
    async fn workplace_reference_resolved() {
        let (store, tracker) = fixtures().await;
        FactExtractor::default()
            .remember(&store, None, "I work at Initech")
            .await
            .unwrap();

        let analysis = analyzer()
            .analyze(&store, &tracker, "traffic near our office", fixed_now())
            .await
            .unwrap();
        assert_eq!(analysis.search_query, "traffic near Initech");
    }

    #[tokio::test]
    async fn workplace_reference_without_fact_left_alone() {
        let (store, tracker) = fixtures().await;
        let analysis = analyzer()
            .analyze(&store, &tracker, "traffic near our office", fixed_now())
            .await
            .unwrap();
        assert_eq!(analysis.search_query, "traffic near our office");
    }

    #[tokio::test]
    async fn shared_facts_split_fresh_from_stale() {
        let (store, tracker) = fixtures().await;
        tracker
            .add_shared_fact("news", "Fresh headline about the merger")
            .await
            .unwrap();

        let analysis = analyzer()
            .analyze(&store, &tracker, "any news today?", Utc::now())
            .await
            .unwrap();
        // Just shared, well inside the 6h news window.
        assert_eq!(analysis.exclusions.len(), 1);
        assert!(analysis.stale_shared.is_empty());

        // Two days later the same fact has aged out.
        let later = Utc::now() + chrono::Duration::hours(48);
        let aged = analyzer()
            .analyze(&store, &tracker, "any news today?", later)
            .await
            .unwrap();
        assert!(aged.exclusions.is_empty());
        assert_eq!(aged.stale_shared.len(), 1);
    }
}
