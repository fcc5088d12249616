// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Topic-scoped conversation tracking.
//!
//! Every turn is filed under a coarse topic label so later queries can ask
//! "have we talked about this, and when?". Shared facts record what the
//! bot already told the user per topic, so update queries can exclude them.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use strsim::jaro_winkler;
use tokio_rusqlite::Connection;
use tracing::debug;
use uuid::Uuid;

use remora_core::RemoraError;
use remora_freshness::QueryCategory;

use crate::store::{storage_err, MemoryStore};
use crate::types::{now_iso, ConversationTurn, SharedFact};

/// Stopwords skipped when a general query is condensed into a topic label.
const TOPIC_STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "what", "whats", "how", "who", "when", "where",
    "why", "me", "my", "i", "you", "about", "tell", "of", "for", "to", "in", "on", "at", "do",
    "does", "can", "could", "please",
];

/// Condense a query into a topic label for turn filing.
///
/// Category-driven queries get stable labels (all Paris weather queries file
/// under `weather_paris`); general queries condense to their first
/// significant words.
pub fn extract_topic(query: &str, category: QueryCategory) -> String {
    match category {
        QueryCategory::Weather => format!("weather_{}", location_of(query)),
        QueryCategory::Traffic => format!("traffic_{}", location_of(query)),
        QueryCategory::Stock => "stock_price".to_string(),
        QueryCategory::News => "news".to_string(),
        QueryCategory::General => {
            let words: Vec<String> = query
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty() && !TOPIC_STOPWORDS.contains(w))
                .take(3)
                .map(|w| w.to_string())
                .collect();
            if words.is_empty() {
                "general".to_string()
            } else {
                words.join("_")
            }
        }
    }
}

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:in|for|around|near) ([a-zA-Z][a-zA-Z ]*)").expect("static pattern")
});

fn location_of(query: &str) -> String {
    // "weather in New York?" -> "new_york"
    match LOCATION_RE.captures(query) {
        Some(caps) => caps[1]
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_"),
        None => "general".to_string(),
    }
}

/// Turn and shared-fact log over the shared database.
#[derive(Clone)]
pub struct ConversationTracker {
    conn: Connection,
    dedup_threshold: f64,
}

impl ConversationTracker {
    pub fn new(store: &MemoryStore, dedup_threshold: f64) -> Self {
        Self {
            conn: store.connection(),
            dedup_threshold,
        }
    }

    /// Record one completed turn under its topic.
    pub async fn add_turn(
        &self,
        topic: &str,
        query: &str,
        response: &str,
        session_id: Option<&str>,
    ) -> Result<(), RemoraError> {
        let turn = ConversationTurn {
            id: Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            query: query.to_string(),
            response: response.to_string(),
            session_id: session_id.map(|s| s.to_string()),
            created_at: now_iso(),
        };
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO turns (id, topic, query, response, session_id, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![
                        turn.id,
                        turn.topic,
                        turn.query,
                        turn.response,
                        turn.session_id,
                        turn.created_at
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// When the topic was last discussed, if ever.
    pub async fn last_discussion_time(
        &self,
        topic: &str,
    ) -> Result<Option<DateTime<Utc>>, RemoraError> {
        let topic = topic.to_string();
        let latest: Option<String> = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT created_at FROM turns WHERE topic = ?1 ORDER BY created_at DESC LIMIT 1",
                )?;
                let value = match stmt.query_row(rusqlite::params![topic], |row| row.get(0)) {
                    Ok(v) => Some(v),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                };
                Ok(value)
            })
            .await
            .map_err(storage_err)?;

        // Malformed timestamps count as never discussed.
        Ok(latest.and_then(|ts| ts.parse::<DateTime<Utc>>().ok()))
    }

    /// Whether any turn exists for the topic.
    pub async fn has_discussed(&self, topic: &str) -> Result<bool, RemoraError> {
        Ok(self.last_discussion_time(topic).await?.is_some())
    }

    /// Recent turns for a topic, newest first.
    pub async fn turns_for_topic(
        &self,
        topic: &str,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, RemoraError> {
        let topic = topic.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, topic, query, response, session_id, created_at FROM turns \
                     WHERE topic = ?1 ORDER BY created_at DESC LIMIT ?2",
                )?;
                let turns = stmt
                    .query_map(rusqlite::params![topic, limit as i64], |row| {
                        Ok(ConversationTurn {
                            id: row.get(0)?,
                            topic: row.get(1)?,
                            query: row.get(2)?,
                            response: row.get(3)?,
                            session_id: row.get(4)?,
                            created_at: row.get(5)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(turns)
            })
            .await
            .map_err(storage_err)
    }

    /// Topic of the most recent turn, if any. Follow-up queries with no
    /// topic of their own refer to it.
    pub async fn latest_topic(&self) -> Result<Option<String>, RemoraError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT topic FROM turns ORDER BY created_at DESC, rowid DESC LIMIT 1",
                )?;
                let topic = match stmt.query_row([], |row| row.get(0)) {
                    Ok(t) => Some(t),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                };
                Ok(topic)
            })
            .await
            .map_err(storage_err)
    }

    /// Every topic that has at least one turn.
    pub async fn all_topics(&self) -> Result<Vec<String>, RemoraError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT DISTINCT topic FROM turns ORDER BY topic",
                )?;
                let topics = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(topics)
            })
            .await
            .map_err(storage_err)
    }

    /// Record a fact the bot shared with the user on a topic.
    ///
    /// Near-duplicates of an already-shared fact are dropped. Returns
    /// whether the fact was stored.
    pub async fn add_shared_fact(&self, topic: &str, fact: &str) -> Result<bool, RemoraError> {
        let existing = self.shared_facts(topic).await?;
        let is_duplicate = existing.iter().any(|shared| {
            jaro_winkler(&shared.fact.to_lowercase(), &fact.to_lowercase())
                >= self.dedup_threshold
        });
        if is_duplicate {
            debug!(topic, "shared fact already known, skipping");
            return Ok(false);
        }

        let record = SharedFact {
            id: Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            fact: fact.to_string(),
            created_at: now_iso(),
        };
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO shared_facts (id, topic, fact, created_at) VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![record.id, record.topic, record.fact, record.created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)?;
        Ok(true)
    }

    /// Facts already shared on a topic, oldest first.
    pub async fn shared_facts(&self, topic: &str) -> Result<Vec<SharedFact>, RemoraError> {
        let topic = topic.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, topic, fact, created_at FROM shared_facts \
                     WHERE topic = ?1 ORDER BY created_at ASC",
                )?;
                let facts = stmt
                    .query_map(rusqlite::params![topic], |row| {
                        Ok(SharedFact {
                            id: row.get(0)?,
                            topic: row.get(1)?,
                            fact: row.get(2)?,
                            created_at: row.get(3)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(facts)
            })
            .await
            .map_err(storage_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> ConversationTracker {
        let store = MemoryStore::open_in_memory().await.unwrap();
        ConversationTracker::new(&store, 0.85)
    }

    #[test]
    fn weather_topic_includes_location() {
        assert_eq!(
            extract_topic("what's the weather in New York?", QueryCategory::Weather),
            "weather_new_york"
        );
        assert_eq!(
            extract_topic("weather?", QueryCategory::Weather),
            "weather_general"
        );
    }

    #[test]
    fn stock_and_news_topics_are_stable() {
        assert_eq!(
            extract_topic("how is AAPL doing on the market", QueryCategory::Stock),
            "stock_price"
        );
        assert_eq!(
            extract_topic("any breaking news?", QueryCategory::News),
            "news"
        );
    }

    #[test]
    fn general_topic_condenses_significant_words() {
        assert_eq!(
            extract_topic("tell me about machine learning", QueryCategory::General),
            "machine_learning"
        );
        assert_eq!(extract_topic("???", QueryCategory::General), "general");
    }

    #[tokio::test]
    async fn turns_and_last_discussion() {
        let tracker = setup().await;
        assert!(!tracker.has_discussed("weather_paris").await.unwrap());

        tracker
            .add_turn("weather_paris", "weather in paris?", "Sunny, 22C", Some("s1"))
            .await
            .unwrap();

        assert!(tracker.has_discussed("weather_paris").await.unwrap());
        assert!(tracker
            .last_discussion_time("weather_paris")
            .await
            .unwrap()
            .is_some());

        let turns = tracker.turns_for_topic("weather_paris", 10).await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].response, "Sunny, 22C");
    }

    #[tokio::test]
    async fn all_topics_distinct() {
        let tracker = setup().await;
        tracker.add_turn("news", "q1", "r1", None).await.unwrap();
        tracker.add_turn("news", "q2", "r2", None).await.unwrap();
        tracker
            .add_turn("weather_paris", "q3", "r3", None)
            .await
            .unwrap();

        let topics = tracker.all_topics().await.unwrap();
        assert_eq!(topics, vec!["news".to_string(), "weather_paris".to_string()]);
        assert_eq!(
            tracker.latest_topic().await.unwrap(),
            Some("weather_paris".to_string())
        );
    }

    #[tokio::test]
    async fn shared_facts_dedup_near_duplicates() {
        let tracker = setup().await;
        assert!(tracker
            .add_shared_fact("news", "The CEO of Acme resigned today")
            .await
            .unwrap());
        // Same fact with trivial variation is rejected.
        assert!(!tracker
            .add_shared_fact("news", "the CEO of Acme resigned today.")
            .await
            .unwrap());
        // A genuinely different fact is stored.
        assert!(tracker
            .add_shared_fact("news", "A major storm is expected this weekend")
            .await
            .unwrap());

        let facts = tracker.shared_facts("news").await.unwrap();
        assert_eq!(facts.len(), 2);
    }
}
