// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword retrieval over the memory store.
//!
//! Candidates come from FTS5 BM25 ranking; the final score folds in the
//! record's confidence and an exponential recency decay so a confident
//! recent memory outranks a vague old one with the same keyword overlap.

use chrono::{DateTime, Utc};
use tracing::debug;

use remora_config::model::MemoryConfig;
use remora_core::RemoraError;

use crate::store::MemoryStore;
use crate::types::{MemoryRecord, ScoredMemory};

/// BM25 retrieval with confidence and recency weighting.
pub struct KeywordRetriever {
    max_results: usize,
    half_life_hours: f64,
}

impl KeywordRetriever {
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            max_results: config.max_retrieval_results,
            half_life_hours: config.recency_half_life_hours,
        }
    }

    /// Top memories for a query, best first.
    pub async fn retrieve(
        &self,
        store: &MemoryStore,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredMemory>, RemoraError> {
        // Overfetch so reweighting has candidates to promote.
        let candidates = store.search_bm25(query, self.max_results * 4).await?;
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = candidates.iter().map(|(id, _)| id.clone()).collect();
        let records = store.get_by_ids(&ids).await?;

        let mut scored: Vec<ScoredMemory> = candidates
            .iter()
            .filter_map(|(id, bm25)| {
                let record = records.iter().find(|r| &r.id == id)?.clone();
                let score = self.score(&record, *bm25, now);
                Some(ScoredMemory { record, score })
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.max_results);

        debug!(query, results = scored.len(), "memory retrieval");
        Ok(scored)
    }

    /// BM25 relevance (negated, so higher is better) times confidence times
    /// a half-life decay on age. Malformed timestamps decay as if ancient.
    fn score(&self, record: &MemoryRecord, bm25: f64, now: DateTime<Utc>) -> f64 {
        let relevance = -bm25;
        let recency = match record.created_at_utc() {
            Some(created) => {
                let age_hours = (now - created).num_minutes().max(0) as f64 / 60.0;
                0.5_f64.powf(age_hours / self.half_life_hours)
            }
            None => 0.0,
        };
        relevance * record.confidence * (0.25 + 0.75 * recency)
    }
}

impl Default for KeywordRetriever {
    fn default() -> Self {
        Self::new(&MemoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MemoryKind, MemoryStatus};

    fn record(id: &str, content: &str, confidence: f64, created_at: &str) -> MemoryRecord {
        MemoryRecord {
            id: id.to_string(),
            kind: MemoryKind::PersonalFact,
            content: content.to_string(),
            attribute: None,
            cache_key: None,
            source_url: None,
            confidence,
            status: MemoryStatus::Active,
            superseded_by: None,
            session_id: None,
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn retrieves_relevant_memories() {
        let store = MemoryStore::open_in_memory().await.unwrap();
        store
            .save(&record("m1", "User has a dog named Rex", 0.9, "2026-08-01T10:00:00.000Z"))
            .await
            .unwrap();
        store
            .save(&record("m2", "User prefers tea over coffee", 0.9, "2026-08-01T10:00:00.000Z"))
            .await
            .unwrap();

        let now = "2026-08-01T12:00:00.000Z".parse().unwrap();
        let results = KeywordRetriever::default()
            .retrieve(&store, "tell me about the dog", now)
            .await
            .unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].record.id, "m1");
    }

    #[tokio::test]
    async fn no_match_returns_empty() {
        let store = MemoryStore::open_in_memory().await.unwrap();
        store
            .save(&record("m1", "User has a dog", 0.9, "2026-08-01T10:00:00.000Z"))
            .await
            .unwrap();

        let now = "2026-08-01T12:00:00.000Z".parse().unwrap();
        let results = KeywordRetriever::default()
            .retrieve(&store, "quantum chromodynamics", now)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn recent_memory_outranks_old_on_equal_match() {
        let store = MemoryStore::open_in_memory().await.unwrap();
        store
            .save(&record("old", "User visited Paris", 0.8, "2026-01-01T10:00:00.000Z"))
            .await
            .unwrap();
        store
            .save(&record("new", "User visited Paris", 0.8, "2026-08-01T10:00:00.000Z"))
            .await
            .unwrap();

        let now = "2026-08-01T12:00:00.000Z".parse().unwrap();
        let results = KeywordRetriever::default()
            .retrieve(&store, "Paris", now)
            .await
            .unwrap();
        assert_eq!(results[0].record.id, "new");
    }

    #[tokio::test]
    async fn result_count_capped() {
        let store = MemoryStore::open_in_memory().await.unwrap();
        for i in 0..10 {
            store
                .save(&record(
                    &format!("m{i}"),
                    "User mentioned the garden project",
                    0.8,
                    "2026-08-01T10:00:00.000Z",
                ))
                .await
                .unwrap();
        }

        let now = "2026-08-01T12:00:00.000Z".parse().unwrap();
        let results = KeywordRetriever::default()
            .retrieve(&store, "garden project", now)
            .await
            .unwrap();
        assert_eq!(results.len(), MemoryConfig::default().max_retrieval_results);
    }
}
