// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern-based extraction of personal facts from user messages.
//!
//! Each pattern names the attribute it fills and carries a confidence
//! reflecting how explicit the phrasing is ("my name is X" scores higher
//! than "i'm X"). New facts supersede older facts for the same attribute
//! unless the values are near-duplicates.

use regex::Regex;
use strsim::jaro_winkler;
use tracing::{debug, info};
use uuid::Uuid;

use remora_config::model::MemoryConfig;
use remora_core::RemoraError;

use crate::store::MemoryStore;
use crate::types::{now_iso, ExtractedFact, MemoryKind, MemoryRecord, MemoryStatus};

/// Words that follow "i'm" without naming the speaker.
const NOT_NAMES: &[&str] = &[
    "sure", "sorry", "not", "so", "just", "really", "going", "looking", "trying", "hungry",
    "tired", "fine", "good", "okay", "here", "glad", "afraid", "happy", "sad", "busy", "done",
    "back", "still", "also", "very", "a", "an", "the", "in", "on", "at",
];

struct FactPattern {
    attribute: &'static str,
    regex: Regex,
    confidence: f64,
    /// Template with `{}` replaced by the captured value.
    template: &'static str,
}

/// Regex-driven fact extractor with similarity-based dedup.
pub struct FactExtractor {
    patterns: Vec<FactPattern>,
    dedup_threshold: f64,
}

impl FactExtractor {
    pub fn new(config: &MemoryConfig) -> Self {
        let patterns = vec![
            FactPattern {
                attribute: "name",
                regex: Regex::new(r"(?i)\bmy name is (\w+)").expect("static pattern"),
                confidence: 0.95,
                template: "User's name is {}",
            },
            FactPattern {
                attribute: "name",
                regex: Regex::new(r"(?i)\bcall me (\w+)").expect("static pattern"),
                confidence: 0.9,
                template: "User's name is {}",
            },
            FactPattern {
                attribute: "name",
                regex: Regex::new(r"(?i)\bi'?m (\w+)").expect("static pattern"),
                confidence: 0.6,
                template: "User's name is {}",
            },
            FactPattern {
                attribute: "workplace",
                regex: Regex::new(r"(?i)\bi work (?:at|for) ([\w][\w .&'-]*)")
                    .expect("static pattern"),
                confidence: 0.9,
                template: "User works at {}",
            },
            FactPattern {
                attribute: "location",
                regex: Regex::new(r"(?i)\bi live in ([\w][\w .,'-]*)").expect("static pattern"),
                confidence: 0.9,
                template: "User lives in {}",
            },
            FactPattern {
                attribute: "location",
                regex: Regex::new(r"(?i)\bi'?m from ([\w][\w .,'-]*)").expect("static pattern"),
                confidence: 0.7,
                template: "User is from {}",
            },
            FactPattern {
                attribute: "favorite_color",
                regex: Regex::new(r"(?i)\bmy favou?rite colou?r is (\w+)")
                    .expect("static pattern"),
                confidence: 0.9,
                template: "User's favorite color is {}",
            },
        ];
        Self {
            patterns,
            dedup_threshold: config.dedup_threshold,
        }
    }

    /// Pull personal facts out of one user message.
    ///
    /// The highest-confidence match wins per attribute, so "my name is
    /// Alice" is never shadowed by a looser "i'm ..." match in the same
    /// message.
    pub fn extract(&self, text: &str) -> Vec<ExtractedFact> {
        let mut facts: Vec<ExtractedFact> = Vec::new();
        for pattern in &self.patterns {
            let Some(caps) = pattern.regex.captures(text) else {
                continue;
            };
            let value = caps[1].trim().trim_end_matches(['.', ',', '!', '?']).to_string();
            if value.is_empty() {
                continue;
            }
            if pattern.attribute == "name" && NOT_NAMES.contains(&value.to_lowercase().as_str()) {
                continue;
            }
            if facts.iter().any(|f| f.attribute == pattern.attribute) {
                continue;
            }
            facts.push(ExtractedFact {
                attribute: pattern.attribute.to_string(),
                content: pattern.template.replace("{}", &value),
                value,
                confidence: pattern.confidence,
            });
        }
        facts
    }

    /// Extract facts from `text` and persist the new ones.
    ///
    /// A fact whose value is a near-duplicate of the stored fact for the
    /// same attribute is dropped. A genuinely different value supersedes
    /// the stored fact. Returns the facts that were stored.
    pub async fn remember(
        &self,
        store: &MemoryStore,
        session_id: Option<&str>,
        text: &str,
    ) -> Result<Vec<ExtractedFact>, RemoraError> {
        let mut stored = Vec::new();
        for fact in self.extract(text) {
            let existing = store.fact_for_attribute(&fact.attribute).await?;

            if let Some(existing) = &existing {
                // Compare raw values. The templated contents share a long
                // prefix ("User works at ..."), which would inflate the
                // similarity of genuinely different short values.
                let existing_value = self
                    .value_of(&fact.attribute, &existing.content)
                    .unwrap_or_else(|| existing.content.clone());
                let similarity =
                    jaro_winkler(&existing_value.to_lowercase(), &fact.value.to_lowercase());
                if similarity >= self.dedup_threshold {
                    debug!(
                        attribute = %fact.attribute,
                        similarity,
                        "skipping near-duplicate fact"
                    );
                    continue;
                }
            }

            let now = now_iso();
            let record = MemoryRecord {
                id: Uuid::new_v4().to_string(),
                kind: MemoryKind::PersonalFact,
                content: fact.content.clone(),
                attribute: Some(fact.attribute.clone()),
                cache_key: None,
                source_url: None,
                confidence: fact.confidence,
                status: MemoryStatus::Active,
                superseded_by: None,
                session_id: session_id.map(|s| s.to_string()),
                created_at: now.clone(),
                updated_at: now,
            };
            store.save(&record).await?;

            if let Some(existing) = existing {
                store.supersede(&existing.id, &record.id).await?;
                info!(attribute = %fact.attribute, "fact updated, prior superseded");
            } else {
                info!(attribute = %fact.attribute, "new fact stored");
            }
            stored.push(fact);
        }
        Ok(stored)
    }

    /// Recover the raw value from a stored fact's templated content.
    ///
    /// Every template ends in `{}`, so stripping the fixed prefix leaves the
    /// value. Returns `None` when no template for the attribute matches.
    fn value_of(&self, attribute: &str, content: &str) -> Option<String> {
        self.patterns
            .iter()
            .filter(|p| p.attribute == attribute)
            .find_map(|p| {
                let prefix = p.template.trim_end_matches("{}");
                content.strip_prefix(prefix).map(|v| v.to_string())
            })
    }
}

impl Default for FactExtractor {
    fn default() -> Self {
        Self::new(&MemoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_explicit_name() {
        let facts = FactExtractor::default().extract("Hi, my name is Alice!");
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].attribute, "name");
        assert_eq!(facts[0].value, "Alice");
        assert_eq!(facts[0].content, "User's name is Alice");
        assert!(facts[0].confidence > 0.9);
    }

    #[test]
    fn explicit_name_beats_loose_pattern() {
        let facts = FactExtractor::default().extract("I'm Bob and my name is Robert");
        // "my name is" is tried first and wins the attribute.
        let name = facts.iter().find(|f| f.attribute == "name").unwrap();
        assert_eq!(name.value, "Robert");
    }

    #[test]
    fn im_followed_by_adjective_is_not_a_name() {
        let facts = FactExtractor::default().extract("I'm sorry about that");
        assert!(facts.is_empty());
    }

    #[test]
    fn extracts_workplace_multi_word() {
        let facts = FactExtractor::default().extract("I work at Acme Corp these days");
        assert_eq!(facts[0].attribute, "workplace");
        assert!(facts[0].value.starts_with("Acme Corp"));
    }

    #[test]
    fn extracts_location() {
        let facts = FactExtractor::default().extract("i live in San Francisco");
        assert_eq!(facts[0].attribute, "location");
        assert_eq!(facts[0].value, "San Francisco");
    }

    #[test]
    fn extracts_multiple_attributes() {
        let facts = FactExtractor::default()
            .extract("My name is Alice and I work at Globex and I live in Berlin");
        let attrs: Vec<&str> = facts.iter().map(|f| f.attribute.as_str()).collect();
        assert!(attrs.contains(&"name"));
        assert!(attrs.contains(&"workplace"));
        assert!(attrs.contains(&"location"));
    }

    #[test]
    fn no_facts_in_plain_text() {
        let facts = FactExtractor::default().extract("what's the weather in Paris?");
        assert!(facts.is_empty());
    }

    #[test]
    fn value_of_strips_template_prefix() {
        let extractor = FactExtractor::default();
        assert_eq!(
            extractor.value_of("workplace", "User works at Acme").as_deref(),
            Some("Acme")
        );
        assert_eq!(
            extractor.value_of("location", "User is from Ohio").as_deref(),
            Some("Ohio")
        );
        assert!(extractor.value_of("workplace", "unrelated text").is_none());
    }

    #[tokio::test]
    async fn near_duplicate_value_is_skipped() {
        let store = MemoryStore::open_in_memory().await.unwrap();
        let extractor = FactExtractor::default();

        extractor
            .remember(&store, Some("s1"), "I work at Acme Corp")
            .await
            .unwrap();
        // "Acme Corporation" is the same employer with a spelled-out suffix.
        let dup = extractor
            .remember(&store, Some("s1"), "I work at Acme Corporation")
            .await
            .unwrap();
        assert!(dup.is_empty());
        assert_eq!(store.user_profile().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remember_stores_and_supersedes() {
        let store = MemoryStore::open_in_memory().await.unwrap();
        let extractor = FactExtractor::default();

        let stored = extractor
            .remember(&store, Some("s1"), "I work at Acme")
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);

        // Same value again is a near-duplicate.
        let dup = extractor
            .remember(&store, Some("s1"), "I work at Acme")
            .await
            .unwrap();
        assert!(dup.is_empty());

        // A different workplace supersedes the old fact.
        let updated = extractor
            .remember(&store, Some("s1"), "I work at Initech now")
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);

        let current = store.fact_for_attribute("workplace").await.unwrap().unwrap();
        assert!(current.content.contains("Initech"));

        let profile = store.user_profile().await.unwrap();
        assert_eq!(profile.len(), 1);
    }
}
