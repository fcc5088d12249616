// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single record in the memory store.
///
/// One table holds everything the bot remembers: conversation snippets,
/// personal facts about the user, and cached web content. `kind`
/// discriminates; the optional columns apply per kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// What this record is.
    pub kind: MemoryKind,
    /// The textual content.
    pub content: String,
    /// For personal facts: the attribute this fact fills ("name", "workplace").
    pub attribute: Option<String>,
    /// For web content: the normalized query key it was fetched for.
    pub cache_key: Option<String>,
    /// For web content: where it came from.
    pub source_url: Option<String>,
    /// Confidence score (0.0-1.0). Explicit statements score higher than
    /// pattern-extracted ones.
    pub confidence: f64,
    /// Lifecycle status.
    pub status: MemoryStatus,
    /// If superseded, the ID of the newer record.
    pub superseded_by: Option<String>,
    /// Session where this record was created.
    pub session_id: Option<String>,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// ISO 8601 last-update timestamp.
    pub updated_at: String,
}

impl MemoryRecord {
    /// Parsed creation time, or `None` for malformed timestamps.
    ///
    /// Malformed rows are treated as absent by callers doing age math, never
    /// propagated as errors.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.parse::<DateTime<Utc>>().ok()
    }
}

/// What a memory record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// A message the user sent.
    UserMessage,
    /// A message the assistant sent.
    AssistantMessage,
    /// A fact about the user ("name is Alice").
    PersonalFact,
    /// Cached web content keyed by normalized query.
    WebContent,
}

impl MemoryKind {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::UserMessage => "user_message",
            MemoryKind::AssistantMessage => "assistant_message",
            MemoryKind::PersonalFact => "personal_fact",
            MemoryKind::WebContent => "web_content",
        }
    }

    /// Parse from SQLite string.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "user_message" => MemoryKind::UserMessage,
            "assistant_message" => MemoryKind::AssistantMessage,
            "personal_fact" => MemoryKind::PersonalFact,
            _ => MemoryKind::WebContent,
        }
    }
}

/// Lifecycle status of a memory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStatus {
    /// Active and available for retrieval.
    Active,
    /// Replaced by a newer record.
    Superseded,
    /// User asked to forget this.
    Forgotten,
}

impl MemoryStatus {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryStatus::Active => "active",
            MemoryStatus::Superseded => "superseded",
            MemoryStatus::Forgotten => "forgotten",
        }
    }

    /// Parse from SQLite string.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "superseded" => MemoryStatus::Superseded,
            "forgotten" => MemoryStatus::Forgotten,
            _ => MemoryStatus::Active,
        }
    }
}

/// A memory record with its retrieval score.
#[derive(Debug, Clone)]
pub struct ScoredMemory {
    pub record: MemoryRecord,
    /// BM25 relevance boosted by confidence and recency.
    pub score: f64,
}

/// A personal fact pulled from user text by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFact {
    /// Attribute the fact fills ("name", "workplace", "location", ...).
    pub attribute: String,
    /// The extracted value ("Alice", "Acme Corp").
    pub value: String,
    /// The fact as a standalone statement for storage and retrieval.
    pub content: String,
    /// Extraction confidence.
    pub confidence: f64,
}

/// One turn in a topic-scoped conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: String,
    /// Topic label the turn was filed under.
    pub topic: String,
    pub query: String,
    pub response: String,
    pub session_id: Option<String>,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// A fact already shared with the user on some topic.
///
/// Used to avoid repeating the same information in update queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedFact {
    pub id: String,
    pub topic: String,
    pub fact: String,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// Current ISO 8601 timestamp in the store's canonical format.
pub fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trip() {
        for kind in [
            MemoryKind::UserMessage,
            MemoryKind::AssistantMessage,
            MemoryKind::PersonalFact,
            MemoryKind::WebContent,
        ] {
            assert_eq!(MemoryKind::from_str_value(kind.as_str()), kind);
        }
    }

    #[test]
    fn status_round_trip() {
        for status in [
            MemoryStatus::Active,
            MemoryStatus::Superseded,
            MemoryStatus::Forgotten,
        ] {
            assert_eq!(MemoryStatus::from_str_value(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_defaults_to_active() {
        assert_eq!(MemoryStatus::from_str_value("garbage"), MemoryStatus::Active);
    }

    #[test]
    fn now_iso_parses_back() {
        let ts = now_iso();
        assert!(ts.parse::<DateTime<Utc>>().is_ok());
    }

    #[test]
    fn malformed_timestamp_reads_as_none() {
        let record = MemoryRecord {
            id: "r1".into(),
            kind: MemoryKind::WebContent,
            content: "cached".into(),
            attribute: None,
            cache_key: Some("weather in paris".into()),
            source_url: None,
            confidence: 0.5,
            status: MemoryStatus::Active,
            superseded_by: None,
            session_id: None,
            created_at: "not-a-timestamp".into(),
            updated_at: "not-a-timestamp".into(),
        };
        assert!(record.created_at_utc().is_none());
    }
}
