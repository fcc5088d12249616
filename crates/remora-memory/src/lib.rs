// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent memory for the Remora chatbot.
//!
//! One SQLite database holds everything the bot remembers:
//! - personal facts extracted from user messages, with supersede-on-update
//! - cached web content behind the freshness engine's cache seam
//! - sessions and messages behind the core storage seam
//! - a topic-scoped conversation log with shared-fact tracking
//!
//! Retrieval is FTS5 BM25 reweighted by confidence and recency.

pub mod extractor;
pub mod retriever;
pub mod sessions;
pub mod source;
pub mod store;
pub mod tracker;
pub mod types;
pub mod web_cache;

pub use extractor::FactExtractor;
pub use retriever::KeywordRetriever;
pub use sessions::SqliteStorage;
pub use source::MemoryContextSource;
pub use store::{MemoryStore, StoreStats};
pub use tracker::{extract_topic, ConversationTracker};
pub use types::{
    ConversationTurn, ExtractedFact, MemoryKind, MemoryRecord, MemoryStatus, ScoredMemory,
    SharedFact,
};
pub use web_cache::WebCache;
