// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conditional context source backed by the memory store.
//!
//! Per query, contributes up to three sections: the user's profile facts,
//! relevant prior conversation memories, and cached web content for the
//! query's cache key. Sections with nothing to say are omitted entirely.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use remora_config::model::{ContextConfig, MemoryConfig};
use remora_core::traits::Clock;
use remora_core::types::ProviderMessage;
use remora_core::RemoraError;
use remora_freshness::normalize_key;
use remora_context::ContextSource;

use crate::retriever::KeywordRetriever;
use crate::store::MemoryStore;
use crate::types::MemoryKind;

/// Formats memory into system-role context for the provider.
pub struct MemoryContextSource {
    store: MemoryStore,
    retriever: KeywordRetriever,
    clock: Arc<dyn Clock>,
    max_context_memories: usize,
    max_web_snippets: usize,
}

impl MemoryContextSource {
    pub fn new(
        store: MemoryStore,
        memory_config: &MemoryConfig,
        context_config: &ContextConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            retriever: KeywordRetriever::new(memory_config),
            clock,
            max_context_memories: context_config.max_context_memories,
            max_web_snippets: context_config.max_web_snippets,
        }
    }

    async fn user_facts_section(&self) -> Result<Option<String>, RemoraError> {
        let profile = self.store.user_profile().await?;
        if profile.is_empty() {
            return Ok(None);
        }
        let mut section = String::from("**User Facts:**\n");
        for fact in &profile {
            section.push_str(&format!("- {}\n", fact.content));
        }
        Ok(Some(section))
    }

    async fn memories_section(&self, query: &str) -> Result<Option<String>, RemoraError> {
        let now = self.clock.now();
        let scored = self.retriever.retrieve(&self.store, query, now).await?;
        let relevant: Vec<_> = scored
            .iter()
            // Profile facts and web content have their own sections.
            .filter(|m| {
                m.record.kind != MemoryKind::PersonalFact
                    && m.record.kind != MemoryKind::WebContent
            })
            .take(self.max_context_memories)
            .collect();
        if relevant.is_empty() {
            return Ok(None);
        }
        let mut section = String::from("**Previous Conversation Context:**\n");
        for memory in relevant {
            section.push_str(&format!("- {}\n", memory.record.content));
        }
        Ok(Some(section))
    }

    async fn web_section(&self, query: &str) -> Result<Option<String>, RemoraError> {
        let key = normalize_key(query);
        let items = self.store.web_content_items(&key).await?;
        if items.is_empty() {
            return Ok(None);
        }
        let mut section = String::from("**Current Web Information:**\n");
        for item in items.iter().take(self.max_web_snippets) {
            match &item.source_url {
                Some(url) => section.push_str(&format!("- {} (source: {url})\n", item.content)),
                None => section.push_str(&format!("- {}\n", item.content)),
            }
        }
        Ok(Some(section))
    }
}

#[async_trait]
impl ContextSource for MemoryContextSource {
    async fn provide_context(
        &self,
        _session_id: &str,
        query: &str,
    ) -> Result<Vec<ProviderMessage>, RemoraError> {
        let mut sections = Vec::new();
        if let Some(facts) = self.user_facts_section().await? {
            sections.push(facts);
        }
        if let Some(memories) = self.memories_section(query).await? {
            sections.push(memories);
        }
        if let Some(web) = self.web_section(query).await? {
            sections.push(web);
        }

        if sections.is_empty() {
            return Ok(vec![]);
        }

        debug!(sections = sections.len(), "memory context assembled");
        Ok(vec![ProviderMessage {
            role: "system".to_string(),
            content: sections.join("\n"),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remora_core::traits::SystemClock;

    use crate::types::{now_iso, MemoryRecord, MemoryStatus};

    fn record(id: &str, kind: MemoryKind, content: &str) -> MemoryRecord {
        let now = now_iso();
        MemoryRecord {
            id: id.to_string(),
            kind,
            content: content.to_string(),
            attribute: None,
            cache_key: None,
            source_url: None,
            confidence: 0.8,
            status: MemoryStatus::Active,
            superseded_by: None,
            session_id: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    fn source(store: MemoryStore) -> MemoryContextSource {
        MemoryContextSource::new(
            store,
            &MemoryConfig::default(),
            &ContextConfig::default(),
            Arc::new(SystemClock),
        )
    }

    #[tokio::test]
    async fn empty_store_contributes_nothing() {
        let store = MemoryStore::open_in_memory().await.unwrap();
        let messages = source(store)
            .provide_context("s1", "hello")
            .await
            .unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn user_facts_section_lists_profile() {
        let store = MemoryStore::open_in_memory().await.unwrap();
        let mut fact = record("f1", MemoryKind::PersonalFact, "User's name is Alice");
        fact.attribute = Some("name".to_string());
        store.save(&fact).await.unwrap();

        let messages = source(store)
            .provide_context("s1", "what do you know about me?")
            .await
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("**User Facts:**"));
        assert!(messages[0].content.contains("User's name is Alice"));
    }

    #[tokio::test]
    async fn web_section_uses_normalized_key() {
        let store = MemoryStore::open_in_memory().await.unwrap();
        let mut web = record("w1", MemoryKind::WebContent, "Sunny, 22C");
        web.cache_key = Some("weather in paris".to_string());
        web.source_url = Some("https://example.com/wx".to_string());
        store.save(&web).await.unwrap();

        let messages = source(store)
            .provide_context("s1", "  Weather   in PARIS ")
            .await
            .unwrap();
        let content = &messages[0].content;
        assert!(content.contains("**Current Web Information:**"));
        assert!(content.contains("Sunny, 22C"));
        assert!(content.contains("https://example.com/wx"));
    }

    #[tokio::test]
    async fn conversation_section_excludes_facts_and_web() {
        let store = MemoryStore::open_in_memory().await.unwrap();
        store
            .save(&record(
                "m1",
                MemoryKind::UserMessage,
                "I asked about hiking trails near Denver",
            ))
            .await
            .unwrap();

        let messages = source(store)
            .provide_context("s1", "hiking trails")
            .await
            .unwrap();
        let content = &messages[0].content;
        assert!(content.contains("**Previous Conversation Context:**"));
        assert!(content.contains("hiking trails near Denver"));
    }
}
