// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-turn chat orchestration.
//!
//! The pipeline per turn: persist the user message, extract personal facts,
//! analyze the query, run the freshness decision against the web cache,
//! assemble the zoned prompt, call the provider, persist the reply, and file
//! the turn under its topic.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use remora_config::model::RemoraConfig;
use remora_core::traits::{Clock, ProviderAdapter, StorageAdapter};
use remora_core::types::{Message, ProviderMessage, Session};
use remora_core::{HealthStatus, RemoraError};
use remora_context::ContextEngine;
use remora_freshness::{
    normalize_key, CacheStore, CategoryClassifier, Decision, FreshnessEngine, FreshnessPolicy,
    QueryCategory, TemporalRequirement,
};
use remora_memory::{
    ConversationTracker, FactExtractor, MemoryContextSource, MemoryStore, SqliteStorage,
    StoreStats, WebCache,
};

use crate::analysis::QueryAnalyzer;

/// One chat turn, inbound.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// Existing session to continue, or `None` to start one.
    pub session_id: Option<String>,
    /// Surface the turn came from ("cli", "api").
    pub channel: String,
    pub message: String,
}

/// One chat turn, outbound.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub session_id: String,
    pub reply: String,
    pub category: QueryCategory,
    pub topic: String,
    /// The freshness verdict, absent for personal-fact queries which never
    /// consult the web cache.
    pub decision: Option<Decision>,
    /// Attributes of facts stored this turn.
    pub facts_stored: Vec<String>,
}

/// The assembled chatbot: memory, freshness, context, and provider.
pub struct Agent {
    config: RemoraConfig,
    store: MemoryStore,
    storage: SqliteStorage,
    cache: WebCache,
    extractor: FactExtractor,
    tracker: ConversationTracker,
    engine: FreshnessEngine,
    analyzer: QueryAnalyzer,
    context: ContextEngine,
    provider: Arc<dyn ProviderAdapter>,
    clock: Arc<dyn Clock>,
}

impl Agent {
    /// Build an agent over the configured database path.
    pub async fn new(
        config: RemoraConfig,
        provider: Arc<dyn ProviderAdapter>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RemoraError> {
        let path = config.storage.database_path.clone();
        let store = MemoryStore::open(&path, config.storage.wal_mode).await?;
        Self::with_store(config, store, provider, clock).await
    }

    /// Build an agent over an already-open store. Tests use this with an
    /// in-memory database.
    pub async fn with_store(
        config: RemoraConfig,
        store: MemoryStore,
        provider: Arc<dyn ProviderAdapter>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RemoraError> {
        let storage = SqliteStorage::new(&store);
        storage.initialize().await?;

        let classifier = CategoryClassifier::from_config(&config.freshness);
        let policy = FreshnessPolicy::from_config(&config.freshness);
        let engine = FreshnessEngine::new(classifier.clone(), policy.clone());
        let analyzer = QueryAnalyzer::new(classifier, policy);

        let mut context = ContextEngine::new(&config.agent, &config.context).await?;
        if config.memory.enabled {
            context.add_source(Box::new(MemoryContextSource::new(
                store.clone(),
                &config.memory,
                &config.context,
                clock.clone(),
            )));
        }

        info!(provider = provider.name(), "agent ready");

        Ok(Self {
            extractor: FactExtractor::new(&config.memory),
            tracker: ConversationTracker::new(&store, config.memory.dedup_threshold),
            cache: WebCache::new(store.clone()),
            storage,
            store,
            engine,
            analyzer,
            context,
            provider,
            clock,
            config,
        })
    }

    /// Run one chat turn end to end.
    pub async fn chat(&self, request: TurnRequest) -> Result<TurnOutcome, RemoraError> {
        let now = self.clock.now();
        let session = self.ensure_session(&request).await?;

        self.storage
            .insert_message(&Message {
                id: Uuid::new_v4().to_string(),
                session_id: session.id.clone(),
                role: "user".to_string(),
                content: request.message.clone(),
                created_at: iso(now),
            })
            .await?;

        let facts_stored = if self.config.memory.enabled {
            self.extractor
                .remember(&self.store, Some(&session.id), &request.message)
                .await?
                .into_iter()
                .map(|fact| fact.attribute)
                .collect()
        } else {
            Vec::new()
        };

        let analysis = self
            .analyzer
            .analyze(&self.store, &self.tracker, &request.message, now)
            .await?;

        // Personal-fact questions are answered from the profile and never
        // consult the web cache.
        let decision = if analysis.personal_attribute.is_some() {
            None
        } else {
            let key = normalize_key(&analysis.search_query);
            let newest = self.cache.get(&key).await?;
            let max_age = self
                .engine
                .policy()
                .effective_max_age(analysis.category, analysis.temporal);
            let fresh = self.cache.fresh_items(&key, max_age, now).await?;
            let decision = self.engine.decide_with_suppression(
                &analysis.search_query,
                newest.as_ref(),
                fresh.len(),
                now,
                analysis.temporal,
            );
            debug!(verdict = decision.needs_refresh, reason = %decision.reason, "freshness decision");
            Some(decision)
        };

        let mut provider_request = self
            .context
            .assemble(
                &self.storage,
                &session.id,
                &analysis.search_query,
                &self.config.provider.model,
                self.config.provider.max_tokens,
            )
            .await?;

        // Update queries carry a do-not-repeat list of already-shared facts.
        if analysis.temporal == TemporalRequirement::UpdateSinceLast
            && !analysis.exclusions.is_empty()
        {
            let position = provider_request.messages.len().saturating_sub(1);
            provider_request.messages.insert(
                position,
                ProviderMessage {
                    role: "system".to_string(),
                    content: format!(
                        "Already shared with the user, do not repeat:\n{}",
                        analysis
                            .exclusions
                            .iter()
                            .map(|fact| format!("- {fact}"))
                            .collect::<Vec<_>>()
                            .join("\n")
                    ),
                },
            );
        }

        let response = self.provider.complete(provider_request).await?;

        self.storage
            .insert_message(&Message {
                id: Uuid::new_v4().to_string(),
                session_id: session.id.clone(),
                role: "assistant".to_string(),
                content: response.content.clone(),
                created_at: iso(self.clock.now()),
            })
            .await?;

        self.tracker
            .add_turn(
                &analysis.topic,
                &request.message,
                &response.content,
                Some(&session.id),
            )
            .await?;
        self.tracker
            .add_shared_fact(&analysis.topic, &response.content)
            .await?;

        Ok(TurnOutcome {
            session_id: session.id,
            reply: response.content,
            category: analysis.category,
            topic: analysis.topic,
            decision,
            facts_stored,
        })
    }

    /// The freshness decision alone, without running a turn. Debug surface.
    pub async fn peek_decision(&self, query: &str) -> Result<Decision, RemoraError> {
        let now = self.clock.now();
        let analysis = self
            .analyzer
            .analyze(&self.store, &self.tracker, query, now)
            .await?;
        let key = normalize_key(&analysis.search_query);
        let newest = self.cache.get(&key).await?;
        let max_age = self
            .engine
            .policy()
            .effective_max_age(analysis.category, analysis.temporal);
        let fresh = self.cache.fresh_items(&key, max_age, now).await?;
        Ok(self.engine.decide_with_suppression(
            &analysis.search_query,
            newest.as_ref(),
            fresh.len(),
            now,
            analysis.temporal,
        ))
    }

    async fn ensure_session(&self, request: &TurnRequest) -> Result<Session, RemoraError> {
        if let Some(id) = &request.session_id
            && let Some(session) = self.storage.get_session(id).await?
        {
            return Ok(session);
        }

        let now = iso(self.clock.now());
        let session = Session {
            id: request
                .session_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            channel: request.channel.clone(),
            user_id: None,
            state: "active".to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.storage.create_session(&session).await?;
        debug!(session_id = %session.id, channel = %session.channel, "session created");
        Ok(session)
    }

    pub async fn provider_health(&self) -> Result<HealthStatus, RemoraError> {
        self.provider.health_check().await
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn stats(&self) -> Result<StoreStats, RemoraError> {
        self.store.stats().await
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn cache(&self) -> &WebCache {
        &self.cache
    }

    pub fn config(&self) -> &RemoraConfig {
        &self.config
    }

    /// Checkpoint and release the database.
    pub async fn close(&self) -> Result<(), RemoraError> {
        self.storage.close().await
    }
}

fn iso(now: chrono::DateTime<chrono::Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
