// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached web content backed by the memory store.
//!
//! Web content lives in the memories table as `web_content` records keyed
//! by normalized query. This adapter exposes them through the freshness
//! engine's [`CacheStore`] seam.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use remora_core::RemoraError;
use remora_freshness::{CachedItem, CacheStore};

use crate::store::MemoryStore;
use crate::types::{now_iso, MemoryKind, MemoryRecord, MemoryStatus};

/// [`CacheStore`] over the shared memories table.
#[derive(Clone)]
pub struct WebCache {
    store: MemoryStore,
}

impl WebCache {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

/// A record converts to a cached item only when its timestamp parses.
/// Malformed rows are logged and treated as absent.
fn record_to_item(record: &MemoryRecord) -> Option<CachedItem> {
    let Some(captured_at) = record.created_at_utc() else {
        warn!(id = %record.id, created_at = %record.created_at, "skipping cached item with malformed timestamp");
        return None;
    };
    Some(CachedItem {
        key: record.cache_key.clone().unwrap_or_default(),
        content: record.content.clone(),
        source_url: record.source_url.clone(),
        captured_at,
    })
}

#[async_trait]
impl CacheStore for WebCache {
    async fn get(&self, key: &str) -> Result<Option<CachedItem>, RemoraError> {
        let record = self.store.newest_web_content(key).await?;
        Ok(record.as_ref().and_then(record_to_item))
    }

    async fn put(&self, item: CachedItem) -> Result<(), RemoraError> {
        let new_id = Uuid::new_v4().to_string();

        // Items are immutable: a re-fetch supersedes rather than mutates.
        let priors = self.store.web_content_items(&item.key).await?;

        let record = MemoryRecord {
            id: new_id.clone(),
            kind: MemoryKind::WebContent,
            content: item.content,
            attribute: None,
            cache_key: Some(item.key.clone()),
            source_url: item.source_url,
            confidence: 0.9,
            status: MemoryStatus::Active,
            superseded_by: None,
            session_id: None,
            created_at: item
                .captured_at
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string(),
            updated_at: now_iso(),
        };
        self.store.save(&record).await?;

        for prior in &priors {
            self.store.supersede(&prior.id, &new_id).await?;
        }
        debug!(key = %item.key, superseded = priors.len(), "cached web content");
        Ok(())
    }

    async fn fresh_items(
        &self,
        key: &str,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<CachedItem>, RemoraError> {
        let records = self.store.web_content_items(key).await?;
        Ok(records
            .iter()
            .filter_map(record_to_item)
            .filter(|item| item.age(now) <= max_age)
            .collect())
    }
}
