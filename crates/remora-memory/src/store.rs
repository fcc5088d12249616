// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed memory store with FTS5 for BM25 keyword search.
//!
//! One database file holds memories, sessions, messages, and the
//! conversation tracker tables. Sync triggers keep the FTS5 index
//! aligned with the memories table.

use tokio_rusqlite::Connection;
use tracing::debug;

use remora_core::RemoraError;

use crate::types::{MemoryKind, MemoryRecord, MemoryStatus};

/// Convert tokio_rusqlite errors into RemoraError::Storage.
pub(crate) fn storage_err(e: tokio_rusqlite::Error) -> RemoraError {
    RemoraError::Storage {
        source: Box::new(e),
    }
}

// `Connection::open` surfaces rusqlite errors directly rather than the
// wrapper's error type.
fn open_err(e: rusqlite::Error) -> RemoraError {
    RemoraError::Storage {
        source: Box::new(e),
    }
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS memories (
    id TEXT PRIMARY KEY NOT NULL,
    kind TEXT NOT NULL,
    content TEXT NOT NULL,
    attribute TEXT,
    cache_key TEXT,
    source_url TEXT,
    confidence REAL NOT NULL DEFAULT 0.5,
    status TEXT NOT NULL DEFAULT 'active',
    superseded_by TEXT,
    session_id TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
    content,
    content='memories',
    content_rowid='rowid'
);

CREATE TRIGGER IF NOT EXISTS memories_ai AFTER INSERT ON memories BEGIN
    INSERT INTO memories_fts(rowid, content) VALUES (new.rowid, new.content);
END;

CREATE TRIGGER IF NOT EXISTS memories_ad AFTER DELETE ON memories BEGIN
    INSERT INTO memories_fts(memories_fts, rowid, content)
        VALUES('delete', old.rowid, old.content);
END;

CREATE TRIGGER IF NOT EXISTS memories_au AFTER UPDATE ON memories BEGIN
    INSERT INTO memories_fts(memories_fts, rowid, content)
        VALUES('delete', old.rowid, old.content);
    INSERT INTO memories_fts(rowid, content) VALUES (new.rowid, new.content);
END;

CREATE INDEX IF NOT EXISTS idx_memories_status ON memories(status);
CREATE INDEX IF NOT EXISTS idx_memories_kind ON memories(kind);
CREATE INDEX IF NOT EXISTS idx_memories_cache_key ON memories(cache_key);
CREATE INDEX IF NOT EXISTS idx_memories_created ON memories(created_at);

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY NOT NULL,
    channel TEXT NOT NULL,
    user_id TEXT,
    state TEXT NOT NULL DEFAULT 'active',
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY NOT NULL,
    session_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, created_at);

CREATE TABLE IF NOT EXISTS turns (
    id TEXT PRIMARY KEY NOT NULL,
    topic TEXT NOT NULL,
    query TEXT NOT NULL,
    response TEXT NOT NULL,
    session_id TEXT,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_turns_topic ON turns(topic, created_at);

CREATE TABLE IF NOT EXISTS shared_facts (
    id TEXT PRIMARY KEY NOT NULL,
    topic TEXT NOT NULL,
    fact TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE INDEX IF NOT EXISTS idx_shared_facts_topic ON shared_facts(topic, created_at);
";

/// Row counts for the status surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreStats {
    pub active_memories: usize,
    pub personal_facts: usize,
    pub web_items: usize,
    pub sessions: usize,
    pub messages: usize,
}

/// Persistent store for memories in SQLite.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    conn: Connection,
}

impl MemoryStore {
    /// Open (or create) the database at `path` and apply the schema.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, RemoraError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| RemoraError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path).await.map_err(open_err)?;
        apply_schema(&conn, wal_mode).await?;
        debug!(path, wal_mode, "memory store opened");
        Ok(Self { conn })
    }

    /// In-memory database for tests.
    pub async fn open_in_memory() -> Result<Self, RemoraError> {
        let conn = Connection::open_in_memory().await.map_err(open_err)?;
        apply_schema(&conn, false).await?;
        Ok(Self { conn })
    }

    /// Shared handle to the underlying connection.
    ///
    /// Sessions and messages live in the same database file; the storage
    /// adapter clones this handle rather than opening a second connection.
    pub fn connection(&self) -> Connection {
        self.conn.clone()
    }

    /// Save a record.
    pub async fn save(&self, record: &MemoryRecord) -> Result<(), RemoraError> {
        let r = record.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO memories (id, kind, content, attribute, cache_key, source_url, confidence, status, superseded_by, session_id, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    rusqlite::params![
                        r.id,
                        r.kind.as_str(),
                        r.content,
                        r.attribute,
                        r.cache_key,
                        r.source_url,
                        r.confidence,
                        r.status.as_str(),
                        r.superseded_by,
                        r.session_id,
                        r.created_at,
                        r.updated_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Get a record by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<MemoryRecord>, RemoraError> {
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM memories WHERE id = ?1"
                ))?;
                let record = stmt
                    .query_row(rusqlite::params![id], |row| Ok(row_to_record(row)))
                    .optional()?;
                Ok(record)
            })
            .await
            .map_err(storage_err)
    }

    /// All active records, newest first, optionally filtered by kind.
    pub async fn get_active(
        &self,
        kind: Option<MemoryKind>,
    ) -> Result<Vec<MemoryRecord>, RemoraError> {
        let kind_str = kind.map(|k| k.as_str().to_string());
        self.conn
            .call(move |conn| {
                let records = match kind_str {
                    Some(kind) => {
                        let mut stmt = conn.prepare(&format!(
                            "SELECT {COLUMNS} FROM memories WHERE status = 'active' AND kind = ?1 ORDER BY created_at DESC"
                        ))?;
                        let rows = stmt
                            .query_map(rusqlite::params![kind], |row| Ok(row_to_record(row)))?
                            .collect::<Result<Vec<_>, _>>()?;
                        rows
                    }
                    None => {
                        let mut stmt = conn.prepare(&format!(
                            "SELECT {COLUMNS} FROM memories WHERE status = 'active' ORDER BY created_at DESC"
                        ))?;
                        let rows = stmt
                            .query_map([], |row| Ok(row_to_record(row)))?
                            .collect::<Result<Vec<_>, _>>()?;
                        rows
                    }
                };
                Ok(records)
            })
            .await
            .map_err(storage_err)
    }

    /// Newest active personal fact for an attribute.
    pub async fn fact_for_attribute(
        &self,
        attribute: &str,
    ) -> Result<Option<MemoryRecord>, RemoraError> {
        let attribute = attribute.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM memories WHERE status = 'active' AND kind = 'personal_fact' AND attribute = ?1 ORDER BY created_at DESC LIMIT 1"
                ))?;
                let record = stmt
                    .query_row(rusqlite::params![attribute], |row| Ok(row_to_record(row)))
                    .optional()?;
                Ok(record)
            })
            .await
            .map_err(storage_err)
    }

    /// The user profile: newest active fact per attribute.
    pub async fn user_profile(&self) -> Result<Vec<MemoryRecord>, RemoraError> {
        let facts = self.get_active(Some(MemoryKind::PersonalFact)).await?;
        // get_active returns newest first, so the first hit per attribute wins.
        let mut seen = std::collections::HashSet::new();
        Ok(facts
            .into_iter()
            .filter(|f| match &f.attribute {
                Some(attr) => seen.insert(attr.clone()),
                None => true,
            })
            .collect())
    }

    /// BM25 keyword search via FTS5 over active records.
    ///
    /// Returns (id, bm25_score) pairs sorted by relevance. BM25 scores are
    /// negative (more negative = more relevant).
    pub async fn search_bm25(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, RemoraError> {
        let Some(match_expr) = fts_match_expr(query) else {
            return Ok(vec![]);
        };
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT m.id, bm25(memories_fts) AS score FROM memories_fts \
                     JOIN memories m ON m.rowid = memories_fts.rowid \
                     WHERE memories_fts MATCH ?1 AND m.status = 'active' \
                     ORDER BY bm25(memories_fts) LIMIT ?2",
                )?;
                let results = stmt
                    .query_map(rusqlite::params![match_expr, limit as i64], |row| {
                        let id: String = row.get(0)?;
                        let score: f64 = row.get(1)?;
                        Ok((id, score))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(results)
            })
            .await
            .map_err(storage_err)
    }

    /// Batch retrieval of active records by ID.
    pub async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<MemoryRecord>, RemoraError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let ids = ids.to_vec();
        self.conn
            .call(move |conn| {
                let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
                let sql = format!(
                    "SELECT {COLUMNS} FROM memories WHERE id IN ({}) AND status = 'active'",
                    placeholders.join(", ")
                );
                let mut stmt = conn.prepare(&sql)?;
                let params: Vec<&dyn rusqlite::types::ToSql> =
                    ids.iter().map(|id| id as &dyn rusqlite::types::ToSql).collect();
                let records = stmt
                    .query_map(params.as_slice(), |row| Ok(row_to_record(row)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(storage_err)
    }

    /// Mark a record superseded and link it to its replacement.
    pub async fn supersede(&self, old_id: &str, new_id: &str) -> Result<(), RemoraError> {
        let old_id = old_id.to_string();
        let new_id = new_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE memories SET status = 'superseded', superseded_by = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?2",
                    rusqlite::params![new_id, old_id],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Soft-delete a record (status 'forgotten').
    pub async fn soft_delete(&self, id: &str) -> Result<(), RemoraError> {
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE memories SET status = 'forgotten', updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?1",
                    rusqlite::params![id],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Newest active web-content record for a cache key.
    pub async fn newest_web_content(
        &self,
        cache_key: &str,
    ) -> Result<Option<MemoryRecord>, RemoraError> {
        let cache_key = cache_key.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM memories WHERE status = 'active' AND kind = 'web_content' AND cache_key = ?1 ORDER BY created_at DESC LIMIT 1"
                ))?;
                let record = stmt
                    .query_row(rusqlite::params![cache_key], |row| Ok(row_to_record(row)))
                    .optional()?;
                Ok(record)
            })
            .await
            .map_err(storage_err)
    }

    /// All active web-content records for a cache key, newest first.
    pub async fn web_content_items(
        &self,
        cache_key: &str,
    ) -> Result<Vec<MemoryRecord>, RemoraError> {
        let cache_key = cache_key.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM memories WHERE status = 'active' AND kind = 'web_content' AND cache_key = ?1 ORDER BY created_at DESC"
                ))?;
                let records = stmt
                    .query_map(rusqlite::params![cache_key], |row| Ok(row_to_record(row)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await
            .map_err(storage_err)
    }

    /// Row counts for the status surface.
    pub async fn stats(&self) -> Result<StoreStats, RemoraError> {
        self.conn
            .call(|conn| {
                let count = |sql: &str| -> Result<usize, rusqlite::Error> {
                    conn.query_row(sql, [], |row| row.get::<_, i64>(0))
                        .map(|n| n as usize)
                };
                Ok(StoreStats {
                    active_memories: count(
                        "SELECT COUNT(*) FROM memories WHERE status = 'active'",
                    )?,
                    personal_facts: count(
                        "SELECT COUNT(*) FROM memories WHERE status = 'active' AND kind = 'personal_fact'",
                    )?,
                    web_items: count(
                        "SELECT COUNT(*) FROM memories WHERE status = 'active' AND kind = 'web_content'",
                    )?,
                    sessions: count("SELECT COUNT(*) FROM sessions")?,
                    messages: count("SELECT COUNT(*) FROM messages")?,
                })
            })
            .await
            .map_err(storage_err)
    }
}

async fn apply_schema(conn: &Connection, wal_mode: bool) -> Result<(), RemoraError> {
    conn.call(move |conn| -> Result<(), rusqlite::Error> {
        if wal_mode {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }
        conn.pragma_update(None, "busy_timeout", 5000)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    })
    .await
    .map_err(storage_err)
}

const COLUMNS: &str = "id, kind, content, attribute, cache_key, source_url, confidence, status, superseded_by, session_id, created_at, updated_at";

/// Convert a rusqlite Row to a MemoryRecord.
fn row_to_record(row: &rusqlite::Row) -> MemoryRecord {
    let kind_str: String = row.get(1).unwrap_or_default();
    let status_str: String = row.get(7).unwrap_or_default();
    MemoryRecord {
        id: row.get(0).unwrap_or_default(),
        kind: MemoryKind::from_str_value(&kind_str),
        content: row.get(2).unwrap_or_default(),
        attribute: row.get(3).unwrap_or(None),
        cache_key: row.get(4).unwrap_or(None),
        source_url: row.get(5).unwrap_or(None),
        confidence: row.get(6).unwrap_or(0.5),
        status: MemoryStatus::from_str_value(&status_str),
        superseded_by: row.get(8).unwrap_or(None),
        session_id: row.get(9).unwrap_or(None),
        created_at: row.get(10).unwrap_or_default(),
        updated_at: row.get(11).unwrap_or_default(),
    }
}

/// Build an FTS5 MATCH expression from free text.
///
/// Raw user queries contain characters FTS5 treats as syntax, so tokens are
/// extracted and individually quoted, joined with OR. Returns `None` when no
/// searchable token remains.
fn fts_match_expr(query: &str) -> Option<String> {
    let tokens: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{t}\""))
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" OR "))
    }
}

/// Extension trait for optional row queries.
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
