// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the core [`StorageAdapter`] seam.
//!
//! Sessions and messages live in the same database file as the memory
//! store; this adapter borrows the store's connection handle.

use async_trait::async_trait;
use tokio_rusqlite::Connection;
use tracing::debug;

use remora_core::traits::StorageAdapter;
use remora_core::types::{Message, Session};
use remora_core::RemoraError;

use crate::store::{storage_err, MemoryStore};

/// Session and message persistence over the shared memory database.
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Share the memory store's connection. The schema is already applied
    /// when the store opens.
    pub fn new(store: &MemoryStore) -> Self {
        Self {
            conn: store.connection(),
        }
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), RemoraError> {
        // Schema applied by MemoryStore::open; nothing further to do.
        Ok(())
    }

    async fn close(&self) -> Result<(), RemoraError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(storage_err)?;
        debug!("storage checkpoint complete");
        Ok(())
    }

    async fn create_session(&self, session: &Session) -> Result<(), RemoraError> {
        let s = session.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO sessions (id, channel, user_id, state, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![s.id, s.channel, s.user_id, s.state, s.created_at, s.updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, RemoraError> {
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, channel, user_id, state, created_at, updated_at \
                     FROM sessions WHERE id = ?1",
                )?;
                let session = match stmt.query_row(rusqlite::params![id], row_to_session) {
                    Ok(s) => Some(s),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                };
                Ok(session)
            })
            .await
            .map_err(storage_err)
    }

    async fn list_sessions(&self, state: Option<&str>) -> Result<Vec<Session>, RemoraError> {
        let state = state.map(|s| s.to_string());
        self.conn
            .call(move |conn| {
                let sessions = match state {
                    Some(state) => {
                        let mut stmt = conn.prepare(
                            "SELECT id, channel, user_id, state, created_at, updated_at \
                             FROM sessions WHERE state = ?1 ORDER BY updated_at DESC",
                        )?;
                        let rows = stmt
                            .query_map(rusqlite::params![state], row_to_session)?
                            .collect::<Result<Vec<_>, _>>()?;
                        rows
                    }
                    None => {
                        let mut stmt = conn.prepare(
                            "SELECT id, channel, user_id, state, created_at, updated_at \
                             FROM sessions ORDER BY updated_at DESC",
                        )?;
                        let rows = stmt
                            .query_map([], row_to_session)?
                            .collect::<Result<Vec<_>, _>>()?;
                        rows
                    }
                };
                Ok(sessions)
            })
            .await
            .map_err(storage_err)
    }

    async fn update_session_state(&self, id: &str, state: &str) -> Result<(), RemoraError> {
        let id = id.to_string();
        let state = state.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE sessions SET state = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?2",
                    rusqlite::params![state, id],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    async fn insert_message(&self, message: &Message) -> Result<(), RemoraError> {
        let m = message.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO messages (id, session_id, role, content, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![m.id, m.session_id, m.role, m.content, m.created_at],
                )?;
                conn.execute(
                    "UPDATE sessions SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?1",
                    rusqlite::params![m.session_id],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    async fn get_messages(
        &self,
        session_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, RemoraError> {
        let session_id = session_id.to_string();
        self.conn
            .call(move |conn| {
                // Take the newest N then restore chronological order. Rowid
                // breaks ties between messages sharing a timestamp.
                let mut stmt = conn.prepare(
                    "SELECT id, session_id, role, content, created_at FROM ( \
                         SELECT rowid AS rid, id, session_id, role, content, created_at \
                         FROM messages WHERE session_id = ?1 \
                         ORDER BY created_at DESC, rid DESC LIMIT ?2 \
                     ) ORDER BY created_at ASC, rid ASC",
                )?;
                let messages = stmt
                    .query_map(
                        rusqlite::params![session_id, limit.unwrap_or(i64::MAX)],
                        row_to_message,
                    )?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(messages)
            })
            .await
            .map_err(storage_err)
    }
}

fn row_to_session(row: &rusqlite::Row) -> Result<Session, rusqlite::Error> {
    Ok(Session {
        id: row.get(0)?,
        channel: row.get(1)?,
        user_id: row.get(2)?,
        state: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn row_to_message(row: &rusqlite::Row) -> Result<Message, rusqlite::Error> {
    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}
