// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation storage seam.

use async_trait::async_trait;

use crate::error::RemoraError;
use crate::types::{Message, Session};

/// Persistence for sessions and conversation messages.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Open the backing store and apply the schema.
    async fn initialize(&self) -> Result<(), RemoraError>;

    /// Flush and close the backing store.
    async fn close(&self) -> Result<(), RemoraError>;

    // --- Session operations ---

    async fn create_session(&self, session: &Session) -> Result<(), RemoraError>;

    async fn get_session(&self, id: &str) -> Result<Option<Session>, RemoraError>;

    async fn list_sessions(&self, state: Option<&str>) -> Result<Vec<Session>, RemoraError>;

    async fn update_session_state(&self, id: &str, state: &str) -> Result<(), RemoraError>;

    // --- Message operations ---

    async fn insert_message(&self, message: &Message) -> Result<(), RemoraError>;

    /// Messages for a session in chronological order, optionally capped to
    /// the most recent `limit`.
    async fn get_messages(
        &self,
        session_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, RemoraError>;
}
