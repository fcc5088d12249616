// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conditional zone: trait for sources that inject query-specific context
//! (memory facts, cached web content) into the prompt.

use async_trait::async_trait;
use remora_core::types::ProviderMessage;
use remora_core::RemoraError;

/// A source of conditional context for a turn.
///
/// Implementations inject query-specific context such as stored user facts,
/// previous conversation summaries, or cached web information. The context
/// engine calls all registered sources during assembly and places their
/// output between the system prompt and the conversation history.
#[async_trait]
pub trait ContextSource: Send + Sync {
    /// Context messages to inject for this session and query.
    ///
    /// Returns an empty vec when nothing applies.
    async fn provide_context(
        &self,
        session_id: &str,
        query: &str,
    ) -> Result<Vec<ProviderMessage>, RemoraError>;
}
