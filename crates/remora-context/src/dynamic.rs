// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic zone: assembles recent conversation history from storage as a
//! sliding window, then appends the inbound message.

use remora_config::model::ContextConfig;
use remora_core::traits::StorageAdapter;
use remora_core::types::ProviderMessage;
use remora_core::RemoraError;
use tracing::debug;

/// Sliding-window conversation history assembly.
#[derive(Debug, Clone)]
pub struct DynamicZone {
    /// Most recent messages to include per turn. Zero disables history.
    history_limit: i64,
}

impl DynamicZone {
    pub fn new(config: &ContextConfig) -> Self {
        Self {
            history_limit: config.history_limit,
        }
    }

    /// Load the recent history window and append the inbound user message.
    pub async fn assemble_messages(
        &self,
        storage: &dyn StorageAdapter,
        session_id: &str,
        inbound: &str,
    ) -> Result<Vec<ProviderMessage>, RemoraError> {
        let history = if self.history_limit > 0 {
            storage
                .get_messages(session_id, Some(self.history_limit))
                .await?
        } else {
            Vec::new()
        };

        debug!(
            history_len = history.len(),
            limit = self.history_limit,
            "dynamic zone window"
        );

        let mut messages: Vec<ProviderMessage> = history
            .iter()
            .map(|msg| ProviderMessage {
                role: msg.role.clone(),
                content: msg.content.clone(),
            })
            .collect();

        messages.push(ProviderMessage {
            role: "user".to_string(),
            content: inbound.to_string(),
        });

        Ok(messages)
    }
}
