// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zone-based prompt assembly for the Remora chatbot.
//!
//! Assembles prompts from three zones:
//! - **Static zone**: the system prompt (file > inline > default)
//! - **Conditional zone**: query-specific context from registered sources
//!   (user facts, cached web content)
//! - **Dynamic zone**: a sliding window of recent conversation history
//!
//! The engine produces a [`ProviderRequest`] ready to hand to whatever
//! `ProviderAdapter` is configured.

pub mod conditional;
pub mod dynamic;
pub mod static_zone;

use remora_config::model::{AgentConfig, ContextConfig};
use remora_core::traits::StorageAdapter;
use remora_core::types::ProviderRequest;
use remora_core::RemoraError;

pub use conditional::ContextSource;
pub use dynamic::DynamicZone;
pub use static_zone::StaticZone;

/// Orchestrates three-zone prompt assembly.
pub struct ContextEngine {
    static_zone: StaticZone,
    sources: Vec<Box<dyn ContextSource>>,
    dynamic_zone: DynamicZone,
}

impl ContextEngine {
    /// Create an engine: loads the static zone from agent config, sizes the
    /// dynamic window from context config.
    pub async fn new(
        agent_config: &AgentConfig,
        context_config: &ContextConfig,
    ) -> Result<Self, RemoraError> {
        let static_zone = StaticZone::new(agent_config).await?;
        let dynamic_zone = DynamicZone::new(context_config);

        Ok(Self {
            static_zone,
            sources: Vec::new(),
            dynamic_zone,
        })
    }

    /// Assemble a complete provider request for one turn.
    pub async fn assemble(
        &self,
        storage: &dyn StorageAdapter,
        session_id: &str,
        query: &str,
        model: &str,
        max_tokens: u32,
    ) -> Result<ProviderRequest, RemoraError> {
        let mut messages = Vec::new();

        for source in &self.sources {
            let ctx = source.provide_context(session_id, query).await?;
            messages.extend(ctx);
        }

        let dynamic = self
            .dynamic_zone
            .assemble_messages(storage, session_id, query)
            .await?;
        messages.extend(dynamic);

        Ok(ProviderRequest {
            model: model.to_string(),
            system_prompt: Some(self.static_zone.system_prompt().to_string()),
            messages,
            max_tokens,
        })
    }

    /// Register a conditional context source. Sources are called in
    /// registration order during assembly.
    pub fn add_source(&mut self, source: Box<dyn ContextSource>) {
        self.sources.push(source);
    }

    pub fn static_zone(&self) -> &StaticZone {
        &self.static_zone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn context_engine_new() {
        let agent_config = AgentConfig {
            system_prompt: Some("Test engine.".into()),
            ..Default::default()
        };
        let context_config = ContextConfig::default();

        let engine = ContextEngine::new(&agent_config, &context_config)
            .await
            .unwrap();
        assert_eq!(engine.static_zone().system_prompt(), "Test engine.");
        assert!(engine.sources.is_empty());
    }
}
