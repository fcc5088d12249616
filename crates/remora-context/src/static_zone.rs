// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static zone: loads and caches the system prompt.

use remora_config::model::AgentConfig;
use remora_core::RemoraError;
use tracing::{info, warn};

/// Holds the system prompt text for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct StaticZone {
    system_prompt: String,
}

impl StaticZone {
    /// Load the system prompt from config.
    ///
    /// # Priority
    /// 1. `config.system_prompt_file` -- reads from disk
    /// 2. `config.system_prompt` -- inline string
    /// 3. Default: "You are {name}, a concise assistant with a memory."
    pub async fn new(config: &AgentConfig) -> Result<Self, RemoraError> {
        let system_prompt = load_system_prompt(config).await?;
        Ok(Self { system_prompt })
    }

    /// The raw system prompt text.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

/// Loads the system prompt following config priority: file > inline > default.
async fn load_system_prompt(config: &AgentConfig) -> Result<String, RemoraError> {
    if let Some(ref file_path) = config.system_prompt_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim().to_string();
                if !trimmed.is_empty() {
                    info!(path = file_path.as_str(), "loaded system prompt from file");
                    return Ok(trimmed);
                }
            }
            Err(e) => {
                warn!(
                    path = file_path.as_str(),
                    error = %e,
                    "failed to read system prompt file, falling back"
                );
            }
        }
    }

    if let Some(ref prompt) = config.system_prompt
        && !prompt.is_empty()
    {
        return Ok(prompt.clone());
    }

    Ok(format!(
        "You are {}, a concise assistant with a memory.",
        config.name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_zone_default_prompt() {
        let config = AgentConfig::default();
        let zone = StaticZone::new(&config).await.unwrap();
        assert!(zone.system_prompt().contains("remora"));
        assert!(zone.system_prompt().contains("concise assistant"));
    }

    #[tokio::test]
    async fn static_zone_inline_prompt() {
        let config = AgentConfig {
            system_prompt: Some("Custom prompt.".into()),
            ..Default::default()
        };
        let zone = StaticZone::new(&config).await.unwrap();
        assert_eq!(zone.system_prompt(), "Custom prompt.");
    }

    #[tokio::test]
    async fn static_zone_file_prompt_wins_over_inline() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("sys-prompt.md");
        std::fs::write(&file_path, "File-based prompt.").unwrap();

        let config = AgentConfig {
            system_prompt: Some("Inline.".into()),
            system_prompt_file: Some(file_path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        let zone = StaticZone::new(&config).await.unwrap();
        assert_eq!(zone.system_prompt(), "File-based prompt.");
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_inline() {
        let config = AgentConfig {
            system_prompt: Some("Inline fallback.".into()),
            system_prompt_file: Some("/nonexistent/prompt.md".into()),
            ..Default::default()
        };
        let zone = StaticZone::new(&config).await.unwrap();
        assert_eq!(zone.system_prompt(), "Inline fallback.");
    }
}
