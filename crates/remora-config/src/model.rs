// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Remora chatbot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.
//!
//! Freshness thresholds and category keyword lists live here deliberately:
//! the decision logic takes an immutable policy value built from this
//! config rather than reading ambient state.

use serde::{Deserialize, Serialize};

/// Top-level Remora configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemoraConfig {
    /// Agent identity and prompt settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// LLM provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Web-content freshness policy.
    #[serde(default)]
    pub freshness: FreshnessConfig,

    /// Memory retrieval settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Prompt assembly settings.
    #[serde(default)]
    pub context: ContextConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Agent identity and prompt configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the agent.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a markdown file containing the system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "remora".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// LLM provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Model label to record on responses.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    "extractive-v1".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("remora").join("remora.db"))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "remora.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Web-content freshness policy configuration.
///
/// Maximum ages are in whole hours and must be positive. Keyword lists feed
/// the category classifier; match order is weather, traffic, stock, news,
/// with general as the fallback.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FreshnessConfig {
    /// Max age for weather content before re-fetch.
    #[serde(default = "default_weather_max_age")]
    pub weather_max_age_hours: u64,

    /// Max age for traffic content before re-fetch.
    #[serde(default = "default_traffic_max_age")]
    pub traffic_max_age_hours: u64,

    /// Max age for stock/market content before re-fetch.
    #[serde(default = "default_stock_max_age")]
    pub stock_max_age_hours: u64,

    /// Max age for news content before re-fetch.
    #[serde(default = "default_news_max_age")]
    pub news_max_age_hours: u64,

    /// Max age for everything else. Large on purpose: stable facts rarely
    /// need a re-fetch.
    #[serde(default = "default_general_max_age")]
    pub general_max_age_hours: u64,

    /// Max age override when the query demands right-now data.
    #[serde(default = "default_immediate_max_age")]
    pub immediate_max_age_hours: u64,

    /// Max age override when the query asks for recent data.
    #[serde(default = "default_recent_max_age")]
    pub recent_max_age_hours: u64,

    /// Keywords that classify a query as weather.
    #[serde(default = "default_weather_keywords")]
    pub weather_keywords: Vec<String>,

    /// Keywords that classify a query as traffic.
    #[serde(default = "default_traffic_keywords")]
    pub traffic_keywords: Vec<String>,

    /// Keywords that classify a query as stock.
    #[serde(default = "default_stock_keywords")]
    pub stock_keywords: Vec<String>,

    /// Keywords that classify a query as news.
    #[serde(default = "default_news_keywords")]
    pub news_keywords: Vec<String>,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            weather_max_age_hours: default_weather_max_age(),
            traffic_max_age_hours: default_traffic_max_age(),
            stock_max_age_hours: default_stock_max_age(),
            news_max_age_hours: default_news_max_age(),
            general_max_age_hours: default_general_max_age(),
            immediate_max_age_hours: default_immediate_max_age(),
            recent_max_age_hours: default_recent_max_age(),
            weather_keywords: default_weather_keywords(),
            traffic_keywords: default_traffic_keywords(),
            stock_keywords: default_stock_keywords(),
            news_keywords: default_news_keywords(),
        }
    }
}

fn default_weather_max_age() -> u64 {
    3
}

fn default_traffic_max_age() -> u64 {
    1
}

fn default_stock_max_age() -> u64 {
    4
}

fn default_news_max_age() -> u64 {
    6
}

fn default_general_max_age() -> u64 {
    168
}

fn default_immediate_max_age() -> u64 {
    1
}

fn default_recent_max_age() -> u64 {
    24
}

fn default_weather_keywords() -> Vec<String> {
    ["weather", "temperature", "forecast", "rain", "snow", "humidity"]
        .map(String::from)
        .to_vec()
}

fn default_traffic_keywords() -> Vec<String> {
    ["traffic", "commute", "congestion", "road closure"]
        .map(String::from)
        .to_vec()
}

fn default_stock_keywords() -> Vec<String> {
    ["stock", "share price", "market", "nasdaq", "dow jones"]
        .map(String::from)
        .to_vec()
}

fn default_news_keywords() -> Vec<String> {
    ["news", "headline", "happening", "breaking", "resignation"]
        .map(String::from)
        .to_vec()
}

/// Memory retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable memory retrieval and fact extraction.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Maximum memories returned per retrieval.
    #[serde(default = "default_max_retrieval_results")]
    pub max_retrieval_results: usize,

    /// Jaro-Winkler similarity above which two facts are duplicates.
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: f64,

    /// Half-life in hours for the recency boost applied to retrieval scores.
    #[serde(default = "default_recency_half_life")]
    pub recency_half_life_hours: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            max_retrieval_results: default_max_retrieval_results(),
            dedup_threshold: default_dedup_threshold(),
            recency_half_life_hours: default_recency_half_life(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_max_retrieval_results() -> usize {
    5
}

fn default_dedup_threshold() -> f64 {
    0.85
}

fn default_recency_half_life() -> f64 {
    48.0
}

/// Prompt assembly configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Maximum conversation history messages included per turn.
    #[serde(default = "default_history_limit")]
    pub history_limit: i64,

    /// Maximum web-content snippets injected into the prompt.
    #[serde(default = "default_max_web_snippets")]
    pub max_web_snippets: usize,

    /// Maximum conversational memories injected into the prompt.
    #[serde(default = "default_max_context_memories")]
    pub max_context_memories: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            max_web_snippets: default_max_web_snippets(),
            max_context_memories: default_max_context_memories(),
        }
    }
}

fn default_history_limit() -> i64 {
    20
}

fn default_max_web_snippets() -> usize {
    3
}

fn default_max_context_memories() -> usize {
    3
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind the gateway listener to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port for the gateway listener.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8420
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_thresholds() {
        let config = RemoraConfig::default();
        assert_eq!(config.freshness.weather_max_age_hours, 3);
        assert_eq!(config.freshness.traffic_max_age_hours, 1);
        assert_eq!(config.freshness.stock_max_age_hours, 4);
        assert_eq!(config.freshness.news_max_age_hours, 6);
        assert_eq!(config.freshness.general_max_age_hours, 168);
    }

    #[test]
    fn freshness_section_deserializes() {
        let toml_str = r#"
[freshness]
weather_max_age_hours = 2
news_keywords = ["news", "headline"]
"#;
        let config: RemoraConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.freshness.weather_max_age_hours, 2);
        assert_eq!(config.freshness.news_keywords, vec!["news", "headline"]);
        // Untouched fields keep defaults.
        assert_eq!(config.freshness.traffic_max_age_hours, 1);
    }

    #[test]
    fn unknown_freshness_key_is_rejected() {
        let toml_str = r#"
[freshness]
wether_max_age_hours = 2
"#;
        assert!(toml::from_str::<RemoraConfig>(toml_str).is_err());
    }

    #[test]
    fn gateway_defaults() {
        let config = RemoraConfig::default();
        assert_eq!(config.gateway.bind_address, "127.0.0.1");
        assert_eq!(config.gateway.port, 8420);
    }
}
