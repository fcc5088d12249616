// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! XDG hierarchy: `./remora.toml` > `~/.config/remora/remora.toml` >
//! `/etc/remora/remora.toml`, with `REMORA_` environment variable overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RemoraConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/remora/remora.toml` (system-wide)
/// 3. `~/.config/remora/remora.toml` (user XDG config)
/// 4. `./remora.toml` (local directory)
/// 5. `REMORA_*` environment variables
pub fn load_config() -> Result<RemoraConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RemoraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RemoraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RemoraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RemoraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RemoraConfig::default()))
        .merge(Toml::file("/etc/remora/remora.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("remora/remora.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("remora.toml"))
        .merge(env_provider())
}

/// Environment variable provider using an explicit `map()` for the
/// section-to-dot translation.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `REMORA_FRESHNESS_WEATHER_MAX_AGE_HOURS` must map to
/// `freshness.weather_max_age_hours`, not `freshness.weather.max.age.hours`.
fn env_provider() -> Env {
    Env::prefixed("REMORA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("provider_", "provider.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("freshness_", "freshness.", 1)
            .replacen("memory_", "memory.", 1)
            .replacen("context_", "context.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
