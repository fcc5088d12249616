// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `remora status` command implementation.
//!
//! Shows the effective configuration and store statistics without
//! starting the gateway. `--json` emits structured output for scripting.

use colored::Colorize;
use serde::Serialize;

use remora_config::model::RemoraConfig;
use remora_core::RemoraError;
use remora_memory::MemoryStore;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub agent_name: String,
    pub provider_model: String,
    pub memory_enabled: bool,
    pub database_path: String,
    pub gateway_address: String,
    pub active_memories: usize,
    pub personal_facts: usize,
    pub web_items: usize,
    pub sessions: usize,
    pub messages: usize,
}

/// Run the `remora status` command.
pub async fn run_status(config: &RemoraConfig, json: bool) -> Result<(), RemoraError> {
    let path = config.storage.database_path.clone();
    let store = MemoryStore::open(&path, config.storage.wal_mode).await?;
    let stats = store.stats().await?;

    let report = StatusReport {
        agent_name: config.agent.name.clone(),
        provider_model: config.provider.model.clone(),
        memory_enabled: config.memory.enabled,
        database_path: path,
        gateway_address: format!("{}:{}", config.gateway.bind_address, config.gateway.port),
        active_memories: stats.active_memories,
        personal_facts: stats.personal_facts,
        web_items: stats.web_items,
        sessions: stats.sessions,
        messages: stats.messages,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report)
                .map_err(|e| RemoraError::Internal(format!("status serialization: {e}")))?
        );
        return Ok(());
    }

    println!("{}", "remora status".bold().green());
    println!("  agent:      {}", report.agent_name);
    println!("  provider:   {}", report.provider_model);
    println!(
        "  memory:     {}",
        if report.memory_enabled { "enabled" } else { "disabled" }
    );
    println!("  database:   {}", report.database_path);
    println!("  gateway:    {}", report.gateway_address);
    println!();
    println!("  active memories:  {}", report.active_memories);
    println!("  personal facts:   {}", report.personal_facts);
    println!("  cached web items: {}", report.web_items);
    println!("  sessions:         {}", report.sessions);
    println!("  messages:         {}", report.messages);

    Ok(())
}
