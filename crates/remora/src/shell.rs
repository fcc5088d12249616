// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `remora shell` command implementation.
//!
//! Interactive REPL with a colored prompt and readline history. Each
//! reply is followed by a dimmed line showing the freshness verdict so
//! the cache behavior is visible while chatting.

use std::sync::Arc;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use remora_agent::{Agent, ExtractiveProvider, TurnRequest};
use remora_config::model::RemoraConfig;
use remora_core::traits::SystemClock;
use remora_core::RemoraError;

/// Run the interactive REPL. One session per invocation.
pub async fn run_shell(config: RemoraConfig) -> Result<(), RemoraError> {
    let agent = Agent::new(
        config,
        Arc::new(ExtractiveProvider::new()),
        Arc::new(SystemClock),
    )
    .await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| RemoraError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "remora shell".bold().green());
    println!("Type {} to exit.\n", "/quit".yellow());

    let prompt = format!("{}> ", "remora".green());
    let mut session_id: Option<String> = None;

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let outcome = agent
                    .chat(TurnRequest {
                        session_id: session_id.clone(),
                        channel: "cli".to_string(),
                        message: trimmed.to_string(),
                    })
                    .await;

                match outcome {
                    Ok(outcome) => {
                        session_id = Some(outcome.session_id.clone());
                        println!("{}", outcome.reply);
                        match &outcome.decision {
                            Some(decision) => println!(
                                "{}",
                                format!(
                                    "[{} | refresh: {} | {}]",
                                    outcome.category, decision.needs_refresh, decision.reason
                                )
                                .dimmed()
                            ),
                            None => println!(
                                "{}",
                                "[personal query, answered from profile]".dimmed()
                            ),
                        }
                        println!();
                    }
                    Err(err) => {
                        eprintln!("{} {err}", "error:".red());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                debug!("readline interrupted");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                return Err(RemoraError::Internal(format!("readline error: {e}")));
            }
        }
    }

    agent.close().await?;
    println!("bye");
    Ok(())
}
