// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remora, a demonstration chatbot with long-term memory and
//! freshness-aware web caching.
//!
//! Binary entry point: loads and validates configuration, initializes
//! tracing, and dispatches to the serve / shell / status subcommands.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod serve;
mod shell;
mod status;

/// Remora, a chatbot that remembers and knows when its web cache is stale.
#[derive(Parser, Debug)]
#[command(name = "remora", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Launch an interactive REPL session.
    Shell,
    /// Show configuration and store statistics.
    Status {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match remora_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            remora_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.agent.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Shell) => shell::run_shell(config).await,
        Some(Commands::Status { json }) => status::run_status(&config, json).await,
        None => {
            println!("remora: use --help for available commands");
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("remora: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    #[serial_test::serial]
    fn binary_loads_config_defaults() {
        let config = remora_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.agent.name, "remora");
    }
}
