//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::Config;

/// subgoal - goal decomposition service
#[derive(Parser)]
#[command(
    name = "sg",
    about = "Break goals into sub-problems, options and reports with an LLM",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Address to bind (overrides config)
        #[arg(short, long)]
        bind: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Count cl100k_base tokens in a file (or stdin)
    Tokens {
        /// File to read; stdin when omitted
        file: Option<PathBuf>,
    },
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("subgoal")
        .join("logs")
        .join("subgoal.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with secret checks and the log location
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let defaults = Config::default();
    let mut help = String::new();

    help.push_str("Required Secrets:\n");
    for name in [&defaults.openai.api_key_env, &defaults.huggingface.token_env] {
        let set = std::env::var(name).map(|v| !v.trim().is_empty()).unwrap_or(false);
        let icon = if set { "\u{2705}" } else { "\u{274C}" };
        let status = if set { "set" } else { "not set" };
        help.push_str(&format!("  {} {:<10} {}\n", icon, name, status));
    }

    help.push('\n');
    help.push_str(&format!("Logs: {}\n", get_log_path().display()));
    help
}
