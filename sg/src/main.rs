//! subgoal - goal decomposition service
//!
//! CLI entry point for serving the planning endpoints.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};
use eyre::{Context, Result};
use tracing::{debug, info};

use subgoal::cli::{Cli, Command, generate_after_help, get_log_path};
use subgoal::completion::CompletionClient;
use subgoal::config::{Config, Secrets};
use subgoal::llm::create_client;
use subgoal::planning::Planner;
use subgoal::prompts::{PromptBuilder, PromptLoader};
use subgoal::server;
use subgoal::tokens::TokenCounter;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Build command with dynamic after_help that shows secret status
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, model = %config.active_model(), "subgoal loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Serve { bind, port }) => cmd_serve(&config, bind, port).await,
        Some(Command::Tokens { file }) => cmd_tokens(file),
        None => {
            debug!("main: no command specified, serving");
            cmd_serve(&config, None, None).await
        }
    }
}

/// Build the planning pipeline and serve it until Ctrl+C
async fn cmd_serve(config: &Config, bind: Option<String>, port: Option<u16>) -> Result<()> {
    debug!(?bind, ?port, "cmd_serve: called");

    // Fail fast: nothing is served without both credentials
    let secrets = Secrets::from_env(config).context("Missing provider credentials")?;

    let llm = create_client(config, &secrets).context("Failed to create LLM client")?;
    let prompts = PromptBuilder::new(&PromptLoader::from_dir(config.prompts.dir.as_deref()))
        .context("Failed to load prompt templates")?;
    let tokens = TokenCounter::new()?;

    let completion = CompletionClient::new(llm)
        .with_retry(config.retry.policy())
        .with_max_prompt_chars(config.llm.max_prompt_chars)
        .with_token_counter(tokens);
    let planner = Planner::new(completion, prompts, config.active_model()).with_temperature(config.llm.temperature);

    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let port = port.unwrap_or(config.server.port);
    info!(
        %bind,
        port,
        timeout = ?Duration::from_millis(config.llm.timeout_ms),
        "cmd_serve: starting"
    );
    println!("subgoal listening on http://{}:{}", bind, port);

    server::run_serve(Arc::new(planner), &bind, port).await
}

/// Print the token count of a file or stdin
fn cmd_tokens(file: Option<PathBuf>) -> Result<()> {
    debug!(?file, "cmd_tokens: called");
    let text = match file {
        Some(path) => fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
            buf
        }
    };

    let counter = TokenCounter::new()?;
    println!("{}", counter.count(&text));
    Ok(())
}
