//! Command-line interface definition and dispatch for relay.
//!
//! Uses [`clap`] for argument parsing with derive macros. With no subcommand
//! relay starts the interactive chat.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::agent::Agent;
use crate::chat;
use crate::config::{Config, Overrides};
use crate::conversation::Conversation;
use crate::output::StdoutRenderer;
use crate::provider::OpenAiClient;
use crate::tools::ToolRegistry;

/// Top-level CLI structure for relay.
#[derive(Parser)]
#[command(
    name = "relay",
    version,
    about = "A terminal assistant that lets a chat model call local tools"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use (overrides config and OPENAI_MODEL)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Chat-completions base URL (overrides config and OPENAI_API_BASE)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Maximum tool rounds per user turn
    #[arg(long, global = true)]
    pub max_rounds: Option<usize>,
}

/// Available subcommands. The `///` doc comments double as `--help` text.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start an interactive chat session (default)
    Chat,
    /// Run a single turn and exit
    Ask {
        /// The question to ask
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// List the tools the model can call
    Tools,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            max_tool_rounds: self.max_rounds,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

/// Dispatches the parsed CLI command to its handler.
///
/// Configuration and the tool registry are built once here; a missing API
/// key fails before any prompt is shown.
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    config.apply_overrides(cli.overrides())?;

    let project_root = std::env::current_dir().context("Failed to read working directory")?;
    let tools = ToolRegistry::with_builtins(project_root, &config.gitlab)?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Tools => {
            chat::print_catalog(&tools);
            Ok(())
        }
        Commands::Ask { prompt } => {
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                anyhow::bail!("No prompt provided. Usage: relay ask \"your question here\"");
            }

            let client = OpenAiClient::from_config(&config)?;
            println!("{} [model: {}]", "relay".bold().cyan(), client.model().yellow());
            println!();

            let mut agent = new_agent(&config, &client, &tools);
            let mut renderer = StdoutRenderer::new();
            let outcome = chat::run_interruptible(&mut agent, &prompt, &mut renderer).await;
            match outcome.failure_message() {
                None => Ok(()),
                Some(msg) => anyhow::bail!("{msg}"),
            }
        }
        Commands::Chat => {
            let client = OpenAiClient::from_config(&config)?;
            let agent = new_agent(&config, &client, &tools);
            chat::run_chat(&config, agent).await
        }
    }
}

fn new_agent<'a>(config: &Config, client: &'a OpenAiClient, tools: &'a ToolRegistry) -> Agent<'a> {
    Agent::new(
        client,
        tools,
        Conversation::new(config.system_prompt.clone()),
        config.max_tool_rounds,
    )
}
