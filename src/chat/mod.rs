//! Interactive chat REPL for relay.
//!
//! Reads lines with [`rustyline`] (history, line editing) and hands each one
//! to an [`Agent`]. The full conversation is sent with each request so the
//! model keeps context across turns; nothing outlives the process except
//! the readline history.
//!
//! # Readline behavior
//!
//! - **Ctrl+C** at the prompt: clears the line, stays in the REPL
//! - **Ctrl+C** during a turn: interrupts the turn, keeps the session
//! - **Ctrl+D** or `exit`: leaves with "goodbye."
//! - Readline history is persisted to `~/.cache/relay/chat_history.txt`

mod commands;

pub(crate) use commands::print_catalog;

use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio_util::sync::CancellationToken;

use crate::agent::{Agent, Input, TurnOutcome};
use crate::config::Config;
use crate::output::{Renderer, StdoutRenderer};

/// Runs one user turn with Ctrl+C wired to its cancellation token.
pub(crate) async fn run_interruptible(
    agent: &mut Agent<'_>,
    input: &str,
    renderer: &mut dyn Renderer,
) -> TurnOutcome {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };
    let outcome = agent.run_turn(input, renderer, &cancel).await;
    watcher.abort();
    outcome
}

/// Runs the interactive chat REPL until `exit` or end of input.
pub async fn run_chat(config: &Config, mut agent: Agent<'_>) -> Result<()> {
    println!(
        "{} [model: {}] [tools: {}] (type 'exit' or Ctrl+D to quit, /help for commands)",
        "relay chat".bold().cyan(),
        config.model.yellow(),
        agent.tools().len(),
    );
    println!();

    let mut rl = DefaultEditor::new().context("Failed to initialize line editor")?;
    let history_path = Config::cache_dir()?.join(crate::constants::HISTORY_FILENAME);
    if history_path.exists() {
        if let Err(e) = rl.load_history(&history_path) {
            tracing::debug!(error = %e, path = %history_path.display(), "could not load readline history");
        }
    }

    let mut renderer = StdoutRenderer::new();

    loop {
        let line = match rl.readline(&format!("{} ", ">".green().bold())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "goodbye.".dimmed());
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        };

        match Input::classify(Some(line.as_str())) {
            Input::Empty => continue,
            Input::Exit => {
                println!("{}", "goodbye.".dimmed());
                break;
            }
            Input::Command(cmd) => {
                if let commands::CommandAction::Unknown(cmd) =
                    commands::handle_slash_command(cmd, agent.conversation(), agent.tools())
                {
                    println!("{} Unknown command: {}", "?".yellow(), cmd);
                }
            }
            Input::Prompt(prompt) => {
                let _ = rl.add_history_entry(prompt);
                println!();
                let outcome = run_interruptible(&mut agent, prompt, &mut renderer).await;
                if let Some(msg) = outcome.failure_message() {
                    renderer.render_error(&msg);
                }
                println!();
            }
        }
    }

    agent.terminate();

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    if let Err(e) = rl.save_history(&history_path) {
        tracing::warn!(error = %e, "could not save readline history");
    }

    Ok(())
}
