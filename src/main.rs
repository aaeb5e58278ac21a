//! Entry point for relay, a terminal assistant that lets a chat model call
//! local tools.
//!
//! This binary loads environment variables, sets up logging, parses CLI
//! arguments via [`cli`], and dispatches to the chosen subcommand.

mod agent;
mod chat;
mod cli;
mod config;
mod constants;
mod conversation;
mod error;
mod format;
mod logging;
mod message;
mod output;
mod provider;
mod tools;

use anyhow::Result;

/// Runs the relay CLI.
///
/// Loads `.env` files (silently ignored if absent) before anything reads the
/// environment.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();
    let cli = cli::parse();
    cli::run(cli).await
}
