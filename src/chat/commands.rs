//! Slash command handlers for the chat REPL.
//!
//! Dispatches `/help`, `/history` and `/tools`. Commands are handled
//! locally and never reach the model.

use colored::Colorize;

use crate::conversation::Conversation;
use crate::format;
use crate::tools::ToolRegistry;

/// Action returned by slash command handling.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CommandAction {
    /// Command was handled; continue the REPL loop.
    Continue,
    /// Unknown command was entered.
    Unknown(String),
}

pub(crate) fn handle_slash_command(
    command: &str,
    conversation: &Conversation,
    tools: &ToolRegistry,
) -> CommandAction {
    match command {
        "/history" => {
            for msg in conversation.visible() {
                println!("{}", format::format_message(msg));
                println!();
            }
            CommandAction::Continue
        }
        "/tools" => {
            print_catalog(tools);
            CommandAction::Continue
        }
        "/help" => {
            println!("{}", "Commands:".bold());
            println!("  {} - show conversation history", "/history".cyan());
            println!("  {} - list the tools the model can call", "/tools".cyan());
            println!("  {} - show this help", "/help".cyan());
            println!("  {} - leave (or Ctrl+D)", "exit".cyan());
            println!();
            println!("{}", "Ctrl+C interrupts a running turn.".dimmed());
            CommandAction::Continue
        }
        other => CommandAction::Unknown(other.to_string()),
    }
}

/// Prints every registered tool with its description, in registration order.
pub(crate) fn print_catalog(tools: &ToolRegistry) {
    for def in tools.definitions() {
        println!("{}", def.name.green().bold());
        println!("  {}", def.description.dimmed());
    }
}
