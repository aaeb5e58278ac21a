//! Output rendering abstraction for relay.
//!
//! The conversation loop reports everything the operator should see through
//! [`Renderer`], so the loop never prints directly. [`StdoutRenderer`] writes
//! the colored transcript to the terminal.

use colored::Colorize;

use crate::format;
use crate::message::Role;

pub trait Renderer {
    /// Assistant text for the current turn (never called with empty text).
    fn assistant_text(&mut self, text: &str);

    /// The model asked for a tool; called before it runs.
    fn tool_start(&mut self, name: &str, arguments: &str);

    /// A tool finished; `content` is what the model will see.
    fn tool_result(&mut self, name: &str, content: &str);

    /// A recoverable failure the operator should know about.
    fn render_error(&mut self, err: &str);
}

/// Renders the transcript to stdout and errors to stderr.
pub struct StdoutRenderer;

impl StdoutRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for StdoutRenderer {
    fn assistant_text(&mut self, text: &str) {
        println!(
            "{} {}",
            format::role_label(Role::Assistant),
            format::render_markdown_lite(text)
        );
    }

    fn tool_start(&mut self, name: &str, arguments: &str) {
        println!(
            "{} {}",
            format::role_label(Role::Tool),
            format::format_tool_call(name, arguments)
        );
    }

    fn tool_result(&mut self, _name: &str, content: &str) {
        println!("  {}", format::preview(content).dimmed());
    }

    fn render_error(&mut self, err: &str) {
        eprintln!("{} {}", "error:".red().bold(), err);
    }
}
