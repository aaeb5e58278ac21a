//! Terminal formatting for transcript output.

use colored::Colorize;

use crate::constants::TOOL_PREVIEW_WIDTH;
use crate::message::{Message, Role};

/// Format a message for terminal display with a colored role label.
pub fn format_message(msg: &Message) -> String {
    let label = role_label(msg.role);
    let body = match msg.role {
        Role::User => msg.text().to_string(),
        Role::Assistant => {
            let mut body = render_markdown_lite(msg.text());
            for call in &msg.tool_calls {
                if !body.is_empty() {
                    body.push('\n');
                }
                body.push_str(&format_tool_call(&call.name, &call.arguments));
            }
            body
        }
        Role::Tool | Role::System => msg.text().dimmed().to_string(),
    };
    format!("{}\n{}", label, body)
}

pub fn role_label(role: Role) -> String {
    let label = format!("{}:", role);
    match role {
        Role::User => label.blue().bold().to_string(),
        Role::Assistant => label.yellow().bold().to_string(),
        Role::Tool => label.green().to_string(),
        Role::System => label.dimmed().to_string(),
    }
}

/// `name(arguments)` as shown when the model requests a tool.
pub fn format_tool_call(name: &str, arguments: &str) -> String {
    format!("{}({})", name.green(), arguments.trim())
}

/// First line of a tool result, cut to the preview width.
pub fn preview(text: &str) -> String {
    let first = text.lines().next().unwrap_or("").trim_end();
    let more_lines = text.lines().nth(1).is_some();
    let mut out: String = first.chars().take(TOOL_PREVIEW_WIDTH).collect();
    if more_lines || first.chars().count() > TOOL_PREVIEW_WIDTH {
        out.push_str(" …");
    }
    out
}

/// Minimal markdown renderer for terminal output.
/// Fenced code blocks and `inline code` are dimmed, **bold** is bolded.
pub fn render_markdown_lite(text: &str) -> String {
    let mut lines = Vec::new();
    let mut in_fence = false;

    for line in text.lines() {
        if let Some(lang) = line.trim_start().strip_prefix("```") {
            in_fence = !in_fence;
            if in_fence && !lang.trim().is_empty() {
                lines.push(format!("  {}", lang.trim().dimmed()));
            }
            continue;
        }
        if in_fence {
            lines.push(format!("  {}", line.dimmed()));
        } else {
            lines.push(render_inline(line));
        }
    }
    lines.join("\n")
}

/// Odd segments between backticks are code; within the rest, odd segments
/// between `**` are bold. Unbalanced markers are left as typed.
fn render_inline(line: &str) -> String {
    if line.matches('`').count() % 2 != 0 {
        return render_bold(line);
    }
    line.split('`')
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 1 {
                part.dimmed().to_string()
            } else {
                render_bold(part)
            }
        })
        .collect()
}

fn render_bold(text: &str) -> String {
    if text.matches("**").count() % 2 != 0 {
        return text.to_string();
    }
    text.split("**")
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 1 {
                part.bold().to_string()
            } else {
                part.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain<T>(f: impl FnOnce() -> T) -> T {
        colored::control::set_override(false);
        f()
    }

    #[test]
    fn markdown_markers_are_stripped() {
        plain(|| {
            assert_eq!(
                render_markdown_lite("use **this** and `that`"),
                "use this and that"
            );
        });
    }

    #[test]
    fn unbalanced_markers_are_kept() {
        plain(|| {
            assert_eq!(render_markdown_lite("a ` b"), "a ` b");
            assert_eq!(render_markdown_lite("2 ** 3"), "2 ** 3");
        });
    }

    #[test]
    fn code_fences_are_indented() {
        plain(|| {
            let out = render_markdown_lite("before\n```rust\nfn main() {}\n```\nafter");
            assert_eq!(out, "before\n  rust\n  fn main() {}\nafter");
        });
    }

    #[test]
    fn preview_keeps_first_line_only() {
        assert_eq!(preview("one\ntwo"), "one …");
        assert_eq!(preview("short"), "short");
        let long = "x".repeat(TOOL_PREVIEW_WIDTH + 5);
        assert_eq!(preview(&long).chars().count(), TOOL_PREVIEW_WIDTH + 2);
    }
}
