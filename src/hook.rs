//! Tool-hook input parsing and operator-facing block output.
//!
//! Hook input arrives on stdin as JSON, either the coding-agent shape
//! `{"tool_input": {"command": "..."}}` or the bare `{"command": "..."}`.
//! Block output goes to stderr as a bordered, colored notice; the JSON
//! protocol is the exit code. The notice always contains the decision's
//! reason and suggestion verbatim so wrappers can scrape them.

use colored::Colorize;
use serde::Deserialize;
use std::io::{self, IsTerminal, Write};

use crate::analyzer::Decision;

/// Hook input, agent shape.
#[derive(Debug, Deserialize)]
struct HookInput {
    tool_input: Option<ToolInput>,
    command: Option<String>,
}

/// Tool-specific input containing the command to execute.
#[derive(Debug, Deserialize)]
struct ToolInput {
    command: Option<String>,
}

/// Extract the command from hook JSON; `None` when neither shape matches.
#[must_use]
pub fn extract_command(input: &str) -> Option<String> {
    let parsed: HookInput = serde_json::from_str(input).ok()?;
    if let Some(tool_input) = parsed.tool_input {
        if let Some(command) = tool_input.command {
            return Some(command);
        }
    }
    parsed.command
}

/// Disable colors when stderr is not a terminal.
pub fn configure_colors() {
    if !io::stderr().is_terminal() {
        colored::control::set_override(false);
    }
}

const NOTICE_WIDTH: usize = 72;

fn print_notice(header: &str, command: &str, decision: &Decision, blocked: bool) {
    let stderr = io::stderr();
    let mut handle = stderr.lock();

    let border = "─".repeat(NOTICE_WIDTH);
    let paint = |s: &str| {
        if blocked {
            s.red().bold()
        } else {
            s.yellow().bold()
        }
    };

    let _ = writeln!(handle, "\n{}", paint(&border));
    let _ = writeln!(
        handle,
        "{}  {}",
        if blocked {
            header.white().on_red().bold()
        } else {
            header.black().on_yellow().bold()
        },
        "shellshield".bold()
    );
    let _ = writeln!(handle, "{}", paint(&border));

    // Reason and suggestion go out unwrapped: wrappers scrape them as
    // contiguous substrings, so they must survive verbatim on one line.
    let _ = writeln!(
        handle,
        "{}  {}",
        "Reason:".yellow().bold(),
        decision.reason.white()
    );

    let display_cmd = if command.chars().count() > 60 {
        let truncated: String = command.chars().take(57).collect();
        format!("{truncated}...")
    } else {
        command.to_string()
    };
    let _ = writeln!(
        handle,
        "{} {}",
        "Command:".cyan().bold(),
        display_cmd.bright_white().italic()
    );

    let _ = writeln!(
        handle,
        "{}     {}",
        "Try:".green().bold(),
        decision.suggestion.white()
    );

    if !decision.rule.is_empty() {
        let _ = writeln!(handle, "{}    {}", "Rule:".bright_black(), decision.rule.bright_black());
    }
    let _ = writeln!(handle, "{}\n", paint(&border));
}

/// Print the blocking notice for a denied command.
pub fn print_block(command: &str, decision: &Decision) {
    print_notice("BLOCKED", command, decision, true);
}

/// Print the advisory notice used by permissive mode.
pub fn print_warning(command: &str, decision: &Decision) {
    print_notice("WARNING", command, decision, false);
}
