//! shellshield binary: the pre-execution gate.
//!
//! Entry shapes:
//!   - hook mode (default): read JSON from stdin, analyze the command,
//!     exit 0 to allow or 2 to block (block notice on stderr)
//!   - `--check "<cmd>"`: analyze one command from the flag
//!   - `--paste`: analyze each non-empty stdin line, first block wins
//!
//! `SHELLSHIELD_SKIP` (1/true/yes/on/enable/enabled) bypasses analysis.
//!
//! # Performance
//!
//! The gate runs in front of every command, so the common path must be
//! cheap: a quick-reject scan allows plain commands without touching the
//! analyzer at all. The scan is conservative — it only short-circuits
//! when no rule could possibly fire.

use clap::Parser;
use memchr::memmem;
use std::io::{self, IsTerminal, Read};
use std::process;

use shellshield::analyzer::{Analyzer, Decision};
use shellshield::audit::{self, AuditDecision, AuditEntry, AuditSource};
use shellshield::cli::Cli;
use shellshield::config::{Config, Mode};
use shellshield::git::SystemGit;
use shellshield::hook;
use shellshield::patterns::MAX_INPUT_LENGTH;

/// Shell metacharacters that take a command off the fast path.
const META_CHARS: &[char] = &[
    '$', '|', '&', ';', '>', '<', '`', '\\', '(', ')', '~', '=', '\'', '"',
];

/// Substrings that can implicate a rule regardless of config.
const STATIC_NEEDLES: &[&str] = &[
    "dd", "mv", "cp", "chmod", "chown", "chgrp", "systemctl", "find", "curl", "wget",
    "powershell", "base64", "xxd", "eval", "sed", "awk", "openssl", "tar", ".bashrc", ".zshrc",
    ".profile", ".gitconfig", ".ssh",
];

/// Conservative fast path: true only when no rule could possibly fire.
fn quick_allow(command: &str, config: &Config) -> bool {
    if !config.custom_rules.is_empty() || config.context_path.is_some() {
        return false;
    }
    if command.len() > MAX_INPUT_LENGTH || !command.is_ascii() {
        return false;
    }
    if command
        .chars()
        .any(|c| c.is_ascii_control() && !matches!(c, '\t' | '\n' | '\r'))
    {
        return false;
    }
    if command.contains(META_CHARS) {
        return false;
    }

    let lower = command.to_lowercase();
    let bytes = lower.as_bytes();
    for needle in STATIC_NEEDLES {
        if memmem::find(bytes, needle.as_bytes()).is_some() {
            return false;
        }
    }
    for needle in &config.blocked {
        if memmem::find(bytes, needle.as_bytes()).is_some() {
            return false;
        }
    }
    true
}

/// Analyze one command, apply the mode mapping, audit, and return the
/// exit code (0 allow, 2 block).
fn gate(analyzer: &Analyzer<'_>, config: &Config, command: &str, source: AuditSource) -> i32 {
    // Unknown faults fail open: an advisory gate must not brick the shell.
    // Recognized attack surfaces (over-length, malformed syntax, depth
    // overrun) block inside the analyzer instead.
    let decision =
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| analyzer.analyze(command)))
            .unwrap_or_else(|_| Decision::allowed());

    if !decision.is_blocked() {
        audit::append(&AuditEntry::new(
            command,
            &decision,
            AuditDecision::Allowed,
            config.mode,
            source,
        ));
        return 0;
    }

    match config.mode {
        Mode::Enforce => {
            hook::print_block(command, &decision);
            audit::append(&AuditEntry::new(
                command,
                &decision,
                AuditDecision::Blocked,
                config.mode,
                source,
            ));
            2
        }
        Mode::Permissive => {
            hook::print_warning(command, &decision);
            audit::append(&AuditEntry::new(
                command,
                &decision,
                AuditDecision::Warn,
                config.mode,
                source,
            ));
            0
        }
        Mode::Interactive => {
            hook::print_block(command, &decision);
            if prompt_approval() {
                audit::append(&AuditEntry::new(
                    command,
                    &decision,
                    AuditDecision::Approved,
                    config.mode,
                    source,
                ));
                0
            } else {
                audit::append(&AuditEntry::new(
                    command,
                    &decision,
                    AuditDecision::Blocked,
                    config.mode,
                    source,
                ));
                2
            }
        }
    }
}

/// Ask the operator whether to proceed. Non-TTY defaults to no.
fn prompt_approval() -> bool {
    if !io::stdin().is_terminal() {
        return false;
    }
    eprint!("Proceed anyway? [y/N] ");
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn main() {
    hook::configure_colors();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help/--version land here too; only real usage errors are 1.
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            process::exit(code);
        }
    };

    // Escape hatch: skip analysis entirely.
    if Config::is_bypassed() {
        return;
    }

    let config = Config::load();
    let git = SystemGit;
    let analyzer = Analyzer::new(&config, &git);

    if let Some(command) = cli.check.as_deref() {
        process::exit(gate(&analyzer, &config, command, AuditSource::Check));
    }

    if cli.paste {
        let mut input = String::new();
        if io::stdin().read_to_string(&mut input).is_err() {
            return;
        }
        for line in input.split(['\r', '\n']) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let code = gate(&analyzer, &config, line, AuditSource::Paste);
            if code != 0 {
                process::exit(code);
            }
        }
        return;
    }

    // Hook mode: JSON on stdin; empty stdin means nothing to gate.
    let mut input = String::new();
    if io::stdin().read_to_string(&mut input).is_err() {
        return;
    }
    if input.trim().is_empty() {
        return;
    }
    let Some(command) = hook::extract_command(&input) else {
        // Unknown input shape: fail open, this is an advisory gate.
        return;
    };
    if command.is_empty() {
        return;
    }

    if quick_allow(&command, &config) {
        audit::append(&AuditEntry::new(
            &command,
            &Decision::allowed(),
            AuditDecision::Allowed,
            config.mode,
            AuditSource::Stdin,
        ));
        return;
    }

    process::exit(gate(&analyzer, &config, &command, AuditSource::Stdin));
}
