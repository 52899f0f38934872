//! Append-only audit log.
//!
//! One JSON object per line at `$HOME/.shellshield/audit.log` (overridable
//! via `SHELLSHIELD_AUDIT_PATH`). Logging is best-effort by contract: a
//! failed write is swallowed, because the gate must not fail open — or
//! block a healthy command — just because its log is unwritable.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::analyzer::Decision;
use crate::config::Mode;

/// Overrides the audit log location.
pub const ENV_AUDIT_PATH: &str = "SHELLSHIELD_AUDIT_PATH";

/// Final outcome recorded for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditDecision {
    /// No rule fired.
    Allowed,
    /// A rule fired but permissive mode let it through.
    Warn,
    /// A rule fired and the operator approved interactively.
    Approved,
    /// A rule fired and the command was blocked.
    Blocked,
}

/// Which entry shape produced the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSource {
    Check,
    Paste,
    Stdin,
    Run,
}

/// One audit log record.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub timestamp: String,
    pub command: String,
    pub blocked: bool,
    pub decision: AuditDecision,
    pub mode: String,
    pub source: AuditSource,
    pub rule: String,
    pub reason: String,
    pub suggestion: String,
    pub cwd: String,
}

impl AuditEntry {
    /// Build an entry from an analyzer decision and its outcome.
    #[must_use]
    pub fn new(
        command: &str,
        analysis: &Decision,
        outcome: AuditDecision,
        mode: Mode,
        source: AuditSource,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            command: command.to_string(),
            blocked: analysis.blocked,
            decision: outcome,
            mode: mode.label().to_string(),
            source,
            rule: analysis.rule.clone(),
            reason: analysis.reason.clone(),
            suggestion: analysis.suggestion.clone(),
            cwd: env::current_dir()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Serialize to one JSON line.
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Resolve the audit log path: env override, else `~/.shellshield/audit.log`.
#[must_use]
pub fn audit_path() -> Option<PathBuf> {
    if let Ok(p) = env::var(ENV_AUDIT_PATH) {
        if !p.trim().is_empty() {
            return Some(PathBuf::from(p.trim()));
        }
    }
    dirs::home_dir().map(|h| h.join(".shellshield").join("audit.log"))
}

/// Append an entry. All failures are swallowed.
pub fn append(entry: &AuditEntry) {
    let Some(path) = audit_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = writeln!(file, "{}", entry.to_json_line());
}
