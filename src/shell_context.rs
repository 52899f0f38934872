//! Shell-context snapshot lookup.
//!
//! An external producer captures `type <cmd>` output for the interactive
//! shell's aliases and functions into a snapshot file. The analyzer only
//! reads it, and only to answer one question: does a benign-looking name
//! resolve to an alias or function whose body references a blocked token?
//!
//! The snapshot is either a whole-file JSON map (`name -> entry`) or one
//! JSON record per line (`{"name": ..., ...}`). A missing or unreadable
//! snapshot disables the check; it never fails an analysis.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// How the shell resolves a command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Alias,
    Function,
    Builtin,
    File,
}

/// One resolved command name from the snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct ShellContextEntry {
    pub kind: ContextKind,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "referencedTokens", default)]
    pub referenced_tokens: HashSet<String>,
}

/// A line-oriented snapshot record carrying its own name.
#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
    #[serde(flatten)]
    entry: ShellContextEntry,
}

/// The loaded snapshot: command name to resolution.
#[derive(Debug, Clone, Default)]
pub struct ShellContext {
    entries: HashMap<String, ShellContextEntry>,
}

impl ShellContext {
    /// Load a snapshot from `path`. Returns `None` when the file is
    /// missing or holds no parseable records.
    #[must_use]
    pub fn load(path: &Path) -> Option<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "shell-context snapshot unreadable");
                return None;
            }
        };
        let ctx = Self::parse(&raw);
        if ctx.entries.is_empty() { None } else { Some(ctx) }
    }

    /// Parse snapshot text: whole-file map first, JSON-lines fallback.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Ok(entries) = serde_json::from_str::<HashMap<String, ShellContextEntry>>(raw) {
            return Self { entries };
        }
        let mut entries = HashMap::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<NamedEntry>(line) {
                Ok(named) => {
                    entries.insert(named.name, named.entry);
                }
                Err(e) => debug!(error = %e, "skipping malformed snapshot record"),
            }
        }
        Self { entries }
    }

    /// Look up a resolved command name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ShellContextEntry> {
        self.entries.get(name)
    }

    /// If `name` is an alias or function whose body references a blocked
    /// token, return the first such token.
    #[must_use]
    pub fn blocked_reference<'a>(
        &'a self,
        name: &str,
        blocked: &HashSet<String>,
    ) -> Option<&'a str> {
        let entry = self.lookup(name)?;
        if !matches!(entry.kind, ContextKind::Alias | ContextKind::Function) {
            return None;
        }
        entry
            .referenced_tokens
            .iter()
            .find(|t| blocked.contains(*t))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocked() -> HashSet<String> {
        ["rm", "shred"].into_iter().map(str::to_string).collect()
    }

    #[test]
    fn parses_whole_file_map() {
        let raw = r#"{
            "cleanup": {"kind": "alias", "body": "rm -rf --", "referencedTokens": ["rm"]},
            "ll": {"kind": "alias", "body": "ls -la", "referencedTokens": ["ls"]}
        }"#;
        let ctx = ShellContext::parse(raw);
        assert_eq!(ctx.lookup("cleanup").unwrap().kind, ContextKind::Alias);
        assert_eq!(ctx.blocked_reference("cleanup", &blocked()), Some("rm"));
        assert_eq!(ctx.blocked_reference("ll", &blocked()), None);
    }

    #[test]
    fn parses_json_lines() {
        let raw = concat!(
            r#"{"name": "wipe", "kind": "function", "body": "shred -u \"$@\"", "referencedTokens": ["shred"]}"#,
            "\n",
            r#"{"name": "gs", "kind": "alias", "body": "git status", "referencedTokens": ["git"]}"#,
            "\n",
        );
        let ctx = ShellContext::parse(raw);
        assert_eq!(ctx.blocked_reference("wipe", &blocked()), Some("shred"));
        assert_eq!(ctx.blocked_reference("gs", &blocked()), None);
    }

    #[test]
    fn builtins_and_files_never_flag() {
        let raw = r#"{"cd": {"kind": "builtin", "body": "", "referencedTokens": ["rm"]},
                      "rm": {"kind": "file", "body": "/bin/rm", "referencedTokens": ["rm"]}}"#;
        let ctx = ShellContext::parse(raw);
        assert_eq!(ctx.blocked_reference("cd", &blocked()), None);
        assert_eq!(ctx.blocked_reference("rm", &blocked()), None);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let raw = "not json\n{\"name\": \"z\", \"kind\": \"alias\", \"referencedTokens\": [\"rm\"]}\n";
        let ctx = ShellContext::parse(raw);
        assert_eq!(ctx.blocked_reference("z", &blocked()), Some("rm"));
    }

    #[test]
    fn unknown_name_is_none() {
        let ctx = ShellContext::parse("{}");
        assert!(ctx.lookup("anything").is_none());
    }
}
