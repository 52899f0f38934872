//! Git working-copy status, batched.
//!
//! The uncommitted-changes guard needs to know which of a command's file
//! targets carry uncommitted modifications. That is answered with a single
//! `git status --porcelain -- <path>…` invocation per command, never one
//! process per file. The trait exists so tests can stub the answer.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Answers "which of these paths are dirty in their working copy?".
pub trait GitStatus {
    /// Returns the subset of `paths` with uncommitted changes. Paths
    /// outside any git working copy are never returned.
    fn dirty_paths(&self, paths: &[PathBuf]) -> HashSet<PathBuf>;
}

/// Production implementation backed by the `git` binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl GitStatus for SystemGit {
    fn dirty_paths(&self, paths: &[PathBuf]) -> HashSet<PathBuf> {
        if paths.is_empty() {
            return HashSet::new();
        }

        let output = Command::new("git")
            .arg("status")
            .arg("--porcelain")
            .arg("--")
            .args(paths)
            .output();

        let Ok(output) = output else {
            return HashSet::new();
        };
        if !output.status.success() {
            // Not a repository, or git is unhappy; the guard stays quiet.
            return HashSet::new();
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let dirty: HashSet<PathBuf> = stdout.lines().filter_map(parse_porcelain_line).collect();

        // Porcelain paths are repo-relative; match against the requested
        // paths by normalized suffix so `./file.txt` and `file.txt` agree.
        paths
            .iter()
            .filter(|p| {
                let requested = normalize_for_match(p);
                dirty.iter().any(|d| {
                    let reported = normalize_for_match(d);
                    requested == reported
                        || requested.ends_with(&format!("/{reported}"))
                        || reported.ends_with(&format!("/{requested}"))
                })
            })
            .cloned()
            .collect()
    }
}

/// Extract the path from one `git status --porcelain` line.
///
/// Format: two status columns, a space, then the path; renames are
/// `old -> new` and the new name is the dirty one.
fn parse_porcelain_line(line: &str) -> Option<PathBuf> {
    if line.len() < 4 {
        return None;
    }
    let path = &line[3..];
    let path = path.rsplit(" -> ").next().unwrap_or(path);
    let path = path.trim().trim_matches('"');
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

fn normalize_for_match(p: &Path) -> String {
    let s = p.to_string_lossy().replace('\\', "/");
    s.strip_prefix("./").unwrap_or(&s).trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modified_line() {
        assert_eq!(
            parse_porcelain_line(" M src/lib.rs"),
            Some(PathBuf::from("src/lib.rs"))
        );
    }

    #[test]
    fn parses_untracked_line() {
        assert_eq!(
            parse_porcelain_line("?? notes.txt"),
            Some(PathBuf::from("notes.txt"))
        );
    }

    #[test]
    fn rename_reports_new_name() {
        assert_eq!(
            parse_porcelain_line("R  old.rs -> new.rs"),
            Some(PathBuf::from("new.rs"))
        );
    }

    #[test]
    fn short_lines_are_ignored() {
        assert_eq!(parse_porcelain_line(""), None);
        assert_eq!(parse_porcelain_line("M"), None);
    }

    #[test]
    fn normalization_strips_dot_slash() {
        assert_eq!(normalize_for_match(Path::new("./a/b.txt")), "a/b.txt");
    }

    #[test]
    fn empty_input_spawns_nothing() {
        assert!(SystemGit.dirty_paths(&[]).is_empty());
    }
}
