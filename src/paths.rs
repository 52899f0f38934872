//! Critical-path and sensitive-path classification.
//!
//! Critical paths are OS install roots (Unix and Windows) plus `.git`
//! directories; sensitive paths are per-user dotfiles and key material
//! under `~`. Both classifiers normalize before matching so `C:\Windows\`
//! and `c:/windows` agree.

use crate::patterns::{CRITICAL_PATHS, SENSITIVE_HOME_PATHS, SENSITIVE_HOME_TREES};

/// Normalize a path for set membership: forward slashes, lowercase,
/// trailing slashes stripped (the bare root keeps its slash).
fn normalize(path: &str) -> String {
    let mut p = path.replace('\\', "/").to_lowercase();
    while p.len() > 1 && p.ends_with('/') {
        p.pop();
    }
    p
}

/// Returns true when deleting or overwriting `path` would damage the OS
/// install or a repository's version-control root.
#[must_use]
pub fn is_critical_path(path: &str) -> bool {
    let p = normalize(path);
    if p.is_empty() {
        return true;
    }
    if CRITICAL_PATHS.contains(p.as_str()) {
        return true;
    }
    p == ".git" || p.ends_with("/.git")
}

/// Expand a leading `~` or `$HOME` and return the path relative to the
/// home directory, if the path points inside it.
fn home_relative(path: &str) -> Option<String> {
    let p = normalize(path);
    if let Some(rest) = p.strip_prefix("~/") {
        return Some(rest.to_string());
    }
    if let Some(rest) = p.strip_prefix("$home/").or_else(|| p.strip_prefix("${home}/")) {
        return Some(rest.to_string());
    }
    let home = dirs::home_dir()?;
    let home = normalize(&home.to_string_lossy());
    p.strip_prefix(&format!("{home}/")).map(str::to_string)
}

/// Returns true when `path` names a per-user sensitive file (`~/.bashrc`,
/// `~/.gitconfig`, ...) or anything under a sensitive tree (`~/.ssh/`).
#[must_use]
pub fn is_sensitive_path(path: &str) -> bool {
    let Some(rel) = home_relative(path) else {
        return false;
    };
    if SENSITIVE_HOME_PATHS.contains(&rel.as_str()) {
        return true;
    }
    SENSITIVE_HOME_TREES
        .iter()
        .any(|tree| rel == *tree || rel.starts_with(&format!("{tree}/")))
}
