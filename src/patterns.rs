//! Shared constants and pattern tables.
//!
//! Everything the rules need to agree on lives here: the input bound, the
//! default blocked-command set, critical and sensitive path sets, trusted
//! download hosts, and the interpreter/executor name sets used by the token
//! walk. Regex tables are lazily compiled once per process.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Maximum command length the analyzer will inspect, in characters.
///
/// Anything longer is blocked outright (`COMMAND TOO LONG`) and no regex is
/// ever run against it, which keeps worst-case match time bounded.
pub const MAX_INPUT_LENGTH: usize = 10_000;

/// Returns true when `input` is within the analyzable bound.
///
/// Every pattern predicate in this crate gates on this before matching, so
/// over-length input can never produce a pattern hit.
#[inline]
#[must_use]
pub fn within_input_bound(input: &str) -> bool {
    // Cheap byte-length check first; char count only when it could matter.
    input.len() <= MAX_INPUT_LENGTH || input.chars().count() <= MAX_INPUT_LENGTH
}

/// Commands blocked by default. Users extend this via config or
/// `OPENCODE_BLOCK_COMMANDS`.
pub static DEFAULT_BLOCKED: LazyLock<HashSet<String>> = LazyLock::new(|| {
    [
        "rm", "rmdir", "shred", "srm", "unlink", "mkfs", "fdisk", "killall", "pkill",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
});

/// Hosts that may feed a piped-to-shell installer without a block.
pub static DEFAULT_TRUSTED_DOMAINS: LazyLock<Vec<String>> = LazyLock::new(|| {
    [
        "raw.githubusercontent.com",
        "github.com",
        "gitlab.com",
        "bitbucket.org",
        "sh.rustup.rs",
        "get.docker.com",
        "deb.nodesource.com",
        "dl.google.com",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
});

/// Filesystem locations whose deletion or modification damages the OS
/// install or a project's version-control root. Entries are normalized:
/// forward slashes, lowercase, no trailing slash.
pub static CRITICAL_PATHS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "/",
        "/bin",
        "/boot",
        "/dev",
        "/etc",
        "/home",
        "/lib",
        "/lib64",
        "/opt",
        "/proc",
        "/root",
        "/sbin",
        "/srv",
        "/sys",
        "/usr",
        "/usr/bin",
        "/usr/lib",
        "/usr/local",
        "/usr/sbin",
        "/var",
        // Windows, slash-separated and concatenated spellings.
        "c:",
        "c:/windows",
        "c:/windows/system32",
        "c:/program files",
        "c:/program files (x86)",
        "c:/users",
        "c:windows",
        "c:windows/system32",
        "windows/system32",
        "system32",
    ]
    .into_iter()
    .collect()
});

/// Per-user files whose overwrite is a persistence or credential-theft
/// vector. Matched relative to `~`/`$HOME`; `.ssh` matches the whole tree.
pub const SENSITIVE_HOME_PATHS: &[&str] = &[".bashrc", ".zshrc", ".profile", ".gitconfig"];

/// Sensitive directory subtrees under `~`.
pub const SENSITIVE_HOME_TREES: &[&str] = &[".ssh"];

/// Shell interpreters: pipeline stages and `-c` carriers.
pub const SHELL_INTERPRETERS: &[&str] = &["sh", "bash", "zsh", "dash", "ksh", "fish"];

/// Non-shell interpreters that execute a downloaded payload just as well.
pub const SCRIPT_INTERPRETERS: &[&str] =
    &["python", "python3", "perl", "ruby", "node", "bun", "php"];

/// Names that execute a file handed to them: shells, interpreters, the
/// sourcing builtins, `exec`, and `chmod` (the classic `chmod +x` step).
pub static EXECUTORS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    SHELL_INTERPRETERS
        .iter()
        .chain(SCRIPT_INTERPRETERS)
        .copied()
        .chain([".", "source", "exec", "chmod"])
        .collect()
});

/// Extra destructive basenames for `find -exec` beyond the blocked set.
pub const FIND_EXEC_DESTRUCTIVE: &[&str] = &["rm", "shred", "dd", "mkfs"];

/// `systemctl` subcommands that take a service down or out of rotation.
pub const SYSTEMCTL_DESTRUCTIVE_SUBCOMMANDS: &[&str] =
    &["stop", "disable", "mask", "reset-failed", "isolate", "kill"];

/// Downloader command names the pipe-to-shell and download-and-exec checks
/// care about.
pub const DOWNLOADERS: &[&str] = &["curl", "wget"];

/// curl/wget flags that disable certificate verification.
pub const CERT_BYPASS_FLAGS: &[&str] = &["-k", "--insecure", "--no-check-certificate"];

/// Wrapper prefixes that do not count as the effective command.
pub const COMMAND_PREFIXES: &[&str] = &["sudo", "xargs", "command", "env"];

/// Returns true when `name` is a shell interpreter (`sh`, `bash`, ...).
#[inline]
#[must_use]
pub fn is_shell_interpreter(name: &str) -> bool {
    SHELL_INTERPRETERS.contains(&name)
}

/// Returns true when `name` is a downloader (`curl`/`wget`).
#[inline]
#[must_use]
pub fn is_downloader(name: &str) -> bool {
    DOWNLOADERS.contains(&name)
}
