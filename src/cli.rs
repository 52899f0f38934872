//! CLI argument parsing.
//!
//! Three entry shapes share one binary: `--check "<cmd>"` analyzes a
//! single command, `--paste` analyzes each line read from stdin, and with
//! no flags the binary runs in hook mode (JSON on stdin). Exit codes:
//! 0 allow/bypass/no-input, 2 block, 1 usage errors.

use clap::Parser;

const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
// Build metadata from vergen (set by build.rs)
const BUILD_TIMESTAMP: Option<&str> = option_env!("VERGEN_BUILD_TIMESTAMP");
const RUSTC_SEMVER: Option<&str> = option_env!("VERGEN_RUSTC_SEMVER");

/// Extended version string for `--version`.
#[must_use]
pub fn long_version() -> String {
    format!(
        "{PKG_VERSION} (built {}, rustc {})",
        BUILD_TIMESTAMP.unwrap_or("unknown"),
        RUSTC_SEMVER.unwrap_or("unknown"),
    )
}

/// A pre-execution gate for shell commands.
///
/// shellshield analyzes a candidate command line and blocks destructive
/// or deceptive shapes: critical-path deletes, pipe-to-shell installs
/// from untrusted hosts, download-and-exec chains, homograph hostnames,
/// terminal injection, and more. It is advisory: the calling shell or
/// agent acts on the exit code.
#[derive(Parser, Debug)]
#[command(name = "shellshield")]
#[command(version = PKG_VERSION, long_version = long_version())]
#[command(after_help = "With no flags, reads hook JSON from stdin and exits 0 (allow) or 2 (block).\n\
    Set SHELLSHIELD_SKIP=1 to bypass analysis entirely.")]
pub struct Cli {
    /// Analyze a single command and exit
    #[arg(long, value_name = "CMD", conflicts_with = "paste")]
    pub check: Option<String>,

    /// Analyze each non-empty line of stdin (bracketed-paste guard)
    #[arg(long)]
    pub paste: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_flag() {
        let cli = Cli::try_parse_from(["shellshield", "--check", "rm -rf /"]).unwrap();
        assert_eq!(cli.check.as_deref(), Some("rm -rf /"));
        assert!(!cli.paste);
    }

    #[test]
    fn parses_paste_flag() {
        let cli = Cli::try_parse_from(["shellshield", "--paste"]).unwrap();
        assert!(cli.paste);
    }

    #[test]
    fn check_and_paste_conflict() {
        assert!(Cli::try_parse_from(["shellshield", "--check", "ls", "--paste"]).is_err());
    }

    #[test]
    fn bare_invocation_is_hook_mode() {
        let cli = Cli::try_parse_from(["shellshield"]).unwrap();
        assert!(cli.check.is_none());
        assert!(!cli.paste);
    }

    #[test]
    fn long_version_mentions_package_version() {
        assert!(long_version().contains(PKG_VERSION));
    }
}
