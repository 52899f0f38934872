//! Configuration loading for shellshield.
//!
//! A single `.shellshield.json` file is searched across the invocation
//! context (`$INIT_CWD`, `$PWD`, the process CWD, the invoking script's
//! directory and its parent, then `$HOME`); the first hit wins. Environment
//! variables override file values. Unknown keys are ignored; invalid
//! values are ignored too, with a diagnostic when `DEBUG` is set, so a
//! half-broken config never takes the gate down.

use serde_json::Value;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::patterns::{DEFAULT_BLOCKED, DEFAULT_TRUSTED_DOMAINS};

/// Config file name searched in each candidate directory.
const CONFIG_FILE_NAME: &str = ".shellshield.json";

/// Escape-hatch env var; truthy values skip analysis entirely.
pub const ENV_SKIP: &str = "SHELLSHIELD_SKIP";

/// CSV appended to the blocked set.
pub const ENV_BLOCK_COMMANDS: &str = "OPENCODE_BLOCK_COMMANDS";
/// CSV appended to the allowed set.
pub const ENV_ALLOW_COMMANDS: &str = "OPENCODE_ALLOW_COMMANDS";
/// Overrides the volume threshold.
pub const ENV_THRESHOLD: &str = "SHELLSHIELD_THRESHOLD";
/// Overrides the subshell recursion bound.
pub const ENV_MAX_SUBSHELL_DEPTH: &str = "SHELLSHIELD_MAX_SUBSHELL_DEPTH";
/// Overrides the decision mode.
pub const ENV_MODE: &str = "SHELLSHIELD_MODE";
/// Overrides the shell-context snapshot path.
pub const ENV_CONTEXT_PATH: &str = "SHELLSHIELD_CONTEXT_PATH";

/// How the caller maps a blocking decision to behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Block on `blocked=true`.
    #[default]
    Enforce,
    /// Prompt the operator; block on non-TTY.
    Interactive,
    /// Log a warning, allow anyway.
    Permissive,
}

impl Mode {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "enforce" => Some(Self::Enforce),
            "interactive" => Some(Self::Interactive),
            "permissive" => Some(Self::Permissive),
            _ => None,
        }
    }

    /// Label used in audit entries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Enforce => "enforce",
            Self::Interactive => "interactive",
            Self::Permissive => "permissive",
        }
    }
}

/// A user-supplied regex rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomRule {
    pub pattern: String,
    pub suggestion: String,
}

/// Immutable analyzer configuration, loaded once per invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub blocked: HashSet<String>,
    pub allowed: HashSet<String>,
    pub trusted_domains: Vec<String>,
    pub threshold: u32,
    pub max_subshell_depth: u32,
    pub mode: Mode,
    pub custom_rules: Vec<CustomRule>,
    pub context_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blocked: DEFAULT_BLOCKED.clone(),
            allowed: HashSet::new(),
            trusted_domains: DEFAULT_TRUSTED_DOMAINS.clone(),
            threshold: 50,
            max_subshell_depth: 5,
            mode: Mode::Enforce,
            custom_rules: Vec::new(),
            context_path: None,
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the first `.shellshield.json`
    /// found in search order, then environment overrides.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();
        if let Some(path) = find_config_file() {
            if let Ok(raw) = fs::read_to_string(&path) {
                config.apply_file(&raw);
            }
        }
        config.apply_env();
        config
    }

    /// True when `SHELLSHIELD_SKIP` requests a bypass.
    #[must_use]
    pub fn is_bypassed() -> bool {
        env::var(ENV_SKIP).is_ok_and(|v| {
            matches!(
                v.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on" | "enable" | "enabled"
            )
        })
    }

    /// Merge a config file's contents. Tolerant: each key is applied
    /// independently and wrong-typed values are skipped.
    pub fn apply_file(&mut self, raw: &str) {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
            debug_warn("config file is not a JSON object; using defaults");
            return;
        };

        // Command names are compared against lowercased resolved names, so
        // fold case here exactly like the env-var path does.
        if let Some(v) = map.get("blocked") {
            match string_array(v) {
                Some(items) => self.blocked.extend(items.iter().map(|s| s.to_lowercase())),
                None => debug_warn("config key 'blocked' is not a string array"),
            }
        }
        if let Some(v) = map.get("allowed") {
            match string_array(v) {
                Some(items) => self.allowed.extend(items.iter().map(|s| s.to_lowercase())),
                None => debug_warn("config key 'allowed' is not a string array"),
            }
        }
        if let Some(v) = map.get("trustedDomains") {
            match string_array(v) {
                Some(items) => self.trusted_domains = items,
                None => debug_warn("config key 'trustedDomains' is not a string array"),
            }
        }
        if let Some(v) = map.get("threshold") {
            match v.as_u64() {
                Some(n) => self.threshold = u32::try_from(n).unwrap_or(u32::MAX),
                None => debug_warn("config key 'threshold' is not an unsigned integer"),
            }
        }
        if let Some(v) = map.get("maxSubshellDepth") {
            match v.as_u64() {
                Some(n) => self.max_subshell_depth = u32::try_from(n).unwrap_or(u32::MAX),
                None => debug_warn("config key 'maxSubshellDepth' is not an unsigned integer"),
            }
        }
        if let Some(v) = map.get("mode") {
            match v.as_str().and_then(Mode::parse) {
                Some(mode) => self.mode = mode,
                None => debug_warn("config key 'mode' is not one of enforce/permissive/interactive"),
            }
        }
        if let Some(v) = map.get("customRules") {
            match custom_rules(v) {
                Some(rules) => self.custom_rules = rules,
                None => debug_warn("config key 'customRules' is malformed"),
            }
        }
        if let Some(v) = map.get("contextPath") {
            match v.as_str() {
                Some(p) if !p.trim().is_empty() => {
                    self.context_path = Some(expand_tilde(p.trim()));
                }
                _ => debug_warn("config key 'contextPath' is not a path string"),
            }
        }
    }

    /// Apply environment overrides on top of file values.
    pub fn apply_env(&mut self) {
        if let Ok(csv) = env::var(ENV_BLOCK_COMMANDS) {
            let items: Vec<String> = split_csv(&csv).collect();
            self.blocked.extend(items);
        }
        if let Ok(csv) = env::var(ENV_ALLOW_COMMANDS) {
            let items: Vec<String> = split_csv(&csv).collect();
            self.allowed.extend(items);
        }
        if let Ok(v) = env::var(ENV_THRESHOLD) {
            match v.trim().parse() {
                Ok(n) => self.threshold = n,
                Err(_) => debug_warn("SHELLSHIELD_THRESHOLD is not an unsigned integer"),
            }
        }
        if let Ok(v) = env::var(ENV_MAX_SUBSHELL_DEPTH) {
            match v.trim().parse() {
                Ok(n) => self.max_subshell_depth = n,
                Err(_) => debug_warn("SHELLSHIELD_MAX_SUBSHELL_DEPTH is not an unsigned integer"),
            }
        }
        if let Ok(v) = env::var(ENV_MODE) {
            match Mode::parse(&v) {
                Some(mode) => self.mode = mode,
                None => debug_warn("SHELLSHIELD_MODE is not enforce/permissive/interactive"),
            }
        }
        if let Ok(v) = env::var(ENV_CONTEXT_PATH) {
            if !v.trim().is_empty() {
                self.context_path = Some(expand_tilde(v.trim()));
            }
        }
    }
}

fn split_csv(csv: &str) -> impl Iterator<Item = String> + '_ {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn string_array(v: &Value) -> Option<Vec<String>> {
    let arr = v.as_array()?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(item.as_str()?.to_string());
    }
    Some(out)
}

fn custom_rules(v: &Value) -> Option<Vec<CustomRule>> {
    let arr = v.as_array()?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        let obj = item.as_object()?;
        let pattern = obj.get("pattern")?.as_str()?.to_string();
        let suggestion = obj
            .get("suggestion")
            .and_then(Value::as_str)
            .unwrap_or("Review this command against your custom policy")
            .to_string();
        out.push(CustomRule {
            pattern,
            suggestion,
        });
    }
    Some(out)
}

fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Directories searched for `.shellshield.json`, in priority order.
fn search_dirs() -> Vec<PathBuf> {
    let mut dirs_out: Vec<PathBuf> = Vec::with_capacity(6);

    if let Ok(d) = env::var("INIT_CWD") {
        dirs_out.push(PathBuf::from(d));
    }
    if let Ok(d) = env::var("PWD") {
        dirs_out.push(PathBuf::from(d));
    }
    if let Ok(d) = env::current_dir() {
        dirs_out.push(d);
    }
    if let Some(script_dir) = invoker_dir() {
        if let Some(parent) = script_dir.parent() {
            let parent = parent.to_path_buf();
            dirs_out.push(script_dir.clone());
            dirs_out.push(parent);
        } else {
            dirs_out.push(script_dir);
        }
    }
    if let Some(home) = dirs::home_dir() {
        dirs_out.push(home);
    }

    dirs_out.dedup();
    dirs_out
}

/// Directory of the invoking binary/script (argv[0]), when resolvable.
fn invoker_dir() -> Option<PathBuf> {
    let argv0 = env::args_os().next()?;
    let path = Path::new(&argv0);
    let parent = path.parent()?;
    if parent.as_os_str().is_empty() {
        None
    } else {
        Some(parent.to_path_buf())
    }
}

fn find_config_file() -> Option<PathBuf> {
    search_dirs()
        .into_iter()
        .map(|d| d.join(CONFIG_FILE_NAME))
        .find(|p| p.is_file())
}

/// Warn about a skipped config value, but only when `DEBUG` is set.
fn debug_warn(msg: &str) {
    if env::var_os("DEBUG").is_some() {
        warn!("{msg}");
        eprintln!("shellshield: {msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = Config::default();
        assert_eq!(c.threshold, 50);
        assert_eq!(c.max_subshell_depth, 5);
        assert_eq!(c.mode, Mode::Enforce);
        assert!(c.blocked.contains("rm"));
        assert!(c.allowed.is_empty());
        assert!(c.context_path.is_none());
    }

    #[test]
    fn file_values_are_merged() {
        let mut c = Config::default();
        c.apply_file(
            r#"{
                "blocked": ["terraform"],
                "allowed": ["rm"],
                "trustedDomains": ["example.org"],
                "threshold": 10,
                "maxSubshellDepth": 2,
                "mode": "permissive",
                "customRules": [{"pattern": "drop\\s+table", "suggestion": "Back up first"}],
                "contextPath": "/tmp/snapshot.json"
            }"#,
        );
        assert!(c.blocked.contains("terraform"));
        assert!(c.blocked.contains("rm"), "file blocked extends defaults");
        assert!(c.allowed.contains("rm"));
        assert_eq!(c.trusted_domains, vec!["example.org"]);
        assert_eq!(c.threshold, 10);
        assert_eq!(c.max_subshell_depth, 2);
        assert_eq!(c.mode, Mode::Permissive);
        assert_eq!(c.custom_rules.len(), 1);
        assert_eq!(c.context_path, Some(PathBuf::from("/tmp/snapshot.json")));
    }

    #[test]
    fn file_values_are_case_folded_like_env_values() {
        let mut c = Config::default();
        c.apply_file(r#"{"blocked": ["Terraform"], "allowed": ["RM"]}"#);
        assert!(c.blocked.contains("terraform"));
        assert!(c.allowed.contains("rm"));
        assert!(!c.blocked.contains("Terraform"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut c = Config::default();
        c.apply_file(r#"{"unknownKey": 42, "threshold": 7}"#);
        assert_eq!(c.threshold, 7);
    }

    #[test]
    fn invalid_values_are_ignored() {
        let mut c = Config::default();
        c.apply_file(
            r#"{"threshold": "lots", "mode": "yolo", "blocked": "rm", "customRules": [{"nope": 1}]}"#,
        );
        assert_eq!(c.threshold, 50);
        assert_eq!(c.mode, Mode::Enforce);
        assert!(c.custom_rules.is_empty());
    }

    #[test]
    fn non_object_file_is_ignored() {
        let mut c = Config::default();
        c.apply_file("[1, 2, 3]");
        assert_eq!(c.threshold, 50);
    }

    #[test]
    fn custom_rule_without_suggestion_gets_default_text() {
        let mut c = Config::default();
        c.apply_file(r#"{"customRules": [{"pattern": "foo"}]}"#);
        assert_eq!(c.custom_rules.len(), 1);
        assert!(!c.custom_rules[0].suggestion.is_empty());
    }

    #[test]
    fn csv_splitting_trims_and_lowercases() {
        let items: Vec<String> = split_csv(" Foo, bar ,,BAZ ").collect();
        assert_eq!(items, vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!(Mode::parse("ENFORCE"), Some(Mode::Enforce));
        assert_eq!(Mode::parse("Interactive"), Some(Mode::Interactive));
        assert_eq!(Mode::parse("bogus"), None);
    }

    #[test]
    fn tilde_expansion_leaves_absolute_paths_alone() {
        assert_eq!(expand_tilde("/a/b"), PathBuf::from("/a/b"));
    }
}
