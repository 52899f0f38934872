//! User-configured regex rules.
//!
//! Each `{pattern, suggestion}` entry from the config is tried in order
//! against the raw command. Patterns that fail to compile are skipped;
//! a bad entry must not disable the rest of the gate.

use fancy_regex::Regex;

use crate::analyzer::Decision;
use crate::config::Config;
use crate::patterns::within_input_bound;

/// Check the command against the configured custom rules.
#[must_use]
pub fn check(raw: &str, config: &Config) -> Option<Decision> {
    if config.custom_rules.is_empty() || !within_input_bound(raw) {
        return None;
    }

    for rule in &config.custom_rules {
        let Ok(regex) = Regex::new(&rule.pattern) else {
            continue;
        };
        if regex.is_match(raw).unwrap_or(false) {
            return Some(Decision::block(
                "CUSTOM RULE VIOLATION",
                rule.suggestion.clone(),
            ));
        }
    }
    None
}
