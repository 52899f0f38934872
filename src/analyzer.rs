//! Analyzer façade: orchestrates the two rule phases.
//!
//! Order per invocation: recursion-depth check, pre-phase rules over the
//! raw string, tokenization (malformed input blocks), post-phase rules
//! over the token stream. The first blocking decision wins and is
//! annotated with the rule that produced it. Analysis is synchronous and
//! pure with respect to `(command, Config, snapshot)`.

use crate::config::Config;
use crate::git::GitStatus;
use crate::rules::{Phase, Rule, RuleContext};
use crate::shell_context::ShellContext;
use crate::tokenizer::tokenize;

/// The analyzer's verdict on one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// True when the command should not run.
    pub blocked: bool,
    /// Stable reason string; empty when allowed.
    pub reason: String,
    /// Safer alternative; empty when allowed.
    pub suggestion: String,
    /// Name of the rule that decided; empty when allowed.
    pub rule: String,
}

impl Decision {
    /// An allowing decision.
    #[must_use]
    pub fn allowed() -> Self {
        Self {
            blocked: false,
            reason: String::new(),
            suggestion: String::new(),
            rule: String::new(),
        }
    }

    /// A blocking decision. The engine annotates the rule name.
    #[must_use]
    pub fn block(reason: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            blocked: true,
            reason: reason.into(),
            suggestion: suggestion.into(),
            rule: String::new(),
        }
    }

    /// Annotate the rule that produced this decision, unless a nested
    /// analysis already did.
    #[must_use]
    pub fn with_rule(mut self, rule: &str) -> Self {
        if self.rule.is_empty() {
            self.rule = rule.to_string();
        }
        self
    }

    /// True when this decision blocks execution.
    #[inline]
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}

/// One analysis context: configuration, optional shell-context snapshot,
/// and the git status collaborator. Shared immutably across recursive
/// subshell analyses.
pub struct Analyzer<'a> {
    config: &'a Config,
    shell_context: Option<ShellContext>,
    git: &'a dyn GitStatus,
}

impl<'a> Analyzer<'a> {
    /// Build an analyzer, loading the shell-context snapshot if the
    /// config names one.
    #[must_use]
    pub fn new(config: &'a Config, git: &'a dyn GitStatus) -> Self {
        let shell_context = config
            .context_path
            .as_deref()
            .and_then(ShellContext::load);
        Self {
            config,
            shell_context,
            git,
        }
    }

    /// Build an analyzer with an explicit snapshot (tests, embedders).
    #[must_use]
    pub fn with_context(
        config: &'a Config,
        shell_context: Option<ShellContext>,
        git: &'a dyn GitStatus,
    ) -> Self {
        Self {
            config,
            shell_context,
            git,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        self.config
    }

    #[must_use]
    pub fn shell_context(&self) -> Option<&ShellContext> {
        self.shell_context.as_ref()
    }

    #[must_use]
    pub fn git(&self) -> &dyn GitStatus {
        self.git
    }

    /// Analyze one command line.
    #[must_use]
    pub fn analyze(&self, command: &str) -> Decision {
        self.analyze_at_depth(command, 0)
    }

    /// Analyze with an explicit recursion depth (subshell `-c` bodies).
    #[must_use]
    pub(crate) fn analyze_at_depth(&self, command: &str, depth: u32) -> Decision {
        if depth > self.config.max_subshell_depth {
            return Decision::block(
                "SUBSHELL DEPTH LIMIT EXCEEDED",
                "Flatten the nesting; run the innermost command directly",
            )
            .with_rule("analyzer");
        }

        if command.trim().is_empty() {
            return Decision::allowed();
        }

        // Pre phase: rules over the raw string.
        let pre_ctx = RuleContext {
            raw: command,
            tokens: &[],
            analyzer: self,
            depth,
        };
        for rule in Rule::ALL {
            if rule.phase() == Phase::Pre {
                if let Some(decision) = rule.check(&pre_ctx) {
                    return decision.with_rule(rule.name());
                }
            }
        }

        // Tokenize; lexical failure blocks.
        let tokens = match tokenize(command) {
            Ok(tokens) => tokens,
            Err(_) => {
                return Decision::block(
                    "MALFORMED COMMAND SYNTAX",
                    "Fix the unterminated quote or substitution and retry",
                )
                .with_rule("tokenizer");
            }
        };

        // Post phase: rules over the token stream.
        let post_ctx = RuleContext {
            raw: command,
            tokens: &tokens,
            analyzer: self,
            depth,
        };
        for rule in Rule::ALL {
            if rule.phase() == Phase::Post {
                if let Some(decision) = rule.check(&post_ctx) {
                    return decision.with_rule(rule.name());
                }
            }
        }

        Decision::allowed()
    }
}
