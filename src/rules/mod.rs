//! The security rule set.
//!
//! Rules are a fixed list of variants, each tagged with the phase it runs
//! in: `Pre` rules see the raw command string before tokenization, `Post`
//! rules see the token stream. The engine walks them in declaration order
//! and the first blocking decision wins; later rules are not consulted.

pub mod core_ast;
pub mod custom;
pub mod raw_threat;

use crate::analyzer::{Analyzer, Decision};
use crate::tokenizer::Token;
use crate::validators;

/// When a rule runs relative to tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Over the raw string, before tokenization.
    Pre,
    /// Over the token stream.
    Post,
}

/// Everything a rule may consult. `tokens` is empty during the pre phase.
pub struct RuleContext<'a> {
    pub raw: &'a str,
    pub tokens: &'a [Token],
    pub analyzer: &'a Analyzer<'a>,
    pub depth: u32,
}

/// The fixed, ordered rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Mixed-script hostnames in URL-like text.
    Homograph,
    /// ANSI escape sequences and hidden characters.
    TerminalInjection,
    /// The bounded-regex threat table plus the deep-subshell and
    /// input-length guards.
    RawThreat,
    /// User-configured regex rules.
    Custom,
    /// The token-stream walk: blocklists, pipes, downloads, paths.
    CoreAst,
}

impl Rule {
    /// Declaration order is evaluation order.
    pub const ALL: [Self; 5] = [
        Self::Homograph,
        Self::TerminalInjection,
        Self::RawThreat,
        Self::Custom,
        Self::CoreAst,
    ];

    /// The rule name recorded on decisions and audit entries.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Homograph => "Homograph",
            Self::TerminalInjection => "TerminalInjection",
            Self::RawThreat => "RawThreat",
            Self::Custom => "Custom",
            Self::CoreAst => "CoreAst",
        }
    }

    /// Which phase this rule runs in.
    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Self::Homograph | Self::TerminalInjection | Self::RawThreat => Phase::Pre,
            Self::Custom | Self::CoreAst => Phase::Post,
        }
    }

    /// Run this rule. `None` means "no opinion"; a decision blocks.
    #[must_use]
    pub fn check(self, ctx: &RuleContext<'_>) -> Option<Decision> {
        match self {
            Self::Homograph => check_homograph(ctx.raw),
            Self::TerminalInjection => check_terminal(ctx.raw),
            Self::RawThreat => raw_threat::check(ctx.raw),
            Self::Custom => custom::check(ctx.raw, ctx.analyzer.config()),
            Self::CoreAst => core_ast::check(ctx),
        }
    }
}

fn check_homograph(raw: &str) -> Option<Decision> {
    if validators::has_homograph(raw) {
        return Some(Decision::block(
            "HOMOGRAPH ATTACK DETECTED",
            "Retype the hostname by hand instead of pasting it, and verify the spelling",
        ));
    }
    None
}

fn check_terminal(raw: &str) -> Option<Decision> {
    let threat = validators::check_terminal_injection(raw)?;
    let suggestion = match threat {
        validators::TerminalThreat::AnsiEscape => {
            "Strip the escape sequences; pipe through 'cat -v' to see what they do"
        }
        validators::TerminalThreat::HiddenCharacters => {
            "Re-enter the command by hand; the pasted text contains invisible characters"
        }
    };
    Some(Decision::block(threat.reason(), suggestion))
}
