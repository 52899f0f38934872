// Forbid unsafe code in production, but allow in tests for env var manipulation
#![cfg_attr(not(test), forbid(unsafe_code))]
//! ShellShield library.
//!
//! A pre-execution gate for shell commands: it receives a candidate
//! command line — from a coding-agent tool hook, an interactive shell
//! preexec trap, or a pasted block — and decides whether to allow, warn,
//! or block, returning a structured reason and a safer alternative.
//! Advisory by design: the host shell still acts on the exit code; this
//! is defense in depth, not a sandbox.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Configuration                           │
//! │   (.shellshield.json search path → env overrides → defaults) │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Analyzer                              │
//! │   depth check → pre rules → tokenize → post rules            │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Rule set                               │
//! │  Homograph │ TerminalInjection │ RawThreat │ Custom │ CoreAst │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use shellshield::analyzer::Analyzer;
//! use shellshield::config::Config;
//! use shellshield::git::SystemGit;
//!
//! let config = Config::load();
//! let analyzer = Analyzer::new(&config, &SystemGit);
//! let decision = analyzer.analyze("rm -rf /");
//! if decision.is_blocked() {
//!     eprintln!("{}: {}", decision.reason, decision.suggestion);
//! }
//! ```

pub mod analyzer;
pub mod audit;
pub mod cli;
pub mod config;
pub mod git;
pub mod hook;
pub mod paths;
pub mod patterns;
pub mod rules;
pub mod shell_context;
pub mod tokenizer;
pub mod validators;

// Re-export the types nearly every caller needs
pub use analyzer::{Analyzer, Decision};
pub use audit::{AuditDecision, AuditEntry, AuditSource};
pub use config::{Config, CustomRule, Mode};
pub use git::{GitStatus, SystemGit};
pub use rules::{Phase, Rule};
pub use shell_context::{ContextKind, ShellContext, ShellContextEntry};
pub use tokenizer::{Op, Token, TokenizeError, tokenize};
pub use validators::{
    TerminalThreat, UrlRisk, check_terminal_injection, has_homograph, is_trusted_domain,
    score_url_risk,
};
