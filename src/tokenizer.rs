//! Shell command tokenizer.
//!
//! Converts a command string into the token stream a POSIX-shell-literate
//! reader would produce, without executing anything: quoting (`'…'`, `"…"`,
//! `\x`), the full operator set, command substitution (`$(…)`, backticks)
//! kept as opaque word text, and process substitution (`<(…)`, `>(…)`) as
//! an operator followed by the inner text as a word.
//!
//! Variable references are normalized to `${NAME}` placeholders so the
//! token walk can resolve them later against its assignment map and the
//! process environment; unresolvable references stay as literal text that
//! rules can still match on.
//!
//! The tokenizer is total: every input yields either a token list or a
//! [`TokenizeError`]. It never panics on malformed input.

use std::fmt;

/// A shell operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `|`
    Pipe,
    /// `|&` (pipe stdout+stderr)
    PipeBoth,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `;`
    Semi,
    /// `&` (background)
    Background,
    /// `>`
    WriteOut,
    /// `>>`
    AppendOut,
    /// `<`
    ReadIn,
    /// `<<`
    Heredoc,
    /// `<<<`
    HereString,
    /// `<>`
    OpenRw,
    /// `1>`
    StdoutWrite,
    /// `1>>`
    StdoutAppend,
    /// `2>`
    StderrWrite,
    /// `2>>`
    StderrAppend,
    /// `&>`
    BothWrite,
    /// `>&`
    DupOut,
    /// `<&`
    DupIn,
    /// `<(`
    ProcRead,
    /// `>(`
    ProcWrite,
}

impl Op {
    /// The literal spelling of this operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pipe => "|",
            Self::PipeBoth => "|&",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Semi => ";",
            Self::Background => "&",
            Self::WriteOut => ">",
            Self::AppendOut => ">>",
            Self::ReadIn => "<",
            Self::Heredoc => "<<",
            Self::HereString => "<<<",
            Self::OpenRw => "<>",
            Self::StdoutWrite => "1>",
            Self::StdoutAppend => "1>>",
            Self::StderrWrite => "2>",
            Self::StderrAppend => "2>>",
            Self::BothWrite => "&>",
            Self::DupOut => ">&",
            Self::DupIn => "<&",
            Self::ProcRead => "<(",
            Self::ProcWrite => ">(",
        }
    }

    /// Command-boundary operators: the next word after one of these starts
    /// a new command.
    #[must_use]
    pub const fn is_control(self) -> bool {
        matches!(
            self,
            Self::Pipe | Self::PipeBoth | Self::AndAnd | Self::OrOr | Self::Semi | Self::Background
        )
    }

    /// Pipe operators only.
    #[must_use]
    pub const fn is_pipe(self) -> bool {
        matches!(self, Self::Pipe | Self::PipeBoth)
    }

    /// Sequencing operators (`&&`, `||`, `;`, `&`) — boundaries that end a
    /// pipeline, as opposed to extending one.
    #[must_use]
    pub const fn is_sequence(self) -> bool {
        matches!(
            self,
            Self::AndAnd | Self::OrOr | Self::Semi | Self::Background
        )
    }

    /// Any redirection operator (consumes the following word as a target).
    #[must_use]
    pub const fn is_redirect(self) -> bool {
        matches!(
            self,
            Self::WriteOut
                | Self::AppendOut
                | Self::ReadIn
                | Self::Heredoc
                | Self::HereString
                | Self::OpenRw
                | Self::StdoutWrite
                | Self::StdoutAppend
                | Self::StderrWrite
                | Self::StderrAppend
                | Self::BothWrite
                | Self::DupOut
                | Self::DupIn
        )
    }

    /// Redirections whose target is written to.
    #[must_use]
    pub const fn is_output_redirect(self) -> bool {
        matches!(
            self,
            Self::WriteOut
                | Self::AppendOut
                | Self::OpenRw
                | Self::StdoutWrite
                | Self::StdoutAppend
                | Self::StderrWrite
                | Self::StderrAppend
                | Self::BothWrite
                | Self::DupOut
        )
    }
}

/// A single token in the command stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A word: command name, argument, or opaque substitution text.
    Word(String),
    /// A shell operator.
    Operator(Op),
}

impl Token {
    /// The word text, if this token is a word.
    #[must_use]
    pub fn word(&self) -> Option<&str> {
        match self {
            Self::Word(w) => Some(w),
            Self::Operator(_) => None,
        }
    }
}

/// Lexical failure; surfaces to callers as `MALFORMED COMMAND SYNTAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeError {
    UnterminatedSingleQuote,
    UnterminatedDoubleQuote,
    UnterminatedSubstitution,
    UnterminatedBacktick,
    UnterminatedProcessSubstitution,
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::UnterminatedSingleQuote => "unterminated single quote",
            Self::UnterminatedDoubleQuote => "unterminated double quote",
            Self::UnterminatedSubstitution => "unterminated substitution",
            Self::UnterminatedBacktick => "unterminated backtick",
            Self::UnterminatedProcessSubstitution => "unterminated process substitution",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for TokenizeError {}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
    word: String,
    in_word: bool,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
            word: String::new(),
            in_word: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn push_char(&mut self, c: char) {
        self.word.push(c);
        self.in_word = true;
    }

    fn flush_word(&mut self) {
        if self.in_word {
            self.tokens.push(Token::Word(std::mem::take(&mut self.word)));
            self.in_word = false;
        }
    }

    fn push_op(&mut self, op: Op, len: usize) {
        self.flush_word();
        self.tokens.push(Token::Operator(op));
        self.pos += len;
    }

    /// Consume `'...'`, appending the literal content.
    fn single_quote(&mut self) -> Result<(), TokenizeError> {
        self.pos += 1; // opening quote
        self.in_word = true;
        while let Some(c) = self.bump() {
            if c == '\'' {
                return Ok(());
            }
            self.word.push(c);
        }
        Err(TokenizeError::UnterminatedSingleQuote)
    }

    /// Consume `"..."`, handling escapes and substitutions inside.
    fn double_quote(&mut self) -> Result<(), TokenizeError> {
        self.pos += 1; // opening quote
        self.in_word = true;
        loop {
            let Some(c) = self.peek() else {
                return Err(TokenizeError::UnterminatedDoubleQuote);
            };
            match c {
                '"' => {
                    self.pos += 1;
                    return Ok(());
                }
                '\\' => {
                    self.pos += 1;
                    match self.bump() {
                        Some(e @ ('"' | '\\' | '$' | '`')) => self.word.push(e),
                        Some(other) => {
                            self.word.push('\\');
                            self.word.push(other);
                        }
                        None => return Err(TokenizeError::UnterminatedDoubleQuote),
                    }
                }
                '$' => self.dollar()?,
                '`' => self.backtick()?,
                _ => {
                    self.pos += 1;
                    self.word.push(c);
                }
            }
        }
    }

    /// Consume a `$` form: `$(...)` and `${...}` opaquely, `$NAME` as a
    /// `${NAME}` placeholder, anything else literally.
    fn dollar(&mut self) -> Result<(), TokenizeError> {
        self.pos += 1; // the '$'
        self.in_word = true;
        match self.peek() {
            Some('(') => {
                self.word.push('$');
                self.balanced_parens()
            }
            Some('{') => {
                self.pos += 1;
                self.word.push_str("${");
                while let Some(c) = self.bump() {
                    self.word.push(c);
                    if c == '}' {
                        return Ok(());
                    }
                }
                Err(TokenizeError::UnterminatedSubstitution)
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(c) = self.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                self.word.push_str("${");
                self.word.push_str(&name);
                self.word.push('}');
                Ok(())
            }
            Some(c) => {
                // Positional / special parameters stay literal.
                self.pos += 1;
                self.word.push('$');
                self.word.push(c);
                Ok(())
            }
            None => {
                self.word.push('$');
                Ok(())
            }
        }
    }

    /// Consume a balanced `(...)` run (after `$` or process substitution),
    /// appending the parens and content to the current word.
    fn balanced_parens(&mut self) -> Result<(), TokenizeError> {
        debug_assert_eq!(self.peek(), Some('('));
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            self.word.push(c);
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(TokenizeError::UnterminatedSubstitution)
    }

    /// Consume `` `...` `` opaquely, backticks included.
    fn backtick(&mut self) -> Result<(), TokenizeError> {
        self.pos += 1;
        self.in_word = true;
        self.word.push('`');
        while let Some(c) = self.bump() {
            self.word.push(c);
            if c == '`' {
                return Ok(());
            }
        }
        Err(TokenizeError::UnterminatedBacktick)
    }

    /// Consume `<(...)`/`>(...)`: emit the operator, then the inner text
    /// as a word.
    fn process_substitution(&mut self, op: Op) -> Result<(), TokenizeError> {
        self.flush_word();
        self.tokens.push(Token::Operator(op));
        self.pos += 2; // "<(" or ">("
        let mut depth = 1usize;
        let mut inner = String::new();
        while let Some(c) = self.bump() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        self.tokens.push(Token::Word(inner.trim().to_string()));
                        return Ok(());
                    }
                }
                _ => {}
            }
            inner.push(c);
        }
        Err(TokenizeError::UnterminatedProcessSubstitution)
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizeError> {
        while let Some(c) = self.peek() {
            match c {
                _ if c.is_whitespace() => {
                    self.flush_word();
                    self.pos += 1;
                }
                '#' if !self.in_word => break, // comment to end of input
                '\'' => self.single_quote()?,
                '"' => self.double_quote()?,
                '\\' => {
                    self.pos += 1;
                    match self.bump() {
                        // A leading `\cmd` is an alias bypass; keep the
                        // backslash so name resolution can see it.
                        Some(e) if !self.in_word && e.is_ascii_alphanumeric() => {
                            self.push_char('\\');
                            self.push_char(e);
                        }
                        Some(e) => self.push_char(e),
                        None => self.push_char('\\'),
                    }
                }
                '$' => self.dollar()?,
                '`' => self.backtick()?,
                '<' => match (self.peek_at(1), self.peek_at(2)) {
                    (Some('('), _) => self.process_substitution(Op::ProcRead)?,
                    (Some('<'), Some('<')) => self.push_op(Op::HereString, 3),
                    (Some('<'), _) => self.push_op(Op::Heredoc, 2),
                    (Some('>'), _) => self.push_op(Op::OpenRw, 2),
                    (Some('&'), _) => self.push_op(Op::DupIn, 2),
                    _ => self.push_op(Op::ReadIn, 1),
                },
                '>' => match self.peek_at(1) {
                    Some('(') => self.process_substitution(Op::ProcWrite)?,
                    Some('>') => self.push_op(Op::AppendOut, 2),
                    Some('&') => self.push_op(Op::DupOut, 2),
                    _ => self.push_op(Op::WriteOut, 1),
                },
                '&' => match self.peek_at(1) {
                    Some('&') => self.push_op(Op::AndAnd, 2),
                    Some('>') => self.push_op(Op::BothWrite, 2),
                    _ => self.push_op(Op::Background, 1),
                },
                '|' => match self.peek_at(1) {
                    Some('|') => self.push_op(Op::OrOr, 2),
                    Some('&') => self.push_op(Op::PipeBoth, 2),
                    _ => self.push_op(Op::Pipe, 1),
                },
                ';' => self.push_op(Op::Semi, 1),
                '1' | '2' if !self.in_word && self.peek_at(1) == Some('>') => {
                    let append = self.peek_at(2) == Some('>');
                    let op = match (c, append) {
                        ('1', false) => Op::StdoutWrite,
                        ('1', true) => Op::StdoutAppend,
                        ('2', false) => Op::StderrWrite,
                        (_, true) => Op::StderrAppend,
                        (_, false) => Op::StderrWrite,
                    };
                    self.push_op(op, if append { 3 } else { 2 });
                    // `2>&1` — the dup target follows immediately.
                    if !append && self.peek() == Some('&') {
                        self.push_op(Op::DupOut, 1);
                    }
                }
                _ => {
                    self.pos += 1;
                    self.push_char(c);
                }
            }
        }
        self.flush_word();
        Ok(self.tokens)
    }
}

/// Tokenize a command string.
///
/// # Errors
///
/// Returns a [`TokenizeError`] on unterminated quotes or substitutions.
pub fn tokenize(input: &str) -> Result<Vec<Token>, TokenizeError> {
    Lexer::new(input).run()
}
