// Error taxonomy
// Plain enums with hand-written Display. Syntax errors carry the byte
// range of the offending pattern text so tools can highlight it.

use crate::span::Span;

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Malformed pattern text. Parsing aborts immediately; no partial AST is
/// ever returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub code: SyntaxErrorCode,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(code: SyntaxErrorCode, span: Span) -> Self {
        SyntaxError { code, span }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyntaxErrorCode {
    /// `(` without matching `)`
    UnterminatedGroup,
    /// `[` without matching `]`, or a reversed range like `[z-a]`
    UnbalancedClass,
    /// `{2,1}`, bare `*`, stacked quantifiers
    InvalidQuantifier,
    /// `\p{...}` name that resolves to nothing
    UnknownProperty,
    /// `\q` and other unrecognized escapes, or a trailing `\`
    InvalidEscape,
    /// Same capture name used twice outside exclusive alternation branches
    DuplicateCaptureName,
    /// Backreference to a group that does not exist
    InvalidBackreference,
    /// Anything else the grammar cannot accept at this position
    UnexpectedToken,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let what = match self.code {
            SyntaxErrorCode::UnterminatedGroup => "unterminated group",
            SyntaxErrorCode::UnbalancedClass => "unbalanced character class",
            SyntaxErrorCode::InvalidQuantifier => "invalid quantifier",
            SyntaxErrorCode::UnknownProperty => "unknown character property",
            SyntaxErrorCode::InvalidEscape => "invalid escape sequence",
            SyntaxErrorCode::DuplicateCaptureName => "duplicate capture name",
            SyntaxErrorCode::InvalidBackreference => "invalid backreference",
            SyntaxErrorCode::UnexpectedToken => "unexpected token",
        };
        write!(f, "{} at {}", what, self.span)
    }
}

impl std::error::Error for SyntaxError {}

/// Internal invariant violation during lowering. Unreachable for any AST
/// the parser produces; surfacing one is a bug in this crate, not in the
/// caller's pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError(pub &'static str);

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "internal compile error: {}", self.0)
    }
}

impl std::error::Error for CompileError {}

/// Umbrella error for the `Regex::new` convenience path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    Syntax(SyntaxError),
    Compile(CompileError),
}

impl std::fmt::Display for RegexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegexError::Syntax(e) => write!(f, "{}", e),
            RegexError::Compile(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RegexError {}

impl From<SyntaxError> for RegexError {
    fn from(e: SyntaxError) -> Self {
        RegexError::Syntax(e)
    }
}

impl From<CompileError> for RegexError {
    fn from(e: CompileError) -> Self {
        RegexError::Compile(e)
    }
}
