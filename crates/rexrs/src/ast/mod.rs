// Pattern AST
// Closed set of node variants produced by the parser; traversal is by
// exhaustive matching everywhere downstream (captures, compiler, renderer).

mod render;

pub use render::render;

use smol_str::SmolStr;

use crate::span::Span;

/// A parsed pattern node together with the byte range of pattern text
/// it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    pub kind: AstKind,
    pub span: Span,
}

impl Ast {
    pub fn new(kind: AstKind, span: Span) -> Self {
        Ast { kind, span }
    }

    /// Structural equality ignoring spans and trivia nodes. This is what
    /// "round-trips" after canonical rendering: spans obviously shift and
    /// comments are not re-rendered.
    pub fn structural_eq(&self, other: &Ast) -> bool {
        fn strip(ast: &Ast) -> Option<AstKind> {
            match &ast.kind {
                AstKind::Trivia(_) => None,
                AstKind::Alternation(branches) => Some(AstKind::Alternation(
                    branches.iter().map(strip_node).collect(),
                )),
                AstKind::Concatenation(parts) => {
                    let parts: Vec<Ast> = parts
                        .iter()
                        .filter(|p| !matches!(p.kind, AstKind::Trivia(_)))
                        .map(strip_node)
                        .collect();
                    match parts.len() {
                        0 => Some(AstKind::Empty),
                        1 => Some(parts.into_iter().next().map(|p| p.kind).unwrap_or(AstKind::Empty)),
                        _ => Some(AstKind::Concatenation(parts)),
                    }
                }
                AstKind::Group(kind, body) => {
                    Some(AstKind::Group(kind.clone(), Box::new(strip_node(body))))
                }
                AstKind::Quantification(q, body) => Some(AstKind::Quantification(
                    q.clone(),
                    Box::new(strip_node(body)),
                )),
                other => Some(other.clone()),
            }
        }
        fn strip_node(ast: &Ast) -> Ast {
            Ast::new(strip(ast).unwrap_or(AstKind::Empty), Span::default())
        }
        strip_node(self).kind == strip_node(other).kind
    }
}

impl std::fmt::Display for Ast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render(self))
    }
}

/// Pattern node variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstKind {
    /// `a|b|c` - branches in declared priority order
    Alternation(Vec<Ast>),
    /// `abc` - ordered parts, binds tighter than alternation
    Concatenation(Vec<Ast>),
    /// `(...)` and friends
    Group(GroupKind, Box<Ast>),
    /// `a*`, `a{2,5}?`, ...
    Quantification(Quantifier, Box<Ast>),
    /// Single indivisible element
    Atom(Atom),
    /// `[...]`, `\d`, `\p{...}` - compiled to a membership predicate
    CharClass(ClassExpr),
    /// `\Q...\E` verbatim text, matched literally
    Quote(String),
    /// `(?#...)` comment, preserved for source-range rendering only
    Trivia(String),
    /// Matches everywhere with zero width
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    /// Literal character
    Char(char),
    /// `.`
    Any,
    /// Zero-width boundary assertion
    Assertion(AssertionKind),
    /// `\1` / `\k<name>`
    Backreference(BackrefTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionKind {
    StartOfLine,    // ^
    EndOfLine,      // $
    WordBoundary,   // \b
    NotWordBoundary, // \B
    StartOfInput,   // \A
    EndOfInput,     // \z
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackrefTarget {
    Index(u32),
    Named(SmolStr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKind {
    /// `(...)` - numbered capture
    Capture,
    /// `(?<name>...)`
    NamedCapture(SmolStr),
    /// `(?:...)`
    NonCapture,
    /// `(?>...)` - discards interior backtrack alternatives on exit
    Atomic,
    /// `(?=...)` / `(?!...)`
    Lookahead { negated: bool },
    /// `(?<=...)` / `(?<!...)`
    Lookbehind { negated: bool },
    /// `(?i:...)` and `(?i)`-to-end-of-group option scopes
    Options(OptionToggle),
}

/// Inline option toggles, e.g. `(?im-s:...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptionToggle {
    pub enable: MatchOptions,
    pub disable: MatchOptions,
}

/// Semantic matching options. Baked into instructions at compile time so
/// the executor never tracks option state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchOptions {
    /// `i` - case-insensitive literals, classes and backreferences
    pub case_insensitive: bool,
    /// `m` - `^`/`$` also match at line boundaries
    pub multiline: bool,
    /// `s` - `.` also matches `\n`
    pub dot_matches_newline: bool,
}

impl MatchOptions {
    pub fn apply(mut self, toggle: OptionToggle) -> MatchOptions {
        if toggle.enable.case_insensitive {
            self.case_insensitive = true;
        }
        if toggle.enable.multiline {
            self.multiline = true;
        }
        if toggle.enable.dot_matches_newline {
            self.dot_matches_newline = true;
        }
        if toggle.disable.case_insensitive {
            self.case_insensitive = false;
        }
        if toggle.disable.multiline {
            self.multiline = false;
        }
        if toggle.disable.dot_matches_newline {
            self.dot_matches_newline = false;
        }
        self
    }
}

/// Quantifier amount plus greediness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    pub amount: QuantAmount,
    pub kind: QuantKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantAmount {
    ZeroOrMore,      // *
    OneOrMore,       // +
    ZeroOrOne,       // ?
    Exactly(u32),    // {n}
    AtLeast(u32),    // {n,}
    Range(u32, u32), // {n,m}
}

impl QuantAmount {
    pub fn min(self) -> u32 {
        match self {
            QuantAmount::ZeroOrMore | QuantAmount::ZeroOrOne => 0,
            QuantAmount::OneOrMore => 1,
            QuantAmount::Exactly(n) | QuantAmount::AtLeast(n) | QuantAmount::Range(n, _) => n,
        }
    }

    pub fn max(self) -> Option<u32> {
        match self {
            QuantAmount::ZeroOrMore | QuantAmount::OneOrMore | QuantAmount::AtLeast(_) => None,
            QuantAmount::ZeroOrOne => Some(1),
            QuantAmount::Exactly(n) => Some(n),
            QuantAmount::Range(_, m) => Some(m),
        }
    }

    /// True if zero repetitions satisfy the quantifier, which makes any
    /// capture inside it optional.
    pub fn admits_zero(self) -> bool {
        self.min() == 0
    }

    /// True if more than one repetition is possible, which switches the
    /// capture result to list-of-ranges typing.
    pub fn admits_many(self) -> bool {
        self.max().is_none_or(|m| m > 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuantKind {
    /// Try more repetitions first (default)
    Greedy,
    /// `?` suffix - try fewer repetitions first
    Lazy,
    /// `+` suffix - never give repetitions back
    Possessive,
}

/// Character-class set expression. `[a-z&&[^aeiou]]` style algebra is
/// kept structural here and collapsed to a predicate tree by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassExpr {
    Item(ClassItem),
    /// `[abc]` - any member matches
    Union(Vec<ClassExpr>),
    /// `[a&&b]`
    Intersection(Box<ClassExpr>, Box<ClassExpr>),
    /// `[a--b]`
    Difference(Box<ClassExpr>, Box<ClassExpr>),
    /// `[^...]`
    Negation(Box<ClassExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassItem {
    Char(char),
    Range(char, char),
    Posix(PosixClass),
    Shorthand(Shorthand),
    Property { kind: PropertyKind, negated: bool },
}

/// `[:alpha:]` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PosixClass {
    Alnum,
    Alpha,
    Blank,
    Cntrl,
    Digit,
    Graph,
    Lower,
    Print,
    Punct,
    Space,
    Upper,
    Word,
    Xdigit,
}

/// `\d` / `\D` / `\w` / `\W` / `\s` / `\S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shorthand {
    Digit,
    NotDigit,
    Word,
    NotWord,
    Space,
    NotSpace,
}

/// `\p{...}` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Exact general category, e.g. `\p{Lu}`
    Category(unicode_general_category::GeneralCategory),
    /// One-letter category group, e.g. `\p{L}`
    CategoryGroup(CategoryGroup),
    /// `\p{Script=Latin}`
    Script(unicode_script::Script),
    /// `\p{Alphabetic}`
    Alphabetic,
    /// `\p{White_Space}`
    WhiteSpace,
    /// `\p{Uppercase}`
    Uppercase,
    /// `\p{Lowercase}`
    Lowercase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryGroup {
    Letter,      // L
    Mark,        // M
    Number,      // N
    Punctuation, // P
    Symbol,      // S
    Separator,   // Z
    Other,       // C
}
