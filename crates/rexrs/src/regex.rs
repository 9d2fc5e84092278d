// Public entry point
// Ties parsing, capture analysis and compilation together behind one
// reusable handle. A `Regex` is immutable after construction and can be
// matched from many threads at once.

use std::ops::Range;

use crate::ast;
use crate::captures;
use crate::compiler::{self, CompileOptions};
use crate::error::RegexError;
use crate::input::Granularity;
use crate::parser::{self, SyntaxOptions};
use crate::program::Program;
use crate::vm::{self, MatchMode, MatchOutcome, DEFAULT_STEP_LIMIT};

/// Construction options; the defaults give the traditional syntax
/// profile, grapheme-cluster matching and the standard step budget.
#[derive(Debug, Clone, Copy)]
pub struct RegexOptions {
    pub syntax: SyntaxOptions,
    pub granularity: Granularity,
    pub options: ast::MatchOptions,
    pub step_limit: usize,
}

impl Default for RegexOptions {
    fn default() -> Self {
        RegexOptions {
            syntax: SyntaxOptions::traditional(),
            granularity: Granularity::default(),
            options: ast::MatchOptions::default(),
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub struct Regex {
    program: Program,
    step_limit: usize,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Regex, RegexError> {
        Regex::with_options(pattern, RegexOptions::default())
    }

    pub fn with_options(pattern: &str, opts: RegexOptions) -> Result<Regex, RegexError> {
        let ast = parser::parse(pattern, opts.syntax)?;
        let caps = captures::analyze(&ast)?;
        let program = compiler::compile(
            &ast,
            &caps,
            CompileOptions {
                granularity: opts.granularity,
                options: opts.options,
            },
        )?;
        Ok(Regex {
            program,
            step_limit: opts.step_limit,
        })
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn granularity(&self) -> Granularity {
        self.program.granularity
    }

    /// Leftmost match anywhere in `text`.
    pub fn find(&self, text: &str) -> MatchOutcome {
        self.find_in(text, 0..text.len())
    }

    /// Leftmost match anywhere in `text[range]`.
    pub fn find_in(&self, text: &str, range: Range<usize>) -> MatchOutcome {
        vm::execute(&self.program, text, range, MatchMode::Search, self.step_limit)
    }

    /// Match starting exactly at `range.start`.
    pub fn match_prefix(&self, text: &str, range: Range<usize>) -> MatchOutcome {
        vm::execute(&self.program, text, range, MatchMode::Prefix, self.step_limit)
    }

    /// Match spanning all of `text[range]`.
    pub fn match_whole(&self, text: &str, range: Range<usize>) -> MatchOutcome {
        vm::execute(&self.program, text, range, MatchMode::Whole, self.step_limit)
    }

    /// Whether any match exists. Exhaustion counts as no match.
    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).into_match().is_some()
    }
}
