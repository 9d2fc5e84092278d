// rexrs
// A regex engine with a recursive-descent parser, a deterministic
// bytecode compiler and a backtracking virtual machine, matching at a
// selectable Unicode granularity (grapheme cluster, scalar or code unit).

pub mod ast;
pub mod captures;
pub mod compiler;
pub mod consumers;
pub mod error;
pub mod input;
pub mod parser;
pub mod program;
pub mod regex;
pub mod searchers;
mod span;
mod unicode;
pub mod vm;

pub use crate::ast::MatchOptions;
pub use crate::error::{ParseResult, RegexError, SyntaxError, SyntaxErrorCode};
pub use crate::input::Granularity;
pub use crate::parser::SyntaxOptions;
pub use crate::regex::{Regex, RegexOptions};
pub use crate::span::Span;
pub use crate::vm::{CaptureValue, MatchMode, MatchOutcome, MatchResult, DEFAULT_STEP_LIMIT};

#[cfg(test)]
mod test;
