// Pattern source cursor
// Peek/eat helpers over the pattern text with byte-offset tracking for
// diagnostic spans.

use crate::error::{SyntaxError, SyntaxErrorCode};
use crate::span::Span;

pub(crate) struct Source<'a> {
    text: &'a str,
    // (byte offset, char) pairs; decoded once up front
    chars: Vec<(usize, char)>,
    cursor: usize,
}

impl<'a> Source<'a> {
    pub fn new(text: &'a str) -> Self {
        Source {
            text,
            chars: text.char_indices().collect(),
            cursor: 0,
        }
    }

    /// Byte offset of the next unconsumed character (== text len at EOF).
    pub fn offset(&self) -> usize {
        self.chars
            .get(self.cursor)
            .map_or(self.text.len(), |&(off, _)| off)
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.cursor).map(|&(_, c)| c)
    }

    pub fn peek_at(&self, lookahead: usize) -> Option<char> {
        self.chars.get(self.cursor + lookahead).map(|&(_, c)| c)
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += 1;
        Some(c)
    }

    /// Consume `c` if it is next.
    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Consume the exact sequence `s` if it is next.
    pub fn eat_str(&mut self, s: &str) -> bool {
        let mut lookahead = 0;
        for c in s.chars() {
            if self.peek_at(lookahead) != Some(c) {
                return false;
            }
            lookahead += 1;
        }
        self.cursor += lookahead;
        true
    }

    pub fn expect(&mut self, c: char, code: SyntaxErrorCode) -> Result<(), SyntaxError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error_here(code))
        }
    }

    /// Consume characters while `pred` holds, returning the span covered.
    pub fn bump_while(&mut self, mut pred: impl FnMut(char) -> bool) -> Span {
        let start = self.offset();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.cursor += 1;
        }
        Span::new(start, self.offset())
    }

    pub fn slice(&self, span: Span) -> &'a str {
        &self.text[span.start..span.end]
    }

    /// Error at the current position (one character wide, or zero at EOF).
    pub fn error_here(&self, code: SyntaxErrorCode) -> SyntaxError {
        let start = self.offset();
        let end = self
            .chars
            .get(self.cursor)
            .map_or(start, |&(off, c)| off + c.len_utf8());
        SyntaxError::new(code, Span::new(start, end))
    }

    pub fn error_from(&self, code: SyntaxErrorCode, start: usize) -> SyntaxError {
        SyntaxError::new(code, Span::new(start, self.offset()))
    }

    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.offset())
    }
}
