// Pattern parser
// Recursive descent from pattern text to AST. Two selectable syntax
// profiles change lexical rules only (whitespace sensitivity, raw
// quotes); the produced AST shape is identical.

mod source;

use smol_str::SmolStr;

use crate::ast::{
    Ast, AstKind, Atom, AssertionKind, BackrefTarget, ClassExpr, ClassItem, GroupKind,
    MatchOptions, OptionToggle, PosixClass, Quantifier, QuantAmount, QuantKind, Shorthand,
};
use crate::error::{ParseResult, SyntaxError, SyntaxErrorCode};
use crate::span::Span;
use crate::unicode;
use source::Source;

/// Lexical profile. `traditional()` is the usual PCRE-style surface;
/// `extended()` makes whitespace outside classes non-semantic and lets
/// `"..."` spans act as verbatim quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyntaxOptions {
    pub non_semantic_whitespace: bool,
    pub raw_quotes: bool,
}

impl SyntaxOptions {
    pub fn traditional() -> Self {
        SyntaxOptions::default()
    }

    pub fn extended() -> Self {
        SyntaxOptions {
            non_semantic_whitespace: true,
            raw_quotes: true,
        }
    }
}

/// Parse `pattern` into an AST, or fail with the first syntax error.
pub fn parse(pattern: &str, opts: SyntaxOptions) -> ParseResult<Ast> {
    let mut parser = Parser {
        src: Source::new(pattern),
        opts,
    };
    let ast = parser.alternation()?;
    if !parser.src.at_end() {
        // A stray `)` is the only way alternation parsing stops early.
        return Err(parser.src.error_here(SyntaxErrorCode::UnterminatedGroup));
    }
    Ok(ast)
}

/// What `(` turned out to be: a regular node, or an inline option toggle
/// without a body, which scopes over the rest of the current branch.
enum GroupParse {
    Node(Ast),
    OptionsToEnd(OptionToggle, usize),
}

struct Parser<'a> {
    src: Source<'a>,
    opts: SyntaxOptions,
}

impl<'a> Parser<'a> {
    fn alternation(&mut self) -> ParseResult<Ast> {
        let start = self.src.offset();
        let mut branches = vec![self.concatenation()?];
        while self.src.eat('|') {
            branches.push(self.concatenation()?);
        }
        if branches.len() == 1 {
            return Ok(branches.remove(0));
        }
        Ok(Ast::new(
            AstKind::Alternation(branches),
            self.src.span_from(start),
        ))
    }

    fn concatenation(&mut self) -> ParseResult<Ast> {
        let start = self.src.offset();
        let mut parts: Vec<Ast> = Vec::new();
        loop {
            self.skip_nonsemantic();
            match self.src.peek() {
                None | Some('|') | Some(')') => break,
                Some('*') | Some('+') | Some('?') => {
                    return Err(self.src.error_here(SyntaxErrorCode::InvalidQuantifier));
                }
                _ => {}
            }
            let elem_start = self.src.offset();
            match self.element()? {
                GroupParse::OptionsToEnd(toggle, toggle_start) => {
                    // `(?i)` scopes over the remainder of the branch.
                    let rest = self.concatenation()?;
                    let span = self.src.span_from(toggle_start);
                    parts.push(Ast::new(
                        AstKind::Group(GroupKind::Options(toggle), Box::new(rest)),
                        span,
                    ));
                    break;
                }
                GroupParse::Node(elem) => {
                    let elem = self.apply_quantifier(elem, elem_start)?;
                    parts.push(elem);
                }
            }
        }
        let span = self.src.span_from(start);
        match parts.len() {
            0 => Ok(Ast::new(AstKind::Empty, span)),
            1 => Ok(parts.remove(0)),
            _ => Ok(Ast::new(AstKind::Concatenation(parts), span)),
        }
    }

    fn skip_nonsemantic(&mut self) {
        if self.opts.non_semantic_whitespace {
            self.src.bump_while(|c| c.is_whitespace());
        }
    }

    fn element(&mut self) -> ParseResult<GroupParse> {
        let start = self.src.offset();
        let c = match self.src.peek() {
            Some(c) => c,
            None => return Err(self.src.error_here(SyntaxErrorCode::UnexpectedToken)),
        };
        let node = match c {
            '(' => return self.group(),
            '[' => {
                let expr = self.class()?;
                Ast::new(AstKind::CharClass(expr), self.src.span_from(start))
            }
            '\\' => self.escape()?,
            '.' => {
                self.src.bump();
                Ast::new(AstKind::Atom(Atom::Any), self.src.span_from(start))
            }
            '^' => {
                self.src.bump();
                Ast::new(
                    AstKind::Atom(Atom::Assertion(AssertionKind::StartOfLine)),
                    self.src.span_from(start),
                )
            }
            '$' => {
                self.src.bump();
                Ast::new(
                    AstKind::Atom(Atom::Assertion(AssertionKind::EndOfLine)),
                    self.src.span_from(start),
                )
            }
            '"' if self.opts.raw_quotes => {
                self.src.bump();
                let span = self.src.bump_while(|c| c != '"');
                let text = self.src.slice(span).to_string();
                if !self.src.eat('"') {
                    return Err(self.src.error_from(SyntaxErrorCode::UnexpectedToken, start));
                }
                Ast::new(AstKind::Quote(text), self.src.span_from(start))
            }
            _ => {
                self.src.bump();
                Ast::new(AstKind::Atom(Atom::Char(c)), self.src.span_from(start))
            }
        };
        Ok(GroupParse::Node(node))
    }

    fn apply_quantifier(&mut self, elem: Ast, start: usize) -> ParseResult<Ast> {
        let amount = match self.src.peek() {
            Some('*') => {
                self.src.bump();
                QuantAmount::ZeroOrMore
            }
            Some('+') => {
                self.src.bump();
                QuantAmount::OneOrMore
            }
            Some('?') => {
                self.src.bump();
                QuantAmount::ZeroOrOne
            }
            Some('{') if self.brace_is_quantifier() => self.braced_amount()?,
            _ => return Ok(elem),
        };
        if matches!(elem.kind, AstKind::Trivia(_)) {
            return Err(self.src.error_from(SyntaxErrorCode::InvalidQuantifier, start));
        }
        let kind = if self.src.eat('?') {
            QuantKind::Lazy
        } else if self.src.eat('+') {
            QuantKind::Possessive
        } else {
            QuantKind::Greedy
        };
        // `a*?*` and friends have nothing left to repeat
        match self.src.peek() {
            Some('*') | Some('+') | Some('?') => {
                return Err(self.src.error_here(SyntaxErrorCode::InvalidQuantifier));
            }
            Some('{') if self.brace_is_quantifier() => {
                return Err(self.src.error_here(SyntaxErrorCode::InvalidQuantifier));
            }
            _ => {}
        }
        Ok(Ast::new(
            AstKind::Quantification(Quantifier { amount, kind }, Box::new(elem)),
            self.src.span_from(start),
        ))
    }

    /// `{` only opens a quantifier when followed by digits/comma shaped
    /// like bounds; otherwise it is a literal brace.
    fn brace_is_quantifier(&self) -> bool {
        let mut i = 1;
        let mut digits = 0;
        while let Some(c) = self.src.peek_at(i) {
            if c.is_ascii_digit() {
                digits += 1;
                i += 1;
            } else {
                break;
            }
        }
        match self.src.peek_at(i) {
            Some('}') => digits > 0,
            Some(',') => {
                i += 1;
                while let Some(c) = self.src.peek_at(i) {
                    if c.is_ascii_digit() {
                        i += 1;
                    } else {
                        break;
                    }
                }
                self.src.peek_at(i) == Some('}')
            }
            _ => false,
        }
    }

    fn braced_amount(&mut self) -> ParseResult<QuantAmount> {
        let start = self.src.offset();
        self.src.bump(); // {
        let min = self.bounded_number()?;
        if self.src.eat('}') {
            return match min {
                Some(n) => Ok(QuantAmount::Exactly(n)),
                None => Err(self.src.error_from(SyntaxErrorCode::InvalidQuantifier, start)),
            };
        }
        self.src.expect(',', SyntaxErrorCode::InvalidQuantifier)?;
        let max = self.bounded_number()?;
        self.src.expect('}', SyntaxErrorCode::InvalidQuantifier)?;
        let amount = match (min, max) {
            (Some(n), Some(m)) => {
                if n > m {
                    return Err(self.src.error_from(SyntaxErrorCode::InvalidQuantifier, start));
                }
                QuantAmount::Range(n, m)
            }
            (Some(n), None) => QuantAmount::AtLeast(n),
            (None, Some(m)) => QuantAmount::Range(0, m),
            (None, None) => {
                return Err(self.src.error_from(SyntaxErrorCode::InvalidQuantifier, start));
            }
        };
        Ok(amount)
    }

    fn bounded_number(&mut self) -> ParseResult<Option<u32>> {
        let span = self.src.bump_while(|c| c.is_ascii_digit());
        if span.is_empty() {
            return Ok(None);
        }
        self.src
            .slice(span)
            .parse::<u32>()
            .map(Some)
            .map_err(|_| SyntaxError::new(SyntaxErrorCode::InvalidQuantifier, span))
    }

    fn group(&mut self) -> ParseResult<GroupParse> {
        let start = self.src.offset();
        self.src.bump(); // (
        let kind = if self.src.eat('?') {
            if self.src.eat('#') {
                let span = self.src.bump_while(|c| c != ')');
                let text = self.src.slice(span).to_string();
                self.src.expect(')', SyntaxErrorCode::UnterminatedGroup)?;
                return Ok(GroupParse::Node(Ast::new(
                    AstKind::Trivia(text),
                    self.src.span_from(start),
                )));
            } else if self.src.eat(':') {
                GroupKind::NonCapture
            } else if self.src.eat('>') {
                GroupKind::Atomic
            } else if self.src.eat('=') {
                GroupKind::Lookahead { negated: false }
            } else if self.src.eat('!') {
                GroupKind::Lookahead { negated: true }
            } else if self.src.eat('<') {
                if self.src.eat('=') {
                    GroupKind::Lookbehind { negated: false }
                } else if self.src.eat('!') {
                    GroupKind::Lookbehind { negated: true }
                } else {
                    GroupKind::NamedCapture(self.group_name()?)
                }
            } else {
                let toggle = self.option_toggle()?;
                if self.src.eat(':') {
                    GroupKind::Options(toggle)
                } else if self.src.eat(')') {
                    return Ok(GroupParse::OptionsToEnd(toggle, start));
                } else {
                    return Err(self.src.error_here(SyntaxErrorCode::UnexpectedToken));
                }
            }
        } else {
            GroupKind::Capture
        };
        let body = self.alternation()?;
        if !self.src.eat(')') {
            return Err(self.src.error_from(SyntaxErrorCode::UnterminatedGroup, start));
        }
        Ok(GroupParse::Node(Ast::new(
            AstKind::Group(kind, Box::new(body)),
            self.src.span_from(start),
        )))
    }

    fn group_name(&mut self) -> ParseResult<SmolStr> {
        let span = self
            .src
            .bump_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let name = self.src.slice(span);
        let valid = !name.is_empty()
            && !name.starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            return Err(SyntaxError::new(SyntaxErrorCode::UnexpectedToken, span));
        }
        self.src.expect('>', SyntaxErrorCode::UnexpectedToken)?;
        Ok(SmolStr::new(name))
    }

    fn option_toggle(&mut self) -> ParseResult<OptionToggle> {
        let mut toggle = OptionToggle::default();
        let mut target = &mut toggle.enable;
        let mut seen_any = false;
        loop {
            match self.src.peek() {
                Some('i') => target.case_insensitive = true,
                Some('m') => target.multiline = true,
                Some('s') => target.dot_matches_newline = true,
                Some('-') => {
                    self.src.bump();
                    target = &mut toggle.disable;
                    continue;
                }
                Some(':') | Some(')') if seen_any => break,
                _ => return Err(self.src.error_here(SyntaxErrorCode::UnexpectedToken)),
            }
            self.src.bump();
            seen_any = true;
        }
        Ok(toggle)
    }

    fn escape(&mut self) -> ParseResult<Ast> {
        let start = self.src.offset();
        self.src.bump(); // backslash
        let c = match self.src.peek() {
            Some(c) => c,
            None => return Err(self.src.error_from(SyntaxErrorCode::InvalidEscape, start)),
        };
        let node = match c {
            'd' | 'D' | 'w' | 'W' | 's' | 'S' => {
                self.src.bump();
                AstKind::CharClass(ClassExpr::Item(ClassItem::Shorthand(shorthand_for(c))))
            }
            'b' => {
                self.src.bump();
                AstKind::Atom(Atom::Assertion(AssertionKind::WordBoundary))
            }
            'B' => {
                self.src.bump();
                AstKind::Atom(Atom::Assertion(AssertionKind::NotWordBoundary))
            }
            'A' => {
                self.src.bump();
                AstKind::Atom(Atom::Assertion(AssertionKind::StartOfInput))
            }
            'z' => {
                self.src.bump();
                AstKind::Atom(Atom::Assertion(AssertionKind::EndOfInput))
            }
            'p' | 'P' => {
                let item = self.property_escape(start)?;
                AstKind::CharClass(ClassExpr::Item(item))
            }
            'k' => {
                self.src.bump();
                self.src.expect('<', SyntaxErrorCode::InvalidEscape)?;
                let name = self.group_name()?;
                AstKind::Atom(Atom::Backreference(BackrefTarget::Named(name)))
            }
            '1'..='9' => {
                let span = self.src.bump_while(|c| c.is_ascii_digit());
                let index = self
                    .src
                    .slice(span)
                    .parse::<u32>()
                    .map_err(|_| SyntaxError::new(SyntaxErrorCode::InvalidBackreference, span))?;
                AstKind::Atom(Atom::Backreference(BackrefTarget::Index(index)))
            }
            'Q' => {
                self.src.bump();
                let text = self.quoted_span();
                AstKind::Quote(text)
            }
            _ => {
                let ch = self.char_escape(start)?;
                AstKind::Atom(Atom::Char(ch))
            }
        };
        Ok(Ast::new(node, self.src.span_from(start)))
    }

    /// `\Q...\E`; a missing `\E` quotes through end of pattern.
    fn quoted_span(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.src.bump() {
            if c == '\\' && self.src.eat('E') {
                break;
            }
            text.push(c);
        }
        text
    }

    fn property_escape(&mut self, start: usize) -> ParseResult<ClassItem> {
        let negated = self.src.bump() == Some('P');
        self.src.expect('{', SyntaxErrorCode::InvalidEscape)?;
        let span = self.src.bump_while(|c| c != '}');
        let body = self.src.slice(span).to_string();
        self.src.expect('}', SyntaxErrorCode::InvalidEscape)?;
        let kind = unicode::resolve_property(&body)
            .ok_or_else(|| self.src.error_from(SyntaxErrorCode::UnknownProperty, start))?;
        Ok(ClassItem::Property { kind, negated })
    }

    /// Character-valued escapes, shared by top level and classes. The
    /// caller has consumed `\`; the next character is still pending.
    fn char_escape(&mut self, start: usize) -> ParseResult<char> {
        let c = match self.src.bump() {
            Some(c) => c,
            None => return Err(self.src.error_from(SyntaxErrorCode::InvalidEscape, start)),
        };
        let ch = match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'f' => '\u{0C}',
            'v' => '\u{0B}',
            'a' => '\u{07}',
            'e' => '\u{1B}',
            '0' => '\0',
            'x' => {
                if self.src.eat('{') {
                    self.hex_char('}', start)?
                } else {
                    self.fixed_hex(2, start)?
                }
            }
            'u' => {
                if self.src.eat('{') {
                    self.hex_char('}', start)?
                } else {
                    self.fixed_hex(4, start)?
                }
            }
            c if c.is_ascii_alphanumeric() => {
                return Err(self.src.error_from(SyntaxErrorCode::InvalidEscape, start));
            }
            c => c,
        };
        Ok(ch)
    }

    fn hex_char(&mut self, close: char, start: usize) -> ParseResult<char> {
        let span = self.src.bump_while(|c| c.is_ascii_hexdigit());
        let digits = self.src.slice(span).to_string();
        self.src.expect(close, SyntaxErrorCode::InvalidEscape)?;
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.src.error_from(SyntaxErrorCode::InvalidEscape, start))
    }

    fn fixed_hex(&mut self, count: usize, start: usize) -> ParseResult<char> {
        let mut value: u32 = 0;
        for _ in 0..count {
            let d = self
                .src
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.src.error_from(SyntaxErrorCode::InvalidEscape, start))?;
            value = value * 16 + d;
        }
        char::from_u32(value)
            .ok_or_else(|| self.src.error_from(SyntaxErrorCode::InvalidEscape, start))
    }

    // Character classes

    fn class(&mut self) -> ParseResult<ClassExpr> {
        let start = self.src.offset();
        self.src.bump(); // [
        let negated = self.src.eat('^');
        let mut expr = self.class_chunk(start, true)?;
        loop {
            if self.src.eat_str("&&") {
                let rhs = self.class_chunk(start, false)?;
                expr = ClassExpr::Intersection(Box::new(expr), Box::new(rhs));
            } else if self.src.eat_str("--") {
                let rhs = self.class_chunk(start, false)?;
                expr = ClassExpr::Difference(Box::new(expr), Box::new(rhs));
            } else {
                break;
            }
        }
        if !self.src.eat(']') {
            return Err(self.src.error_from(SyntaxErrorCode::UnbalancedClass, start));
        }
        Ok(if negated {
            ClassExpr::Negation(Box::new(expr))
        } else {
            expr
        })
    }

    /// One union run inside a class, stopping at `]`, `&&` or `--`.
    fn class_chunk(&mut self, class_start: usize, first: bool) -> ParseResult<ClassExpr> {
        let mut members: Vec<ClassExpr> = Vec::new();
        let mut leading = first;
        loop {
            let c = match self.src.peek() {
                Some(c) => c,
                None => {
                    return Err(self.src.error_from(SyntaxErrorCode::UnbalancedClass, class_start));
                }
            };
            match c {
                ']' if !leading || !members.is_empty() => break,
                ']' => {
                    // leading `]` is a literal member
                    self.src.bump();
                    members.push(ClassExpr::Item(ClassItem::Char(']')));
                }
                '&' if self.src.peek_at(1) == Some('&') => break,
                '-' if self.src.peek_at(1) == Some('-') => break,
                '[' if self.src.peek_at(1) == Some(':') => {
                    members.push(ClassExpr::Item(self.posix_class()?));
                }
                '[' => {
                    members.push(self.class()?);
                }
                '\\' => {
                    members.push(ClassExpr::Item(self.class_escape()?));
                }
                _ => {
                    self.src.bump();
                    members.push(ClassExpr::Item(self.maybe_range(c, class_start)?));
                }
            }
            leading = false;
        }
        if members.len() == 1 {
            return Ok(members.remove(0));
        }
        Ok(ClassExpr::Union(members))
    }

    /// `a` just consumed inside a class; turn it into `a-z` if a range
    /// follows. A `-` before `]` or an operator stays literal.
    fn maybe_range(&mut self, lo: char, class_start: usize) -> ParseResult<ClassItem> {
        if self.src.peek() != Some('-') {
            return Ok(ClassItem::Char(lo));
        }
        match self.src.peek_at(1) {
            None | Some(']') | Some('-') => return Ok(ClassItem::Char(lo)),
            _ => {}
        }
        self.src.bump(); // -
        let hi = match self.src.peek() {
            Some('\\') => {
                let esc_start = self.src.offset();
                self.src.bump();
                self.char_escape(esc_start)?
            }
            Some(c) => {
                self.src.bump();
                c
            }
            None => {
                return Err(self.src.error_from(SyntaxErrorCode::UnbalancedClass, class_start));
            }
        };
        if lo > hi {
            return Err(self.src.error_from(SyntaxErrorCode::UnbalancedClass, class_start));
        }
        Ok(ClassItem::Range(lo, hi))
    }

    fn class_escape(&mut self) -> ParseResult<ClassItem> {
        let start = self.src.offset();
        match self.src.peek_at(1) {
            Some('d') | Some('D') | Some('w') | Some('W') | Some('s') | Some('S') => {
                self.src.bump();
                let c = self.src.bump().unwrap_or('d');
                Ok(ClassItem::Shorthand(shorthand_for(c)))
            }
            Some('p') | Some('P') => {
                self.src.bump();
                self.property_escape(start)
            }
            Some('b') => {
                // backspace inside a class
                self.src.bump();
                self.src.bump();
                Ok(ClassItem::Char('\u{08}'))
            }
            _ => {
                self.src.bump();
                let ch = self.char_escape(start)?;
                self.maybe_range(ch, start)
            }
        }
    }

    fn posix_class(&mut self) -> ParseResult<ClassItem> {
        let start = self.src.offset();
        self.src.bump(); // [
        self.src.bump(); // :
        let span = self.src.bump_while(|c| c.is_ascii_alphabetic());
        let name = self.src.slice(span).to_string();
        if !self.src.eat_str(":]") {
            return Err(self.src.error_from(SyntaxErrorCode::UnbalancedClass, start));
        }
        let class = match name.as_str() {
            "alnum" => PosixClass::Alnum,
            "alpha" => PosixClass::Alpha,
            "blank" => PosixClass::Blank,
            "cntrl" => PosixClass::Cntrl,
            "digit" => PosixClass::Digit,
            "graph" => PosixClass::Graph,
            "lower" => PosixClass::Lower,
            "print" => PosixClass::Print,
            "punct" => PosixClass::Punct,
            "space" => PosixClass::Space,
            "upper" => PosixClass::Upper,
            "word" => PosixClass::Word,
            "xdigit" => PosixClass::Xdigit,
            _ => return Err(self.src.error_from(SyntaxErrorCode::UnknownProperty, start)),
        };
        Ok(ClassItem::Posix(class))
    }
}

fn shorthand_for(c: char) -> Shorthand {
    match c {
        'd' => Shorthand::Digit,
        'D' => Shorthand::NotDigit,
        'w' => Shorthand::Word,
        'W' => Shorthand::NotWord,
        's' => Shorthand::Space,
        _ => Shorthand::NotSpace,
    }
}
