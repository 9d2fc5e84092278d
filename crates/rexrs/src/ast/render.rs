// Canonical pattern rendering
// Prints an AST back to traditional syntax. Re-parsing the output yields a
// structurally equal AST (modulo trivia), which is what the round-trip
// tests lean on.

use super::{
    Ast, AstKind, Atom, AssertionKind, BackrefTarget, CategoryGroup, ClassExpr, ClassItem,
    GroupKind, MatchOptions, PosixClass, PropertyKind, QuantAmount, QuantKind, Quantifier,
    Shorthand,
};

/// Render `ast` in canonical traditional syntax.
pub fn render(ast: &Ast) -> String {
    let mut out = String::new();
    node(ast, &mut out);
    out
}

fn node(ast: &Ast, out: &mut String) {
    match &ast.kind {
        AstKind::Alternation(branches) => {
            for (i, branch) in branches.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                node(branch, out);
            }
        }
        AstKind::Concatenation(parts) => {
            for part in parts {
                node(part, out);
            }
        }
        AstKind::Group(kind, body) => group(kind, body, out),
        AstKind::Quantification(q, body) => {
            // The parser only ever quantifies atoms, classes, groups and
            // quotes; anything else is a programmatic AST and gets a
            // non-capturing wrapper so the output stays parseable.
            match &body.kind {
                AstKind::Atom(_)
                | AstKind::CharClass(_)
                | AstKind::Group(..)
                | AstKind::Quote(_) => node(body, out),
                _ => {
                    out.push_str("(?:");
                    node(body, out);
                    out.push(')');
                }
            }
            quantifier(q, out);
        }
        AstKind::Atom(a) => atom(a, out),
        AstKind::CharClass(expr) => class_top(expr, out),
        AstKind::Quote(text) => {
            out.push_str("\\Q");
            out.push_str(text);
            out.push_str("\\E");
        }
        AstKind::Trivia(text) => {
            out.push_str("(?#");
            out.push_str(text);
            out.push(')');
        }
        AstKind::Empty => {}
    }
}

fn group(kind: &GroupKind, body: &Ast, out: &mut String) {
    match kind {
        GroupKind::Capture => out.push('('),
        GroupKind::NamedCapture(name) => {
            out.push_str("(?<");
            out.push_str(name);
            out.push('>');
        }
        GroupKind::NonCapture => out.push_str("(?:"),
        GroupKind::Atomic => out.push_str("(?>"),
        GroupKind::Lookahead { negated } => {
            out.push_str(if *negated { "(?!" } else { "(?=" })
        }
        GroupKind::Lookbehind { negated } => {
            out.push_str(if *negated { "(?<!" } else { "(?<=" })
        }
        GroupKind::Options(toggle) => {
            out.push_str("(?");
            option_letters(toggle.enable, out);
            if toggle.disable != MatchOptions::default() {
                out.push('-');
                option_letters(toggle.disable, out);
            }
            out.push(':');
        }
    }
    node(body, out);
    out.push(')');
}

fn option_letters(opts: MatchOptions, out: &mut String) {
    if opts.case_insensitive {
        out.push('i');
    }
    if opts.multiline {
        out.push('m');
    }
    if opts.dot_matches_newline {
        out.push('s');
    }
}

fn quantifier(q: &Quantifier, out: &mut String) {
    let mut buf = itoa::Buffer::new();
    match q.amount {
        QuantAmount::ZeroOrMore => out.push('*'),
        QuantAmount::OneOrMore => out.push('+'),
        QuantAmount::ZeroOrOne => out.push('?'),
        QuantAmount::Exactly(n) => {
            out.push('{');
            out.push_str(buf.format(n));
            out.push('}');
        }
        QuantAmount::AtLeast(n) => {
            out.push('{');
            out.push_str(buf.format(n));
            out.push_str(",}");
        }
        QuantAmount::Range(n, m) => {
            out.push('{');
            out.push_str(buf.format(n));
            out.push(',');
            out.push_str(buf.format(m));
            out.push('}');
        }
    }
    match q.kind {
        QuantKind::Greedy => {}
        QuantKind::Lazy => out.push('?'),
        QuantKind::Possessive => out.push('+'),
    }
}

fn atom(a: &Atom, out: &mut String) {
    match a {
        Atom::Char(c) => literal_char(*c, out),
        Atom::Any => out.push('.'),
        Atom::Assertion(kind) => out.push_str(match kind {
            AssertionKind::StartOfLine => "^",
            AssertionKind::EndOfLine => "$",
            AssertionKind::WordBoundary => "\\b",
            AssertionKind::NotWordBoundary => "\\B",
            AssertionKind::StartOfInput => "\\A",
            AssertionKind::EndOfInput => "\\z",
        }),
        Atom::Backreference(target) => match target {
            BackrefTarget::Index(n) => {
                let mut buf = itoa::Buffer::new();
                out.push('\\');
                out.push_str(buf.format(*n));
            }
            BackrefTarget::Named(name) => {
                out.push_str("\\k<");
                out.push_str(name);
                out.push('>');
            }
        },
    }
}

fn literal_char(c: char, out: &mut String) {
    match c {
        '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' => {
            out.push('\\');
            out.push(c);
        }
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        _ => out.push(c),
    }
}

/// Top-level class rendering: bare shorthands and properties stay bare,
/// everything else gets brackets.
fn class_top(expr: &ClassExpr, out: &mut String) {
    match expr {
        ClassExpr::Item(ClassItem::Shorthand(s)) => shorthand(*s, out),
        ClassExpr::Item(ClassItem::Property { kind, negated }) => property(kind, *negated, out),
        ClassExpr::Negation(inner) => {
            out.push_str("[^");
            class_body(inner, out);
            out.push(']');
        }
        other => {
            out.push('[');
            class_body(other, out);
            out.push(']');
        }
    }
}

/// Render a class expression as bracket interior text.
fn class_body(expr: &ClassExpr, out: &mut String) {
    match expr {
        ClassExpr::Item(item) => class_item(item, out),
        ClassExpr::Union(members) => {
            for member in members {
                match member {
                    ClassExpr::Item(item) => class_item(item, out),
                    nested => class_top(nested, out),
                }
            }
        }
        ClassExpr::Intersection(a, b) => {
            operand(a, out);
            out.push_str("&&");
            operand(b, out);
        }
        ClassExpr::Difference(a, b) => {
            operand(a, out);
            out.push_str("--");
            operand(b, out);
        }
        ClassExpr::Negation(_) => class_top(expr, out),
    }
}

fn operand(expr: &ClassExpr, out: &mut String) {
    match expr {
        ClassExpr::Item(item) => class_item(item, out),
        nested => class_top(nested, out),
    }
}

fn class_item(item: &ClassItem, out: &mut String) {
    match item {
        ClassItem::Char(c) => class_char(*c, out),
        ClassItem::Range(lo, hi) => {
            class_char(*lo, out);
            out.push('-');
            class_char(*hi, out);
        }
        ClassItem::Posix(p) => {
            out.push_str("[:");
            out.push_str(posix_name(*p));
            out.push_str(":]");
        }
        ClassItem::Shorthand(s) => shorthand(*s, out),
        ClassItem::Property { kind, negated } => property(kind, *negated, out),
    }
}

fn class_char(c: char, out: &mut String) {
    match c {
        ']' | '[' | '\\' | '^' | '-' | '&' => {
            out.push('\\');
            out.push(c);
        }
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        _ => out.push(c),
    }
}

fn shorthand(s: Shorthand, out: &mut String) {
    out.push_str(match s {
        Shorthand::Digit => "\\d",
        Shorthand::NotDigit => "\\D",
        Shorthand::Word => "\\w",
        Shorthand::NotWord => "\\W",
        Shorthand::Space => "\\s",
        Shorthand::NotSpace => "\\S",
    });
}

fn posix_name(p: PosixClass) -> &'static str {
    match p {
        PosixClass::Alnum => "alnum",
        PosixClass::Alpha => "alpha",
        PosixClass::Blank => "blank",
        PosixClass::Cntrl => "cntrl",
        PosixClass::Digit => "digit",
        PosixClass::Graph => "graph",
        PosixClass::Lower => "lower",
        PosixClass::Print => "print",
        PosixClass::Punct => "punct",
        PosixClass::Space => "space",
        PosixClass::Upper => "upper",
        PosixClass::Word => "word",
        PosixClass::Xdigit => "xdigit",
    }
}

fn property(kind: &PropertyKind, negated: bool, out: &mut String) {
    out.push_str(if negated { "\\P{" } else { "\\p{" });
    match kind {
        PropertyKind::Category(gc) => out.push_str(category_abbrev(*gc)),
        PropertyKind::CategoryGroup(g) => out.push_str(match g {
            CategoryGroup::Letter => "L",
            CategoryGroup::Mark => "M",
            CategoryGroup::Number => "N",
            CategoryGroup::Punctuation => "P",
            CategoryGroup::Symbol => "S",
            CategoryGroup::Separator => "Z",
            CategoryGroup::Other => "C",
        }),
        PropertyKind::Script(script) => {
            out.push_str("Script=");
            out.push_str(script.full_name());
        }
        PropertyKind::Alphabetic => out.push_str("Alphabetic"),
        PropertyKind::WhiteSpace => out.push_str("White_Space"),
        PropertyKind::Uppercase => out.push_str("Uppercase"),
        PropertyKind::Lowercase => out.push_str("Lowercase"),
    }
    out.push('}');
}

fn category_abbrev(gc: unicode_general_category::GeneralCategory) -> &'static str {
    use unicode_general_category::GeneralCategory::*;
    match gc {
        UppercaseLetter => "Lu",
        LowercaseLetter => "Ll",
        TitlecaseLetter => "Lt",
        ModifierLetter => "Lm",
        OtherLetter => "Lo",
        NonspacingMark => "Mn",
        SpacingMark => "Mc",
        EnclosingMark => "Me",
        DecimalNumber => "Nd",
        LetterNumber => "Nl",
        OtherNumber => "No",
        ConnectorPunctuation => "Pc",
        DashPunctuation => "Pd",
        OpenPunctuation => "Ps",
        ClosePunctuation => "Pe",
        InitialPunctuation => "Pi",
        FinalPunctuation => "Pf",
        OtherPunctuation => "Po",
        MathSymbol => "Sm",
        CurrencySymbol => "Sc",
        ModifierSymbol => "Sk",
        OtherSymbol => "So",
        SpaceSeparator => "Zs",
        LineSeparator => "Zl",
        ParagraphSeparator => "Zp",
        Control => "Cc",
        Format => "Cf",
        Surrogate => "Cs",
        PrivateUse => "Co",
        Unassigned => "Cn",
    }
}
