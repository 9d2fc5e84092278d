use crate::ast::{
    render, Ast, AstKind, Atom, ClassExpr, ClassItem, GroupKind, QuantAmount, QuantKind,
};
use crate::error::SyntaxErrorCode;
use crate::parser::{parse, SyntaxOptions};

fn p(pattern: &str) -> Ast {
    parse(pattern, SyntaxOptions::traditional()).unwrap()
}

fn err(pattern: &str) -> SyntaxErrorCode {
    parse(pattern, SyntaxOptions::traditional()).unwrap_err().code
}

#[test]
fn alternation_and_concatenation() {
    let ast = p("ab|c|d");
    let AstKind::Alternation(branches) = &ast.kind else {
        panic!("expected alternation, got {:?}", ast.kind);
    };
    assert_eq!(branches.len(), 3);
    let AstKind::Concatenation(parts) = &branches[0].kind else {
        panic!("expected concatenation");
    };
    assert_eq!(parts.len(), 2);
}

#[test]
fn quantifier_amounts_and_kinds() {
    let cases = [
        ("a*", QuantAmount::ZeroOrMore, QuantKind::Greedy),
        ("a*?", QuantAmount::ZeroOrMore, QuantKind::Lazy),
        ("a++", QuantAmount::OneOrMore, QuantKind::Possessive),
        ("a?", QuantAmount::ZeroOrOne, QuantKind::Greedy),
        ("a{3}", QuantAmount::Exactly(3), QuantKind::Greedy),
        ("a{2,}", QuantAmount::AtLeast(2), QuantKind::Greedy),
        ("a{2,5}?", QuantAmount::Range(2, 5), QuantKind::Lazy),
        ("a{,5}", QuantAmount::Range(0, 5), QuantKind::Greedy),
    ];
    for (pattern, amount, kind) in cases {
        let ast = p(pattern);
        let AstKind::Quantification(q, _) = &ast.kind else {
            panic!("{pattern}: expected quantification, got {:?}", ast.kind);
        };
        assert_eq!(q.amount, amount, "{pattern}");
        assert_eq!(q.kind, kind, "{pattern}");
    }
}

#[test]
fn brace_without_bounds_is_literal() {
    let ast = p("a{b}");
    let AstKind::Concatenation(parts) = &ast.kind else {
        panic!("expected concatenation");
    };
    assert_eq!(parts[1].kind, AstKind::Atom(Atom::Char('{')));
}

#[test]
fn bad_quantifiers() {
    assert_eq!(err("a**"), SyntaxErrorCode::InvalidQuantifier);
    assert_eq!(err("*a"), SyntaxErrorCode::InvalidQuantifier);
    assert_eq!(err("a{2,1}"), SyntaxErrorCode::InvalidQuantifier);
    assert_eq!(err("(?#note)*"), SyntaxErrorCode::InvalidQuantifier);
}

#[test]
fn group_kinds() {
    let kinds = [
        ("(a)", GroupKind::Capture),
        ("(?:a)", GroupKind::NonCapture),
        ("(?>a)", GroupKind::Atomic),
        ("(?=a)", GroupKind::Lookahead { negated: false }),
        ("(?!a)", GroupKind::Lookahead { negated: true }),
        ("(?<=a)", GroupKind::Lookbehind { negated: false }),
        ("(?<!a)", GroupKind::Lookbehind { negated: true }),
        ("(?<name>a)", GroupKind::NamedCapture("name".into())),
    ];
    for (pattern, expected) in kinds {
        let ast = p(pattern);
        let AstKind::Group(kind, _) = &ast.kind else {
            panic!("{pattern}: expected group, got {:?}", ast.kind);
        };
        assert_eq!(*kind, expected, "{pattern}");
    }
}

#[test]
fn inline_options_scope_to_branch_end() {
    let ast = p("x|(?i)ab|y");
    let AstKind::Alternation(branches) = &ast.kind else {
        panic!("expected alternation");
    };
    assert!(matches!(
        branches[1].kind,
        AstKind::Group(GroupKind::Options(_), _)
    ));
    // The other branches are untouched.
    assert_eq!(branches[2].kind, AstKind::Atom(Atom::Char('y')));
}

#[test]
fn comment_groups_are_trivia() {
    let ast = p("(?#ignore me)a");
    let AstKind::Concatenation(parts) = &ast.kind else {
        panic!("expected concatenation");
    };
    assert_eq!(parts[0].kind, AstKind::Trivia("ignore me".to_string()));
}

#[test]
fn character_escapes() {
    assert_eq!(p(r"\x41").kind, AstKind::Atom(Atom::Char('A')));
    assert_eq!(p(r"\u{1F600}").kind, AstKind::Atom(Atom::Char('\u{1F600}')));
    assert_eq!(p(r"A").kind, AstKind::Atom(Atom::Char('A')));
    assert_eq!(p(r"\n").kind, AstKind::Atom(Atom::Char('\n')));
    assert_eq!(p(r"\.").kind, AstKind::Atom(Atom::Char('.')));
    assert_eq!(err(r"\q"), SyntaxErrorCode::InvalidEscape);
    assert_eq!(err("\\"), SyntaxErrorCode::InvalidEscape);
}

#[test]
fn verbatim_quotes() {
    assert_eq!(p(r"\Qa*b\E").kind, AstKind::Quote("a*b".to_string()));
    // Missing \E quotes through the end.
    assert_eq!(p(r"\Qa(b").kind, AstKind::Quote("a(b".to_string()));
}

#[test]
fn classes() {
    assert_eq!(
        p("[a-z]").kind,
        AstKind::CharClass(ClassExpr::Item(ClassItem::Range('a', 'z')))
    );
    assert!(matches!(
        p("[^ab]").kind,
        AstKind::CharClass(ClassExpr::Negation(_))
    ));
    // Leading ] is a literal member.
    let AstKind::CharClass(ClassExpr::Union(members)) = p("[]a]").kind else {
        panic!("expected union");
    };
    assert_eq!(members[0], ClassExpr::Item(ClassItem::Char(']')));
    assert!(matches!(
        p("[a&&b]").kind,
        AstKind::CharClass(ClassExpr::Intersection(..))
    ));
    assert!(matches!(
        p("[a--b]").kind,
        AstKind::CharClass(ClassExpr::Difference(..))
    ));
    assert!(matches!(
        p("[[:digit:]]").kind,
        AstKind::CharClass(ClassExpr::Item(ClassItem::Posix(_)))
    ));
}

#[test]
fn malformed_input() {
    assert_eq!(err("[z-a]"), SyntaxErrorCode::UnbalancedClass);
    assert_eq!(err("[ab"), SyntaxErrorCode::UnbalancedClass);
    assert_eq!(err("(a"), SyntaxErrorCode::UnterminatedGroup);
    assert_eq!(err("a)"), SyntaxErrorCode::UnterminatedGroup);
    assert_eq!(err(r"\p{Bogus}"), SyntaxErrorCode::UnknownProperty);
    assert_eq!(err("[[:nope:]]"), SyntaxErrorCode::UnknownProperty);
}

#[test]
fn property_escapes() {
    let AstKind::CharClass(ClassExpr::Item(ClassItem::Property { negated, .. })) = p(r"\p{L}").kind
    else {
        panic!("expected property");
    };
    assert!(!negated);
    let AstKind::CharClass(ClassExpr::Item(ClassItem::Property { negated, .. })) =
        p(r"\P{Lu}").kind
    else {
        panic!("expected property");
    };
    assert!(negated);
}

#[test]
fn extended_profile() {
    let loose = parse("a b\n\tc", SyntaxOptions::extended()).unwrap();
    assert!(loose.structural_eq(&p("abc")));
    let quoted = parse("\"a*b\"", SyntaxOptions::extended()).unwrap();
    assert_eq!(quoted.kind, AstKind::Quote("a*b".to_string()));
}

#[test]
fn render_round_trip() {
    let patterns = [
        "a|b|c",
        "(?:ab)+?",
        r"(?<x>a)\k<x>",
        "[a-z&&[^aeiou]]",
        "(?im-s:a.b)",
        "a{2,5}+",
        r"\p{Script=Greek}\d[^x-z]",
        "(?>ab|c)",
        "(?=a)(?<!b)c",
        r"\Q+*\E{2}",
        r"^a$|\Ab\z",
        r"a\n\x41",
        "(?i)x(y|z)*",
        "[]a-c[:upper:]]",
    ];
    for pattern in patterns {
        let ast = p(pattern);
        let rendered = render(&ast);
        let reparsed = p(&rendered);
        assert!(
            ast.structural_eq(&reparsed),
            "{pattern} -> {rendered} did not round-trip"
        );
    }
}
