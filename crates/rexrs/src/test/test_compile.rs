use crate::ast::MatchOptions;
use crate::captures::analyze;
use crate::compiler::{compile, CompileOptions};
use crate::parser::{parse, SyntaxOptions};
use crate::program::{Inst, LookKind, Program};

fn program(pattern: &str) -> Program {
    program_with(pattern, CompileOptions::default())
}

fn program_with(pattern: &str, opts: CompileOptions) -> Program {
    let ast = parse(pattern, SyntaxOptions::traditional()).unwrap();
    let caps = analyze(&ast).unwrap();
    compile(&ast, &caps, opts).unwrap()
}

fn has<F: Fn(&Inst) -> bool>(p: &Program, f: F) -> bool {
    p.insts.iter().any(f)
}

#[test]
fn adjacent_literals_fuse() {
    let p = program(r"ab\x63d");
    assert_eq!(p.insts, vec![Inst::Literal(0), Inst::Accept]);
    assert_eq!(p.pool.literals[0].text, "abcd");
}

#[test]
fn compilation_is_deterministic() {
    let pattern = r"a+(b|c)*\d{2,}(?=x)";
    assert_eq!(program(pattern), program(pattern));
}

#[test]
fn options_bake_into_instructions() {
    let p = program("(?i:a)b");
    assert_eq!(p.pool.literals.len(), 2);
    assert!(p.pool.literals[0].case_insensitive);
    assert!(!p.pool.literals[1].case_insensitive);

    let base = CompileOptions {
        options: MatchOptions {
            case_insensitive: true,
            ..MatchOptions::default()
        },
        ..CompileOptions::default()
    };
    let p = program_with("ab", base);
    assert!(p.pool.literals[0].case_insensitive);

    assert!(has(&program("(?s:.)"), |i| matches!(
        i,
        Inst::Any { allow_newline: true }
    )));
    assert!(has(&program("."), |i| matches!(
        i,
        Inst::Any {
            allow_newline: false
        }
    )));
}

#[test]
fn small_bounded_quantifiers_unroll() {
    let p = program("a{3}");
    assert!(!has(&p, |i| matches!(i, Inst::Repeat { .. })));
    assert_eq!(p.insts.len(), 4);

    let p = program("a{1,3}");
    assert!(!has(&p, |i| matches!(i, Inst::Repeat { .. })));
    assert_eq!(p.counter_count, 0);
}

#[test]
fn large_and_unbounded_quantifiers_use_counters() {
    let p = program("a{20}");
    assert!(has(&p, |i| matches!(
        i,
        Inst::Repeat {
            min: 20,
            max: Some(20),
            ..
        }
    )));
    assert!(has(&p, |i| matches!(i, Inst::RepeatReset(_))));

    let p = program("a*");
    assert!(has(&p, |i| matches!(
        i,
        Inst::Repeat {
            min: 0,
            max: None,
            lazy: false,
            ..
        }
    )));

    let p = program("a+?");
    assert!(has(&p, |i| matches!(i, Inst::Repeat { lazy: true, .. })));
}

#[test]
fn possessive_quantifiers_are_atomic() {
    let p = program("a++");
    assert_eq!(p.insts[0], Inst::AtomicBegin);
    assert!(has(&p, |i| matches!(i, Inst::AtomicEnd)));
}

#[test]
fn lookarounds_become_subprograms() {
    let p = program("(?=ab)c");
    assert_eq!(p.pool.subprograms.len(), 1);
    assert!(has(&p, |i| matches!(
        i,
        Inst::Look {
            kind: LookKind::Ahead,
            negated: false,
            ..
        }
    )));
    let sub = &p.pool.subprograms[0];
    assert_eq!(sub.insts.last(), Some(&Inst::Accept));

    assert!(has(&program("(?<!x)y"), |i| matches!(
        i,
        Inst::Look {
            kind: LookKind::Behind,
            negated: true,
            ..
        }
    )));
}

#[test]
fn capture_groups_emit_saves() {
    let p = program("(?<x>a)|(?<x>b)");
    assert_eq!(p.capture_count, 1);
    let saves = p
        .insts
        .iter()
        .filter(|i| matches!(i, Inst::SaveStart(0)))
        .count();
    assert_eq!(saves, 2);
    assert_eq!(p.names.get("x"), Some(&0));
}

#[test]
fn unrolled_capture_copies_share_a_slot() {
    let p = program("(a){2}(b)");
    assert_eq!(p.capture_count, 2);
    let starts: Vec<u32> = p
        .insts
        .iter()
        .filter_map(|i| match i {
            Inst::SaveStart(s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(starts, vec![0, 0, 1]);

    let p = program("(?:x(?<n>y)){1,3}");
    let starts = p
        .insts
        .iter()
        .filter(|i| matches!(i, Inst::SaveStart(0)))
        .count();
    assert_eq!(starts, 3);

    // A zero-repetition body emits nothing, yet later groups still
    // resolve past its occurrences.
    let p = program("(a){0}(b)");
    assert_eq!(p.capture_count, 2);
    assert!(!has(&p, |i| matches!(i, Inst::SaveStart(0))));
    assert!(has(&p, |i| matches!(i, Inst::SaveStart(1))));
}

#[test]
fn prefix_and_anchor_hoisting() {
    let p = program(r"\Aabc.*");
    assert!(p.anchored_start);
    assert_eq!(p.prefix.as_deref(), Some("abc"));

    let p = program("^ab");
    assert!(p.anchored_start);

    // Multiline ^ can match mid-text, so no anchor.
    let p = program("(?m)^ab");
    assert!(!p.anchored_start);

    // Alternations get no prefix.
    assert_eq!(program("abc|x").prefix, None);

    // Case-insensitive heads are not hoisted.
    assert_eq!(program("(?i)abc").prefix, None);

    // A required leading repetition contributes its head.
    assert_eq!(program("z+x").prefix.as_deref(), Some("z"));
}

#[test]
fn backreferences_resolve_to_slots() {
    let p = program(r"(?<x>a)\k<x>(b)\2");
    let backrefs: Vec<u32> = p
        .insts
        .iter()
        .filter_map(|i| match i {
            Inst::Backref { slot, .. } => Some(*slot),
            _ => None,
        })
        .collect();
    assert_eq!(backrefs, vec![0, 1]);
}
