use std::ops::Range;

use crate::input::Granularity;
use crate::regex::{Regex, RegexOptions};
use crate::vm::{CaptureValue, MatchOutcome};

fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

fn find(pattern: &str, text: &str) -> Option<Range<usize>> {
    rx(pattern).find(text).into_match().map(|m| m.range())
}

#[test]
fn literal_search() {
    assert_eq!(find("bc", "abcd"), Some(1..3));
    assert_eq!(find("x", "abcd"), None);
    assert_eq!(find("abcd", "abcd"), Some(0..4));
}

#[test]
fn empty_pattern_matches_empty() {
    assert_eq!(find("", ""), Some(0..0));
    assert_eq!(find("", "ab"), Some(0..0));
    assert_eq!(find("a|", "b"), Some(0..0));
}

#[test]
fn greedy_and_lazy() {
    assert_eq!(find("a+", "aaab"), Some(0..3));
    assert_eq!(find("a+?", "aaab"), Some(0..1));
    assert_eq!(find("a{2,3}", "aaaa"), Some(0..3));
    assert_eq!(find("a{2,3}?", "aaaa"), Some(0..2));
}

#[test]
fn alternation_priority() {
    // Leftmost branch wins even when a later one is longer.
    assert_eq!(find("ab|a", "abc"), Some(0..2));
    assert_eq!(find("a|ab", "abc"), Some(0..1));
}

#[test]
fn match_modes() {
    let r = rx("a|ab");
    // Whole-match keeps backtracking past an early accept.
    assert_eq!(
        r.match_whole("ab", 0..2).into_match().map(|m| m.range()),
        Some(0..2)
    );
    assert!(matches!(rx("a").match_whole("ab", 0..2), MatchOutcome::NoMatch));

    let r = rx("b");
    assert!(matches!(r.match_prefix("abc", 0..3), MatchOutcome::NoMatch));
    assert_eq!(
        r.match_prefix("abc", 1..3).into_match().map(|m| m.range()),
        Some(1..2)
    );
}

#[test]
fn search_respects_range() {
    assert_eq!(
        rx("a").find_in("banana", 2..5).into_match().map(|m| m.range()),
        Some(3..4)
    );
    // Assertions see the range edges as input edges.
    assert_eq!(
        rx("^a").find_in("banana", 3..6).into_match().map(|m| m.range()),
        Some(3..4)
    );
}

#[test]
fn backreferences() {
    assert_eq!(find(r"(a)\1", "aa"), Some(0..2));
    assert_eq!(find(r"(a)\1", "ab"), None);
    assert_eq!(find(r"(?<d>\d)\k<d>", "a11b"), Some(1..3));
    // Case folding applies to the referenced text.
    assert_eq!(find(r"(?i)(a)\1", "aA"), Some(0..2));
    // A reference to an unbound group fails rather than matching empty.
    assert_eq!(find(r"(a)?\1", "b"), None);
    assert_eq!(find(r"(a)?\1", "aa"), Some(0..2));
}

#[test]
fn capture_values() {
    let m = rx("(a)?b").find("b").into_match().unwrap();
    assert_eq!(m.capture(0), Some(&CaptureValue::Unbound));

    let m = rx("(ab)+").find("abab").into_match().unwrap();
    assert_eq!(m.capture(0), Some(&CaptureValue::Ranges(vec![0..2, 2..4])));

    let m = rx(r"(?<w>\w+)").find("  hey ").into_match().unwrap();
    assert_eq!(m.capture_named("w"), Some(&CaptureValue::Range(2..5)));

    // Duplicate names land in the shared slot.
    let m = rx("(?<x>a)|(?<x>b)").find("b").into_match().unwrap();
    assert_eq!(m.capture_named("x"), Some(&CaptureValue::Range(0..1)));
}

#[test]
fn captures_under_bounded_quantifiers() {
    let m = rx("(a){2}").find("aaa").into_match().unwrap();
    assert_eq!(m.range(), 0..2);
    assert_eq!(m.capture(0), Some(&CaptureValue::Ranges(vec![0..1, 1..2])));

    let m = rx(r"(?<d>\d){2,3}x").find("a123x").into_match().unwrap();
    assert_eq!(m.range(), 1..5);
    assert_eq!(
        m.capture_named("d"),
        Some(&CaptureValue::Ranges(vec![1..2, 2..3, 3..4]))
    );
}

#[test]
fn anchors_and_boundaries() {
    assert_eq!(find("^b", "ab"), None);
    assert_eq!(find("(?m)^b", "a\nb"), Some(2..3));
    assert_eq!(find("a$", "ba"), Some(1..2));
    assert_eq!(find("(?m)b$", "ab\nc"), Some(1..2));
    assert_eq!(find(r"\Aa\z", "a"), Some(0..1));
    assert_eq!(find(r"\Aa\z", "ab"), None);
    assert_eq!(find(r"\bcat\b", "the cat sat"), Some(4..7));
    assert_eq!(find(r"\bcat\b", "concatenate"), None);
    assert_eq!(find(r"\Bcat", "concatenate"), Some(3..6));
}

#[test]
fn dot_and_newlines() {
    assert_eq!(find(".", "\n"), None);
    assert_eq!(find("(?s).", "\n"), Some(0..1));
}

#[test]
fn case_insensitivity() {
    assert_eq!(find("(?i)abc", "xABCy"), Some(1..4));
    assert_eq!(find("(?i)[a-z]+", "ABC"), Some(0..3));
    // Disabling inside an enabled scope.
    assert_eq!(find("(?i:a(?-i:b))", "AB"), None);
    assert_eq!(find("(?i:a(?-i:b))", "Ab"), Some(0..2));
}

#[test]
fn grapheme_cluster_matching() {
    // Family emoji: four scalars joined by ZWJs, one cluster.
    let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F466}";
    let text = format!("{family}x");
    let m = rx(".").find(&text).into_match().unwrap();
    assert_eq!(m.range(), 0..family.len());

    // A literal may not stop in the middle of a cluster.
    assert_eq!(find("a", "a\u{301}b"), None);
}

#[test]
fn scalar_and_code_unit_granularity() {
    let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F466}";
    let scalar = RegexOptions {
        granularity: Granularity::Scalar,
        ..RegexOptions::default()
    };
    let m = Regex::with_options(".", scalar)
        .unwrap()
        .find(family)
        .into_match()
        .unwrap();
    assert_eq!(m.range(), 0..'\u{1F468}'.len_utf8());

    let code_unit = RegexOptions {
        granularity: Granularity::CodeUnit,
        ..RegexOptions::default()
    };
    let m = Regex::with_options(".", code_unit)
        .unwrap()
        .find("é")
        .into_match()
        .unwrap();
    assert_eq!(m.range(), 0..1);
    let m = Regex::with_options("é", code_unit)
        .unwrap()
        .find("xé")
        .into_match()
        .unwrap();
    assert_eq!(m.range(), 1..3);
}

#[test]
fn code_unit_search_continues_past_a_failed_multibyte_start() {
    // The first candidate fails at `\d`; the restart position lands
    // mid-scalar and the scan must still reach the real match.
    let opts = RegexOptions {
        granularity: Granularity::CodeUnit,
        ..RegexOptions::default()
    };
    let r = Regex::with_options(r"éab\d", opts).unwrap();
    let m = r.find("éabxéab9").into_match().unwrap();
    assert_eq!(m.range(), 5..10);
}

#[test]
fn unicode_properties_and_classes() {
    assert_eq!(find(r"\p{Script=Latin}+", "abcαβγ"), Some(0..3));
    assert_eq!(find(r"\p{Script=Greek}+", "abcαβγ"), Some(3..9));
    assert_eq!(find(r"\p{Lu}+", "abCDe"), Some(2..4));
    assert_eq!(find("[a-z&&[^aeiou]]+", "outbreak"), Some(2..5));
    assert_eq!(find("[[:digit:]]+", "ab12cd"), Some(2..4));
    assert_eq!(find(r"[\d--[0-4]]+", "1379"), Some(2..4));
}

#[test]
fn lookarounds() {
    assert_eq!(find("a(?=b)", "acab"), Some(2..3));
    assert_eq!(find("a(?!b)", "abac"), Some(2..3));
    assert_eq!(find("(?<=a)b", "cb ab"), Some(4..5));
    assert_eq!(find("(?<!a)b", "ab b"), Some(3..4));
    assert_eq!(find(r"(?<=\d{2})x", "1x 22x"), Some(5..6));
}

#[test]
fn lookahead_captures_persist() {
    let m = rx("(?=(a+))a").find("aaa").into_match().unwrap();
    assert_eq!(m.range(), 0..1);
    assert_eq!(m.capture(0), Some(&CaptureValue::Range(0..3)));
}

#[test]
fn atomic_groups_discard_alternatives() {
    assert_eq!(find("(?>a+)a", "aaa"), None);
    assert_eq!(find("(?>a+)b", "aab"), Some(0..3));
    // The non-atomic version can give an `a` back.
    assert_eq!(find("(?:a+)a", "aaa"), Some(0..3));
}

#[test]
fn possessive_branch_selection() {
    let r = rx("a+bcd(?:g*)ab+?c?de(?:(?:(?i:f)))hij|zzz++a|3|2|1");
    let m = r.find("zzzzzzzzza").into_match().unwrap();
    assert_eq!(m.range(), 0..10);
}

#[test]
fn zero_width_loops_terminate() {
    assert_eq!(find("(?:a|)*", "aab"), Some(0..2));
    assert_eq!(find("(?:b?)*", "aaa"), Some(0..0));
    assert_eq!(find(r"(?:\b)+x", "x"), Some(0..1));
}

#[test]
fn step_limit_exhaustion() {
    let opts = RegexOptions {
        step_limit: 5_000,
        ..RegexOptions::default()
    };
    let r = Regex::with_options("(?:a|a)+c", opts).unwrap();
    let text = format!("{}b", "a".repeat(30));
    assert!(matches!(r.find(&text), MatchOutcome::Exhausted));
    // The boolean view collapses exhaustion to no-match.
    assert!(!r.is_match(&text));
}

#[test]
fn exhaustion_is_not_reported_when_a_match_exists_first() {
    // The budget easily covers an immediate hit.
    let opts = RegexOptions {
        step_limit: 5_000,
        ..RegexOptions::default()
    };
    let r = Regex::with_options("(?:a|a)+c", opts).unwrap();
    assert!(matches!(r.find("aac"), MatchOutcome::Matched(_)));
}
