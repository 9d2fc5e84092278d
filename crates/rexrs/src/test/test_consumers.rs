use crate::consumers::{
    BackwardConsumer, Consumer, FixedConsumer, ManyConsumer, PredicateConsumer, RegexConsumer,
    SequenceConsumer,
};
use crate::input::Granularity;
use crate::regex::Regex;
use crate::searchers::{BackwardConsumerSearcher, BackwardSearcher, ConsumerSearcher, Searcher};

fn digits() -> PredicateConsumer<impl Fn(&str) -> bool> {
    PredicateConsumer::new(
        |s: &str| s.chars().all(|c| c.is_ascii_digit()),
        Granularity::Scalar,
    )
}

#[test]
fn fixed_consumer() {
    let c = FixedConsumer::new("ab", Granularity::Scalar);
    assert_eq!(c.consume("xaby", 1..4), Some(3));
    assert_eq!(c.consume("xaby", 0..4), None);
    // Too little room.
    assert_eq!(c.consume("xaby", 1..2), None);

    assert_eq!(c.consume_back("xaby", 0..3), Some(1));
    assert_eq!(c.consume_back("xaby", 0..4), None);
}

#[test]
fn fixed_consumer_respects_clusters() {
    // "a" + combining acute is one grapheme; a bare "a" cannot end inside it.
    let c = FixedConsumer::new("a", Granularity::Grapheme);
    assert_eq!(c.consume("a\u{301}b", 0..4), None);
    assert_eq!(c.consume("ab", 0..2), Some(1));
}

#[test]
fn predicate_consumer() {
    let c = digits();
    assert_eq!(c.consume("42a", 0..3), Some(1));
    assert_eq!(c.consume("a42", 0..3), None);
    assert_eq!(c.consume_back("a42", 0..3), Some(2));
    // Empty range has no element.
    assert_eq!(c.consume("42a", 1..1), None);
}

#[test]
fn many_consumer() {
    let c = ManyConsumer::new(digits());
    assert_eq!(c.consume("123ab", 0..5), Some(3));
    // Zero repetitions still succeed.
    assert_eq!(c.consume("ab", 0..2), Some(0));
    assert_eq!(c.consume_back("ab123", 0..5), Some(2));
}

#[test]
fn sequence_consumer() {
    let c = SequenceConsumer::new(
        ManyConsumer::new(digits()),
        FixedConsumer::new("a", Granularity::Scalar),
    );
    assert_eq!(c.consume("12ab", 0..4), Some(3));
    assert_eq!(c.consume("ab", 0..2), Some(1));
    assert_eq!(c.consume("12b", 0..3), None);
}

#[test]
fn regex_consumer() {
    let c = RegexConsumer::new(Regex::new("a+").unwrap());
    assert_eq!(c.consume("aab", 0..3), Some(2));
    assert_eq!(c.consume("baa", 0..3), None);
    // Backward: start of the suffix the pattern spans.
    assert_eq!(c.consume_back("xaa", 0..3), Some(1));
    assert_eq!(c.consume_back("xax", 0..3), None);
}

#[test]
fn consumer_searcher() {
    let s = ConsumerSearcher::new(FixedConsumer::new("na", Granularity::Scalar));
    assert_eq!(s.search("banana", 0..6), Some(2..4));
    assert_eq!(s.search("banana", 3..6), Some(4..6));
    assert_eq!(s.search("bx", 0..2), None);
}

#[test]
fn backward_consumer_searcher() {
    let s = BackwardConsumerSearcher::new(FixedConsumer::new("na", Granularity::Scalar));
    assert_eq!(s.search_back("banana", 0..6), Some(4..6));
    assert_eq!(s.search_back("banana", 0..5), Some(2..4));
    assert_eq!(s.search_back("bx", 0..2), None);
}

#[test]
fn regex_as_searcher() {
    let r = Regex::new("an").unwrap();
    assert_eq!(r.search("banana", 0..6), Some(1..3));
    assert_eq!(r.search("xyz", 0..3), None);
}
