use crate::captures::{analyze, CaptureList};
use crate::error::SyntaxErrorCode;
use crate::parser::{parse, SyntaxOptions};

fn caps(pattern: &str) -> CaptureList {
    let ast = parse(pattern, SyntaxOptions::traditional()).unwrap();
    analyze(&ast).unwrap()
}

fn caps_err(pattern: &str) -> SyntaxErrorCode {
    let ast = parse(pattern, SyntaxOptions::traditional()).unwrap();
    analyze(&ast).unwrap_err().code
}

#[test]
fn preorder_slot_numbering() {
    let list = caps("(a)(b(c))");
    assert_eq!(list.slot_count(), 3);
    for i in 0..3 {
        assert_eq!(list.slot_for_occurrence(i), Some(i as u32));
    }
    assert!(list.names().is_empty());
}

#[test]
fn named_slots() {
    let list = caps("(?<x>a)(b)(?<y>c)");
    assert_eq!(list.index_of_name("x"), Some(0));
    assert_eq!(list.index_of_name("y"), Some(2));
    assert_eq!(list.index_of_name("z"), None);
    assert_eq!(list.slots[0].name.as_deref(), Some("x"));
    assert_eq!(list.slots[1].name, None);
}

#[test]
fn optionality() {
    let list = caps("(a)?(b)");
    assert!(list.slots[0].optional);
    assert!(!list.slots[1].optional);

    // Every branch of an alternation is optional.
    let list = caps("(a)|b");
    assert!(list.slots[0].optional);

    // Negative lookaround contents never bind.
    let list = caps("(?!(a))x");
    assert!(list.slots[0].optional);
}

#[test]
fn repetition_typing() {
    assert!(caps("(a)+").slots[0].repeats);
    assert!(caps("(a){2}").slots[0].repeats);
    assert!(!caps("(a)?").slots[0].repeats);
    assert!(!caps("(a)").slots[0].repeats);
    // Nesting under an outer quantifier counts.
    assert!(caps("(?:x(a))*").slots[0].repeats);
}

#[test]
fn duplicate_names_in_exclusive_branches_share_a_slot() {
    let list = caps("(?<x>a)|(?<x>b)|c");
    assert_eq!(list.slot_count(), 1);
    assert_eq!(list.slot_for_occurrence(0), Some(0));
    assert_eq!(list.slot_for_occurrence(1), Some(0));
    assert!(list.slots[0].optional);
}

#[test]
fn duplicate_names_elsewhere_are_rejected() {
    assert_eq!(
        caps_err("(?<x>a)(?<x>b)"),
        SyntaxErrorCode::DuplicateCaptureName
    );
    // Same branch of the same alternation does not count as exclusive.
    assert_eq!(
        caps_err("(?:(?<x>a)(?<x>b))|c"),
        SyntaxErrorCode::DuplicateCaptureName
    );
}

#[test]
fn duplicate_names_checked_against_every_prior_use() {
    // The second and third uses share a branch even though each is
    // exclusive with the first.
    assert_eq!(
        caps_err("(?<x>a)|(?<x>b)(?<x>c)"),
        SyntaxErrorCode::DuplicateCaptureName
    );
    // Three mutually exclusive uses still share one slot.
    let list = caps("(?<x>a)|(?<x>b)|(?<x>c)");
    assert_eq!(list.slot_count(), 1);
    assert_eq!(list.slot_for_occurrence(2), Some(0));
}

#[test]
fn backreference_validation() {
    caps(r"(a)\1");
    caps(r"(?<x>a)\k<x>");
    assert_eq!(caps_err(r"(a)\2"), SyntaxErrorCode::InvalidBackreference);
    assert_eq!(caps_err(r"\k<nope>"), SyntaxErrorCode::InvalidBackreference);
}
