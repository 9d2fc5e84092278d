// Collection consumers
// Composable prefix/suffix matchers over string ranges. A consumer
// reports how far it can eat from the front (or back) of a range;
// searchers are derived from consumers by sliding the start position.

use std::ops::Range;

use smol_str::SmolStr;

use crate::input::{Granularity, Input};
use crate::regex::Regex;

/// Matches a prefix of `text[range]` and reports where it ends.
pub trait Consumer {
    /// End offset of the matched prefix, or None if nothing matches.
    /// Implementations must return an offset in `range`.
    fn consume(&self, text: &str, range: Range<usize>) -> Option<usize>;
}

/// Matches a suffix of `text[range]` and reports where it starts.
pub trait BackwardConsumer {
    fn consume_back(&self, text: &str, range: Range<usize>) -> Option<usize>;
}

/// Consumes an exact literal, honoring element boundaries at the chosen
/// granularity.
#[derive(Debug, Clone)]
pub struct FixedConsumer {
    needle: SmolStr,
    granularity: Granularity,
}

impl FixedConsumer {
    pub fn new(needle: &str, granularity: Granularity) -> Self {
        FixedConsumer {
            needle: SmolStr::new(needle),
            granularity,
        }
    }
}

impl Consumer for FixedConsumer {
    fn consume(&self, text: &str, range: Range<usize>) -> Option<usize> {
        let end = range.start + self.needle.len();
        if end > range.end || !text[range.start..].starts_with(self.needle.as_str()) {
            return None;
        }
        Input::new(text, self.granularity)
            .is_boundary(end)
            .then_some(end)
    }
}

impl BackwardConsumer for FixedConsumer {
    fn consume_back(&self, text: &str, range: Range<usize>) -> Option<usize> {
        let start = range.end.checked_sub(self.needle.len())?;
        if start < range.start || !text[..range.end].ends_with(self.needle.as_str()) {
            return None;
        }
        Input::new(text, self.granularity)
            .is_boundary(start)
            .then_some(start)
    }
}

/// Consumes one element whose text satisfies a predicate.
#[derive(Debug, Clone)]
pub struct PredicateConsumer<P> {
    pred: P,
    granularity: Granularity,
}

impl<P: Fn(&str) -> bool> PredicateConsumer<P> {
    pub fn new(pred: P, granularity: Granularity) -> Self {
        PredicateConsumer { pred, granularity }
    }
}

impl<P: Fn(&str) -> bool> Consumer for PredicateConsumer<P> {
    fn consume(&self, text: &str, range: Range<usize>) -> Option<usize> {
        let input = Input::new(text, self.granularity);
        let end = input.next_boundary(range.start).filter(|&e| e <= range.end)?;
        (self.pred)(&text[range.start..end]).then_some(end)
    }
}

impl<P: Fn(&str) -> bool> BackwardConsumer for PredicateConsumer<P> {
    fn consume_back(&self, text: &str, range: Range<usize>) -> Option<usize> {
        let input = Input::new(text, self.granularity);
        let start = input.prev_boundary(range.end).filter(|&s| s >= range.start)?;
        (self.pred)(&text[start..range.end]).then_some(start)
    }
}

/// Greedily repeats an inner consumer zero or more times. Always
/// succeeds; an iteration that consumes nothing ends the repetition.
#[derive(Debug, Clone)]
pub struct ManyConsumer<C> {
    inner: C,
}

impl<C> ManyConsumer<C> {
    pub fn new(inner: C) -> Self {
        ManyConsumer { inner }
    }
}

impl<C: Consumer> Consumer for ManyConsumer<C> {
    fn consume(&self, text: &str, range: Range<usize>) -> Option<usize> {
        let mut at = range.start;
        while let Some(next) = self.inner.consume(text, at..range.end) {
            if next <= at {
                break;
            }
            at = next;
        }
        Some(at)
    }
}

impl<C: BackwardConsumer> BackwardConsumer for ManyConsumer<C> {
    fn consume_back(&self, text: &str, range: Range<usize>) -> Option<usize> {
        let mut at = range.end;
        while let Some(prev) = self.inner.consume_back(text, range.start..at) {
            if prev >= at {
                break;
            }
            at = prev;
        }
        Some(at)
    }
}

/// Runs two consumers in sequence.
#[derive(Debug, Clone)]
pub struct SequenceConsumer<A, B> {
    first: A,
    second: B,
}

impl<A, B> SequenceConsumer<A, B> {
    pub fn new(first: A, second: B) -> Self {
        SequenceConsumer { first, second }
    }
}

impl<A: Consumer, B: Consumer> Consumer for SequenceConsumer<A, B> {
    fn consume(&self, text: &str, range: Range<usize>) -> Option<usize> {
        let mid = self.first.consume(text, range.clone())?;
        self.second.consume(text, mid..range.end)
    }
}

impl<A: BackwardConsumer, B: BackwardConsumer> BackwardConsumer for SequenceConsumer<A, B> {
    fn consume_back(&self, text: &str, range: Range<usize>) -> Option<usize> {
        let mid = self.second.consume_back(text, range.clone())?;
        self.first.consume_back(text, range.start..mid)
    }
}

/// Adapts a compiled regex as a consumer. A run that exhausts its step
/// budget reports no match.
#[derive(Debug, Clone)]
pub struct RegexConsumer {
    regex: Regex,
}

impl RegexConsumer {
    pub fn new(regex: Regex) -> Self {
        RegexConsumer { regex }
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl Consumer for RegexConsumer {
    fn consume(&self, text: &str, range: Range<usize>) -> Option<usize> {
        self.regex
            .match_prefix(text, range)
            .into_match()
            .map(|m| m.range().end)
    }
}

impl BackwardConsumer for RegexConsumer {
    fn consume_back(&self, text: &str, range: Range<usize>) -> Option<usize> {
        // Earliest start wins, so the longest matching suffix is taken.
        let input = Input::new(text, self.regex.granularity());
        let mut start = range.start;
        loop {
            if self
                .regex
                .match_whole(text, start..range.end)
                .into_match()
                .is_some()
            {
                return Some(start);
            }
            if start >= range.end {
                return None;
            }
            start = input.next_boundary(start)?;
        }
    }
}
