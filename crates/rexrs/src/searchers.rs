// Collection searchers
// Find the first (or last) subrange a matcher accepts. Any consumer
// becomes a searcher by sliding its start across the range.

use std::ops::Range;

use crate::consumers::{BackwardConsumer, Consumer};
use crate::regex::Regex;

pub trait Searcher {
    /// First matching subrange of `text[range]`, scanning forward.
    fn search(&self, text: &str, range: Range<usize>) -> Option<Range<usize>>;
}

pub trait BackwardSearcher {
    /// Last matching subrange of `text[range]`, scanning backward.
    fn search_back(&self, text: &str, range: Range<usize>) -> Option<Range<usize>>;
}

/// Slides a consumer forward one scalar at a time.
#[derive(Debug, Clone)]
pub struct ConsumerSearcher<C> {
    consumer: C,
}

impl<C> ConsumerSearcher<C> {
    pub fn new(consumer: C) -> Self {
        ConsumerSearcher { consumer }
    }
}

impl<C: Consumer> Searcher for ConsumerSearcher<C> {
    fn search(&self, text: &str, range: Range<usize>) -> Option<Range<usize>> {
        let mut start = range.start;
        loop {
            if let Some(end) = self.consumer.consume(text, start..range.end) {
                return Some(start..end);
            }
            if start >= range.end {
                return None;
            }
            start += text[start..].chars().next()?.len_utf8();
        }
    }
}

/// Slides a backward consumer from the end of the range.
#[derive(Debug, Clone)]
pub struct BackwardConsumerSearcher<C> {
    consumer: C,
}

impl<C> BackwardConsumerSearcher<C> {
    pub fn new(consumer: C) -> Self {
        BackwardConsumerSearcher { consumer }
    }
}

impl<C: BackwardConsumer> BackwardSearcher for BackwardConsumerSearcher<C> {
    fn search_back(&self, text: &str, range: Range<usize>) -> Option<Range<usize>> {
        let mut end = range.end;
        loop {
            if let Some(start) = self.consumer.consume_back(text, range.start..end) {
                return Some(start..end);
            }
            if end <= range.start {
                return None;
            }
            end -= text[..end].chars().next_back()?.len_utf8();
        }
    }
}

/// A compiled regex searches directly via the engine's leftmost scan.
/// A run that exhausts its step budget reports no match.
impl Searcher for Regex {
    fn search(&self, text: &str, range: Range<usize>) -> Option<Range<usize>> {
        self.find_in(text, range).into_match().map(|m| m.range())
    }
}
