// Backtracking executor
// Single-thread depth-first interpreter over a compiled program. Every
// choice point pushes a full snapshot; the step budget is shared across
// the whole call (all attempts and lookaround sub-programs), so runtime
// is bounded regardless of pattern shape.

use std::collections::HashMap;
use std::ops::Range;

use ahash::RandomState;
use smol_str::SmolStr;

use crate::input::{Granularity, Input};
use crate::program::{AssertInst, CompiledClass, Inst, LiteralRun, LookKind, Pc, Program};
use crate::unicode;

/// Default per-call step budget.
pub const DEFAULT_STEP_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchMode {
    /// Match must span the entire range
    Whole,
    /// Match must start at the range start
    Prefix,
    /// Leftmost match anywhere in the range
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched(MatchResult),
    NoMatch,
    /// Step budget ran out before the attempt resolved either way
    Exhausted,
}

impl MatchOutcome {
    pub fn into_match(self) -> Option<MatchResult> {
        match self {
            MatchOutcome::Matched(result) => Some(result),
            MatchOutcome::NoMatch | MatchOutcome::Exhausted => None,
        }
    }
}

/// A successful match: the overall range plus one value per capture slot.
/// All positions are byte offsets into the searched text.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    range: Range<usize>,
    captures: Vec<CaptureValue>,
    names: HashMap<SmolStr, u32, RandomState>,
}

impl MatchResult {
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    pub fn capture(&self, index: u32) -> Option<&CaptureValue> {
        self.captures.get(index as usize)
    }

    pub fn capture_named(&self, name: &str) -> Option<&CaptureValue> {
        self.captures.get(*self.names.get(name)? as usize)
    }
}

/// Capture slot result, typed by the analyzer's optional/repeats flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureValue {
    /// The group never bound (untaken branch, zero repetitions)
    Unbound,
    /// Exactly one bound range
    Range(Range<usize>),
    /// One range per iteration of an enclosing quantifier
    Ranges(Vec<Range<usize>>),
}

impl CaptureValue {
    /// Latest bound range, if any.
    pub fn last(&self) -> Option<Range<usize>> {
        match self {
            CaptureValue::Unbound => None,
            CaptureValue::Range(r) => Some(r.clone()),
            CaptureValue::Ranges(rs) => rs.last().cloned(),
        }
    }
}

/// Run `program` over `text[range]`. `range` bounds both the match and
/// every assertion: `^`, `$`, `\A`, `\z` and word boundaries treat the
/// range edges as the edges of the input.
pub fn execute(
    program: &Program,
    text: &str,
    range: Range<usize>,
    mode: MatchMode,
    step_limit: usize,
) -> MatchOutcome {
    let end = range.end.min(text.len());
    let start = range.start.min(end);
    let input = Input::new(text, program.granularity);
    let mut machine = Machine {
        input,
        range_start: start,
        steps: step_limit,
    };

    let whole = mode == MatchMode::Whole;
    let mut at = Some(start);
    while let Some(s) = at {
        let s = if mode == MatchMode::Search {
            match machine.next_viable_start(program, s, end) {
                Some(s) => s,
                None => return MatchOutcome::NoMatch,
            }
        } else {
            s
        };
        let slots = vec![SlotState::default(); program.capture_count as usize];
        match machine.attempt(program, s, end, whole, slots) {
            Attempt::Matched(thread) => {
                return MatchOutcome::Matched(finish(program, &thread, s));
            }
            Attempt::Exhausted => return MatchOutcome::Exhausted,
            Attempt::NoMatch => {}
        }
        if mode != MatchMode::Search || program.anchored_start || s >= end {
            return MatchOutcome::NoMatch;
        }
        at = input.next_boundary(s).filter(|&n| n <= end);
    }
    MatchOutcome::NoMatch
}

fn finish(program: &Program, thread: &Thread, start: usize) -> MatchResult {
    let captures = program
        .slot_meta
        .iter()
        .zip(&thread.slots)
        .map(|(meta, state)| {
            if meta.repeats {
                if state.ranges.is_empty() {
                    CaptureValue::Unbound
                } else {
                    CaptureValue::Ranges(state.ranges.clone())
                }
            } else {
                match state.ranges.last() {
                    Some(r) => CaptureValue::Range(r.clone()),
                    None => CaptureValue::Unbound,
                }
            }
        })
        .collect();
    MatchResult {
        range: start..thread.pos,
        captures,
        names: program.names.clone(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct SlotState {
    pending: Option<usize>,
    ranges: Vec<Range<usize>>,
}

#[derive(Debug, Clone)]
struct Thread {
    pc: Pc,
    pos: usize,
    slots: Vec<SlotState>,
    counters: Vec<u32>,
    /// Position at entry to the latest iteration of each counter loop;
    /// drives the zero-progress guard.
    counter_pos: Vec<usize>,
    /// Backtrack-stack depths recorded by open atomic regions.
    atomics: Vec<usize>,
}

enum Attempt {
    Matched(Thread),
    NoMatch,
    Exhausted,
}

struct Machine<'t> {
    input: Input<'t>,
    range_start: usize,
    /// Remaining step budget, shared by every attempt in this call.
    steps: usize,
}

impl<'t> Machine<'t> {
    /// Depth-first run of one attempt starting at `start`. With `whole`
    /// set, Accept only succeeds at `end` and otherwise backtracks.
    fn attempt(
        &mut self,
        program: &Program,
        start: usize,
        end: usize,
        whole: bool,
        slots: Vec<SlotState>,
    ) -> Attempt {
        let mut thread = Thread {
            pc: 0,
            pos: start,
            slots,
            counters: vec![0; program.counter_count],
            counter_pos: vec![usize::MAX; program.counter_count],
            atomics: Vec::new(),
        };
        let mut stack: Vec<Thread> = Vec::new();

        macro_rules! backtrack {
            () => {
                match stack.pop() {
                    Some(prev) => {
                        thread = prev;
                        continue;
                    }
                    None => return Attempt::NoMatch,
                }
            };
        }

        loop {
            if self.steps == 0 {
                return Attempt::Exhausted;
            }
            self.steps -= 1;

            match program.insts[thread.pc] {
                Inst::Accept => {
                    if whole && thread.pos != end {
                        backtrack!();
                    }
                    return Attempt::Matched(thread);
                }
                Inst::Fail => backtrack!(),
                Inst::Jump(target) => thread.pc = target,
                Inst::Split { primary, alternate } => {
                    let mut alt = thread.clone();
                    alt.pc = alternate;
                    stack.push(alt);
                    thread.pc = primary;
                }
                Inst::Literal(id) => {
                    let run = &program.pool.literals[id];
                    match self.literal_end(run, thread.pos, end) {
                        Some(next) => {
                            thread.pos = next;
                            thread.pc += 1;
                        }
                        None => backtrack!(),
                    }
                }
                Inst::Class(id) => {
                    let class = &program.pool.classes[id];
                    match self.class_end(class, thread.pos, end) {
                        Some(next) => {
                            thread.pos = next;
                            thread.pc += 1;
                        }
                        None => backtrack!(),
                    }
                }
                Inst::Any { allow_newline } => match self.any_end(thread.pos, end, allow_newline) {
                    Some(next) => {
                        thread.pos = next;
                        thread.pc += 1;
                    }
                    None => backtrack!(),
                },
                Inst::Assert(assert) => {
                    if self.assertion_holds(assert, thread.pos, end) {
                        thread.pc += 1;
                    } else {
                        backtrack!();
                    }
                }
                Inst::SaveStart(slot) => {
                    thread.slots[slot as usize].pending = Some(thread.pos);
                    thread.pc += 1;
                }
                Inst::SaveEnd(slot) => {
                    let state = &mut thread.slots[slot as usize];
                    if let Some(open) = state.pending.take() {
                        state.ranges.push(open..thread.pos);
                    }
                    thread.pc += 1;
                }
                Inst::Backref {
                    slot,
                    case_insensitive,
                } => {
                    let captured = thread.slots[slot as usize].ranges.last().cloned();
                    match captured {
                        // A reference to an unbound slot never matches.
                        None => backtrack!(),
                        Some(r) => {
                            let needle = self.input.slice(r.start, r.end);
                            match self.text_end(needle, case_insensitive, thread.pos, end) {
                                Some(next) => {
                                    thread.pos = next;
                                    thread.pc += 1;
                                }
                                None => backtrack!(),
                            }
                        }
                    }
                }
                Inst::RepeatReset(counter) => {
                    thread.counters[counter] = 0;
                    thread.counter_pos[counter] = usize::MAX;
                    thread.pc += 1;
                }
                Inst::Repeat {
                    counter,
                    min,
                    max,
                    body,
                    exit,
                    lazy,
                } => {
                    let n = thread.counters[counter];
                    if n > 0 && n >= min && thread.counter_pos[counter] == thread.pos {
                        // Last iteration consumed nothing; looping again
                        // could never make progress.
                        thread.pc = exit;
                    } else if n < min {
                        thread.counters[counter] = n + 1;
                        thread.counter_pos[counter] = thread.pos;
                        thread.pc = body;
                    } else if max.is_some_and(|m| n >= m) {
                        thread.pc = exit;
                    } else if lazy {
                        let mut alt = thread.clone();
                        alt.counters[counter] = n + 1;
                        alt.counter_pos[counter] = thread.pos;
                        alt.pc = body;
                        stack.push(alt);
                        thread.pc = exit;
                    } else {
                        let mut alt = thread.clone();
                        alt.pc = exit;
                        stack.push(alt);
                        thread.counters[counter] = n + 1;
                        thread.counter_pos[counter] = thread.pos;
                        thread.pc = body;
                    }
                }
                Inst::AtomicBegin => {
                    thread.atomics.push(stack.len());
                    thread.pc += 1;
                }
                Inst::AtomicEnd => {
                    if let Some(mark) = thread.atomics.pop() {
                        stack.truncate(mark);
                    }
                    thread.pc += 1;
                }
                Inst::Look { kind, negated, sub } => {
                    let sub = &program.pool.subprograms[sub];
                    let result = match kind {
                        LookKind::Ahead => {
                            self.attempt(sub, thread.pos, end, false, thread.slots.clone())
                        }
                        LookKind::Behind => self.behind(sub, thread.pos, &thread.slots),
                    };
                    match result {
                        Attempt::Exhausted => return Attempt::Exhausted,
                        Attempt::Matched(sub_thread) => {
                            if negated {
                                backtrack!();
                            }
                            // Captures written inside a positive
                            // lookaround persist.
                            thread.slots = sub_thread.slots;
                            thread.pc += 1;
                        }
                        Attempt::NoMatch => {
                            if negated {
                                thread.pc += 1;
                            } else {
                                backtrack!();
                            }
                        }
                    }
                }
            }
        }
    }

    /// Lookbehind: try every element boundary at or before `pos` as a
    /// sub-match start, requiring the sub-match to end exactly at `pos`.
    fn behind(&mut self, sub: &Program, pos: usize, slots: &[SlotState]) -> Attempt {
        let mut start = pos;
        loop {
            match self.attempt(sub, start, pos, true, slots.to_vec()) {
                Attempt::NoMatch => {}
                resolved => return resolved,
            }
            if start <= self.range_start {
                return Attempt::NoMatch;
            }
            match self.input.prev_boundary(start) {
                Some(prev) if prev >= self.range_start => start = prev,
                _ => return Attempt::NoMatch,
            }
        }
    }

    /// First boundary-aligned start at or after `from` where the hoisted
    /// prefix literal occurs. Without a prefix, `from` itself. The scan
    /// works on raw bytes: in code-unit mode `from` may sit mid-scalar,
    /// where `&str` slicing would reject the range.
    fn next_viable_start(&self, program: &Program, from: usize, end: usize) -> Option<usize> {
        let prefix = match &program.prefix {
            Some(p) => p.as_bytes(),
            None => return Some(from),
        };
        let text = self.input.text().as_bytes();
        let mut at = from;
        while at + prefix.len() <= end {
            let off = text[at..end]
                .windows(prefix.len())
                .position(|w| w == prefix)?;
            let cand = at + off;
            if self.input.is_boundary(cand) {
                return Some(cand);
            }
            at = cand + 1;
        }
        None
    }

    fn code_unit(&self) -> bool {
        self.input.granularity() == Granularity::CodeUnit
    }

    fn literal_end(&self, run: &LiteralRun, pos: usize, end: usize) -> Option<usize> {
        self.text_end(run.text.as_str(), run.case_insensitive, pos, end)
    }

    /// Position after `needle` matched at `pos`, bounded by `end` and
    /// required to land on an element boundary.
    fn text_end(
        &self,
        needle: &str,
        case_insensitive: bool,
        pos: usize,
        end: usize,
    ) -> Option<usize> {
        let text = self.input.text();
        let next = if self.code_unit() {
            // Code-unit mode may sit mid-scalar, so compare raw bytes.
            let avail = &text.as_bytes()[pos..end];
            let needle = needle.as_bytes();
            let matched = if case_insensitive {
                avail.len() >= needle.len() && avail[..needle.len()].eq_ignore_ascii_case(needle)
            } else {
                avail.starts_with(needle)
            };
            if !matched {
                return None;
            }
            pos + needle.len()
        } else if case_insensitive {
            let mut at = pos;
            for expected in needle.chars() {
                if at >= end {
                    return None;
                }
                let c = text[at..].chars().next()?;
                if !unicode::chars_eq(c, expected, true) {
                    return None;
                }
                at += c.len_utf8();
            }
            at
        } else {
            if !text[pos..end].starts_with(needle) {
                return None;
            }
            pos + needle.len()
        };
        // In cluster mode a literal may not stop inside a grapheme.
        if !self.input.is_boundary(next) {
            return None;
        }
        Some(next)
    }

    /// Class membership keys off the element's first scalar; the whole
    /// element is consumed. Code-unit mode admits ASCII bytes only.
    fn class_end(&self, class: &CompiledClass, pos: usize, end: usize) -> Option<usize> {
        if pos >= end {
            return None;
        }
        if self.code_unit() {
            let b = self.input.text().as_bytes()[pos];
            if !b.is_ascii() || !class.matches(b as char) {
                return None;
            }
            return Some(pos + 1);
        }
        let c = self.input.first_scalar(pos)?;
        if !class.matches(c) {
            return None;
        }
        self.input.next_boundary(pos).filter(|&next| next <= end)
    }

    fn any_end(&self, pos: usize, end: usize, allow_newline: bool) -> Option<usize> {
        if pos >= end {
            return None;
        }
        if self.code_unit() {
            let b = self.input.text().as_bytes()[pos];
            if !allow_newline && b == b'\n' {
                return None;
            }
            return Some(pos + 1);
        }
        let c = self.input.first_scalar(pos)?;
        if !allow_newline && c == '\n' {
            return None;
        }
        self.input.next_boundary(pos).filter(|&next| next <= end)
    }

    fn assertion_holds(&self, assert: AssertInst, pos: usize, end: usize) -> bool {
        let bytes = self.input.text().as_bytes();
        match assert {
            AssertInst::StartOfInput => pos == self.range_start,
            AssertInst::EndOfInput => pos == end,
            AssertInst::StartOfLine { multiline } => {
                pos == self.range_start || (multiline && pos > 0 && bytes[pos - 1] == b'\n')
            }
            AssertInst::EndOfLine { multiline } => {
                pos == end || (multiline && pos < end && bytes[pos] == b'\n')
            }
            AssertInst::WordBoundary => self.word_before(pos) != self.word_after(pos, end),
            AssertInst::NotWordBoundary => self.word_before(pos) == self.word_after(pos, end),
        }
    }

    fn word_before(&self, pos: usize) -> bool {
        if pos <= self.range_start {
            return false;
        }
        if self.code_unit() {
            let b = self.input.text().as_bytes()[pos - 1];
            return b.is_ascii_alphanumeric() || b == b'_';
        }
        self.input.text()[..pos]
            .chars()
            .next_back()
            .is_some_and(unicode::is_word_char)
    }

    fn word_after(&self, pos: usize, end: usize) -> bool {
        if pos >= end {
            return false;
        }
        if self.code_unit() {
            let b = self.input.text().as_bytes()[pos];
            return b.is_ascii_alphanumeric() || b == b'_';
        }
        self.input.text()[pos..]
            .chars()
            .next()
            .is_some_and(unicode::is_word_char)
    }
}
