// Compiled program
// Linear instruction sequence plus constant pool. Immutable once built;
// compiling equal ASTs yields equal programs, and a Program is safe to
// share read-only across concurrent match attempts.

mod instruction;

pub use instruction::{AssertInst, ClassId, CounterId, Inst, LiteralId, LookKind, Pc, SubProgramId};

use std::collections::HashMap;

use ahash::RandomState;
use smol_str::SmolStr;

use crate::ast::{ClassItem, PosixClass, PropertyKind, Shorthand};
use crate::input::Granularity;
use crate::unicode;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub insts: Vec<Inst>,
    pub pool: ConstantPool,
    pub capture_count: u32,
    pub counter_count: usize,
    pub slot_meta: Vec<SlotMeta>,
    pub names: HashMap<SmolStr, u32, RandomState>,
    pub granularity: Granularity,
    /// Leading required literal, hoisted as a search pre-filter
    pub prefix: Option<SmolStr>,
    /// Pattern can only match at the start of the searched range
    pub anchored_start: bool,
}

/// Result typing for one capture slot, copied out of the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMeta {
    pub name: Option<SmolStr>,
    pub optional: bool,
    pub repeats: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstantPool {
    pub literals: Vec<LiteralRun>,
    pub classes: Vec<CompiledClass>,
    pub subprograms: Vec<Program>,
}

impl ConstantPool {
    pub fn add_literal(&mut self, run: LiteralRun) -> LiteralId {
        self.literals.push(run);
        self.literals.len() - 1
    }

    pub fn add_class(&mut self, class: CompiledClass) -> ClassId {
        self.classes.push(class);
        self.classes.len() - 1
    }

    pub fn add_subprogram(&mut self, sub: Program) -> SubProgramId {
        self.subprograms.push(sub);
        self.subprograms.len() - 1
    }
}

/// A fused run of literal text matched as one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralRun {
    pub text: SmolStr,
    pub case_insensitive: bool,
}

/// A character-class membership predicate, evaluated per scalar without
/// invoking the general matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledClass {
    pub pred: ClassPred,
    pub case_insensitive: bool,
}

impl CompiledClass {
    pub fn matches(&self, c: char) -> bool {
        if self.pred.matches(c) {
            return true;
        }
        if !self.case_insensitive {
            return false;
        }
        // Simple-fold retry: try the other case of the scalar.
        c.to_lowercase().chain(c.to_uppercase()).any(|alt| alt != c && self.pred.matches(alt))
    }
}

/// Closed predicate tree compiled from a `ClassExpr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassPred {
    Char(char),
    Range(char, char),
    Posix(PosixClass),
    Shorthand(Shorthand),
    Property { kind: PropertyKind, negated: bool },
    Any(Vec<ClassPred>),
    All(Vec<ClassPred>),
    Not(Box<ClassPred>),
}

impl ClassPred {
    pub fn matches(&self, c: char) -> bool {
        match self {
            ClassPred::Char(expected) => c == *expected,
            ClassPred::Range(lo, hi) => *lo <= c && c <= *hi,
            ClassPred::Posix(class) => unicode::posix_matches(*class, c),
            ClassPred::Shorthand(kind) => unicode::shorthand_matches(*kind, c),
            ClassPred::Property { kind, negated } => {
                unicode::property_matches(*kind, c) != *negated
            }
            ClassPred::Any(preds) => preds.iter().any(|p| p.matches(c)),
            ClassPred::All(preds) => preds.iter().all(|p| p.matches(c)),
            ClassPred::Not(inner) => !inner.matches(c),
        }
    }

    pub fn from_item(item: &ClassItem) -> ClassPred {
        match item {
            ClassItem::Char(c) => ClassPred::Char(*c),
            ClassItem::Range(lo, hi) => ClassPred::Range(*lo, *hi),
            ClassItem::Posix(p) => ClassPred::Posix(*p),
            ClassItem::Shorthand(s) => ClassPred::Shorthand(*s),
            ClassItem::Property { kind, negated } => ClassPred::Property {
                kind: *kind,
                negated: *negated,
            },
        }
    }
}
