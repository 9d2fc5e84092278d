// Instruction set
// One variant per VM operation. Instruction operands reference the
// program's constant pool by index; nothing here owns heap data except
// through the pool.

/// Instruction address within a program.
pub type Pc = usize;

/// Index into `ConstantPool::literals`.
pub type LiteralId = usize;
/// Index into `ConstantPool::classes`.
pub type ClassId = usize;
/// Index into `ConstantPool::subprograms`.
pub type SubProgramId = usize;
/// Repetition counter register.
pub type CounterId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    /// Halt with success
    Accept,
    /// Pop the newest backtrack snapshot, or fail the attempt
    Fail,
    /// pc := target
    Jump(Pc),
    /// Push a snapshot resuming at `alternate`, continue at `primary`.
    /// Branch priority: `primary` is explored first.
    Split { primary: Pc, alternate: Pc },
    /// Consume a fused literal run from the pool
    Literal(LiteralId),
    /// Consume one element matching a compiled class predicate
    Class(ClassId),
    /// Consume any element; `.` (newline acceptance baked in)
    Any { allow_newline: bool },
    /// Zero-width boundary check
    Assert(AssertInst),
    /// slot start := current position
    SaveStart(u32),
    /// Close the slot's pending range at the current position
    SaveEnd(u32),
    /// Consume text equal to the slot's latest captured range
    Backref { slot: u32, case_insensitive: bool },
    /// counter := 0
    RepeatReset(CounterId),
    /// Bounded-repetition check: loop to `body` or leave to `exit`
    /// according to the counter, the bounds and laziness
    Repeat {
        counter: CounterId,
        min: u32,
        max: Option<u32>,
        body: Pc,
        exit: Pc,
        lazy: bool,
    },
    /// Record the backtrack-stack depth
    AtomicBegin,
    /// Discard every snapshot pushed since the matching AtomicBegin
    AtomicEnd,
    /// Run a sub-program as a zero-width assertion
    Look {
        kind: LookKind,
        negated: bool,
        sub: SubProgramId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookKind {
    Ahead,
    Behind,
}

/// Boundary assertions with the multiline option resolved at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertInst {
    StartOfLine { multiline: bool },
    EndOfLine { multiline: bool },
    WordBoundary,
    NotWordBoundary,
    StartOfInput,
    EndOfInput,
}
