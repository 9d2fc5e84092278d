// Bytecode compiler
// Deterministic, pure AST -> Program lowering. Option toggles are folded
// into the emitted instructions here so the executor never tracks option
// state. Peepholes (literal fusion, small-quantifier unrolling, prefix
// hoisting) must never change match semantics.

use smol_str::SmolStr;

use crate::ast::{
    Ast, AstKind, Atom, AssertionKind, BackrefTarget, ClassExpr, GroupKind, MatchOptions,
    QuantAmount, QuantKind, Quantifier,
};
use crate::captures::CaptureList;
use crate::error::CompileError;
use crate::input::Granularity;
use crate::program::{
    AssertInst, ClassPred, CompiledClass, ConstantPool, Inst, LiteralRun, LookKind, Pc, Program,
    SlotMeta,
};

/// Bounded quantifiers up to this many repetitions are unrolled instead
/// of getting a counter loop.
const UNROLL_LIMIT: u32 = 8;

const UNPATCHED: Pc = usize::MAX;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub granularity: Granularity,
    pub options: MatchOptions,
}

/// Lower an analyzed AST to a program. Infallible for parser-produced
/// ASTs; a `CompileError` here means a broken invariant in this crate.
pub fn compile(
    ast: &Ast,
    caps: &CaptureList,
    opts: CompileOptions,
) -> Result<Program, CompileError> {
    let mut compiler = Compiler {
        caps,
        insts: Vec::new(),
        pool: ConstantPool::default(),
        counter_count: 0,
        occurrence: 0,
        opts: opts.options,
        granularity: opts.granularity,
    };
    compiler.node(ast)?;
    compiler.emit(Inst::Accept);

    let (prefix, anchored_start) = scan_head(ast, opts.options);
    let slot_meta = caps
        .slots
        .iter()
        .map(|slot| SlotMeta {
            name: slot.name.clone(),
            optional: slot.optional,
            repeats: slot.repeats,
        })
        .collect();
    Ok(Program {
        insts: compiler.insts,
        pool: compiler.pool,
        capture_count: caps.slot_count(),
        counter_count: compiler.counter_count,
        slot_meta,
        names: caps.names().clone(),
        granularity: opts.granularity,
        prefix,
        anchored_start,
    })
}

struct Compiler<'a> {
    caps: &'a CaptureList,
    insts: Vec<Inst>,
    pool: ConstantPool,
    counter_count: usize,
    /// Pre-order capturing-group occurrence counter, mapped to slots via
    /// the analyzer's assignment table.
    occurrence: usize,
    opts: MatchOptions,
    granularity: Granularity,
}

impl<'a> Compiler<'a> {
    fn emit(&mut self, inst: Inst) -> Pc {
        self.insts.push(inst);
        self.insts.len() - 1
    }

    fn here(&self) -> Pc {
        self.insts.len()
    }

    fn patch_jump(&mut self, at: Pc, target: Pc) {
        if let Inst::Jump(t) = &mut self.insts[at] {
            *t = target;
        }
    }

    fn patch_split_alternate(&mut self, at: Pc, target: Pc) {
        if let Inst::Split { alternate, .. } = &mut self.insts[at] {
            *alternate = target;
        }
    }

    fn node(&mut self, ast: &Ast) -> Result<(), CompileError> {
        match &ast.kind {
            AstKind::Empty | AstKind::Trivia(_) => Ok(()),
            AstKind::Alternation(branches) => self.alternation(branches),
            AstKind::Concatenation(parts) => self.concatenation(parts),
            AstKind::Group(kind, body) => self.group(kind, body),
            AstKind::Quantification(q, body) => self.quantification(*q, body),
            AstKind::Atom(atom) => self.atom(atom),
            AstKind::CharClass(expr) => {
                let id = self.pool.add_class(CompiledClass {
                    pred: class_pred(expr),
                    case_insensitive: self.opts.case_insensitive,
                });
                self.emit(Inst::Class(id));
                Ok(())
            }
            AstKind::Quote(text) => {
                self.literal_run(text);
                Ok(())
            }
        }
    }

    fn literal_run(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let id = self.pool.add_literal(LiteralRun {
            text: SmolStr::new(text),
            case_insensitive: self.opts.case_insensitive,
        });
        self.emit(Inst::Literal(id));
    }

    fn alternation(&mut self, branches: &[Ast]) -> Result<(), CompileError> {
        let mut exits: Vec<Pc> = Vec::new();
        for (i, branch) in branches.iter().enumerate() {
            let last = i + 1 == branches.len();
            let split = if last {
                None
            } else {
                let at = self.emit(Inst::Split {
                    primary: UNPATCHED,
                    alternate: UNPATCHED,
                });
                let next = self.here();
                if let Inst::Split { primary, .. } = &mut self.insts[at] {
                    *primary = next;
                }
                Some(at)
            };
            self.node(branch)?;
            if !last {
                exits.push(self.emit(Inst::Jump(UNPATCHED)));
            }
            if let Some(at) = split {
                let target = self.here();
                self.patch_split_alternate(at, target);
            }
        }
        let end = self.here();
        for at in exits {
            self.patch_jump(at, end);
        }
        Ok(())
    }

    /// Concatenation with adjacent-literal fusion: runs of plain
    /// characters and quotes collapse into one literal-run instruction.
    fn concatenation(&mut self, parts: &[Ast]) -> Result<(), CompileError> {
        let mut run = String::new();
        for part in parts {
            match &part.kind {
                AstKind::Atom(Atom::Char(c)) => run.push(*c),
                AstKind::Quote(text) => run.push_str(text),
                AstKind::Trivia(_) | AstKind::Empty => {}
                _ => {
                    if !run.is_empty() {
                        self.literal_run(&std::mem::take(&mut run));
                    }
                    self.node(part)?;
                }
            }
        }
        if !run.is_empty() {
            self.literal_run(&run);
        }
        Ok(())
    }

    fn group(&mut self, kind: &GroupKind, body: &Ast) -> Result<(), CompileError> {
        match kind {
            GroupKind::Capture | GroupKind::NamedCapture(_) => {
                let slot = self
                    .caps
                    .slot_for_occurrence(self.occurrence)
                    .ok_or(CompileError("capture occurrence without an assigned slot"))?;
                self.occurrence += 1;
                self.emit(Inst::SaveStart(slot));
                self.node(body)?;
                self.emit(Inst::SaveEnd(slot));
                Ok(())
            }
            GroupKind::NonCapture => self.node(body),
            GroupKind::Atomic => {
                self.emit(Inst::AtomicBegin);
                self.node(body)?;
                self.emit(Inst::AtomicEnd);
                Ok(())
            }
            GroupKind::Lookahead { negated } => self.look(LookKind::Ahead, *negated, body),
            GroupKind::Lookbehind { negated } => self.look(LookKind::Behind, *negated, body),
            GroupKind::Options(toggle) => {
                let saved = self.opts;
                self.opts = self.opts.apply(*toggle);
                self.node(body)?;
                self.opts = saved;
                Ok(())
            }
        }
    }

    /// Compile a lookaround body as an embedded sub-program sharing the
    /// parent's slot numbering.
    fn look(&mut self, kind: LookKind, negated: bool, body: &Ast) -> Result<(), CompileError> {
        let saved_insts = std::mem::take(&mut self.insts);
        let saved_pool = std::mem::take(&mut self.pool);
        self.node(body)?;
        self.emit(Inst::Accept);
        let sub = Program {
            insts: std::mem::replace(&mut self.insts, saved_insts),
            pool: std::mem::replace(&mut self.pool, saved_pool),
            capture_count: self.caps.slot_count(),
            // Counter ids are shared with the enclosing program, so the
            // sub-program's table must cover every id emitted so far.
            counter_count: self.counter_count,
            slot_meta: Vec::new(),
            names: Default::default(),
            granularity: self.granularity,
            prefix: None,
            anchored_start: false,
        };
        let id = self.pool.add_subprogram(sub);
        self.emit(Inst::Look {
            kind,
            negated,
            sub: id,
        });
        Ok(())
    }

    fn atom(&mut self, atom: &Atom) -> Result<(), CompileError> {
        match atom {
            Atom::Char(c) => {
                let mut buf = [0u8; 4];
                self.literal_run(c.encode_utf8(&mut buf));
                Ok(())
            }
            Atom::Any => {
                self.emit(Inst::Any {
                    allow_newline: self.opts.dot_matches_newline,
                });
                Ok(())
            }
            Atom::Assertion(kind) => {
                let inst = match kind {
                    AssertionKind::StartOfLine => AssertInst::StartOfLine {
                        multiline: self.opts.multiline,
                    },
                    AssertionKind::EndOfLine => AssertInst::EndOfLine {
                        multiline: self.opts.multiline,
                    },
                    AssertionKind::WordBoundary => AssertInst::WordBoundary,
                    AssertionKind::NotWordBoundary => AssertInst::NotWordBoundary,
                    AssertionKind::StartOfInput => AssertInst::StartOfInput,
                    AssertionKind::EndOfInput => AssertInst::EndOfInput,
                };
                self.emit(Inst::Assert(inst));
                Ok(())
            }
            Atom::Backreference(target) => {
                let slot = match target {
                    BackrefTarget::Index(n) => self
                        .caps
                        .slot_for_occurrence((*n as usize).wrapping_sub(1)),
                    BackrefTarget::Named(name) => self.caps.index_of_name(name),
                }
                .ok_or(CompileError("backreference to unknown group"))?;
                self.emit(Inst::Backref {
                    slot,
                    case_insensitive: self.opts.case_insensitive,
                });
                Ok(())
            }
        }
    }

    fn quantification(&mut self, q: Quantifier, body: &Ast) -> Result<(), CompileError> {
        let possessive = q.kind == QuantKind::Possessive;
        let lazy = q.kind == QuantKind::Lazy;
        // Unrolling emits the body's syntactic groups several times;
        // every copy must resolve to the same occurrence window.
        let base = self.occurrence;
        if possessive {
            self.emit(Inst::AtomicBegin);
        }
        match q.amount {
            QuantAmount::ZeroOrOne => self.optional(body, lazy)?,
            QuantAmount::ZeroOrMore => self.counter_loop(body, 0, None, lazy)?,
            QuantAmount::OneOrMore => self.counter_loop(body, 1, None, lazy)?,
            QuantAmount::Exactly(n) => {
                if n <= UNROLL_LIMIT {
                    for _ in 0..n {
                        self.occurrence = base;
                        self.node(body)?;
                    }
                } else {
                    self.counter_loop(body, n, Some(n), lazy)?;
                }
            }
            QuantAmount::AtLeast(n) => {
                if n <= UNROLL_LIMIT {
                    for _ in 0..n {
                        self.occurrence = base;
                        self.node(body)?;
                    }
                    self.occurrence = base;
                    self.counter_loop(body, 0, None, lazy)?;
                } else {
                    self.counter_loop(body, n, None, lazy)?;
                }
            }
            QuantAmount::Range(min, max) => {
                if max <= UNROLL_LIMIT {
                    for _ in 0..min {
                        self.occurrence = base;
                        self.node(body)?;
                    }
                    self.optional_chain(body, max - min, lazy, base)?;
                } else {
                    self.counter_loop(body, min, Some(max), lazy)?;
                }
            }
        }
        // `{0}` emits no copy at all, so advance past the body's groups
        // explicitly instead of trusting the last copy.
        self.occurrence = base + group_occurrences(body);
        if possessive {
            self.emit(Inst::AtomicEnd);
        }
        Ok(())
    }

    /// `(?:body)?` - one split around one copy.
    fn optional(&mut self, body: &Ast, lazy: bool) -> Result<(), CompileError> {
        let split = self.emit(Inst::Split {
            primary: UNPATCHED,
            alternate: UNPATCHED,
        });
        let body_start = self.here();
        self.node(body)?;
        let after = self.here();
        let (primary, alternate) = if lazy {
            (after, body_start)
        } else {
            (body_start, after)
        };
        if let Inst::Split {
            primary: p,
            alternate: a,
        } = &mut self.insts[split]
        {
            *p = primary;
            *a = alternate;
        }
        Ok(())
    }

    /// Unrolled `{0,count}` as nested optionals so greedy/lazy branch
    /// priority matches the counted form. `base` is the occurrence
    /// counter at the quantifier, restored for every copy.
    fn optional_chain(
        &mut self,
        body: &Ast,
        count: u32,
        lazy: bool,
        base: usize,
    ) -> Result<(), CompileError> {
        if count == 0 {
            return Ok(());
        }
        let split = self.emit(Inst::Split {
            primary: UNPATCHED,
            alternate: UNPATCHED,
        });
        let body_start = self.here();
        self.occurrence = base;
        self.node(body)?;
        self.optional_chain(body, count - 1, lazy, base)?;
        let after = self.here();
        let (primary, alternate) = if lazy {
            (after, body_start)
        } else {
            (body_start, after)
        };
        if let Inst::Split {
            primary: p,
            alternate: a,
        } = &mut self.insts[split]
        {
            *p = primary;
            *a = alternate;
        }
        Ok(())
    }

    /// Counter-driven repetition loop. Also carries the zero-progress
    /// guard: the executor leaves the loop when an iteration consumed
    /// nothing, so empty-matching bodies cannot spin.
    fn counter_loop(
        &mut self,
        body: &Ast,
        min: u32,
        max: Option<u32>,
        lazy: bool,
    ) -> Result<(), CompileError> {
        let counter = self.counter_count;
        self.counter_count += 1;
        self.emit(Inst::RepeatReset(counter));
        let head = self.emit(Inst::Repeat {
            counter,
            min,
            max,
            body: UNPATCHED,
            exit: UNPATCHED,
            lazy,
        });
        let body_start = self.here();
        self.node(body)?;
        self.emit(Inst::Jump(head));
        let exit = self.here();
        if let Inst::Repeat {
            body: b, exit: e, ..
        } = &mut self.insts[head]
        {
            *b = body_start;
            *e = exit;
        }
        Ok(())
    }
}

/// Capturing-group occurrences inside `ast`, in pre-order. The
/// quantifier lowering uses this to keep the occurrence counter in step
/// with the analyzer's numbering whatever the number of unrolled copies.
fn group_occurrences(ast: &Ast) -> usize {
    match &ast.kind {
        AstKind::Group(kind, body) => {
            let own = matches!(kind, GroupKind::Capture | GroupKind::NamedCapture(_)) as usize;
            own + group_occurrences(body)
        }
        AstKind::Alternation(nodes) | AstKind::Concatenation(nodes) => {
            nodes.iter().map(group_occurrences).sum()
        }
        AstKind::Quantification(_, body) => group_occurrences(body),
        _ => 0,
    }
}

fn class_pred(expr: &ClassExpr) -> ClassPred {
    match expr {
        ClassExpr::Item(item) => ClassPred::from_item(item),
        ClassExpr::Union(members) => {
            let mut preds: Vec<ClassPred> = members.iter().map(class_pred).collect();
            if preds.len() == 1 {
                preds.remove(0)
            } else {
                ClassPred::Any(preds)
            }
        }
        ClassExpr::Intersection(a, b) => ClassPred::All(vec![class_pred(a), class_pred(b)]),
        ClassExpr::Difference(a, b) => ClassPred::All(vec![
            class_pred(a),
            ClassPred::Not(Box::new(class_pred(b))),
        ]),
        ClassExpr::Negation(inner) => ClassPred::Not(Box::new(class_pred(inner))),
    }
}

/// Hoist a leading required literal and detect start anchoring for the
/// search fast path. Conservative: only the spine of the top-level
/// concatenation is considered, and only case-sensitively.
fn scan_head(ast: &Ast, opts: MatchOptions) -> (Option<SmolStr>, bool) {
    let mut prefix = String::new();
    let mut anchored = false;
    let mut first = true;
    let parts: &[Ast] = match &ast.kind {
        AstKind::Concatenation(parts) => parts,
        _ => std::slice::from_ref(ast),
    };
    for part in parts {
        match &part.kind {
            AstKind::Trivia(_) | AstKind::Empty => continue,
            AstKind::Atom(Atom::Assertion(AssertionKind::StartOfInput)) if first => {
                anchored = true;
            }
            AstKind::Atom(Atom::Assertion(AssertionKind::StartOfLine))
                if first && !opts.multiline =>
            {
                anchored = true;
            }
            AstKind::Atom(Atom::Char(c)) if !opts.case_insensitive => prefix.push(*c),
            AstKind::Quote(text) if !opts.case_insensitive => prefix.push_str(text),
            AstKind::Quantification(q, body) if !opts.case_insensitive && q.amount.min() >= 1 => {
                // A required first repetition contributes its head, then
                // the scan stops; the tail is variable.
                if let AstKind::Atom(Atom::Char(c)) = &body.kind {
                    prefix.push(*c);
                }
                break;
            }
            _ => break,
        }
        first = false;
    }
    let prefix = if prefix.is_empty() {
        None
    } else {
        Some(SmolStr::new(prefix))
    };
    (prefix, anchored)
}
