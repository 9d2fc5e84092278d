// Capture-structure analyzer
// Walks the AST once, assigning stable pre-order slot indices, resolving
// names (duplicates across exclusive alternation branches share a slot)
// and computing per-slot optionality and repetition typing.

use std::collections::HashMap;

use ahash::RandomState;
use smol_str::SmolStr;

use crate::ast::{Ast, AstKind, Atom, BackrefTarget, GroupKind};
use crate::error::{ParseResult, SyntaxError, SyntaxErrorCode};

/// Analyzer output: the slot table, the name map, and the mapping from
/// pre-order capturing-group occurrence to slot index (duplicated names
/// make this non-identity), consumed by the compiler.
#[derive(Debug, Clone)]
pub struct CaptureList {
    pub slots: Vec<CaptureSlot>,
    names: HashMap<SmolStr, u32, RandomState>,
    assignment: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSlot {
    pub index: u32,
    pub name: Option<SmolStr>,
    /// May legitimately finish a match unbound (untaken branch or
    /// zero-repetition quantifier).
    pub optional: bool,
    /// Sits under a quantifier that can run more than once; results are
    /// typed as a list of ranges.
    pub repeats: bool,
}

impl CaptureList {
    pub fn slot_count(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn index_of_name(&self, name: &str) -> Option<u32> {
        self.names.get(name).copied()
    }

    /// Slot index for the `occurrence`-th capturing group in pre-order.
    pub fn slot_for_occurrence(&self, occurrence: usize) -> Option<u32> {
        self.assignment.get(occurrence).copied()
    }

    pub fn names(&self) -> &HashMap<SmolStr, u32, RandomState> {
        &self.names
    }
}

/// Position of a node relative to the alternations above it: one
/// (alternation id, branch index) entry per enclosing alternation.
type BranchPath = Vec<(usize, usize)>;

/// Two paths are mutually exclusive when they first diverge inside the
/// same alternation, in different branches.
fn exclusive(a: &BranchPath, b: &BranchPath) -> bool {
    for (ea, eb) in a.iter().zip(b.iter()) {
        if ea == eb {
            continue;
        }
        return ea.0 == eb.0 && ea.1 != eb.1;
    }
    false
}

struct Analyzer {
    slots: Vec<CaptureSlot>,
    names: HashMap<SmolStr, u32, RandomState>,
    /// Every occurrence's branch path per name; a new duplicate must be
    /// pairwise exclusive with all of them.
    name_paths: HashMap<SmolStr, Vec<BranchPath>, RandomState>,
    assignment: Vec<u32>,
    next_alt_id: usize,
}

struct WalkCtx {
    optional: bool,
    repeats: bool,
    path: BranchPath,
}

/// Analyze `ast`, producing the capture metadata the compiler and the
/// executor's result typing rely on. Fails on incompatible duplicate
/// names and on backreferences to nonexistent groups.
pub fn analyze(ast: &Ast) -> ParseResult<CaptureList> {
    let mut analyzer = Analyzer {
        slots: Vec::new(),
        names: HashMap::default(),
        name_paths: HashMap::default(),
        assignment: Vec::new(),
        next_alt_id: 0,
    };
    analyzer.walk(
        ast,
        &WalkCtx {
            optional: false,
            repeats: false,
            path: Vec::new(),
        },
    )?;
    let list = CaptureList {
        slots: analyzer.slots,
        names: analyzer.names,
        assignment: analyzer.assignment,
    };
    validate_backrefs(ast, &list)?;
    Ok(list)
}

impl Analyzer {
    fn walk(&mut self, ast: &Ast, ctx: &WalkCtx) -> ParseResult<()> {
        match &ast.kind {
            AstKind::Alternation(branches) => {
                let alt_id = self.next_alt_id;
                self.next_alt_id += 1;
                for (branch_idx, branch) in branches.iter().enumerate() {
                    let mut path = ctx.path.clone();
                    path.push((alt_id, branch_idx));
                    self.walk(
                        branch,
                        &WalkCtx {
                            optional: ctx.optional || branches.len() > 1,
                            repeats: ctx.repeats,
                            path,
                        },
                    )?;
                }
            }
            AstKind::Concatenation(parts) => {
                for part in parts {
                    self.walk(part, ctx)?;
                }
            }
            AstKind::Quantification(q, body) => {
                self.walk(
                    body,
                    &WalkCtx {
                        optional: ctx.optional || q.amount.admits_zero(),
                        repeats: ctx.repeats || q.amount.admits_many(),
                        path: ctx.path.clone(),
                    },
                )?;
            }
            AstKind::Group(kind, body) => {
                match kind {
                    GroupKind::Capture => self.define_slot(None, ast, ctx)?,
                    GroupKind::NamedCapture(name) => {
                        self.define_slot(Some(name.clone()), ast, ctx)?
                    }
                    _ => {}
                }
                // Anything inside a negative lookaround never binds.
                let optional = ctx.optional
                    || matches!(
                        kind,
                        GroupKind::Lookahead { negated: true }
                            | GroupKind::Lookbehind { negated: true }
                    );
                self.walk(
                    body,
                    &WalkCtx {
                        optional,
                        repeats: ctx.repeats,
                        path: ctx.path.clone(),
                    },
                )?;
            }
            AstKind::Atom(_)
            | AstKind::CharClass(_)
            | AstKind::Quote(_)
            | AstKind::Trivia(_)
            | AstKind::Empty => {}
        }
        Ok(())
    }

    fn define_slot(
        &mut self,
        name: Option<SmolStr>,
        ast: &Ast,
        ctx: &WalkCtx,
    ) -> ParseResult<()> {
        if let Some(name) = &name {
            if let Some(&existing) = self.names.get(name) {
                let paths = self.name_paths.entry(name.clone()).or_default();
                if !paths.iter().all(|prior| exclusive(prior, &ctx.path)) {
                    return Err(SyntaxError::new(
                        SyntaxErrorCode::DuplicateCaptureName,
                        ast.span,
                    ));
                }
                paths.push(ctx.path.clone());
                // Exclusive branches share the earlier slot.
                self.assignment.push(existing);
                let slot = &mut self.slots[existing as usize];
                slot.optional = slot.optional || ctx.optional;
                slot.repeats = slot.repeats || ctx.repeats;
                return Ok(());
            }
        }
        let index = self.slots.len() as u32;
        if let Some(name) = &name {
            self.names.insert(name.clone(), index);
            self.name_paths.insert(name.clone(), vec![ctx.path.clone()]);
        }
        self.slots.push(CaptureSlot {
            index,
            name,
            optional: ctx.optional,
            repeats: ctx.repeats,
        });
        self.assignment.push(index);
        Ok(())
    }
}

fn validate_backrefs(ast: &Ast, list: &CaptureList) -> ParseResult<()> {
    match &ast.kind {
        AstKind::Atom(Atom::Backreference(target)) => {
            let known = match target {
                BackrefTarget::Index(n) => {
                    *n >= 1 && list.slot_for_occurrence(*n as usize - 1).is_some()
                }
                BackrefTarget::Named(name) => list.index_of_name(name).is_some(),
            };
            if !known {
                return Err(SyntaxError::new(
                    SyntaxErrorCode::InvalidBackreference,
                    ast.span,
                ));
            }
        }
        AstKind::Alternation(nodes) | AstKind::Concatenation(nodes) => {
            for node in nodes {
                validate_backrefs(node, list)?;
            }
        }
        AstKind::Group(_, body) | AstKind::Quantification(_, body) => {
            validate_backrefs(body, list)?;
        }
        _ => {}
    }
    Ok(())
}
