//! Lowering context: the per-function mutable state a lowering pass
//! threads through every statement and expression it visits.
//!
//! One `LoweringContext` exists per function being lowered (module-level
//! state — the symbol environment, struct/interface metadata — lives in
//! `talus_types::ModuleEnv` and is shared by reference, not copied per
//! function): a chain of lexical variable scopes, a loop-exit stack for
//! `break`/`continue`, and the pending defer records for the function
//! currently open.

use indexmap::IndexMap;
use talus_diagnostics::{LowerError, LowerResult, Position};
use talus_ir::{BlockId, Builder, Value};

use crate::scope::DeferStack;

#[derive(Debug, Clone)]
struct VarSlot {
    ptr: Value,
    mutable: bool,
}

/// One lexical scope: a flat name table plus the slice of defer records
/// pushed while it was open.
#[derive(Debug, Default)]
struct Scope {
    vars: IndexMap<String, VarSlot>,
    /// Trampoline buffers allocated while this scope was open, freed in
    /// LIFO order when it closes: the trampoline buffer is a scoped
    /// resource, same shape as a `defer`, but it's the compiler's own
    /// obligation rather than user source — so it isn't routed through
    /// the AST-level defer stack.
    trampolines: Vec<Value>,
}

/// One active loop's break/continue target blocks. Resolved through an
/// explicit stack rather than a predecessor-walk over block-name
/// prefixes, since `LoweringContext` already tracks the enclosing-loop
/// chain for scope-depth bookkeeping and the stack is the natural place
/// to keep the candidate targets too.
#[derive(Debug, Clone, Copy)]
pub struct LoopTargets {
    pub continue_block: BlockId,
    pub break_block: BlockId,
    /// Scope depth at the moment the loop was entered, i.e. before the
    /// loop body's own scope was pushed. A `break`/`continue` replays
    /// defers from every scope opened since, but leaves anything
    /// declared outside the loop alone.
    pub base_depth: usize,
}

pub struct LoweringContext {
    scopes: Vec<Scope>,
    loops: Vec<LoopTargets>,
    defers: DeferStack,
    next_block_id: u32,
    /// Lazily created sink for a discarded non-void call result: stored
    /// to an anonymous slot rather than simply dropped, so the IR stays
    /// single-assignment.
    discard_slot: Option<Value>,
    /// Name of the function currently being lowered. Identifier resolution
    /// checks this for a `::closure` prefix to decide whether an unbound
    /// name might be a captured environment field.
    function_name: String,
}

impl LoweringContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            loops: Vec::new(),
            defers: DeferStack::new(),
            next_block_id: 0,
            discard_slot: None,
            function_name: String::new(),
        }
    }

    /// Records the name of the function being lowered, for the
    /// `::closure`-prefix check identifier resolution runs against it.
    pub fn set_function_name(&mut self, name: &str) {
        self.function_name = name.to_owned();
    }

    #[must_use]
    pub fn is_closure_body(&self) -> bool {
        self.function_name.starts_with("::closure")
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
        self.defers.push_scope();
    }

    /// Pops the innermost scope, returning its defer records (LIFO replay
    /// order) and any trampoline buffers it owns (also LIFO) for the
    /// caller to emit.
    pub fn pop_scope(&mut self) -> (Vec<crate::scope::DeferredStmt>, Vec<Value>) {
        let scope = self.scopes.pop().expect("at least one scope is always open");
        let trampolines = scope.trampolines.into_iter().rev().collect();
        (self.defers.pop_scope(), trampolines)
    }

    /// Registers a trampoline buffer against the currently-open scope:
    /// released automatically when that scope closes.
    pub fn own_trampoline(&mut self, buf: Value) {
        self.scopes.last_mut().expect("at least one scope is always open").trampolines.push(buf);
    }

    pub fn declare(&mut self, name: &str, ptr: Value, mutable: bool, pos: Position) -> LowerResult<()> {
        if talus_ast::is_reserved(name) {
            return Err(LowerError::ReservedIdent { name: name.to_owned(), pos });
        }
        let scope = self.scopes.last_mut().expect("at least one scope is always open");
        if scope.vars.contains_key(name) {
            return Err(LowerError::DuplicateIdent { name: name.to_owned(), pos });
        }
        scope.vars.insert(name.to_owned(), VarSlot { ptr, mutable });
        Ok(())
    }

    pub fn lookup(&self, name: &str, pos: Position) -> LowerResult<Value> {
        for scope in self.scopes.iter().rev() {
            if let Some(slot) = scope.vars.get(name) {
                return Ok(slot.ptr.clone());
            }
        }
        Err(LowerError::UnboundIdent { name: name.to_owned(), pos })
    }

    pub fn is_mutable(&self, name: &str) -> bool {
        self.scopes.iter().rev().find_map(|s| s.vars.get(name)).is_some_and(|slot| slot.mutable)
    }

    pub fn push_loop(&mut self, targets: LoopTargets) {
        self.loops.push(targets);
    }

    pub fn pop_loop(&mut self) {
        self.loops.pop();
    }

    #[must_use]
    pub fn current_loop(&self) -> Option<LoopTargets> {
        self.loops.last().copied()
    }

    pub fn defer(&mut self, stmt: crate::scope::DeferredStmt) {
        self.defers.defer(stmt);
    }

    /// All pending defers across every open scope, innermost-first: a
    /// `return` unwinds every open scope's defers, not just the
    /// innermost one.
    pub fn all_pending_defers(&self) -> Vec<crate::scope::DeferredStmt> {
        self.defers.all_pending()
    }

    /// Trampoline buffers owned by every open scope, innermost-first,
    /// LIFO within each scope: the same unwind order `all_pending_defers`
    /// walks, since a trampoline buffer is a scoped resource exactly like
    /// a `defer`, just one the compiler owns rather than user source. A
    /// `return` has to release every one of these, not only the scope it
    /// textually sits in — otherwise a trampoline bound in an outer scope
    /// around an early `return` in an inner one would never see its
    /// `__builtin_virtual_free`.
    #[must_use]
    pub fn all_pending_trampolines(&self) -> Vec<Value> {
        self.scopes.iter().rev().flat_map(|s| s.trampolines.iter().rev().cloned()).collect()
    }

    /// Trampoline buffers owned by scopes opened at or after `base_depth`
    /// — what a `break`/`continue` must release on its way out of a loop,
    /// mirroring `pending_defers_since`.
    #[must_use]
    pub fn pending_trampolines_since(&self, base_depth: usize) -> Vec<Value> {
        self.scopes[base_depth.min(self.scopes.len())..].iter().rev().flat_map(|s| s.trampolines.iter().rev().cloned()).collect()
    }

    #[must_use]
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Defers opened since `base_depth` — what a `break`/`continue`
    /// replays on its way out of a loop.
    pub fn pending_defers_since(&self, base_depth: usize) -> Vec<crate::scope::DeferredStmt> {
        self.defers.pending_since(base_depth)
    }

    pub fn fresh_block_name(&mut self, prefix: &str) -> String {
        let id = self.next_block_id;
        self.next_block_id += 1;
        format!("{prefix}.{id}")
    }

    /// The slot a discarded call result is stored to, created on first
    /// use.
    pub fn discard_slot(&mut self, ty: talus_ir::Type, builder: &mut dyn Builder) -> Value {
        if let Some(slot) = &self.discard_slot {
            if slot.ty == ty {
                return slot.clone();
            }
        }
        let slot = builder.alloca(ty);
        self.discard_slot = Some(slot.clone());
        slot
    }
}

impl Default for LoweringContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_ir::{RecordingBuilder, Type};

    #[test]
    fn declare_then_lookup_round_trips() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        builder.start_function("f", vec![], false, Type::Void);
        let slot = builder.alloca(Type::Int(32));
        ctx.declare("x", slot.clone(), true, Position::default()).unwrap();
        assert_eq!(ctx.lookup("x", Position::default()).unwrap(), slot);
        assert!(ctx.is_mutable("x"));
    }

    #[test]
    fn duplicate_declare_in_same_scope_errors() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        builder.start_function("f", vec![], false, Type::Void);
        let slot = builder.alloca(Type::Int(32));
        ctx.declare("x", slot.clone(), true, Position::default()).unwrap();
        assert!(ctx.declare("x", slot, true, Position::default()).is_err());
    }

    #[test]
    fn inner_scope_shadows_then_pop_restores_outer() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        builder.start_function("f", vec![], false, Type::Void);
        let outer = builder.alloca(Type::Int(32));
        ctx.declare("x", outer.clone(), true, Position::default()).unwrap();
        ctx.push_scope();
        let inner = builder.alloca(Type::Int(32));
        ctx.declare("x", inner.clone(), false, Position::default()).unwrap();
        assert_eq!(ctx.lookup("x", Position::default()).unwrap(), inner);
        ctx.pop_scope();
        assert_eq!(ctx.lookup("x", Position::default()).unwrap(), outer);
    }
}
