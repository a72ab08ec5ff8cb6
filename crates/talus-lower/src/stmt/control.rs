//! Control-flow statement lowering: `If`, `While`, `Break`, `Continue`.
//!
//! `While`'s condition is lowered twice — once before entering the loop
//! and once at the end of the body — rather than being hoisted into a
//! single shared header block: folding them into one header would change
//! which block a `continue` jumps to, an observable behavior change, not
//! just a cleanup.
//!
//! `Break`/`Continue` resolve their target block through
//! `LoweringContext`'s loop-target stack rather than a CFG predecessor
//! walk — `Builder` has no predecessor query, so the stack gets the same
//! "nearest enclosing loop" result by construction instead of by search.

use talus_ast::{Expr, Stmt};
use talus_diagnostics::{LowerError, LowerResult};
use talus_ir::Builder;
use talus_types::ModuleEnv;

use crate::context::{LoopTargets, LoweringContext};
use crate::expr::lower_expr;

pub fn lower_if(
    cond: &Expr,
    then_branch: &[Stmt],
    else_branch: Option<&[Stmt]>,
    ctx: &mut LoweringContext,
    env: &ModuleEnv,
    builder: &mut dyn Builder,
    lower_block: &mut dyn FnMut(&[Stmt], &mut LoweringContext, &ModuleEnv, &mut dyn Builder) -> LowerResult<()>,
) -> LowerResult<()> {
    let cond_v = lower_expr(cond, ctx, env, builder, talus_ir::Type::Bool)?;
    let then_bb = builder.create_block(&ctx.fresh_block_name("if.then"));
    let else_bb = builder.create_block(&ctx.fresh_block_name("if.else"));
    let join_bb = builder.create_block(&ctx.fresh_block_name("if.join"));
    builder.cond_br(cond_v, then_bb, else_bb);

    builder.position_at_end(then_bb);
    lower_block(then_branch, ctx, env, builder)?;
    if !builder.is_terminated(builder.current_block()) {
        builder.br(join_bb);
    }

    builder.position_at_end(else_bb);
    if let Some(else_stmts) = else_branch {
        lower_block(else_stmts, ctx, env, builder)?;
    }
    if !builder.is_terminated(builder.current_block()) {
        builder.br(join_bb);
    }

    builder.position_at_end(join_bb);
    Ok(())
}

pub fn lower_while(
    cond: &Expr,
    body: &[Stmt],
    ctx: &mut LoweringContext,
    env: &ModuleEnv,
    builder: &mut dyn Builder,
    lower_block: &mut dyn FnMut(&[Stmt], &mut LoweringContext, &ModuleEnv, &mut dyn Builder) -> LowerResult<()>,
) -> LowerResult<()> {
    let body_bb = builder.create_block(&ctx.fresh_block_name("while.body"));
    let exit_bb = builder.create_block(&ctx.fresh_block_name("while.exit"));

    let entry_cond = lower_expr(cond, ctx, env, builder, talus_ir::Type::Bool)?;
    builder.cond_br(entry_cond, body_bb, exit_bb);

    builder.position_at_end(body_bb);
    let base_depth = ctx.scope_depth();
    ctx.push_loop(LoopTargets { continue_block: body_bb, break_block: exit_bb, base_depth });
    lower_block(body, ctx, env, builder)?;
    if !builder.is_terminated(builder.current_block()) {
        let latch_cond = lower_expr(cond, ctx, env, builder, talus_ir::Type::Bool)?;
        builder.cond_br(latch_cond, body_bb, exit_bb);
    }
    ctx.pop_loop();

    builder.position_at_end(exit_bb);
    Ok(())
}

/// Resolves the nearest enclosing loop's targets, erroring with
/// `StrayBreak` if `break`/`continue` appears outside any loop. Callers
/// are responsible for replaying `ctx.pending_defers_since(base_depth)`
/// before branching — that replay needs `lower_stmt`, which would make
/// this module depend on its own caller, so it's left to `stmt::mod`.
pub fn loop_targets(ctx: &LoweringContext, pos: talus_diagnostics::Position) -> LowerResult<LoopTargets> {
    ctx.current_loop().ok_or(LowerError::StrayBreak { pos })
}

pub fn lower_break(ctx: &LoweringContext, pos: talus_diagnostics::Position, builder: &mut dyn Builder) -> LowerResult<()> {
    let targets = loop_targets(ctx, pos)?;
    builder.br(targets.break_block);
    Ok(())
}

pub fn lower_continue(ctx: &LoweringContext, pos: talus_diagnostics::Position, builder: &mut dyn Builder) -> LowerResult<()> {
    let targets = loop_targets(ctx, pos)?;
    builder.br(targets.continue_block);
    Ok(())
}
