//! Statement lowering dispatch.

pub mod bind;
pub mod body;
pub mod control;
pub mod type_switch;

use talus_ast::Stmt;
use talus_diagnostics::{LowerError, LowerResult};
use talus_ir::{Builder, Type};
use talus_types::ModuleEnv;

use crate::context::LoweringContext;
use crate::expr::lower_expr;
use crate::scope::DeferredStmt;

pub use body::lower_block;

pub fn lower_stmt(stmt: &Stmt, ctx: &mut LoweringContext, env: &ModuleEnv, builder: &mut dyn Builder) -> LowerResult<()> {
    match stmt {
        Stmt::Body { stmts, tags, .. } => {
            lower_block(stmts, ctx, env, builder)?;
            for (tag, pos) in tags {
                apply_tag(tag, *pos, builder)?;
            }
            Ok(())
        }

        Stmt::Comment { .. } => Ok(()),

        Stmt::DeclAssign { name, ty, value, mutable, pos } => {
            bind::lower_decl_assign(name, ty.as_ref(), value, *mutable, *pos, ctx, env, builder)
        }
        Stmt::LetExpr { name, value, pos } => bind::lower_decl_assign(name, None, value, false, *pos, ctx, env, builder),

        Stmt::Assign { target, value, pos } => bind::lower_assign(target, value, *pos, ctx, env, builder),
        Stmt::OpEq { op, target, value, pos } => bind::lower_op_eq(*op, target, value, *pos, ctx, env, builder),
        Stmt::Delete { operand, .. } => bind::lower_delete(operand, ctx, env, builder),

        Stmt::Return { value, .. } => {
            let pending = ctx.all_pending_defers();
            replay(&pending, ctx, env, builder)?;
            let value_v = bind::build_return_value(value.as_ref(), ctx, env, builder)?;
            for buf in ctx.all_pending_trampolines() {
                builder.trampoline_free(buf);
            }
            builder.ret(value_v);
            Ok(())
        }

        Stmt::CoReturn { .. } | Stmt::Yield { .. } => Err(LowerError::NotImplemented { feature: describe(stmt), pos: stmt.pos() }),

        Stmt::Defer { stmt, .. } => {
            ctx.defer(DeferredStmt((**stmt).clone()));
            Ok(())
        }

        Stmt::If { cond, then_branch, else_branch, .. } => control::lower_if(
            cond,
            then_branch,
            else_branch.as_deref(),
            ctx,
            env,
            builder,
            &mut |stmts, ctx, env, builder| lower_block(stmts, ctx, env, builder),
        ),

        Stmt::While { cond, body, .. } => control::lower_while(cond, body, ctx, env, builder, &mut |stmts, ctx, env, builder| {
            lower_block(stmts, ctx, env, builder)
        }),

        Stmt::Break { pos } => {
            let targets = control::loop_targets(ctx, *pos)?;
            let pending = ctx.pending_defers_since(targets.base_depth);
            replay(&pending, ctx, env, builder)?;
            for buf in ctx.pending_trampolines_since(targets.base_depth) {
                builder.trampoline_free(buf);
            }
            control::lower_break(ctx, *pos, builder)
        }

        Stmt::Continue { pos } => {
            let targets = control::loop_targets(ctx, *pos)?;
            let pending = ctx.pending_defers_since(targets.base_depth);
            replay(&pending, ctx, env, builder)?;
            for buf in ctx.pending_trampolines_since(targets.base_depth) {
                builder.trampoline_free(buf);
            }
            control::lower_continue(ctx, *pos, builder)
        }

        Stmt::FuncCall { call, pos } => {
            let value = lower_expr(call, ctx, env, builder, Type::Auto)?;
            if value.ty != Type::Void {
                // Discarded non-void result: stored, not dropped, so the
                // IR stays single-assignment. Flagging this for the user
                // is a diagnostics-level concern — `talus-lower` itself
                // only has the IR-level half of that; the warning is
                // emitted by `talusc`, which owns the `Diagnostics`
                // collection.
                let slot = ctx.discard_slot(value.ty.clone(), builder);
                builder.store(value, slot);
            }
            let _ = pos;
            Ok(())
        }

        Stmt::TypeSwitch { scrutinee, arms, default_body, .. } => type_switch::lower_type_switch(
            scrutinee,
            arms,
            default_body.as_deref(),
            ctx,
            env,
            builder,
            &mut |stmts, ctx, env, builder| lower_block(stmts, ctx, env, builder),
        ),

        Stmt::Match { .. } | Stmt::Select { .. } | Stmt::For { .. } => {
            Err(LowerError::NotImplemented { feature: describe(stmt), pos: stmt.pos() })
        }

        Stmt::Structure { .. } | Stmt::Alias { .. } | Stmt::Enumeration { .. } => {
            // Nested type declarations register into the module
            // environment during the pre-pass; by the time statement
            // lowering walks the body they're already resolved and this
            // statement is a no-op.
            Ok(())
        }

        Stmt::Send { .. } | Stmt::Receive { .. } | Stmt::OutStream { .. } | Stmt::InStream { .. } => {
            Err(LowerError::NotImplemented { feature: describe(stmt), pos: stmt.pos() })
        }

        Stmt::PreOp { .. } | Stmt::PostOp { .. } => {
            Err(LowerError::NotImplemented { feature: describe(stmt), pos: stmt.pos() })
        }
    }
}

fn replay(pending: &[DeferredStmt], ctx: &mut LoweringContext, env: &ModuleEnv, builder: &mut dyn Builder) -> LowerResult<()> {
    for deferred in pending {
        lower_stmt(&deferred.0, ctx, env, builder)?;
    }
    Ok(())
}

/// Applies one of a body's own attribute tags to the enclosing function.
/// The recognised set is `noinline`, `inline` (→ `InlineHint`),
/// `mustinline` (→ `AlwaysInline`), and `noreturn`; anything else is
/// `UnknownTag`.
fn apply_tag(tag: &str, pos: talus_diagnostics::Position, builder: &mut dyn Builder) -> LowerResult<()> {
    let attr = match tag {
        "noinline" => talus_ir::FnAttr::NoInline,
        "inline" => talus_ir::FnAttr::InlineHint,
        "mustinline" => talus_ir::FnAttr::AlwaysInline,
        "noreturn" => talus_ir::FnAttr::NoReturn,
        other => return Err(LowerError::UnknownTag { name: other.to_owned(), pos }),
    };
    builder.set_fn_attr(attr);
    Ok(())
}

fn describe(stmt: &Stmt) -> String {
    format!("{stmt:?}").split_whitespace().next().unwrap_or("statement").to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_diagnostics::Position;
    use talus_ir::RecordingBuilder;

    #[test]
    fn defer_then_return_replays_before_ret() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let stmts = vec![
            Stmt::Defer {
                stmt: Box::new(Stmt::FuncCall {
                    call: talus_ast::Expr::Call {
                        callee: Box::new(talus_ast::Expr::Ident { name: "cleanup".into(), pos: Position::default() }),
                        args: vec![],
                        pos: Position::default(),
                    },
                    pos: Position::default(),
                }),
                pos: Position::default(),
            },
            Stmt::Return { value: None, pos: Position::default() },
        ];
        assert!(lower_block(&stmts, &mut ctx, &env, &mut builder).is_ok());
        let func = builder.finish_function();
        assert!(func.is_terminated(func.entry));
    }

    #[test]
    fn trampoline_bound_before_an_early_return_is_still_freed() {
        // A partial-application callable bound earlier in the function
        // must still see its `__builtin_virtual_free` when the function
        // returns through a scope above the one that bound it — not just
        // when control falls off the end of that scope naturally.
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let mut env = ModuleEnv::new();
        env.define_function(
            "add".into(),
            talus_types::FunctionSignature {
                params: vec![
                    talus_ast::TypeNode::Ident { name: "int".into(), pos: Position::default() },
                    talus_ast::TypeNode::Ident { name: "int".into(), pos: Position::default() },
                ],
                return_type: talus_ast::TypeNode::Ident { name: "int".into(), pos: Position::default() },
                variadic: false,
            },
        );
        builder.start_function("f", vec![], false, Type::Void);
        let bind_call = talus_ast::Expr::Call {
            callee: Box::new(talus_ast::Expr::Ident { name: "add".into(), pos: Position::default() }),
            args: vec![
                talus_ast::Expr::Int { value: 3, pos: Position::default() },
                talus_ast::Expr::Ident { name: "::expansion".into(), pos: Position::default() },
            ],
            pos: Position::default(),
        };
        let stmts = vec![
            Stmt::DeclAssign { name: "bound".into(), ty: None, value: bind_call, mutable: false, pos: Position::default() },
            Stmt::Return { value: None, pos: Position::default() },
        ];
        assert!(lower_block(&stmts, &mut ctx, &env, &mut builder).is_ok());
        let func = builder.finish_function();
        let free_calls = func
            .instructions
            .iter()
            .filter(|inst| matches!(inst, talus_ir::Instruction::Call { callee, .. } if callee.id == u32::MAX - 2))
            .count();
        assert_eq!(free_calls, 1);
    }

    #[test]
    fn comment_is_a_no_op() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let stmt = Stmt::Comment { text: "note".into(), pos: Position::default() };
        assert!(lower_stmt(&stmt, &mut ctx, &env, &mut builder).is_ok());
    }

    #[test]
    fn co_return_is_not_implemented_and_does_not_emit_a_ret() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let stmt = Stmt::CoReturn { value: Some(talus_ast::Expr::Int { value: 1, pos: Position::default() }), pos: Position::default() };
        let err = lower_stmt(&stmt, &mut ctx, &env, &mut builder).unwrap_err();
        assert!(matches!(err, LowerError::NotImplemented { feature, .. } if feature == "CoReturn"));
        let func = builder.finish_function();
        assert!(func.instructions.iter().all(|inst| !matches!(inst, talus_ir::Instruction::Ret { .. })));
    }

    #[test]
    fn yield_is_not_implemented() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let stmt = Stmt::Yield { value: talus_ast::Expr::Int { value: 1, pos: Position::default() }, pos: Position::default() };
        let err = lower_stmt(&stmt, &mut ctx, &env, &mut builder).unwrap_err();
        assert!(matches!(err, LowerError::NotImplemented { feature, .. } if feature == "Yield"));
        let func = builder.finish_function();
        assert!(func.instructions.iter().all(|inst| !matches!(inst, talus_ir::Instruction::Call { .. })));
    }

    #[test]
    fn recognised_body_tags_set_the_matching_function_attribute() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let stmt = Stmt::Body { stmts: vec![], tags: vec![("noinline".into(), Position::default())], pos: Position::default() };
        assert!(lower_stmt(&stmt, &mut ctx, &env, &mut builder).is_ok());
        let func = builder.finish_function();
        assert_eq!(func.fn_attrs, vec![talus_ir::FnAttr::NoInline]);
    }

    #[test]
    fn unrecognised_body_tag_is_an_unknown_tag_error() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let stmt = Stmt::Body { stmts: vec![], tags: vec![("bogus".into(), Position::default())], pos: Position::default() };
        let err = lower_stmt(&stmt, &mut ctx, &env, &mut builder).unwrap_err();
        assert!(matches!(err, LowerError::UnknownTag { name, .. } if name == "bogus"));
    }
}
