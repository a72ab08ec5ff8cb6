//! Binding and mutation statement lowering: `DeclAssign`, `Assign`,
//! `OpEq`, `Return`, `Delete`.

use talus_ast::{AssignOp, Expr};
use talus_diagnostics::{LowerError, LowerResult, Position};
use talus_ir::{Builder, IntBinOp, Type, Value};
use talus_types::ModuleEnv;

use crate::context::LoweringContext;
use crate::expr::lower_expr;

pub fn lower_decl_assign(
    name: &str,
    ty: Option<&talus_ast::TypeNode>,
    value: &Expr,
    mutable: bool,
    pos: Position,
    ctx: &mut LoweringContext,
    env: &ModuleEnv,
    builder: &mut dyn Builder,
) -> LowerResult<()> {
    let expected = match ty {
        Some(node) => talus_types::resolve(node, env)?,
        None => Type::Auto,
    };
    let value_v = lower_expr(value, ctx, env, builder, expected)?;
    let slot = builder.alloca(value_v.ty.clone());
    builder.store(value_v, slot);
    ctx.declare(name, slot, mutable, pos)
}

pub fn lower_assign(target: &Expr, value: &Expr, pos: Position, ctx: &mut LoweringContext, env: &ModuleEnv, builder: &mut dyn Builder) -> LowerResult<()> {
    let Expr::Ident { name, .. } = target else {
        return Err(LowerError::NotImplemented { feature: "assignment to a non-identifier target".to_owned(), pos });
    };
    if !ctx.is_mutable(name) {
        return Err(LowerError::ReservedIdent { name: name.clone(), pos });
    }
    let slot = ctx.lookup(name, pos)?;
    let value_v = lower_expr(value, ctx, env, builder, Type::Auto)?;
    builder.store(value_v, slot);
    Ok(())
}

pub fn lower_op_eq(op: AssignOp, target: &Expr, value: &Expr, pos: Position, ctx: &mut LoweringContext, env: &ModuleEnv, builder: &mut dyn Builder) -> LowerResult<()> {
    let Expr::Ident { name, .. } = target else {
        return Err(LowerError::NotImplemented { feature: "compound assignment to a non-identifier target".to_owned(), pos });
    };
    if !ctx.is_mutable(name) {
        return Err(LowerError::ReservedIdent { name: name.clone(), pos });
    }
    let slot = ctx.lookup(name, pos)?;
    let current = builder.load(slot);
    let rhs = lower_expr(value, ctx, env, builder, current.ty.clone())?;
    let iop = match op {
        AssignOp::Add => IntBinOp::AddSigned,
        AssignOp::Sub => IntBinOp::SubSigned,
        AssignOp::Mul => IntBinOp::MulSigned,
        AssignOp::Div => IntBinOp::DivSigned,
        AssignOp::Rem => IntBinOp::RemSigned,
        AssignOp::And => IntBinOp::And,
        AssignOp::Or => IntBinOp::Or,
        AssignOp::Xor => IntBinOp::Xor,
        AssignOp::Shl => IntBinOp::Shl,
        AssignOp::Shr => IntBinOp::Shr,
    };
    let updated = builder.int_binop(iop, current, rhs);
    builder.store(updated, slot);
    Ok(())
}

pub fn lower_delete(operand: &Expr, ctx: &mut LoweringContext, env: &ModuleEnv, builder: &mut dyn Builder) -> LowerResult<()> {
    let value = lower_expr(operand, ctx, env, builder, Type::Auto)?;
    let callee = builder.function_ref("__builtin_delete", Type::Function { params: vec![value.ty.clone()], ret: Box::new(Type::Void), variadic: false });
    builder.call(callee, vec![value], Type::Void);
    Ok(())
}

/// Builds the value for a real `Return`'s terminator. The caller runs
/// every pending defer across the whole function first — a return
/// unwinds every open scope, not just the innermost one — then emits
/// the terminator itself once this value is in hand.
pub fn build_return_value(value: Option<&Expr>, ctx: &mut LoweringContext, env: &ModuleEnv, builder: &mut dyn Builder) -> LowerResult<Option<Value>> {
    value.map(|v| lower_expr(v, ctx, env, builder, Type::Auto)).transpose()
}
