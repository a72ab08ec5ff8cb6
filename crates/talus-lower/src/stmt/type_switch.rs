//! `TypeSwitch` lowering.
//!
//! This is a compile-time dispatch, not a runtime branch: the scrutinee is
//! lowered once into a scratch builder purely to read off its IR type
//! (a throwaway recording pass that's simply discarded afterward), and
//! only the first arm whose declared type equals the scrutinee's type is
//! lowered into the real builder. Nothing is branched on at runtime, so
//! there's no join block and no PHI — the arm not taken leaves no trace
//! in the finished function.

use talus_ast::{Stmt, TypeSwitchArm};
use talus_diagnostics::LowerResult;
use talus_ir::Builder;
use talus_types::ModuleEnv;

use crate::context::LoweringContext;
use crate::expr::lower_expr;

type LowerBlock<'a> = dyn FnMut(&[Stmt], &mut LoweringContext, &ModuleEnv, &mut dyn Builder) -> LowerResult<()> + 'a;

pub fn lower_type_switch(
    scrutinee: &talus_ast::Expr,
    arms: &[TypeSwitchArm],
    default_body: Option<&[Stmt]>,
    ctx: &mut LoweringContext,
    env: &ModuleEnv,
    builder: &mut dyn Builder,
    lower_block: &mut LowerBlock<'_>,
) -> LowerResult<()> {
    let scrutinee_ty = scrutinee_type(scrutinee, ctx, env)?;

    for arm in arms {
        talus_types::reject_variadic_in_type_switch(&arm.ty)?;
        let arm_ty = talus_types::resolve(&arm.ty, env)?;
        if arm_ty == scrutinee_ty {
            return lower_block(&arm.body, ctx, env, builder);
        }
    }

    match default_body {
        Some(stmts) => lower_block(stmts, ctx, env, builder),
        None => Ok(()),
    }
}

/// Lowers `scrutinee` into a scratch `RecordingBuilder` purely to read its
/// resolved `Type`; the real builder never sees any of it, so whatever
/// side effects the scrutinee carries never reach the finished function —
/// the same outcome the original gets by erasing its throw-away block.
fn scrutinee_type(scrutinee: &talus_ast::Expr, ctx: &mut LoweringContext, env: &ModuleEnv) -> LowerResult<talus_ir::Type> {
    let mut scratch = talus_ir::RecordingBuilder::new();
    scratch.start_function("", vec![], false, talus_ir::Type::Void);
    let value = lower_expr(scrutinee, ctx, env, &mut scratch, talus_ir::Type::Auto)?;
    Ok(value.ty)
}
