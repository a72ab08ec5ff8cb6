//! Function builder: return-type deduction, implicit return insertion,
//! parameter attribute assignment.

use talus_ast::{FunctionItem, ParamDecl};
use talus_diagnostics::{LowerError, LowerResult};
use talus_ir::{Builder, Function, ParamAttr, Type};
use talus_types::ModuleEnv;

use crate::context::LoweringContext;
use crate::stmt::lower_block;

/// Lowers a single top-level function declaration to an IR `Function`.
///
/// Return-type deduction: when the declaration omits a return type,
/// every `Return` in the body must agree on one type, found by lowering
/// the body once against an `Auto` return type and recording what each
/// return statement actually produced. Disagreement is a
/// `ReturnTypeConflict`; no `Return` at all deduces `void`. `CoReturn`
/// is a concurrency-surface node (spec §5) that lowers to
/// `NotImplemented` rather than a real `ret`, so it never contributes
/// here.
pub fn lower_function(item: &FunctionItem, env: &ModuleEnv, builder: &mut dyn Builder) -> LowerResult<Function> {
    let param_tys = item
        .params
        .iter()
        .map(|p| talus_types::resolve(&p.ty, env))
        .collect::<LowerResult<Vec<_>>>()?;

    let declared_return = match &item.return_type {
        Some(node) => {
            talus_types::reject_variadic_in_return(node)?;
            Some(talus_types::resolve(node, env)?)
        }
        None => None,
    };

    // Deduction runs unconditionally, not just when the declaration omits
    // a return type: a declared return type still has to agree with what
    // the body actually returns, and the agreement check among the body's
    // own `return`s (`ReturnTypeConflict`) is the same dry run either way.
    let deduced_body_return = deduce_return_type(item, env)?;
    let deduced_return = match &declared_return {
        None => deduced_body_return,
        Some(ty) if *ty == Type::Void || *ty == deduced_body_return => ty.clone(),
        Some(_) => return Err(LowerError::ReturnTypeMismatch { function: item.name.clone(), pos: item.pos }),
    };

    let params = item
        .params
        .iter()
        .zip(&param_tys)
        .map(|(decl, ty)| talus_ir::Param { name: decl.name.clone(), ty: ty.clone(), mutable: decl.mutable })
        .collect::<Vec<_>>();

    let entry = builder.start_function(&item.name, params.clone(), item.variadic, deduced_return.clone());
    builder.position_at_end(entry);

    for (index, decl) in item.params.iter().enumerate() {
        if !decl.mutable {
            builder.set_param_attr(index, ParamAttr::ReadOnly);
        }
    }

    let mut ctx = LoweringContext::new();
    ctx.set_function_name(&item.name);
    for (index, decl) in item.params.iter().enumerate() {
        let slot = builder.alloca(param_tys[index].clone());
        let param_value = builder.param_value(index);
        builder.store(param_value, slot);
        ctx.declare(&decl.name, slot, decl.mutable, item.pos)?;
    }

    lower_block(&item.body, &mut ctx, env, builder)?;
    insert_implicit_return(&deduced_return, builder);

    Ok(builder.finish_function())
}

/// Appends a `ret` to the current block if lowering the body fell through
/// without one — every function is guaranteed a terminator on every
/// path, inserting `ret void`/`ret <zero>` as needed.
fn insert_implicit_return(return_ty: &Type, builder: &mut dyn Builder) {
    let block = builder.current_block();
    if builder.is_terminated(block) {
        return;
    }
    if *return_ty == Type::Void {
        builder.ret(None);
    } else {
        let zero = builder.zero(return_ty.clone());
        builder.ret(Some(zero));
    }
}

/// Walks the body collecting the static type of every `Return`
/// expression, without emitting any IR — a throwaway `RecordingBuilder`
/// absorbs the dry run. All non-void returns must agree; a mix of void
/// and non-void, or two disagreeing non-void types, is a
/// `ReturnTypeConflict`.
fn deduce_return_type(item: &FunctionItem, env: &ModuleEnv) -> LowerResult<Type> {
    let mut scratch = talus_ir::RecordingBuilder::new();
    let params = item
        .params
        .iter()
        .map(|p: &ParamDecl| -> LowerResult<talus_ir::Param> {
            Ok(talus_ir::Param { name: p.name.clone(), ty: talus_types::resolve(&p.ty, env)?, mutable: p.mutable })
        })
        .collect::<LowerResult<Vec<_>>>()?;
    scratch.start_function(&item.name, params.clone(), item.variadic, Type::Auto);

    let mut ctx = LoweringContext::new();
    ctx.set_function_name(&item.name);
    for (index, p) in params.iter().enumerate() {
        let slot = scratch.alloca(p.ty.clone());
        let value = scratch.param_value(index);
        scratch.store(value, slot);
        ctx.declare(&p.name, slot, p.mutable, item.pos)?;
    }

    lower_block(&item.body, &mut ctx, env, &mut scratch)?;
    let func = scratch.finish_function();

    let mut found: Option<Type> = None;
    for inst in &func.instructions {
        let talus_ir::Instruction::Ret { value: Some(v), .. } = inst else { continue };
        match &found {
            None => found = Some(v.ty.clone()),
            Some(existing) if *existing == v.ty => {}
            Some(_) => return Err(LowerError::ReturnTypeConflict { function: item.name.clone(), pos: item.pos }),
        }
    }
    Ok(found.unwrap_or(Type::Void))
}
