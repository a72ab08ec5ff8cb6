//! Identifier, dereference, and address-of lowering.

use talus_ast::Expr;
use talus_diagnostics::{LowerError, LowerResult};
use talus_ir::{Builder, Type, Value};
use talus_types::ModuleEnv;

use crate::context::LoweringContext;

/// `Reference` (`&expr`) lowering is a hard error rather than a
/// borrow-check pass — the language this front end targets has no
/// notion of a first-class reference type for the backend to receive.
pub fn lower_reference(expr: &Expr) -> LowerResult<Value> {
    Err(LowerError::NotImplemented { feature: "address-of".to_owned(), pos: expr.pos() })
}

/// Identifier resolution, in order: a local variable (load from its
/// declared slot; `mut` binders are otherwise indistinguishable once
/// lowered — mutability is a front-end-only check, enforced at
/// assignment, not at every read), a captured environment field when the
/// enclosing function is a closure body (checks the function name for a
/// `::closure` prefix: look up `.env`, find `name` among its structure's
/// field names, emit element-pointer then load), a free function in the
/// module function table (returned as a bare function pointer, not
/// loaded), and finally the reserved `_` discard sink (a lazily-created
/// discard slot).
pub fn lower_ident(name: &str, pos: talus_diagnostics::Position, ctx: &mut LoweringContext, env: &ModuleEnv, builder: &mut dyn Builder, result_ty: Type) -> LowerResult<Value> {
    if let Ok(slot) = ctx.lookup(name, pos) {
        return Ok(builder.load(slot));
    }
    if ctx.is_closure_body() {
        if let Ok(env_ptr) = ctx.lookup(".env", pos) {
            if let (Some(Type::Struct(struct_name)), true) = env_ptr.ty.is_struct_kind() {
                if let Some(index) = env.structure(struct_name).and_then(|meta| meta.field_index(name)) {
                    let field_ty = talus_types::resolve(&env.structure(struct_name).unwrap().fields[index].1, env)?;
                    let field_ptr = builder.gep(env_ptr, index as i64, field_ty);
                    return Ok(builder.load(field_ptr));
                }
            }
        }
    }
    if let Some(sig) = env.function(name) {
        let params = sig.params.iter().map(|p| talus_types::resolve(p, env)).collect::<LowerResult<Vec<_>>>()?;
        let ret = talus_types::resolve(&sig.return_type, env)?;
        let fn_ty = Type::Function { params, ret: Box::new(ret), variadic: sig.variadic };
        return Ok(builder.function_ref(name, fn_ty));
    }
    if name == "_" {
        return Ok(ctx.discard_slot(result_ty, builder));
    }
    Err(LowerError::UnboundIdent { name: name.to_owned(), pos })
}

pub fn lower_deref(ptr_value: Value, builder: &mut dyn Builder) -> LowerResult<Value> {
    Ok(builder.load(ptr_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_diagnostics::Position;
    use talus_ir::RecordingBuilder;

    #[test]
    fn ident_lowers_to_load_of_declared_slot() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let slot = builder.alloca(Type::Int(32));
        ctx.declare("x", slot, false, Position::default()).unwrap();
        let value = lower_ident("x", Position::default(), &mut ctx, &env, &mut builder, Type::Int(32)).unwrap();
        assert_eq!(value.ty, Type::Int(32));
    }

    #[test]
    fn unbound_ident_falls_back_to_the_module_function_table() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let mut env = ModuleEnv::new();
        env.define_function(
            "area".into(),
            talus_types::FunctionSignature { params: vec![], return_type: talus_ast::TypeNode::Ident { name: "int".into(), pos: Position::default() }, variadic: false },
        );
        builder.start_function("f", vec![], false, Type::Void);
        let value = lower_ident("area", Position::default(), &mut ctx, &env, &mut builder, Type::Auto).unwrap();
        assert!(matches!(value.ty, Type::Function { .. }));
    }

    #[test]
    fn discard_ident_resolves_to_the_discard_sink() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let value = lower_ident("_", Position::default(), &mut ctx, &env, &mut builder, Type::Int(32)).unwrap();
        assert!(value.ty.is_pointer() || matches!(value.ty, Type::Int(32)));
    }

    #[test]
    fn closure_body_resolves_unbound_names_through_the_captured_env() {
        let mut env = ModuleEnv::new();
        env.define_structure(talus_types::StructureMeta {
            name: "::closure.env0".into(),
            fields: vec![("captured".into(), talus_ast::TypeNode::Ident { name: "int".into(), pos: Position::default() })],
        });
        let mut ctx = LoweringContext::new();
        ctx.set_function_name("::closure0");
        let mut builder = RecordingBuilder::new();
        builder.start_function("::closure0", vec![], false, Type::Void);
        let env_ptr = builder.alloca(Type::Struct("::closure.env0".into()));
        ctx.declare(".env", env_ptr, false, Position::default()).unwrap();
        let value = lower_ident("captured", Position::default(), &mut ctx, &env, &mut builder, Type::Auto).unwrap();
        assert_eq!(value.ty, Type::Int(32));
    }

    #[test]
    fn reference_is_a_hard_error() {
        let expr = Expr::Ident { name: "x".into(), pos: Position::default() };
        assert!(lower_reference(&expr).is_err());
    }
}
