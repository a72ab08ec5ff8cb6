//! Field and subscript access lowering.

use talus_diagnostics::{LowerError, LowerResult, Position};
use talus_ir::{Builder, Type, Value};
use talus_types::ModuleEnv;

use crate::context::LoweringContext;
use crate::trampoline;

/// `base.member` — a field first: resolves the struct's field table,
/// emits a fixed-index element-pointer, and loads through it. Failing
/// that, `member` is looked up as a `struct::<S>::<member>` function
/// and, if found, bound to `base` through the trampoline binder so the
/// result reads as an ordinary no-`this` callable. Neither matching is
/// `NoSuchMember`.
pub fn lower_struct_member(
    base: Value,
    struct_name: &str,
    member: &str,
    pos: Position,
    env: &ModuleEnv,
    ctx: &mut LoweringContext,
    builder: &mut dyn Builder,
) -> LowerResult<Value> {
    let meta = env.structure(struct_name).ok_or_else(|| LowerError::NotAStruct { field_name: member.to_owned(), pos })?;
    if let Some(index) = meta.field_index(member) {
        let field_ty = talus_types::resolve(&meta.fields[index].1, env)?;
        let field_ptr = builder.gep(base, index as i64, field_ty);
        return Ok(builder.load(field_ptr));
    }

    let mangled = format!("struct::{struct_name}::{member}");
    let Some(sig) = env.function(&mangled) else {
        return Err(LowerError::NoSuchMember { struct_name: struct_name.to_owned(), member: member.to_owned(), pos });
    };
    let params = sig.params.iter().map(|p| talus_types::resolve(p, env)).collect::<LowerResult<Vec<_>>>()?;
    let ret = talus_types::resolve(&sig.return_type, env)?;
    let raw_ty = Type::Function { params: params.clone(), ret: Box::new(ret.clone()), variadic: sig.variadic };
    let reduced_params = params.into_iter().skip(1).collect();
    let reduced_ty = Type::Function { params: reduced_params, ret: Box::new(ret), variadic: sig.variadic };
    let callee = builder.function_ref(&mangled, raw_ty);
    let bound = trampoline::bind_first_arg(callee, base, reduced_ty, ctx, builder)?;
    Ok(bound.callable)
}

/// `base[index]` — the element type is the array/pointer's pointee;
/// indices are dynamic, so unlike `StructMember` the index value itself
/// (not a compile-time constant) would normally drive the GEP. The
/// `Builder::gep` contract here only exposes a constant-index form,
/// matching the element-pointer shape used for fixed-size structs;
/// dynamic-index arrays are out of scope for this lowering core.
pub fn lower_element(base: Value, elem_ty: Type, index: i64, builder: &mut dyn Builder) -> LowerResult<Value> {
    let ptr = builder.gep(base, index, elem_ty);
    Ok(builder.load(ptr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_ast::TypeNode;
    use talus_ir::RecordingBuilder;
    use talus_types::{ModuleEnv, StructureMeta};

    fn ident(name: &str) -> TypeNode {
        TypeNode::Ident { name: name.to_owned(), pos: Position::default() }
    }

    #[test]
    fn struct_member_resolves_field_index_and_loads() {
        let mut env = ModuleEnv::new();
        env.define_structure(StructureMeta {
            name: "Point".into(),
            fields: vec![("x".into(), ident("int")), ("y".into(), ident("int"))],
        });
        let mut ctx = LoweringContext::new();
        let mut builder = RecordingBuilder::new();
        builder.start_function("f", vec![], false, Type::Void);
        let base = builder.alloca(Type::Struct("Point".into()));
        let value = lower_struct_member(base, "Point", "y", Position::default(), &env, &mut ctx, &mut builder).unwrap();
        assert_eq!(value.ty, Type::Int(32));
    }

    #[test]
    fn unknown_member_errors() {
        let mut env = ModuleEnv::new();
        env.define_structure(StructureMeta { name: "Point".into(), fields: vec![("x".into(), ident("int"))] });
        let mut ctx = LoweringContext::new();
        let mut builder = RecordingBuilder::new();
        builder.start_function("f", vec![], false, Type::Void);
        let base = builder.alloca(Type::Struct("Point".into()));
        assert!(lower_struct_member(base, "Point", "z", Position::default(), &env, &mut ctx, &mut builder).is_err());
    }

    #[test]
    fn member_function_binds_this_through_a_trampoline() {
        let mut env = ModuleEnv::new();
        env.define_structure(StructureMeta { name: "Point".into(), fields: vec![("x".into(), ident("int"))] });
        env.define_function(
            "struct::Point::length".into(),
            talus_types::FunctionSignature {
                params: vec![talus_ast::TypeNode::Pointer { inner: Box::new(ident("Point")), pos: Position::default() }],
                return_type: ident("int"),
                variadic: false,
            },
        );
        let mut ctx = LoweringContext::new();
        let mut builder = RecordingBuilder::new();
        builder.start_function("f", vec![], false, Type::Void);
        let base = builder.alloca(Type::Struct("Point".into()));
        let value = lower_struct_member(base, "Point", "length", Position::default(), &env, &mut ctx, &mut builder).unwrap();
        assert!(matches!(value.ty, Type::Function { .. }) || value.ty.is_pointer());
        let (_, trampolines) = ctx.pop_scope();
        assert_eq!(trampolines.len(), 1);
    }
}
