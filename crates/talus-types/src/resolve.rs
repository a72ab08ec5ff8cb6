//! Type resolver: turns the parser's `TypeNode` surface syntax into a
//! concrete `talus_ir::Type`, walking the module environment's name
//! tables in a fixed resolution order.

use talus_ast::TypeNode;
use talus_diagnostics::{LowerError, LowerResult};
use talus_ir::{basic_type, Type};

use crate::env::ModuleEnv;

/// Resolution order: basic type keyword, then struct name,
/// then interface name, then alias (resolved recursively, chains of
/// aliases are followed to their target), then enum name (which resolves
/// to its underlying integer representation). Anything left over is an
/// unknown type.
pub fn resolve(node: &TypeNode, env: &ModuleEnv) -> LowerResult<Type> {
    match node {
        TypeNode::Ident { name, pos } => resolve_name(name, *pos, env),
        TypeNode::Pointer { inner, .. } | TypeNode::MutPointer { inner, .. } => {
            Ok(resolve(inner, env)?.pointer_to())
        }
        TypeNode::Array { elem, len, .. } => {
            let elem_ty = resolve(elem, env)?;
            Ok(Type::Array(Box::new(elem_ty), len.unwrap_or(0)))
        }
        TypeNode::Function { params, ret, variadic, .. } => {
            let params = params.iter().map(|p| resolve(p, env)).collect::<LowerResult<Vec<_>>>()?;
            let ret = resolve(ret, env)?;
            Ok(Type::Function { params, ret: Box::new(ret), variadic: *variadic })
        }
    }
}

fn resolve_name(name: &str, pos: talus_diagnostics::Position, env: &ModuleEnv) -> LowerResult<Type> {
    if let Some(ty) = basic_type(name) {
        return Ok(ty);
    }
    if env.structure(name).is_some() {
        return Ok(Type::Struct(name.to_owned()));
    }
    if env.interface(name).is_some() {
        return Ok(Type::Struct(format!("interface::{name}")));
    }
    if let Some(target) = env.alias(name) {
        return resolve(target, env);
    }
    if let Some(enum_meta) = env.enum_meta(name) {
        return match &enum_meta.underlying {
            Some(underlying) => resolve(underlying, env),
            None => Ok(Type::Int(32)),
        };
    }
    Err(LowerError::UnknownType { name: name.to_owned(), pos })
}

/// Variadic function types are rejected as return types, kept as a hard
/// error rather than silently coerced.
pub fn reject_variadic_in_return(node: &TypeNode) -> LowerResult<()> {
    if let TypeNode::Function { variadic: true, pos, .. } = node {
        return Err(LowerError::VariadicInReturn { pos: *pos });
    }
    Ok(())
}

/// A `TypeSwitch` arm's type cannot be variadic: `typeswitch.hpp`'s
/// `TypeList::codegen` errors the same way when asked for a variadic
/// function type.
pub fn reject_variadic_in_type_switch(node: &TypeNode) -> LowerResult<()> {
    if let TypeNode::Function { variadic: true, pos, .. } = node {
        return Err(LowerError::VariadicInTypeSwitch { pos: *pos });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_diagnostics::Position;

    fn ident(name: &str) -> TypeNode {
        TypeNode::Ident { name: name.to_owned(), pos: Position::default() }
    }

    #[test]
    fn resolves_basic_types_directly() {
        let env = ModuleEnv::new();
        assert_eq!(resolve(&ident("int"), &env).unwrap(), Type::Int(32));
    }

    #[test]
    fn resolves_alias_chains_recursively() {
        let mut env = ModuleEnv::new();
        env.define_alias("Meters".into(), ident("int"));
        env.define_alias("Distance".into(), ident("Meters"));
        assert_eq!(resolve(&ident("Distance"), &env).unwrap(), Type::Int(32));
    }

    #[test]
    fn resolves_enum_to_underlying_or_default_int() {
        let mut env = ModuleEnv::new();
        env.define_enum(crate::env::EnumMeta {
            name: "Color".into(),
            underlying: None,
            variants: vec![("Red".into(), Some(0))],
        });
        assert_eq!(resolve(&ident("Color"), &env).unwrap(), Type::Int(32));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let env = ModuleEnv::new();
        assert!(resolve(&ident("Bogus"), &env).is_err());
    }

    #[test]
    fn pointer_and_array_recurse() {
        let env = ModuleEnv::new();
        let ptr = TypeNode::Pointer { inner: Box::new(ident("int")), pos: Position::default() };
        assert_eq!(resolve(&ptr, &env).unwrap(), Type::Int(32).pointer_to());
        let arr = TypeNode::Array { elem: Box::new(ident("char")), len: Some(4), pos: Position::default() };
        assert_eq!(resolve(&arr, &env).unwrap(), Type::Array(Box::new(Type::Int(8)), 4));
    }
}
