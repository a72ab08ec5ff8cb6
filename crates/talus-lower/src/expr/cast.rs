//! `cast<T>(expr)` lowering.
//!
//! Primitive conversions (int widen/narrow, float widen/narrow, int/float
//! interconversion, pointer bitcast) lower directly to the matching
//! `Builder` cast instruction. A pointer-to-struct source has no
//! primitive instruction backing its conversion: if the target is also
//! struct-kind and names an `interface::`, the cast delegates to
//! interface synthesis; otherwise it looks for a user-defined
//! `operator <target>` member function (mangled
//! `struct::<S>::operator <printable>`) and calls it with the pointer
//! itself as the sole argument. `char*` converting to an int/float is
//! explicitly `NotImplemented` ("parsing numbers from char*") rather
//! than silently bit-cast. No matching operator, and no other case
//! matching, is `InvalidCast`.

use talus_diagnostics::{LowerError, LowerResult, Position};
use talus_ir::{Builder, CastKind, Type, Value};
use talus_types::ModuleEnv;

use crate::context::LoweringContext;
use crate::interface;

/// `struct::<StructName>::operator <printable-of-target>`. `to` keeps
/// whatever shape the surface syntax asked for (a bare struct or a
/// pointer to one) — `Type::printable` already appends `*` per level of
/// indirection, so the mangled name reflects it exactly.
#[must_use]
pub fn cast_operator_name(struct_name: &str, to: &Type) -> String {
    format!("struct::{struct_name}::operator {}", to.printable())
}

pub fn lower_cast(value: Value, from: &Type, to: &Type, pos: Position, env: &ModuleEnv, ctx: &mut LoweringContext, builder: &mut dyn Builder) -> LowerResult<Value> {
    if from == to {
        return Ok(value);
    }

    if from.is_pointer() {
        let (from_struct, from_is_struct) = from.is_struct_kind();
        if from_is_struct {
            let Some(Type::Struct(struct_name)) = from_struct else { unreachable!("is_struct_kind guarantees a Struct") };
            let struct_name = struct_name.clone();
            let (_, to_is_struct) = to.is_struct_kind();
            if to_is_struct && to.underlying().is_interface() {
                let interface_name = to.underlying().printable();
                let interface_name = interface_name.strip_prefix("interface::").unwrap_or(&interface_name).to_owned();
                return interface::cast_to_interface(value, &struct_name, &interface_name, env, ctx, builder, pos);
            }
            let name = cast_operator_name(&struct_name, to);
            let Some(sig) = env.function(&name) else {
                return Err(LowerError::InvalidCast { pos });
            };
            let params = sig.params.iter().map(|p| talus_types::resolve(p, env)).collect::<LowerResult<Vec<_>>>()?;
            let ret = talus_types::resolve(&sig.return_type, env)?;
            let fn_ty = Type::Function { params, ret: Box::new(ret), variadic: sig.variadic };
            let callee = builder.function_ref(&name, fn_ty);
            return Ok(builder.call(callee, vec![value], to.clone()));
        }
        if matches!(from, Type::Pointer(inner) if matches!(inner.as_ref(), Type::Int(8))) {
            if to.is_int() || to.is_float() {
                return Err(LowerError::NotImplemented { feature: "parsing numbers from char*".to_owned(), pos });
            }
            return Ok(builder.cast(CastKind::PtrCast, value, to.clone()));
        }
    }

    let kind = match (from, to) {
        (a, b) if a.is_int() && b.is_int() => {
            let (from_bits, to_bits) = (a.int_bits().unwrap_or(32), b.int_bits().unwrap_or(32));
            match from_bits.cmp(&to_bits) {
                std::cmp::Ordering::Less => CastKind::SExt,
                std::cmp::Ordering::Greater => CastKind::Trunc,
                std::cmp::Ordering::Equal => CastKind::Bitcast,
            }
        }
        (Type::Float(a), Type::Float(b)) => {
            if a.bits() < b.bits() { CastKind::FpExt } else { CastKind::FpTrunc }
        }
        (a, b) if a.is_int() && b.is_float() => CastKind::SiToFp,
        (a, b) if a.is_float() && b.is_int() => CastKind::FpToSi,
        (Type::Pointer(_), Type::Pointer(_)) => CastKind::PtrCast,
        _ => {
            return Err(LowerError::InvalidCast { pos });
        }
    };
    Ok(builder.cast(kind, value, to.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_ir::RecordingBuilder;

    #[test]
    fn widening_int_cast_sign_extends() {
        let env = ModuleEnv::new();
        let mut ctx = LoweringContext::new();
        let mut builder = RecordingBuilder::new();
        builder.start_function("f", vec![], false, Type::Void);
        let v = builder.const_int(Type::Int(8), 1);
        let result = lower_cast(v, &Type::Int(8), &Type::Int(32), Position::default(), &env, &mut ctx, &mut builder).unwrap();
        assert_eq!(result.ty, Type::Int(32));
    }

    #[test]
    fn int_to_float_uses_sitofp() {
        let env = ModuleEnv::new();
        let mut ctx = LoweringContext::new();
        let mut builder = RecordingBuilder::new();
        builder.start_function("f", vec![], false, Type::Void);
        let v = builder.const_int(Type::Int(32), 1);
        let result = lower_cast(v, &Type::Int(32), &Type::Float(talus_ir::FloatKind::Double), Position::default(), &env, &mut ctx, &mut builder).unwrap();
        assert!(result.ty.is_float());
    }

    #[test]
    fn struct_to_struct_calls_the_registered_cast_operator() {
        let mut env = ModuleEnv::new();
        env.define_function(
            "struct::A::operator B".into(),
            talus_types::FunctionSignature {
                params: vec![talus_ast::TypeNode::Pointer {
                    inner: Box::new(talus_ast::TypeNode::Ident { name: "A".into(), pos: Position::default() }),
                    pos: Position::default(),
                }],
                return_type: talus_ast::TypeNode::Ident { name: "B".into(), pos: Position::default() },
                variadic: false,
            },
        );
        let mut ctx = LoweringContext::new();
        let mut builder = RecordingBuilder::new();
        builder.start_function("f", vec![], false, Type::Void);
        let v = builder.alloca(Type::Struct("A".into()));
        let from = Type::Struct("A".into()).pointer_to();
        let to = Type::Struct("B".into());
        let result = lower_cast(v, &from, &to, Position::default(), &env, &mut ctx, &mut builder).unwrap();
        assert_eq!(result.ty, Type::Struct("B".into()));
    }

    #[test]
    fn struct_to_struct_with_no_matching_operator_is_invalid_cast() {
        let env = ModuleEnv::new();
        let mut ctx = LoweringContext::new();
        let mut builder = RecordingBuilder::new();
        builder.start_function("f", vec![], false, Type::Void);
        let v = builder.alloca(Type::Struct("A".into()));
        let from = Type::Struct("A".into()).pointer_to();
        let to = Type::Struct("B".into());
        let err = lower_cast(v, &from, &to, Position::default(), &env, &mut ctx, &mut builder).unwrap_err();
        assert!(matches!(err, LowerError::InvalidCast { .. }));
    }

    #[test]
    fn unrelated_conversion_is_invalid() {
        let env = ModuleEnv::new();
        let mut ctx = LoweringContext::new();
        let mut builder = RecordingBuilder::new();
        builder.start_function("f", vec![], false, Type::Void);
        let v = builder.const_bool(true);
        let err = lower_cast(v, &Type::Bool, &Type::Void, Position::default(), &env, &mut ctx, &mut builder).unwrap_err();
        assert!(matches!(err, LowerError::InvalidCast { .. }));
    }
}
