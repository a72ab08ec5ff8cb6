//! Call lowering, including the `append`/`len` builtins and the
//! struct-literal-construction fallback.
//!
//! Argument checking runs in a fixed order, checked in this sequence
//! rather than all at once so each step's error takes precedence over
//! the ones after it:
//! 1. an `Expansion` (`...expr`) argument short-circuits arity checking —
//!    its element count isn't known until the backend lowers it, so the
//!    checked arity becomes "at least the non-expanded argument count";
//! 2. otherwise, a variadic callee accepts any argument count at or above
//!    its declared parameter count;
//! 3. otherwise the argument count must match exactly;
//! 4. if the callee name isn't a function at all but a declared struct,
//!    the call is re-interpreted as a struct literal construction — and
//!    if *that* also fails to type-check, the original `ArityMismatch`
//!    (not the construction error) is what gets reported, since the
//!    construction attempt was only ever a fallback guess.

use talus_ir::{Builder, Type, Value};
use talus_diagnostics::{LowerError, LowerResult, Position};

pub struct CalleeSignature {
    pub params: Vec<Type>,
    pub variadic: bool,
}

/// Checks a call's argument count against `callee`'s signature, honoring
/// the expansion short-circuit. Returns `Ok(())` when the call is
/// well-formed; the caller still lowers each argument itself.
pub fn check_arity(callee: &CalleeSignature, args: &[talus_ast::Expr], pos: Position) -> LowerResult<()> {
    if args.iter().any(talus_ast::Expr::is_expansion) {
        let fixed = args.iter().filter(|a| !a.is_expansion()).count();
        if fixed > callee.params.len() && !callee.variadic {
            return Err(LowerError::ArityMismatch { expected: callee.params.len(), found: fixed, pos });
        }
        return Ok(());
    }
    if callee.variadic {
        if args.len() < callee.params.len() {
            return Err(LowerError::ArityMismatch { expected: callee.params.len(), found: args.len(), pos });
        }
        return Ok(());
    }
    if args.len() != callee.params.len() {
        return Err(LowerError::ArityMismatch { expected: callee.params.len(), found: args.len(), pos });
    }
    Ok(())
}

/// Attempts the struct-literal-construction fallback when `name` isn't a
/// known function. Construction failures are swallowed in favor of the
/// original arity error — the construction attempt is only ever a
/// fallback guess, so it doesn't get to report its own error.
pub fn try_construct_fallback(name: &str, env: &talus_types::ModuleEnv, arg_count: usize, pos: Position) -> Option<LowerResult<()>> {
    let meta = env.structure(name)?;
    if meta.fields.len() == arg_count {
        Some(Ok(()))
    } else {
        // Swallowed: the caller reports its own ArityMismatch instead.
        let _ = LowerError::ArityMismatch { expected: meta.fields.len(), found: arg_count, pos };
        None
    }
}

pub fn lower_call(callee: Value, args: Vec<Value>, result_ty: Type, builder: &mut dyn Builder) -> LowerResult<Value> {
    Ok(builder.call(callee, args, result_ty))
}

/// Aggregate construction shared by `Initializer` (`{ field: value, ... }`)
/// and `NewExpr` (`new T(args)`): stack-allocates `struct_name`, stores each
/// value at its resolved field index, and yields the slot pointer — the
/// same alloca/gep/store shape as `try_construct_fallback`'s positional
/// struct-literal path in `expr/mod.rs`'s `FuncCall` handling, generalized
/// to accept field names for named-field initializers.
pub fn lower_aggregate(
    struct_name: &str,
    fields: &[(Option<String>, Value)],
    env: &talus_types::ModuleEnv,
    pos: Position,
    builder: &mut dyn Builder,
) -> LowerResult<Value> {
    let meta = env.structure(struct_name).ok_or_else(|| LowerError::UnknownType { name: struct_name.to_owned(), pos })?;
    if fields.len() != meta.fields.len() {
        return Err(LowerError::ArityMismatch { expected: meta.fields.len(), found: fields.len(), pos });
    }
    let slot = builder.alloca(Type::Struct(struct_name.to_owned()));
    for (position, (name, value)) in fields.iter().enumerate() {
        let index = match name {
            Some(n) => meta.field_index(n).ok_or_else(|| LowerError::NoSuchMember { struct_name: struct_name.to_owned(), member: n.clone(), pos })?,
            None => position,
        };
        let field_ptr = builder.gep(slot.clone(), index as i64, value.ty.clone());
        builder.store(value.clone(), field_ptr);
    }
    Ok(slot)
}

/// `append(list, value)` — reallocates and appends, lowering to a call
/// against the runtime-provided append intrinsic.
pub fn lower_append(list: Value, value: Value, elem_ty: Type, builder: &mut dyn Builder) -> LowerResult<Value> {
    let callee = builder.function_ref(
        "__builtin_append",
        Type::Function { params: vec![list.ty.clone(), value.ty.clone()], ret: Box::new(elem_ty.clone().pointer_to()), variadic: false },
    );
    Ok(builder.call(callee, vec![list, value], elem_ty.pointer_to()))
}

/// `len(expr)` — lowers to a load of the variable-length-array's length
/// field, following the `struct { int length; T[0] data }` VLA convention.
pub fn lower_len(operand: Value, builder: &mut dyn Builder) -> LowerResult<Value> {
    let length_ptr = builder.gep(operand, 0, Type::Int(32));
    Ok(builder.load(length_ptr))
}
