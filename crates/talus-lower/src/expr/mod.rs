//! Expression lowering dispatch.

pub mod call;
pub mod cast;
pub mod ident;
pub mod literal;
pub mod member;

use talus_ast::{BinOp, Expr, UnOp};
use talus_diagnostics::{LowerError, LowerResult, Position};
use talus_ir::{Builder, CmpPred, FloatBinOp, IntBinOp, Type, Value};
use talus_types::ModuleEnv;

use crate::context::LoweringContext;
use crate::interface;
use crate::trampoline;

/// Lowers `expr`, returning the `Value` it produces. `expected_ty` guides
/// literal and cast lowering when the surrounding context already knows
/// the target type (e.g. a `DeclAssign` with an explicit type annotation);
/// pass `Type::Auto` when no hint is available.
pub fn lower_expr(
    expr: &Expr,
    ctx: &mut LoweringContext,
    env: &ModuleEnv,
    builder: &mut dyn Builder,
    expected_ty: Type,
) -> LowerResult<Value> {
    if let Some(value) = literal::lower_literal(expr, builder)? {
        return Ok(value);
    }

    match expr {
        Expr::Ident { name, pos } => ident::lower_ident(name, *pos, ctx, env, builder, expected_ty),

        Expr::Deref { operand, .. } => {
            let ptr = lower_expr(operand, ctx, env, builder, Type::Auto)?;
            ident::lower_deref(ptr, builder)
        }

        Expr::Reference { .. } => ident::lower_reference(expr),

        Expr::Binary { op, lhs, rhs, pos } => {
            let lhs_v = lower_expr(lhs, ctx, env, builder, Type::Auto)?;
            let rhs_v = lower_expr(rhs, ctx, env, builder, Type::Auto)?;
            lower_binary(*op, lhs_v, rhs_v, *pos, builder)
        }

        Expr::Unary { op, operand, .. } => {
            let v = lower_expr(operand, ctx, env, builder, Type::Auto)?;
            lower_unary(*op, v, builder)
        }

        Expr::Element { base, index, pos } => {
            let base_v = lower_expr(base, ctx, env, builder, Type::Auto)?;
            let elem_ty = match base_v.ty.underlying() {
                Type::Array(elem, _) => elem.as_ref().clone(),
                other => other.clone(),
            };
            let Expr::Int { value, .. } = index.as_ref() else {
                // Dynamic-index arrays are out of scope for this lowering
                // core; a constant index is the only shape `Builder::gep`
                // exposes.
                return Err(LowerError::NotImplemented { feature: "dynamic array index".to_owned(), pos: *pos });
            };
            member::lower_element(base_v, elem_ty, *value as i64, builder)
        }

        Expr::StructMember { base, member, pos } => {
            let base_v = lower_expr(base, ctx, env, builder, Type::Auto)?;
            let (struct_ty, _) = base_v.ty.is_struct_kind();
            let Some(Type::Struct(struct_name)) = struct_ty else {
                return Err(LowerError::NotAStruct { field_name: member.clone(), pos: *pos });
            };
            let struct_name = struct_name.clone();
            member::lower_struct_member(base_v, &struct_name, member, *pos, env, ctx, builder)
        }

        Expr::Cast { ty, operand, pos } => {
            let operand_v = lower_expr(operand, ctx, env, builder, Type::Auto)?;
            let from = operand_v.ty.clone();
            let target = talus_types::resolve(ty, env)?;
            cast::lower_cast(operand_v, &from, &target, *pos, env, ctx, builder)
        }

        Expr::Call { callee, args, pos } => {
            let Expr::Ident { name, .. } = callee.as_ref() else {
                return Err(LowerError::NotImplemented { feature: "indirect call target".to_owned(), pos: *pos });
            };
            let Some(sig) = env.function(name) else {
                // Not a known function: re-interpret the call as a struct
                // literal construction when the callee name is a declared
                // struct; a non-struct unknown name is unbound.
                if let Some(result) = call::try_construct_fallback(name, env, args.len(), *pos) {
                    result?;
                    let fields = args
                        .iter()
                        .map(|a| Ok((None, lower_expr(a, ctx, env, builder, Type::Auto)?)))
                        .collect::<LowerResult<Vec<_>>>()?;
                    return call::lower_aggregate(name, &fields, env, *pos, builder);
                }
                return Err(LowerError::UnboundIdent { name: name.clone(), pos: *pos });
            };
            let callee_sig = call::CalleeSignature {
                params: sig.params.iter().map(|p| talus_types::resolve(p, env)).collect::<LowerResult<Vec<_>>>()?,
                variadic: sig.variadic,
            };

            // Expansion-based partial application: a trailing
            // `::expansion` sentinel binds every preceding argument
            // through the trampoline binder instead of invoking the call,
            // producing a callable of reduced arity. Only the *last*
            // argument's name is checked for the sentinel; one anywhere
            // earlier is "cannot use an expansion as argument N", surfaced
            // as `EmptyExpansionContext`.
            if args.iter().rev().skip(1).any(Expr::is_partial_application_sentinel) {
                return Err(LowerError::EmptyExpansionContext { pos: *pos });
            }
            if let Some(true) = args.last().map(Expr::is_partial_application_sentinel) {
                let bound_args = &args[..args.len() - 1];
                let ret = talus_types::resolve(&sig.return_type, env)?;
                return lower_partial_application(name, &callee_sig, bound_args, ret, *pos, ctx, env, builder);
            }

            call::check_arity(&callee_sig, args, *pos)?;
            let mut param_idx = 0usize;
            let arg_values = args
                .iter()
                .filter(|a| !a.is_expansion())
                .map(|a| {
                    let value = lower_expr(a, ctx, env, builder, Type::Auto)?;
                    let param_ty = callee_sig.params.get(param_idx).cloned();
                    param_idx += 1;
                    cast_arg_for_param(value, param_ty.as_ref(), *pos, env, ctx, builder)
                })
                .collect::<LowerResult<Vec<_>>>()?;
            let ret = talus_types::resolve(&sig.return_type, env)?;
            let callee_ty = Type::Function { params: callee_sig.params, ret: Box::new(ret.clone()), variadic: sig.variadic };
            let callee_v = builder.function_ref(name, callee_ty);
            call::lower_call(callee_v, arg_values, ret, builder)
        }

        Expr::Append { list, value, pos } => {
            let list_v = lower_expr(list, ctx, env, builder, Type::Auto)?;
            let value_v = lower_expr(value, ctx, env, builder, Type::Auto)?;
            let elem_ty = value_v.ty.clone();
            let _ = pos;
            call::lower_append(list_v, value_v, elem_ty, builder)
        }

        Expr::Len { operand, .. } => {
            let v = lower_expr(operand, ctx, env, builder, Type::Auto)?;
            call::lower_len(v, builder)
        }

        Expr::SizeOf { ty, .. } | Expr::AlignOf { ty, .. } => {
            let resolved = talus_types::resolve(ty, env)?;
            // Neither sizeof nor alignof needs target-layout information
            // at this layer — target data-layout modeling is out of
            // scope, so they lower to a call against the backend's own
            // layout query, named after the resolved type.
            let name = format!("__builtin_sizeof${}", resolved.printable());
            let callee = builder.function_ref(&name, Type::Function { params: vec![], ret: Box::new(Type::Int(64)), variadic: false });
            Ok(builder.call(callee, vec![], Type::Int(64)))
        }

        Expr::NewExpr { ty, args, pos } => {
            // `new T(args)` construction follows the same positional
            // field-assignment shape as the `FuncCall` struct-literal
            // fallback above: both resolve a name to a struct and assign
            // each argument to the next field in declaration order.
            let resolved = talus_types::resolve(ty, env)?;
            let Type::Struct(struct_name) = resolved else {
                return Err(LowerError::NotAStruct { field_name: "<new>".to_owned(), pos: *pos });
            };
            let fields = args
                .iter()
                .map(|a| Ok((None, lower_expr(a, ctx, env, builder, Type::Auto)?)))
                .collect::<LowerResult<Vec<_>>>()?;
            call::lower_aggregate(&struct_name, &fields, env, *pos, builder)
        }

        Expr::Initializer { fields, pos } => {
            // `{ field: value, ... }` — the target struct comes from the
            // surrounding context (a `DeclAssign`'s declared type, or a
            // call argument's expected parameter type); an initializer
            // lowered with no such hint has nothing to resolve its fields
            // against.
            let Type::Struct(struct_name) = &expected_ty else {
                return Err(LowerError::NotAStruct { field_name: "<initializer>".to_owned(), pos: *pos });
            };
            let struct_name = struct_name.clone();
            let values = fields
                .iter()
                .map(|(name, value_expr)| Ok((name.clone(), lower_expr(value_expr, ctx, env, builder, Type::Auto)?)))
                .collect::<LowerResult<Vec<_>>>()?;
            call::lower_aggregate(&struct_name, &values, env, *pos, builder)
        }

        Expr::Expression { inner, .. } => lower_expr(inner, ctx, env, builder, expected_ty),

        Expr::ScopeRes { scope, member, pos } => {
            // Enum variant access: `Color::Red` resolves through the
            // module environment's enum table to a constant value.
            if let Some(enum_meta) = env.enum_meta(scope) {
                let variant = enum_meta
                    .variants
                    .iter()
                    .find(|(name, _)| name == member)
                    .ok_or_else(|| LowerError::NoSuchMember { struct_name: scope.clone(), member: member.clone(), pos: *pos })?;
                let discriminant = variant.1.unwrap_or(0);
                return Ok(builder.const_int(Type::Int(32), discriminant));
            }
            Err(LowerError::UnboundIdent { name: format!("{scope}::{member}"), pos: *pos })
        }

        _ => Err(LowerError::NotImplemented { feature: describe(expr), pos: expr.pos() }),
    }
}

/// If `param_ty` names an interface, casts `value` to it; otherwise
/// passes `value` through unchanged. A value that isn't struct-kind
/// can't satisfy an interface parameter either way, so it's left for the
/// backend's own type check rather than guessed at here.
fn cast_arg_for_param(
    value: Value,
    param_ty: Option<&Type>,
    pos: Position,
    env: &ModuleEnv,
    ctx: &mut LoweringContext,
    builder: &mut dyn Builder,
) -> LowerResult<Value> {
    let Some(param_ty) = param_ty else { return Ok(value) };
    if !param_ty.is_interface() {
        return Ok(value);
    }
    let (Some(Type::Struct(struct_name)), true) = value.ty.is_struct_kind() else {
        return Ok(value);
    };
    if struct_name.starts_with("interface::") {
        return Ok(value);
    }
    let struct_name = struct_name.clone();
    let interface_name = param_ty.printable();
    interface::cast_to_interface(value, &struct_name, &interface_name, env, ctx, builder, pos)
}

/// Binds each of `bound_args` as the callee's next positional argument in
/// turn, through the trampoline binder, yielding a callable of arity
/// `callee_sig.params.len() - bound_args.len()`. `bound_args` empty means
/// the sentinel had nothing to bind (`f(::expansion)`); binding as many
/// or more arguments than the callee declares leaves nothing left to
/// call through the result, which is `OverApplication`.
#[allow(clippy::too_many_arguments)]
fn lower_partial_application(
    name: &str,
    callee_sig: &call::CalleeSignature,
    bound_args: &[Expr],
    ret: Type,
    pos: Position,
    ctx: &mut LoweringContext,
    env: &ModuleEnv,
    builder: &mut dyn Builder,
) -> LowerResult<Value> {
    if bound_args.is_empty() {
        return Err(LowerError::EmptyExpansionContext { pos });
    }
    if bound_args.len() >= callee_sig.params.len() {
        return Err(LowerError::OverApplication { pos });
    }

    let full_ty = Type::Function { params: callee_sig.params.clone(), ret: Box::new(ret.clone()), variadic: callee_sig.variadic };
    let mut callee_v = builder.function_ref(name, full_ty);
    let mut remaining_params = callee_sig.params.clone();
    for arg in bound_args {
        let arg_v = lower_expr(arg, ctx, env, builder, Type::Auto)?;
        let arg_v = cast_arg_for_param(arg_v, remaining_params.first(), pos, env, ctx, builder)?;
        remaining_params.remove(0);
        let reduced_ty = Type::Function { params: remaining_params.clone(), ret: Box::new(ret.clone()), variadic: callee_sig.variadic };
        let bound = trampoline::bind_first_arg(callee_v, arg_v, reduced_ty, ctx, builder)?;
        callee_v = bound.callable;
    }
    Ok(callee_v)
}

fn describe(expr: &Expr) -> String {
    format!("{expr:?}").split_whitespace().next().unwrap_or("expression").to_owned()
}

fn lower_binary(op: BinOp, lhs: Value, rhs: Value, pos: talus_diagnostics::Position, builder: &mut dyn Builder) -> LowerResult<Value> {
    if lhs.ty.is_float() || rhs.ty.is_float() {
        let fop = match op {
            BinOp::Add => FloatBinOp::Add,
            BinOp::Sub => FloatBinOp::Sub,
            BinOp::Mul => FloatBinOp::Mul,
            BinOp::Div => FloatBinOp::Div,
            BinOp::Rem => FloatBinOp::Rem,
            BinOp::Eq => return Ok(builder.fcmp(CmpPred::Eq, lhs, rhs)),
            BinOp::Ne => return Ok(builder.fcmp(CmpPred::Ne, lhs, rhs)),
            BinOp::Lt => return Ok(builder.fcmp(CmpPred::Lt, lhs, rhs)),
            BinOp::Le => return Ok(builder.fcmp(CmpPred::Le, lhs, rhs)),
            BinOp::Gt => return Ok(builder.fcmp(CmpPred::Gt, lhs, rhs)),
            BinOp::Ge => return Ok(builder.fcmp(CmpPred::Ge, lhs, rhs)),
            _ => return Err(LowerError::TypeMismatch { expected: "int".to_owned(), found: "float".to_owned(), pos }),
        };
        return Ok(builder.float_binop(fop, lhs, rhs));
    }

    let iop = match op {
        BinOp::Add => IntBinOp::AddSigned,
        BinOp::Sub => IntBinOp::SubSigned,
        BinOp::Mul => IntBinOp::MulSigned,
        BinOp::Div => IntBinOp::DivSigned,
        BinOp::Rem => IntBinOp::RemSigned,
        BinOp::And | BinOp::LogicalAnd => IntBinOp::And,
        BinOp::Or | BinOp::LogicalOr => IntBinOp::Or,
        BinOp::Xor => IntBinOp::Xor,
        BinOp::Shl => IntBinOp::Shl,
        BinOp::Shr => IntBinOp::Shr,
        BinOp::Eq => return Ok(builder.icmp(CmpPred::Eq, lhs, rhs)),
        BinOp::Ne => return Ok(builder.icmp(CmpPred::Ne, lhs, rhs)),
        BinOp::Lt => return Ok(builder.icmp(CmpPred::Lt, lhs, rhs)),
        BinOp::Le => return Ok(builder.icmp(CmpPred::Le, lhs, rhs)),
        BinOp::Gt => return Ok(builder.icmp(CmpPred::Gt, lhs, rhs)),
        BinOp::Ge => return Ok(builder.icmp(CmpPred::Ge, lhs, rhs)),
    };
    Ok(builder.int_binop(iop, lhs, rhs))
}

fn lower_unary(op: UnOp, operand: Value, builder: &mut dyn Builder) -> LowerResult<Value> {
    match op {
        UnOp::Neg if operand.ty.is_float() => {
            let zero = builder.const_float(operand.ty.clone(), 0.0);
            Ok(builder.float_binop(FloatBinOp::Sub, zero, operand))
        }
        UnOp::Neg => {
            let zero = builder.const_int(operand.ty.clone(), 0);
            Ok(builder.int_binop(IntBinOp::SubSigned, zero, operand))
        }
        UnOp::Not => {
            let truth = builder.const_bool(true);
            Ok(builder.int_binop(IntBinOp::Xor, operand, truth))
        }
        UnOp::BitNot => {
            let all_ones = builder.const_int(operand.ty.clone(), -1);
            Ok(builder.int_binop(IntBinOp::Xor, operand, all_ones))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_ast::Expr;
    use talus_diagnostics::Position;
    use talus_ir::RecordingBuilder;

    #[test]
    fn binary_add_on_ints_lowers_to_int_binop() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let expr = Expr::Binary {
            op: BinOp::Add,
            lhs: Box::new(Expr::Int { value: 1, pos: Position::default() }),
            rhs: Box::new(Expr::Int { value: 2, pos: Position::default() }),
            pos: Position::default(),
        };
        let value = lower_expr(&expr, &mut ctx, &env, &mut builder, Type::Auto).unwrap();
        assert_eq!(value.ty, Type::Int(32));
    }

    #[test]
    fn comparison_produces_bool() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let expr = Expr::Binary {
            op: BinOp::Lt,
            lhs: Box::new(Expr::Int { value: 1, pos: Position::default() }),
            rhs: Box::new(Expr::Int { value: 2, pos: Position::default() }),
            pos: Position::default(),
        };
        let value = lower_expr(&expr, &mut ctx, &env, &mut builder, Type::Auto).unwrap();
        assert_eq!(value.ty, Type::Bool);
    }

    #[test]
    fn reference_expression_is_not_implemented() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let expr = Expr::Reference { operand: Box::new(Expr::Ident { name: "x".into(), pos: Position::default() }), pos: Position::default() };
        assert!(lower_expr(&expr, &mut ctx, &env, &mut builder, Type::Auto).is_err());
    }

    fn point_env() -> ModuleEnv {
        let mut env = ModuleEnv::new();
        env.define_structure(talus_types::StructureMeta {
            name: "Point".into(),
            fields: vec![
                ("x".into(), talus_ast::TypeNode::Ident { name: "int".into(), pos: Position::default() }),
                ("y".into(), talus_ast::TypeNode::Ident { name: "int".into(), pos: Position::default() }),
            ],
        });
        env
    }

    #[test]
    fn new_expr_constructs_a_struct_with_positional_args() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = point_env();
        builder.start_function("f", vec![], false, Type::Void);
        let expr = Expr::NewExpr {
            ty: talus_ast::TypeNode::Ident { name: "Point".into(), pos: Position::default() },
            args: vec![Expr::Int { value: 1, pos: Position::default() }, Expr::Int { value: 2, pos: Position::default() }],
            pos: Position::default(),
        };
        let value = lower_expr(&expr, &mut ctx, &env, &mut builder, Type::Auto).unwrap();
        assert!(value.ty.is_pointer() || matches!(value.ty, Type::Struct(_)));
    }

    #[test]
    fn initializer_resolves_named_fields_against_the_expected_struct_type() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = point_env();
        builder.start_function("f", vec![], false, Type::Void);
        let expr = Expr::Initializer {
            fields: vec![
                (Some("y".into()), Expr::Int { value: 2, pos: Position::default() }),
                (Some("x".into()), Expr::Int { value: 1, pos: Position::default() }),
            ],
            pos: Position::default(),
        };
        let value = lower_expr(&expr, &mut ctx, &env, &mut builder, Type::Struct("Point".into())).unwrap();
        assert!(value.ty.is_pointer() || matches!(value.ty, Type::Struct(_)));
    }

    #[test]
    fn initializer_with_no_expected_type_errors() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = point_env();
        builder.start_function("f", vec![], false, Type::Void);
        let expr = Expr::Initializer { fields: vec![], pos: Position::default() };
        assert!(lower_expr(&expr, &mut ctx, &env, &mut builder, Type::Auto).is_err());
    }

    #[test]
    fn element_indexes_an_array_with_a_constant_index() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let arr = builder.alloca(Type::Array(Box::new(Type::Int(32)), 4));
        ctx.declare("xs", arr, false, Position::default()).unwrap();
        let expr = Expr::Element {
            base: Box::new(Expr::Ident { name: "xs".into(), pos: Position::default() }),
            index: Box::new(Expr::Int { value: 2, pos: Position::default() }),
            pos: Position::default(),
        };
        let value = lower_expr(&expr, &mut ctx, &env, &mut builder, Type::Auto).unwrap();
        assert_eq!(value.ty, Type::Int(32));
    }

    fn declare_add(env: &mut ModuleEnv) {
        env.define_function(
            "add".into(),
            talus_types::FunctionSignature {
                params: vec![talus_ast::TypeNode::Ident { name: "int".into(), pos: Position::default() }, talus_ast::TypeNode::Ident { name: "int".into(), pos: Position::default() }],
                return_type: talus_ast::TypeNode::Ident { name: "int".into(), pos: Position::default() },
                variadic: false,
            },
        );
    }

    #[test]
    fn trailing_expansion_sentinel_produces_a_reduced_arity_callable() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let mut env = ModuleEnv::new();
        declare_add(&mut env);
        builder.start_function("f", vec![], false, Type::Void);
        let call = Expr::Call {
            callee: Box::new(Expr::Ident { name: "add".into(), pos: Position::default() }),
            args: vec![
                Expr::Int { value: 3, pos: Position::default() },
                Expr::Ident { name: "::expansion".into(), pos: Position::default() },
            ],
            pos: Position::default(),
        };
        let value = lower_expr(&call, &mut ctx, &env, &mut builder, Type::Auto).unwrap();
        assert!(matches!(value.ty, Type::Function { .. }) || value.ty.is_pointer());
        let (_, trampolines) = ctx.pop_scope();
        assert_eq!(trampolines.len(), 1);
    }

    #[test]
    fn expansion_sentinel_with_no_preceding_argument_is_empty_context() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let mut env = ModuleEnv::new();
        declare_add(&mut env);
        builder.start_function("f", vec![], false, Type::Void);
        let call = Expr::Call {
            callee: Box::new(Expr::Ident { name: "add".into(), pos: Position::default() }),
            args: vec![Expr::Ident { name: "::expansion".into(), pos: Position::default() }],
            pos: Position::default(),
        };
        let err = lower_expr(&call, &mut ctx, &env, &mut builder, Type::Auto).unwrap_err();
        assert!(matches!(err, LowerError::EmptyExpansionContext { .. }));
    }

    #[test]
    fn expansion_sentinel_binding_every_parameter_is_over_application() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let mut env = ModuleEnv::new();
        declare_add(&mut env);
        builder.start_function("f", vec![], false, Type::Void);
        let call = Expr::Call {
            callee: Box::new(Expr::Ident { name: "add".into(), pos: Position::default() }),
            args: vec![
                Expr::Int { value: 1, pos: Position::default() },
                Expr::Int { value: 2, pos: Position::default() },
                Expr::Ident { name: "::expansion".into(), pos: Position::default() },
            ],
            pos: Position::default(),
        };
        let err = lower_expr(&call, &mut ctx, &env, &mut builder, Type::Auto).unwrap_err();
        assert!(matches!(err, LowerError::OverApplication { .. }));
    }

    #[test]
    fn expansion_sentinel_in_a_non_final_position_is_empty_context() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let mut env = ModuleEnv::new();
        declare_add(&mut env);
        builder.start_function("f", vec![], false, Type::Void);
        let call = Expr::Call {
            callee: Box::new(Expr::Ident { name: "add".into(), pos: Position::default() }),
            args: vec![
                Expr::Ident { name: "::expansion".into(), pos: Position::default() },
                Expr::Int { value: 2, pos: Position::default() },
            ],
            pos: Position::default(),
        };
        let err = lower_expr(&call, &mut ctx, &env, &mut builder, Type::Auto).unwrap_err();
        assert!(matches!(err, LowerError::EmptyExpansionContext { .. }));
    }
}
