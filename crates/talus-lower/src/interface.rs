//! Interface synthesis: a vtable-as-struct-of-function-pointers, with
//! parent interfaces' methods ordered first.

use talus_ast::InterfaceItem;
use talus_diagnostics::{LowerError, LowerResult};
use talus_ir::{Builder, Type, Value};
use talus_types::{InterfaceMeta, InterfaceMethodMeta, ModuleEnv};

use crate::context::LoweringContext;
use crate::trampoline;

/// Registers `item` into the module environment and defines its backing
/// struct type as a flat list of function-pointer fields, parent
/// interfaces' methods first: a derived interface's vtable lays its
/// parents' slots out before its own.
pub fn declare(item: &InterfaceItem, env: &mut ModuleEnv, builder: &mut dyn Builder) -> LowerResult<()> {
    let methods = item
        .methods
        .iter()
        .map(|m| {
            Ok(InterfaceMethodMeta {
                name: m.name.clone(),
                params: m.params.clone(),
                return_type: m.return_type.clone(),
            })
        })
        .collect::<LowerResult<Vec<_>>>()?;

    env.define_interface(InterfaceMeta { name: item.name.clone(), extends: item.extends.clone(), methods });

    let flattened = env.interface_methods(&item.name);
    let mut field_types = Vec::with_capacity(flattened.len());
    for method in &flattened {
        let params = method.params.iter().map(|p| talus_types::resolve(p, env)).collect::<LowerResult<Vec<_>>>()?;
        let ret = talus_types::resolve(&method.return_type, env)?;
        field_types.push(Type::Function { params, ret: Box::new(ret), variadic: false }.pointer_to());
    }
    builder.define_struct(&format!("interface::{}", item.name), field_types);
    Ok(())
}

/// A struct method's mangled linkage name: `struct::<S>::<name>`. Its
/// first declared parameter is always the bound `this` pointer — the
/// interface's own method signature never mentions it, since `this` is
/// supplied through the trampoline's `Nest` slot, not an ordinary
/// argument.
fn mangled_method(struct_name: &str, method_name: &str) -> String {
    format!("struct::{struct_name}::{method_name}")
}

/// The function type a struct method's implementation must declare: `this`
/// (a pointer to the struct) prepended to the interface method's own
/// parameter list.
fn expected_impl_signature(struct_name: &str, method: &InterfaceMethodMeta, env: &ModuleEnv) -> LowerResult<Type> {
    let this_ty = Type::Struct(struct_name.to_owned()).pointer_to();
    let mut params = vec![this_ty];
    params.extend(method.params.iter().map(|p| talus_types::resolve(p, env)).collect::<LowerResult<Vec<_>>>()?);
    let ret = talus_types::resolve(&method.return_type, env)?;
    Ok(Type::Function { params, ret: Box::new(ret), variadic: false })
}

/// `implements`: a struct satisfies an interface only if it defines every
/// flattened method, each taking `this` as its first parameter, matching
/// the interface's declared signature otherwise. Methods are looked up
/// by the struct's own function-name mangling convention
/// (`struct::<S>::<method>`).
pub fn implements(struct_name: &str, interface_name: &str, env: &ModuleEnv) -> LowerResult<bool> {
    let methods = env.interface_methods(interface_name);
    for method in &methods {
        let mangled = mangled_method(struct_name, &method.name);
        let Some(sig) = env.function(&mangled) else {
            return Ok(false);
        };
        let actual_ret = talus_types::resolve(&sig.return_type, env)?;
        let actual_params = sig.params.iter().map(|p| talus_types::resolve(p, env)).collect::<LowerResult<Vec<_>>>()?;
        let actual = Type::Function { params: actual_params, ret: Box::new(actual_ret), variadic: sig.variadic };
        let expected = expected_impl_signature(struct_name, method, env)?;
        if actual != expected {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Casts a concrete struct pointer to an interface vtable pointer: checks
/// every flattened method has a matching `struct::<S>::<method>`
/// implementation, binds `this` through the trampoline binder (the same
/// mechanism a bound method call uses) so each stored function pointer
/// has the interface's own (no-`this`) arity, then builds the vtable
/// literal. A missing implementation is reported as `MissingMethod`
/// against the first unmatched method so diagnostics point at something
/// actionable; a present-but-wrong-shaped one is `MethodSignatureMismatch`.
pub fn cast_to_interface(
    struct_value: Value,
    struct_name: &str,
    interface_name: &str,
    env: &ModuleEnv,
    ctx: &mut LoweringContext,
    builder: &mut dyn Builder,
    pos: talus_diagnostics::Position,
) -> LowerResult<Value> {
    let methods = env.interface_methods(interface_name);
    let mut fn_values = Vec::with_capacity(methods.len());
    for method in &methods {
        let mangled = mangled_method(struct_name, &method.name);
        let Some(sig) = env.function(&mangled) else {
            return Err(LowerError::MissingMethod { struct_name: struct_name.to_owned(), method: method.name.clone(), pos });
        };
        let actual_ret = talus_types::resolve(&sig.return_type, env)?;
        let actual_params = sig.params.iter().map(|p| talus_types::resolve(p, env)).collect::<LowerResult<Vec<_>>>()?;
        let raw_ty = Type::Function { params: actual_params, ret: Box::new(actual_ret.clone()), variadic: sig.variadic };
        let expected = expected_impl_signature(struct_name, method, env)?;
        if raw_ty != expected {
            return Err(LowerError::MethodSignatureMismatch { struct_name: struct_name.to_owned(), method: method.name.clone(), pos });
        }
        let method_params = method.params.iter().map(|p| talus_types::resolve(p, env)).collect::<LowerResult<Vec<_>>>()?;
        let reduced_ty = Type::Function { params: method_params, ret: Box::new(actual_ret), variadic: false };
        let callee = builder.function_ref(&mangled, raw_ty);
        let bound = trampoline::bind_first_arg(callee, struct_value.clone(), reduced_ty, ctx, builder)?;
        fn_values.push(bound.callable);
    }
    let vtable_ty = Type::Struct(format!("interface::{interface_name}"));
    let slot = builder.alloca(vtable_ty.clone());
    for (index, value) in fn_values.into_iter().enumerate() {
        let field_ptr = builder.gep(slot.clone(), index as i64, value.ty.clone());
        builder.store(value, field_ptr);
    }
    Ok(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_ast::{InterfaceItem, InterfaceMethod};
    use talus_diagnostics::Position;
    use talus_ir::RecordingBuilder;

    fn ident(name: &str) -> talus_ast::TypeNode {
        talus_ast::TypeNode::Ident { name: name.to_owned(), pos: Position::default() }
    }

    #[test]
    fn derived_interface_orders_parent_methods_first() {
        let mut env = ModuleEnv::new();
        let mut builder = RecordingBuilder::new();
        builder.start_function("__module_init", vec![], false, Type::Void);
        declare(
            &InterfaceItem {
                name: "Base".into(),
                extends: vec![],
                methods: vec![InterfaceMethod { name: "id".into(), params: vec![], return_type: ident("int") }],
                pos: Position::default(),
            },
            &mut env,
            &mut builder,
        )
        .unwrap();
        declare(
            &InterfaceItem {
                name: "Derived".into(),
                extends: vec!["Base".into()],
                methods: vec![InterfaceMethod { name: "extra".into(), params: vec![], return_type: ident("void") }],
                pos: Position::default(),
            },
            &mut env,
            &mut builder,
        )
        .unwrap();
        let methods = env.interface_methods("Derived");
        assert_eq!(methods[0].name, "id");
        assert_eq!(methods[1].name, "extra");
    }

    #[test]
    fn implements_is_false_without_a_matching_function() {
        let mut env = ModuleEnv::new();
        let mut builder = RecordingBuilder::new();
        builder.start_function("__module_init", vec![], false, Type::Void);
        declare(
            &InterfaceItem {
                name: "Drawable".into(),
                extends: vec![],
                methods: vec![InterfaceMethod { name: "draw".into(), params: vec![], return_type: ident("void") }],
                pos: Position::default(),
            },
            &mut env,
            &mut builder,
        )
        .unwrap();
        assert!(!implements("Circle", "Drawable", &env).unwrap());
    }

    #[test]
    fn implements_is_true_once_this_bound_signature_matches() {
        let mut env = ModuleEnv::new();
        let mut builder = RecordingBuilder::new();
        builder.start_function("__module_init", vec![], false, Type::Void);
        declare(
            &InterfaceItem {
                name: "Drawable".into(),
                extends: vec![],
                methods: vec![InterfaceMethod { name: "draw".into(), params: vec![], return_type: ident("int") }],
                pos: Position::default(),
            },
            &mut env,
            &mut builder,
        )
        .unwrap();
        env.define_structure(talus_types::StructureMeta { name: "Circle".into(), fields: vec![] });
        env.define_function(
            "struct::Circle::draw".into(),
            talus_types::FunctionSignature {
                params: vec![talus_ast::TypeNode::Pointer { inner: Box::new(ident("Circle")), pos: Position::default() }],
                return_type: ident("int"),
                variadic: false,
            },
        );
        assert!(implements("Circle", "Drawable", &env).unwrap());
    }

    #[test]
    fn cast_to_interface_binds_this_through_a_trampoline() {
        let mut env = ModuleEnv::new();
        let mut builder = RecordingBuilder::new();
        builder.start_function("__module_init", vec![], false, Type::Void);
        declare(
            &InterfaceItem {
                name: "Drawable".into(),
                extends: vec![],
                methods: vec![InterfaceMethod { name: "draw".into(), params: vec![], return_type: ident("int") }],
                pos: Position::default(),
            },
            &mut env,
            &mut builder,
        )
        .unwrap();
        env.define_structure(talus_types::StructureMeta { name: "Circle".into(), fields: vec![] });
        env.define_function(
            "struct::Circle::draw".into(),
            talus_types::FunctionSignature {
                params: vec![talus_ast::TypeNode::Pointer { inner: Box::new(ident("Circle")), pos: Position::default() }],
                return_type: ident("int"),
                variadic: false,
            },
        );
        builder.start_function("user", vec![], false, Type::Void);
        let mut ctx = LoweringContext::new();
        let struct_value = builder.alloca(Type::Struct("Circle".into()));
        let result = cast_to_interface(struct_value, "Circle", "Drawable", &env, &mut ctx, &mut builder, Position::default()).unwrap();
        assert!(result.ty.is_pointer() || matches!(result.ty, Type::Struct(_)));
        let (_, trampolines) = ctx.pop_scope();
        assert_eq!(trampolines.len(), 1);
    }
}
