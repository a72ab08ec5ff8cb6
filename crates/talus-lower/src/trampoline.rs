//! Trampoline-based partial application.
//!
//! Binding a closure's first argument allocates an executable trampoline
//! buffer, writes the callee and the bound argument into it via
//! `llvm.init.trampoline`, then
//! recovers a callable function pointer with the right arity via
//! `llvm.adjust.trampoline`. The buffer has to outlive every call through
//! the adjusted pointer but must still be freed — it's a scoped resource,
//! released through the same "guaranteed on every scope exit" mechanism
//! `defer` uses (`LoweringContext::own_trampoline`), just for a
//! compiler-internal obligation rather than user source.

use talus_diagnostics::LowerResult;
use talus_ir::{Builder, Type, Value};

use crate::context::LoweringContext;

pub struct BoundClosure {
    /// The adjusted, directly callable function pointer — one parameter
    /// shorter than `callee`, since the first argument is now baked in.
    pub callable: Value,
}

/// Binds `first_arg` as `callee`'s first parameter: the resulting value
/// is a function pointer accepting the remaining parameters, relying on
/// the trampoline ABI's `Nest`-attribute convention, which is why
/// `callee` itself must already have its first parameter marked `Nest`
/// before this runs.
pub fn bind_first_arg(callee: Value, first_arg: Value, result_ty: Type, ctx: &mut LoweringContext, builder: &mut dyn Builder) -> LowerResult<BoundClosure> {
    builder.mark_nest(callee.clone());
    let buf = builder.trampoline_alloc();
    builder.trampoline_init(buf.clone(), callee, first_arg);
    let callable = builder.trampoline_adjust(buf.clone(), result_ty);
    ctx.own_trampoline(buf);
    Ok(BoundClosure { callable })
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_ir::RecordingBuilder;

    #[test]
    fn bind_first_arg_registers_the_buffer_for_release() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        builder.start_function("f", vec![], false, Type::Void);
        let callee = builder.function_ref("adder", Type::Function { params: vec![Type::Int(32), Type::Int(32)], ret: Box::new(Type::Int(32)), variadic: false });
        let arg = builder.const_int(Type::Int(32), 5);
        let bound = bind_first_arg(
            callee,
            arg,
            Type::Function { params: vec![Type::Int(32)], ret: Box::new(Type::Int(32)), variadic: false },
            &mut ctx,
            &mut builder,
        )
        .unwrap();
        assert!(bound.callable.ty.is_pointer() || matches!(bound.callable.ty, Type::Function { .. }));
        let (_, trampolines) = ctx.pop_scope();
        assert_eq!(trampolines.len(), 1);
    }
}
