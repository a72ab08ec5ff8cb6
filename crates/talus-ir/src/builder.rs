//! Instruction builder contract — the downstream codegen seam.
//!
//! The lowering core never touches a concrete backend; it only ever holds
//! `&mut dyn Builder`, the one mutable, global-per-lowering piece of
//! state: the insertion point lives on the builder, and every
//! statement/expression leaves it on the block where execution logically
//! continues after its effect.

use crate::function::{Function, Param};
use crate::instr::{CastKind, CmpPred, FloatBinOp, FnAttr, IntBinOp, ParamAttr};
use crate::types::Type;
use crate::value::{BlockId, Value};

pub trait Builder {
    /// Begin a new function; becomes the builder's current function until
    /// `finish_function` is called.
    fn start_function(&mut self, name: &str, params: Vec<Param>, variadic: bool, return_type: Type) -> BlockId;

    fn finish_function(&mut self) -> Function;

    fn create_block(&mut self, name: &str) -> BlockId;

    fn position_at_end(&mut self, block: BlockId);

    fn current_block(&self) -> BlockId;

    fn is_terminated(&self, block: BlockId) -> bool;

    /// Parameter value for the function currently being built.
    fn param_value(&self, index: usize) -> Value;

    fn set_param_attr(&mut self, index: usize, attr: ParamAttr);

    fn set_fn_attr(&mut self, attr: FnAttr);

    fn br(&mut self, target: BlockId);

    fn cond_br(&mut self, cond: Value, then_bb: BlockId, else_bb: BlockId);

    fn ret(&mut self, value: Option<Value>);

    fn alloca(&mut self, ty: Type) -> Value;

    fn load(&mut self, ptr: Value) -> Value;

    fn store(&mut self, value: Value, ptr: Value);

    /// Element-pointer instruction at a fixed field/element index.
    fn gep(&mut self, base: Value, index: i64, result_ty: Type) -> Value;

    fn int_binop(&mut self, op: IntBinOp, lhs: Value, rhs: Value) -> Value;

    fn float_binop(&mut self, op: FloatBinOp, lhs: Value, rhs: Value) -> Value;

    fn icmp(&mut self, pred: CmpPred, lhs: Value, rhs: Value) -> Value;

    fn fcmp(&mut self, pred: CmpPred, lhs: Value, rhs: Value) -> Value;

    fn cast(&mut self, kind: CastKind, value: Value, result_ty: Type) -> Value;

    fn call(&mut self, callee: Value, args: Vec<Value>, result_ty: Type) -> Value;

    fn const_int(&mut self, ty: Type, value: i128) -> Value;

    fn const_float(&mut self, ty: Type, value: f64) -> Value;

    fn const_bool(&mut self, value: bool) -> Value;

    fn null_ptr(&mut self, pointee: Type) -> Value;

    fn zero(&mut self, ty: Type) -> Value;

    /// A reference to a named free function, by symbol name — callers
    /// pass the already-mangled name.
    fn function_ref(&mut self, name: &str, ty: Type) -> Value;

    fn define_struct(&mut self, name: &str, fields: Vec<Type>);

    /// `__builtin_virtual_alloc`.
    fn trampoline_alloc(&mut self) -> Value;

    /// `__builtin_virtual_free`.
    fn trampoline_free(&mut self, buf: Value);

    /// Marks `callee`'s first parameter `Nest`, idempotently — called once
    /// per bind, even if the same callee is bound more than once.
    fn mark_nest(&mut self, callee: Value);

    /// `llvm.init.trampoline`.
    fn trampoline_init(&mut self, buf: Value, callee: Value, nested_arg: Value);

    /// `llvm.adjust.trampoline`.
    fn trampoline_adjust(&mut self, buf: Value, result_ty: Type) -> Value;
}
