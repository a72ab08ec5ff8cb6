//! A reference `Builder` that simply records every instruction into a
//! function under construction. Stands in for the real native backend in
//! tests the way `plotnik-bytecode`'s `Instruction` vector stands in for a
//! real VM program during compiler unit tests.

use crate::builder::Builder;
use crate::function::{Function, Param};
use crate::instr::{CastKind, CmpPred, FloatBinOp, FnAttr, Instruction, IntBinOp, ParamAttr};
use crate::types::{FloatKind, Type};
use crate::value::{BlockId, Value};

#[derive(Debug, Default)]
pub struct RecordingBuilder {
    current: Option<Function>,
    current_block: BlockId,
    next_value: u32,
    next_block: u32,
}

impl RecordingBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_value(&mut self, ty: Type) -> Value {
        let id = self.next_value;
        self.next_value += 1;
        Value::new(id, ty)
    }

    fn push(&mut self, inst: Instruction) {
        let Some(func) = self.current.as_mut() else {
            return;
        };
        func.instructions.push(inst);
    }

    fn func_mut(&mut self) -> &mut Function {
        self.current.as_mut().expect("builder has no active function")
    }
}

impl Builder for RecordingBuilder {
    fn start_function(&mut self, name: &str, params: Vec<Param>, variadic: bool, return_type: Type) -> BlockId {
        let mut func = Function::new(name, params, variadic, return_type);
        let entry = BlockId(self.next_block);
        self.next_block += 1;
        func.entry = entry;
        func.blocks.push(entry);
        func.block_names.insert(entry, "entry".to_owned());
        self.current = Some(func);
        self.current_block = entry;
        entry
    }

    fn finish_function(&mut self) -> Function {
        self.current.take().expect("builder has no active function to finish")
    }

    fn create_block(&mut self, name: &str) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        let func = self.func_mut();
        func.blocks.push(id);
        func.block_names.insert(id, name.to_owned());
        id
    }

    fn position_at_end(&mut self, block: BlockId) {
        self.current_block = block;
    }

    fn current_block(&self) -> BlockId {
        self.current_block
    }

    fn is_terminated(&self, block: BlockId) -> bool {
        self.current.as_ref().is_some_and(|f| f.is_terminated(block))
    }

    fn param_value(&self, index: usize) -> Value {
        let func = self.current.as_ref().expect("builder has no active function");
        let param = &func.params[index];
        Value::new(index as u32, param.ty.clone())
    }

    fn set_param_attr(&mut self, index: usize, attr: ParamAttr) {
        self.func_mut().add_param_attr(index, attr);
    }

    fn set_fn_attr(&mut self, attr: FnAttr) {
        self.func_mut().fn_attrs.push(attr);
    }

    fn br(&mut self, target: BlockId) {
        let block = self.current_block;
        self.push(Instruction::Br { target, block });
    }

    fn cond_br(&mut self, cond: Value, then_bb: BlockId, else_bb: BlockId) {
        let block = self.current_block;
        self.push(Instruction::CondBr { cond, then_bb, else_bb, block });
    }

    fn ret(&mut self, value: Option<Value>) {
        let block = self.current_block;
        self.push(Instruction::Ret { value, block });
    }

    fn alloca(&mut self, ty: Type) -> Value {
        let block = self.current_block;
        let result = self.fresh_value(ty.clone().pointer_to());
        self.push(Instruction::Alloca { result: result.clone(), block });
        Value::slot(result.id, result.ty)
    }

    fn load(&mut self, ptr: Value) -> Value {
        let block = self.current_block;
        let pointee = match &ptr.ty {
            Type::Pointer(inner) => inner.as_ref().clone(),
            other => other.clone(),
        };
        let result = self.fresh_value(pointee);
        self.push(Instruction::Load { result: result.clone(), ptr, block });
        result
    }

    fn store(&mut self, value: Value, ptr: Value) {
        let block = self.current_block;
        self.push(Instruction::Store { value, ptr, block });
    }

    fn gep(&mut self, base: Value, index: i64, result_ty: Type) -> Value {
        let block = self.current_block;
        let result = self.fresh_value(result_ty.pointer_to());
        self.push(Instruction::Gep { result: result.clone(), base, index, block });
        Value::slot(result.id, result.ty)
    }

    fn int_binop(&mut self, op: IntBinOp, lhs: Value, rhs: Value) -> Value {
        let block = self.current_block;
        let result = self.fresh_value(lhs.ty.clone());
        self.push(Instruction::IntBin { result: result.clone(), op, lhs, rhs, block });
        result
    }

    fn float_binop(&mut self, op: FloatBinOp, lhs: Value, rhs: Value) -> Value {
        let block = self.current_block;
        let result = self.fresh_value(lhs.ty.clone());
        self.push(Instruction::FloatBin { result: result.clone(), op, lhs, rhs, block });
        result
    }

    fn icmp(&mut self, pred: CmpPred, lhs: Value, rhs: Value) -> Value {
        let block = self.current_block;
        let result = self.fresh_value(Type::Bool);
        self.push(Instruction::ICmp { result: result.clone(), pred, lhs, rhs, block });
        result
    }

    fn fcmp(&mut self, pred: CmpPred, lhs: Value, rhs: Value) -> Value {
        let block = self.current_block;
        let result = self.fresh_value(Type::Bool);
        self.push(Instruction::FCmp { result: result.clone(), pred, lhs, rhs, block });
        result
    }

    fn cast(&mut self, kind: CastKind, value: Value, result_ty: Type) -> Value {
        let block = self.current_block;
        let result = self.fresh_value(result_ty);
        self.push(Instruction::Cast { result: result.clone(), kind, value, block });
        result
    }

    fn call(&mut self, callee: Value, args: Vec<Value>, result_ty: Type) -> Value {
        let block = self.current_block;
        let result = self.fresh_value(result_ty);
        self.push(Instruction::Call { result: result.clone(), callee, args, block });
        result
    }

    fn const_int(&mut self, ty: Type, value: i128) -> Value {
        let _ = value;
        self.fresh_value(ty)
    }

    fn const_float(&mut self, ty: Type, value: f64) -> Value {
        let _ = value;
        self.fresh_value(ty)
    }

    fn const_bool(&mut self, value: bool) -> Value {
        let _ = value;
        self.fresh_value(Type::Bool)
    }

    fn null_ptr(&mut self, pointee: Type) -> Value {
        self.fresh_value(pointee.pointer_to())
    }

    fn zero(&mut self, ty: Type) -> Value {
        self.fresh_value(ty)
    }

    fn function_ref(&mut self, name: &str, ty: Type) -> Value {
        let _ = name;
        self.fresh_value(ty)
    }

    fn define_struct(&mut self, _name: &str, _fields: Vec<Type>) {
        // Recorded at the module level by the caller (talus-lower keeps a
        // handle to the module separately); the builder itself only tracks
        // the function under construction.
    }

    fn trampoline_alloc(&mut self) -> Value {
        let block = self.current_block;
        let char_ptr = Type::Int(8).pointer_to();
        let result = self.fresh_value(char_ptr);
        self.push(Instruction::Call {
            result: result.clone(),
            callee: Value::new(u32::MAX, Type::Function { params: vec![], ret: Box::new(result.ty.clone()), variadic: false }),
            args: vec![],
            block,
        });
        result
    }

    fn trampoline_free(&mut self, buf: Value) {
        let block = self.current_block;
        self.push(Instruction::Call {
            result: Value::new(u32::MAX - 1, Type::Void),
            callee: Value::new(u32::MAX - 2, Type::Function { params: vec![buf.ty.clone()], ret: Box::new(Type::Void), variadic: false }),
            args: vec![buf],
            block,
        });
    }

    fn mark_nest(&mut self, callee: Value) {
        let block = self.current_block;
        self.push(Instruction::MarkNest { callee, block });
    }

    fn trampoline_init(&mut self, buf: Value, callee: Value, nested_arg: Value) {
        let block = self.current_block;
        self.push(Instruction::Call {
            result: Value::new(u32::MAX - 3, Type::Void),
            callee: Value::new(u32::MAX - 4, Type::Function { params: vec![], ret: Box::new(Type::Void), variadic: false }),
            args: vec![buf, callee, nested_arg],
            block,
        });
    }

    fn trampoline_adjust(&mut self, buf: Value, result_ty: Type) -> Value {
        let block = self.current_block;
        let result = self.fresh_value(result_ty);
        self.push(Instruction::Call {
            result: result.clone(),
            callee: Value::new(u32::MAX - 5, Type::Function { params: vec![], ret: Box::new(result.ty.clone()), variadic: false }),
            args: vec![buf],
            block,
        });
        result
    }
}

#[allow(dead_code)]
fn float_kind_name(k: FloatKind) -> &'static str {
    k.printable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Param;

    #[test]
    fn records_entry_block_and_return() {
        let mut b = RecordingBuilder::new();
        b.start_function("f", vec![Param { name: "x".into(), ty: Type::Int(32), mutable: false }], false, Type::Int(32));
        let p = b.param_value(0);
        b.ret(Some(p));
        let func = b.finish_function();
        assert_eq!(func.instructions.len(), 1);
        assert!(func.is_terminated(func.entry));
    }
}
