//! Instruction vocabulary the core issues against the builder. Kept
//! intentionally close to LLVM's own instruction set, since that's the
//! layer a native codegen backend ultimately lowers into.

use crate::value::{BlockId, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntBinOp {
    And,
    Or,
    Xor,
    AddSigned,
    SubSigned,
    MulSigned,
    AddUnsigned,
    SubUnsigned,
    MulUnsigned,
    DivSigned,
    DivUnsigned,
    RemSigned,
    RemUnsigned,
    Shl,
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatBinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpPred {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    ZExt,
    Trunc,
    SExt,
    FpTrunc,
    FpExt,
    FpToSi,
    SiToFp,
    Bitcast,
    PtrCast,
}

/// Parameter attribute: `ReadOnly` for non-`mut` parameters, `Nest` for
/// the trampoline's context-pointer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamAttr {
    ReadOnly,
    Nest,
}

/// Function-level attribute, set by a function body's own tag handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FnAttr {
    NoInline,
    InlineHint,
    AlwaysInline,
    NoReturn,
}

/// One emitted instruction, recorded in program order within a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Alloca { result: Value, block: BlockId },
    Load { result: Value, ptr: Value, block: BlockId },
    Store { value: Value, ptr: Value, block: BlockId },
    Gep { result: Value, base: Value, index: i64, block: BlockId },
    IntBin { result: Value, op: IntBinOp, lhs: Value, rhs: Value, block: BlockId },
    FloatBin { result: Value, op: FloatBinOp, lhs: Value, rhs: Value, block: BlockId },
    ICmp { result: Value, pred: CmpPred, lhs: Value, rhs: Value, block: BlockId },
    FCmp { result: Value, pred: CmpPred, lhs: Value, rhs: Value, block: BlockId },
    Cast { result: Value, kind: CastKind, value: Value, block: BlockId },
    Call { result: Value, callee: Value, args: Vec<Value>, block: BlockId },
    Br { target: BlockId, block: BlockId },
    CondBr { cond: Value, then_bb: BlockId, else_bb: BlockId, block: BlockId },
    Ret { value: Option<Value>, block: BlockId },
    /// Marks a callee's first parameter `Nest` ahead of a trampoline bind.
    /// Idempotent: re-marking the same callee is a no-op at the backend
    /// level, so this is recorded unconditionally here.
    MarkNest { callee: Value, block: BlockId },
}

impl Instruction {
    #[must_use]
    pub fn block(&self) -> BlockId {
        match self {
            Instruction::Alloca { block, .. }
            | Instruction::Load { block, .. }
            | Instruction::Store { block, .. }
            | Instruction::Gep { block, .. }
            | Instruction::IntBin { block, .. }
            | Instruction::FloatBin { block, .. }
            | Instruction::ICmp { block, .. }
            | Instruction::FCmp { block, .. }
            | Instruction::Cast { block, .. }
            | Instruction::Call { block, .. }
            | Instruction::Br { block, .. }
            | Instruction::CondBr { block, .. }
            | Instruction::Ret { block, .. }
            | Instruction::MarkNest { block, .. } => *block,
        }
    }

    #[must_use]
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instruction::Br { .. } | Instruction::CondBr { .. } | Instruction::Ret { .. })
    }
}
