//! Function and parameter records.

use crate::instr::{FnAttr, Instruction, ParamAttr};
use crate::types::Type;
use crate::value::BlockId;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub variadic: bool,
    pub return_type: Type,
    pub entry: BlockId,
    /// Blocks in creation order; callers never need dominance, only
    /// iteration order and membership, matching how the lowering core
    /// walks a function during return-type deduction and defer replay.
    pub blocks: Vec<BlockId>,
    pub block_names: IndexMap<BlockId, String>,
    pub instructions: Vec<Instruction>,
    pub param_attrs: IndexMap<(usize, ParamAttr), ()>,
    pub fn_attrs: Vec<FnAttr>,
}

impl Function {
    #[must_use]
    pub fn new(name: impl Into<String>, params: Vec<Param>, variadic: bool, return_type: Type) -> Self {
        Self {
            name: name.into(),
            params,
            variadic,
            return_type,
            entry: BlockId(0),
            blocks: Vec::new(),
            block_names: IndexMap::new(),
            instructions: Vec::new(),
            param_attrs: IndexMap::new(),
            fn_attrs: Vec::new(),
        }
    }

    #[must_use]
    pub fn block_name(&self, id: BlockId) -> &str {
        self.block_names.get(&id).map_or("", String::as_str)
    }

    #[must_use]
    pub fn instructions_in(&self, block: BlockId) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter().filter(move |i| i.block() == block)
    }

    #[must_use]
    pub fn is_terminated(&self, block: BlockId) -> bool {
        self.instructions_in(block).last().is_some_and(Instruction::is_terminator)
    }

    #[must_use]
    pub fn has_param_attr(&self, index: usize, attr: ParamAttr) -> bool {
        self.param_attrs.contains_key(&(index, attr))
    }

    pub fn add_param_attr(&mut self, index: usize, attr: ParamAttr) {
        self.param_attrs.insert((index, attr), ());
    }

    /// Signature equality ignoring name — used by interface `implements` checks.
    #[must_use]
    pub fn signature(&self) -> Type {
        Type::Function {
            params: self.params.iter().map(|p| p.ty.clone()).collect(),
            ret: Box::new(self.return_type.clone()),
            variadic: self.variadic,
        }
    }
}
