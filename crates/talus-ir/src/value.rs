//! SSA value and basic-block handles.

use crate::types::Type;
use std::fmt;

/// Opaque handle to a basic block within a function under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Opaque handle to the result of an instruction, or to a constant/function
/// reference. Every `Value` carries its IR type so expression lowering
/// never needs to re-derive it — every expression lowering yields a value
/// whose IR type is defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Value {
    pub id: u32,
    pub ty: Type,
    /// Set for instructions that compute an address (`alloca`, `gep`);
    /// callers use this to decide whether a load is still needed — an
    /// element-pointer instruction implies a load is needed.
    pub is_pointer_to_slot: bool,
}

impl Value {
    #[must_use]
    pub fn new(id: u32, ty: Type) -> Self {
        Self { id, ty, is_pointer_to_slot: false }
    }

    #[must_use]
    pub fn slot(id: u32, ty: Type) -> Self {
        Self { id, ty, is_pointer_to_slot: true }
    }
}
