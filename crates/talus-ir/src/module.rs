//! The IR module a finalized function is handed off into, ready for a
//! native backend to consume. Deliberately thin: everything the
//! lowering core needs to *name* things (structures/interfaces/aliases) is
//! owned by `talus-types::ModuleEnv`, not here — this module only carries
//! what a real code generator actually consumes.

use crate::function::Function;
use crate::types::Type;
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct Module {
    pub functions: IndexMap<String, Function>,
    /// Named struct layouts, including synthesized `interface::*` vtable
    /// structs.
    pub structs: IndexMap<String, Vec<Type>>,
}

impl Module {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_struct(&mut self, name: impl Into<String>, fields: Vec<Type>) {
        self.structs.insert(name.into(), fields);
    }

    pub fn insert_function(&mut self, func: Function) {
        self.functions.insert(func.name.clone(), func);
    }
}
