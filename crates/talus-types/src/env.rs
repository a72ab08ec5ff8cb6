//! Module symbol environment.
//!
//! Holds the module-wide declarations the type resolver and lowering core
//! both need to look names up against: structures, interfaces, aliases,
//! and enumerations. Kept on `LoweringContext` as an owned value rather
//! than a process-wide table — no global mutable state, each lowering
//! gets its own `ModuleEnv`.

use indexmap::IndexMap;
use talus_ast::TypeNode;

#[derive(Debug, Clone)]
pub struct StructureMeta {
    pub name: String,
    pub fields: Vec<(String, TypeNode)>,
}

impl StructureMeta {
    /// Linear search for a field's index — struct fields are few enough
    /// that a linear scan beats the bookkeeping of a second index.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(field_name, _)| field_name == name)
    }
}

#[derive(Debug, Clone)]
pub struct InterfaceMethodMeta {
    pub name: String,
    pub params: Vec<TypeNode>,
    pub return_type: TypeNode,
}

#[derive(Debug, Clone)]
pub struct InterfaceMeta {
    pub name: String,
    pub extends: Vec<String>,
    pub methods: Vec<InterfaceMethodMeta>,
}

#[derive(Debug, Clone)]
pub struct EnumMeta {
    pub name: String,
    pub underlying: Option<TypeNode>,
    pub variants: Vec<(String, Option<i128>)>,
}

/// A function's declared shape, keyed by its already-mangled linkage
/// name — free functions verbatim, struct members as
/// `struct::<S>::<member>`, operator overloads as
/// `struct::<S>::operator <printable>`. This is the module function
/// table that identifier resolution and struct-member lookup both look
/// names up against.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub params: Vec<TypeNode>,
    pub return_type: TypeNode,
    pub variadic: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleEnv {
    structures: IndexMap<String, StructureMeta>,
    interfaces: IndexMap<String, InterfaceMeta>,
    aliases: IndexMap<String, TypeNode>,
    enums: IndexMap<String, EnumMeta>,
    functions: IndexMap<String, FunctionSignature>,
}

impl ModuleEnv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_structure(&mut self, meta: StructureMeta) {
        self.structures.insert(meta.name.clone(), meta);
    }

    pub fn define_interface(&mut self, meta: InterfaceMeta) {
        self.interfaces.insert(meta.name.clone(), meta);
    }

    pub fn define_alias(&mut self, name: String, target: TypeNode) {
        self.aliases.insert(name, target);
    }

    pub fn define_enum(&mut self, meta: EnumMeta) {
        self.enums.insert(meta.name.clone(), meta);
    }

    pub fn define_function(&mut self, name: String, signature: FunctionSignature) {
        self.functions.insert(name, signature);
    }

    #[must_use]
    pub fn structure(&self, name: &str) -> Option<&StructureMeta> {
        self.structures.get(name)
    }

    #[must_use]
    pub fn interface(&self, name: &str) -> Option<&InterfaceMeta> {
        self.interfaces.get(name)
    }

    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&TypeNode> {
        self.aliases.get(name)
    }

    #[must_use]
    pub fn enum_meta(&self, name: &str) -> Option<&EnumMeta> {
        self.enums.get(name)
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    /// All declared structures, walked in declaration order when checking
    /// which ones implement a given interface's full method set.
    pub fn structures(&self) -> impl Iterator<Item = &StructureMeta> {
        self.structures.values()
    }

    /// Flattened parent-then-self method list: parent interface fields
    /// come first in the synthesized vtable.
    #[must_use]
    pub fn interface_methods(&self, name: &str) -> Vec<InterfaceMethodMeta> {
        let Some(meta) = self.interface(name) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for parent in &meta.extends {
            out.extend(self.interface_methods(parent));
        }
        out.extend(meta.methods.iter().cloned());
        out
    }
}
