//! Module-level declarations.
//!
//! The Statement taxonomy nests `Structure`/`Alias`/`Enumeration` inside
//! function bodies for locally-scoped declarations, but function
//! definitions and interface declarations only ever appear at module
//! scope. Rather than stretch `Stmt` to cover both
//! scopes, module-level declarations get their own taxonomy here; the
//! nested `Stmt::Structure`/`Stmt::Alias`/`Stmt::Enumeration` variants
//! share their field shape with the corresponding pieces below but stay
//! separate types, since a function-local struct and a module-level one
//! are resolved through different symbol tables (`talus_types::ModuleEnv`
//! vs. function-local scope).

use talus_diagnostics::Position;

use crate::stmt::{EnumeratorDecl, Stmt};
use crate::ty::TypeNode;

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeNode,
    pub mutable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionItem {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub variadic: bool,
    /// `None` triggers return-type deduction from the body.
    pub return_type: Option<TypeNode>,
    pub body: Vec<Stmt>,
    pub pos: Position,
}

/// One member signature inside an `interface` block: a function name
/// paired with its parameter/return types, with no body.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMethod {
    pub name: String,
    pub params: Vec<TypeNode>,
    pub return_type: TypeNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceItem {
    pub name: String,
    /// Parent interfaces, inherited field-order-first.
    pub extends: Vec<String>,
    pub methods: Vec<InterfaceMethod>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructureItem {
    pub name: String,
    pub fields: Vec<(String, TypeNode)>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AliasItem {
    pub name: String,
    pub target: TypeNode,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumerationItem {
    pub name: String,
    pub underlying: Option<TypeNode>,
    pub variants: Vec<EnumeratorDecl>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelItem {
    Function(FunctionItem),
    Interface(InterfaceItem),
    Structure(StructureItem),
    Alias(AliasItem),
    Enumeration(EnumerationItem),
}

impl TopLevelItem {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TopLevelItem::Function(f) => &f.name,
            TopLevelItem::Interface(i) => &i.name,
            TopLevelItem::Structure(s) => &s.name,
            TopLevelItem::Alias(a) => &a.name,
            TopLevelItem::Enumeration(e) => &e.name,
        }
    }

    #[must_use]
    pub fn pos(&self) -> Position {
        match self {
            TopLevelItem::Function(f) => f.pos,
            TopLevelItem::Interface(i) => i.pos,
            TopLevelItem::Structure(s) => s.pos,
            TopLevelItem::Alias(a) => a.pos,
            TopLevelItem::Enumeration(e) => e.pos,
        }
    }
}
