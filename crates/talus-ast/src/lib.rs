//! AST node taxonomy and parse-tree adaptor for the talus lowering core.

pub mod expr;
pub mod item;
pub mod parse_node;
pub mod reserved;
pub mod stmt;
pub mod ty;

pub use expr::{BinOp, Expr, IncDecOp, UnOp};
pub use item::{
    AliasItem, EnumerationItem, FunctionItem, InterfaceItem, InterfaceMethod, ParamDecl,
    StructureItem, TopLevelItem,
};
pub use parse_node::{ident_list, innermost_tag, is_reserved, outermost_tag, split_tags, ParseNode};
pub use reserved::RESERVED;
pub use stmt::{AssignOp, EnumeratorDecl, MatchArm, Stmt, TypeSwitchArm};
pub use ty::TypeNode;
