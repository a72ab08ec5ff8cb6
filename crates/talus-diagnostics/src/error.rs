//! Error taxonomy. Every variant carries the source position of the AST
//! node that triggered it.

use crate::position::Position;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LowerError {
    #[error("unknown type `{name}` at {pos}")]
    UnknownType { name: String, pos: Position },

    #[error("invalid cast at {pos}")]
    InvalidCast { pos: Position },

    #[error("`{field_name}` accessed on a non-struct value at {pos}")]
    NotAStruct { field_name: String, pos: Position },

    #[error("no member `{member}` on struct `{struct_name}` at {pos}")]
    NoSuchMember { struct_name: String, member: String, pos: Position },

    #[error("unbound identifier `{name}` at {pos}")]
    UnboundIdent { name: String, pos: Position },

    #[error("duplicate identifier `{name}` at {pos}")]
    DuplicateIdent { name: String, pos: Position },

    #[error("`{name}` is a reserved word at {pos}")]
    ReservedIdent { name: String, pos: Position },

    #[error("expected {expected} argument(s), got {found} at {pos}")]
    ArityMismatch { expected: usize, found: usize, pos: Position },

    #[error("type mismatch: expected `{expected}`, found `{found}` at {pos}")]
    TypeMismatch { expected: String, found: String, pos: Position },

    #[error("struct `{struct_name}` is missing method `{method}` at {pos}")]
    MissingMethod { struct_name: String, method: String, pos: Position },

    #[error("method `{method}` on `{struct_name}` does not match the interface signature at {pos}")]
    MethodSignatureMismatch { struct_name: String, method: String, pos: Position },

    #[error("interface `{interface_name}` declares `{function}` more than once at {pos}")]
    DuplicateInterfaceFunction { interface_name: String, function: String, pos: Position },

    #[error("function `{function}` has conflicting return types at {pos}")]
    ReturnTypeConflict { function: String, pos: Position },

    #[error("function `{function}` returns an invalid type at {pos}")]
    ReturnTypeMismatch { function: String, pos: Position },

    #[error("`break` outside of a loop at {pos}")]
    StrayBreak { pos: Position },

    #[error("unknown tag `{name}` at {pos}")]
    UnknownTag { name: String, pos: Position },

    #[error("too many arguments given to a partially-applied function at {pos}")]
    OverApplication { pos: Position },

    #[error("{feature} is not implemented at {pos}")]
    NotImplemented { feature: String, pos: Position },

    #[error("a variadic type cannot appear in a return type at {pos}")]
    VariadicInReturn { pos: Position },

    #[error("a variadic type cannot appear in a type switch arm at {pos}")]
    VariadicInTypeSwitch { pos: Position },

    #[error("`::expansion` has no argument to bind at {pos}")]
    EmptyExpansionContext { pos: Position },
}

impl LowerError {
    #[must_use]
    pub fn pos(&self) -> Position {
        match self {
            LowerError::UnknownType { pos, .. }
            | LowerError::InvalidCast { pos }
            | LowerError::NotAStruct { pos, .. }
            | LowerError::NoSuchMember { pos, .. }
            | LowerError::UnboundIdent { pos, .. }
            | LowerError::DuplicateIdent { pos, .. }
            | LowerError::ReservedIdent { pos, .. }
            | LowerError::ArityMismatch { pos, .. }
            | LowerError::TypeMismatch { pos, .. }
            | LowerError::MissingMethod { pos, .. }
            | LowerError::MethodSignatureMismatch { pos, .. }
            | LowerError::DuplicateInterfaceFunction { pos, .. }
            | LowerError::ReturnTypeConflict { pos, .. }
            | LowerError::ReturnTypeMismatch { pos, .. }
            | LowerError::StrayBreak { pos }
            | LowerError::UnknownTag { pos, .. }
            | LowerError::OverApplication { pos }
            | LowerError::NotImplemented { pos, .. }
            | LowerError::VariadicInReturn { pos }
            | LowerError::VariadicInTypeSwitch { pos }
            | LowerError::EmptyExpansionContext { pos } => *pos,
        }
    }
}

pub type LowerResult<T> = std::result::Result<T, LowerError>;
