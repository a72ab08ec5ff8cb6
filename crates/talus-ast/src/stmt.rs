//! Statement AST — the "Statement" node family.

use talus_diagnostics::Position;

use crate::expr::Expr;
use crate::ty::TypeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratorDecl {
    pub name: String,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm {
    pub pattern: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSwitchArm {
    pub ty: TypeNode,
    pub binder: Option<String>,
    pub body: Vec<Stmt>,
}

impl TypeSwitchArm {
    #[must_use]
    pub fn new(ty: TypeNode, body: Vec<Stmt>) -> Self {
        Self { ty, binder: None, body }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `{ ... }` — a nested scope; owns the defer records for anything
    /// deferred directly within it. `tags` are the block's own attribute
    /// annotations (e.g. `#[noinline]`), applied to the enclosing
    /// function once the block finishes lowering.
    Body { stmts: Vec<Stmt>, tags: Vec<(String, Position)>, pos: Position },

    Return { value: Option<Expr>, pos: Position },
    CoReturn { value: Option<Expr>, pos: Position },
    Yield { value: Expr, pos: Position },
    Break { pos: Position },
    Continue { pos: Position },
    Delete { operand: Expr, pos: Position },
    Defer { stmt: Box<Stmt>, pos: Position },

    If { cond: Expr, then_branch: Vec<Stmt>, else_branch: Option<Vec<Stmt>>, pos: Position },
    While { cond: Expr, body: Vec<Stmt>, pos: Position },
    For { binder: String, iterable: Expr, body: Vec<Stmt>, pos: Position },
    Select { arms: Vec<(Stmt, Vec<Stmt>)>, pos: Position },
    Match { scrutinee: Expr, arms: Vec<MatchArm>, pos: Position },
    /// `switch (expr) { case T: ...; default: ... }` — a compile-time
    /// dispatch on the scrutinee's static type, not a runtime branch.
    /// `default_body` runs iff no arm's type matched.
    TypeSwitch { scrutinee: Expr, arms: Vec<TypeSwitchArm>, default_body: Option<Vec<Stmt>>, pos: Position },

    Alias { name: String, target: TypeNode, pos: Position },
    Structure { name: String, fields: Vec<(String, TypeNode)>, pos: Position },
    Enumeration { name: String, underlying: Option<TypeNode>, variants: Vec<EnumeratorDecl>, pos: Position },

    DeclAssign { name: String, ty: Option<TypeNode>, value: Expr, mutable: bool, pos: Position },
    LetExpr { name: String, value: Expr, pos: Position },
    Assign { target: Expr, value: Expr, pos: Position },
    OpEq { op: AssignOp, target: Expr, value: Expr, pos: Position },

    /// A call expression used as a standalone statement; a discarded
    /// non-void result emits a warning, not an error.
    FuncCall { call: Expr, pos: Position },

    Send { channel: Expr, value: Expr, pos: Position },
    Receive { channel: Expr, binder: Option<String>, pos: Position },

    OutStream { value: Expr, pos: Position },
    InStream { target: Expr, pos: Position },

    PreOp { op: crate::expr::IncDecOp, operand: Expr, pos: Position },
    PostOp { op: crate::expr::IncDecOp, operand: Expr, pos: Position },

    /// Line/block comment retained for round-tripping source between
    /// tooling passes; lowering ignores it.
    Comment { text: String, pos: Position },
}

impl Stmt {
    #[must_use]
    pub fn pos(&self) -> Position {
        match self {
            Stmt::Body { pos, .. }
            | Stmt::Return { pos, .. }
            | Stmt::CoReturn { pos, .. }
            | Stmt::Yield { pos, .. }
            | Stmt::Break { pos }
            | Stmt::Continue { pos }
            | Stmt::Delete { pos, .. }
            | Stmt::Defer { pos, .. }
            | Stmt::If { pos, .. }
            | Stmt::While { pos, .. }
            | Stmt::For { pos, .. }
            | Stmt::Select { pos, .. }
            | Stmt::Match { pos, .. }
            | Stmt::TypeSwitch { pos, .. }
            | Stmt::Alias { pos, .. }
            | Stmt::Structure { pos, .. }
            | Stmt::Enumeration { pos, .. }
            | Stmt::DeclAssign { pos, .. }
            | Stmt::LetExpr { pos, .. }
            | Stmt::Assign { pos, .. }
            | Stmt::OpEq { pos, .. }
            | Stmt::FuncCall { pos, .. }
            | Stmt::Send { pos, .. }
            | Stmt::Receive { pos, .. }
            | Stmt::OutStream { pos, .. }
            | Stmt::InStream { pos, .. }
            | Stmt::PreOp { pos, .. }
            | Stmt::PostOp { pos, .. }
            | Stmt::Comment { pos, .. } => *pos,
        }
    }
}
